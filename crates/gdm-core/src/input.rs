//! Raw field parsing and per-feature domain checks.
//!
//! Values arrive as text from a form field, a CLI flag or a CSV cell. Parsing
//! accepts `,` or `.` as the decimal separator. Blank text is a missing
//! feature; other text that does not yield a finite number is not numeric.

use gdm_common::{Error, InputProblem, Result};
use gdm_config::InputSpec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

use crate::logging::event_names;

/// Parse a decimal number typed by a person.
///
/// Surrounding whitespace is trimmed and `,` is read as the decimal point.
/// Empty or malformed text, and textual `nan`/`inf`, yield `None`.
pub fn parse_decimal(raw: &str) -> Option<f64> {
    let cleaned = raw.trim().replace(',', ".");
    if cleaned.is_empty() {
        return None;
    }
    let value: f64 = cleaned.parse().ok()?;
    value.is_finite().then_some(value)
}

/// Parse a field that must hold a number, naming the feature on failure.
///
/// Blank text is reported as missing; any other unparseable text as not numeric.
pub fn parse_field(feature: &str, raw: &str) -> Result<f64> {
    if raw.trim().is_empty() {
        return Err(Error::missing(feature));
    }
    parse_decimal(raw).ok_or_else(|| {
        Error::invalid_input(
            feature,
            InputProblem::NotNumeric {
                raw: raw.trim().to_string(),
            },
        )
    })
}

/// Parse a yes/no flag into 0.0 or 1.0.
pub fn parse_flag(feature: &str, raw: &str) -> Result<f64> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "yes" | "y" | "true" | "да" => Ok(1.0),
        "0" | "no" | "n" | "false" | "нет" => Ok(0.0),
        "" => Err(Error::missing(feature)),
        _ => parse_field(feature, raw),
    }
}

/// Feature name to value for one subject.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureSet {
    values: BTreeMap<String, f64>,
}

impl FeatureSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: f64) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: f64) {
        self.values.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Value of a required feature, or a missing-feature error naming it.
    pub fn require(&self, name: &str) -> Result<f64> {
        self.get(name).ok_or_else(|| Error::missing(name))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for FeatureSet {
    fn from_iter<T: IntoIterator<Item = (K, f64)>>(iter: T) -> Self {
        let mut set = FeatureSet::new();
        for (k, v) in iter {
            set.insert(k, v);
        }
        set
    }
}

/// What to do with a value outside its accepted input range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RangePolicy {
    /// Fail with [`InputProblem::OutOfRange`].
    #[default]
    Reject,
    /// Pull the value to the nearest bound and log a warning.
    Clamp,
}

/// Check one value against its domain.
///
/// Order of checks: finiteness, binary flag, positivity (for log-transformed
/// features), then range under `policy`. Returns the value to score with.
pub fn check_value(
    feature: &str,
    value: f64,
    spec: Option<&InputSpec>,
    require_positive: bool,
    policy: RangePolicy,
) -> Result<f64> {
    if !value.is_finite() {
        return Err(Error::invalid_input(feature, InputProblem::NotFinite));
    }

    if spec.is_some_and(|s| s.binary) && value != 0.0 && value != 1.0 {
        return Err(Error::invalid_input(
            feature,
            InputProblem::NotBinary { value },
        ));
    }

    if require_positive && value <= 0.0 {
        return Err(Error::invalid_input(
            feature,
            InputProblem::NotPositive { value },
        ));
    }

    let Some(spec) = spec else {
        return Ok(value);
    };
    let min = spec.min.unwrap_or(f64::NEG_INFINITY);
    let max = spec.max.unwrap_or(f64::INFINITY);
    if value >= min && value <= max {
        return Ok(value);
    }

    match policy {
        RangePolicy::Reject => Err(Error::invalid_input(
            feature,
            InputProblem::OutOfRange { value, min, max },
        )),
        RangePolicy::Clamp => {
            let clamped = value.clamp(min, max);
            warn!(
                event = event_names::INPUT_CLAMPED,
                feature,
                value,
                clamped,
                "input outside accepted range, clamped"
            );
            Ok(clamped)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_comma_and_dot() {
        assert_eq!(parse_decimal("27,5"), Some(27.5));
        assert_eq!(parse_decimal(" 27.5 "), Some(27.5));
        assert_eq!(parse_decimal("3"), Some(3.0));
        assert_eq!(parse_decimal("-0,25"), Some(-0.25));
    }

    #[test]
    fn malformed_text_is_no_value() {
        assert_eq!(parse_decimal(""), None);
        assert_eq!(parse_decimal("   "), None);
        assert_eq!(parse_decimal("abc"), None);
        assert_eq!(parse_decimal("1,2,3"), None);
        assert_eq!(parse_decimal("nan"), None);
        assert_eq!(parse_decimal("inf"), None);
        assert_eq!(parse_decimal("-Infinity"), None);
    }

    #[test]
    fn parse_field_distinguishes_blank_and_garbage() {
        let err = parse_field("bmi", "").unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidInput { ref feature, problem: InputProblem::Missing } if feature == "bmi"
        ));

        let err = parse_field("bmi", "twenty").unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidInput { problem: InputProblem::NotNumeric { .. }, .. }
        ));

        assert_eq!(parse_field("bmi", "22,4").unwrap(), 22.4);
    }

    #[test]
    fn flags_accept_words() {
        assert_eq!(parse_flag("family_history", "yes").unwrap(), 1.0);
        assert_eq!(parse_flag("family_history", "Нет").unwrap(), 0.0);
        assert_eq!(parse_flag("family_history", "1").unwrap(), 1.0);
        assert_eq!(parse_flag("family_history", "2").unwrap(), 2.0);
        assert!(parse_flag("family_history", "maybe").is_err());
    }

    #[test]
    fn require_names_missing_feature() {
        let set = FeatureSet::new().with("bmi", parse_field("bmi", "27,0").unwrap());
        assert_eq!(set.require("bmi").unwrap(), 27.0);
        assert!(!set.contains("family_history"));
        assert!(matches!(
            set.require("family_history"),
            Err(Error::InvalidInput { problem: InputProblem::Missing, .. })
        ));
    }

    #[test]
    fn binary_flag_rejected_under_either_policy() {
        let spec = InputSpec::flag();
        for policy in [RangePolicy::Reject, RangePolicy::Clamp] {
            let err = check_value("family_history", 0.5, Some(&spec), false, policy).unwrap_err();
            assert!(matches!(
                err,
                Error::InvalidInput { problem: InputProblem::NotBinary { .. }, .. }
            ));
        }
        assert_eq!(
            check_value("family_history", 1.0, Some(&spec), false, RangePolicy::Reject).unwrap(),
            1.0
        );
    }

    #[test]
    fn range_policy_reject_and_clamp() {
        let spec = InputSpec::range("kg/m2", 14.0, 60.0);
        let err = check_value("bmi", 70.0, Some(&spec), false, RangePolicy::Reject).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidInput {
                problem: InputProblem::OutOfRange { min, max, .. },
                ..
            } if min == 14.0 && max == 60.0
        ));

        assert_eq!(
            check_value("bmi", 70.0, Some(&spec), false, RangePolicy::Clamp).unwrap(),
            60.0
        );
        assert_eq!(
            check_value("bmi", 10.0, Some(&spec), false, RangePolicy::Clamp).unwrap(),
            14.0
        );
        assert_eq!(
            check_value("bmi", 14.0, Some(&spec), false, RangePolicy::Reject).unwrap(),
            14.0
        );
    }

    #[test]
    fn positivity_checked_before_range() {
        let err = check_value("MH3", 0.0, None, true, RangePolicy::Clamp).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidInput { problem: InputProblem::NotPositive { .. }, .. }
        ));
    }

    #[test]
    fn non_finite_rejected() {
        let err = check_value("hdl", f64::NAN, None, false, RangePolicy::Reject).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidInput { problem: InputProblem::NotFinite, .. }
        ));
    }
}
