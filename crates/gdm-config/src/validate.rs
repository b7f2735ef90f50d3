//! Configuration validation errors and semantic validation.

use crate::model::{ModelSpec, Thresholds};
use std::collections::BTreeSet;
use thiserror::Error;

/// Validation result type.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Configuration validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Semantic validation failed: {0}")]
    SemanticError(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Version mismatch: expected {expected}, got {actual}")]
    VersionMismatch { expected: String, actual: String },

    #[error("Unknown model '{0}' in catalog")]
    UnknownModel(String),
}

impl ValidationError {
    /// Error code for structured error reporting.
    pub fn code(&self) -> u32 {
        match self {
            ValidationError::IoError(_) => 60,
            ValidationError::ParseError(_) => 61,
            ValidationError::SemanticError(_) => 63,
            ValidationError::MissingField(_) => 64,
            ValidationError::InvalidValue { .. } => 65,
            ValidationError::VersionMismatch { .. } => 66,
            ValidationError::UnknownModel(_) => 67,
        }
    }
}

impl From<ValidationError> for gdm_common::Error {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::IoError(_) | ValidationError::ParseError(_) => {
                gdm_common::Error::Config(err.to_string())
            }
            other => gdm_common::Error::InvalidModel(other.to_string()),
        }
    }
}

/// Validate a model specification semantically.
pub fn validate_model(spec: &ModelSpec) -> ValidationResult<()> {
    if spec.name.trim().is_empty() {
        return Err(ValidationError::MissingField("name".to_string()));
    }
    let prefix = spec.name.as_str();

    if !spec.intercept.is_finite() {
        return Err(ValidationError::InvalidValue {
            field: format!("{}.intercept", prefix),
            message: format!("Must be finite, got {}", spec.intercept),
        });
    }

    validate_feature_order(spec)?;
    validate_thresholds(prefix, &spec.thresholds)?;
    validate_inputs(spec)?;
    validate_normalization(spec)?;

    Ok(())
}

/// Feature order must be non-empty, unique and fully covered by coefficients.
fn validate_feature_order(spec: &ModelSpec) -> ValidationResult<()> {
    if spec.feature_order.is_empty() {
        return Err(ValidationError::MissingField(format!(
            "{}.feature_order",
            spec.name
        )));
    }

    let mut seen = BTreeSet::new();
    for feature in &spec.feature_order {
        if !seen.insert(feature.as_str()) {
            return Err(ValidationError::SemanticError(format!(
                "{}: feature '{}' listed twice in feature_order",
                spec.name, feature
            )));
        }
        match spec.coefficients.get(feature) {
            None => {
                return Err(ValidationError::MissingField(format!(
                    "{}.coefficients.{}",
                    spec.name, feature
                )));
            }
            Some(c) if !c.is_finite() => {
                return Err(ValidationError::InvalidValue {
                    field: format!("{}.coefficients.{}", spec.name, feature),
                    message: format!("Must be finite, got {}", c),
                });
            }
            Some(_) => {}
        }
    }

    Ok(())
}

/// Cutoffs are probabilities strictly inside (0, 1); banded cutoffs ascend.
fn validate_thresholds(prefix: &str, thresholds: &Thresholds) -> ValidationResult<()> {
    let in_open_unit = |v: f64| v.is_finite() && v > 0.0 && v < 1.0;

    match *thresholds {
        Thresholds::Single { threshold } => {
            if !in_open_unit(threshold) {
                return Err(ValidationError::InvalidValue {
                    field: format!("{}.thresholds.threshold", prefix),
                    message: format!("Must be in (0, 1), got {}", threshold),
                });
            }
        }
        Thresholds::Banded { low, high } => {
            if !in_open_unit(low) {
                return Err(ValidationError::InvalidValue {
                    field: format!("{}.thresholds.low", prefix),
                    message: format!("Must be in (0, 1), got {}", low),
                });
            }
            if !in_open_unit(high) {
                return Err(ValidationError::InvalidValue {
                    field: format!("{}.thresholds.high", prefix),
                    message: format!("Must be in (0, 1), got {}", high),
                });
            }
            if low >= high {
                return Err(ValidationError::SemanticError(format!(
                    "{}: thresholds.low ({}) must be below thresholds.high ({})",
                    prefix, low, high
                )));
            }
        }
    }

    Ok(())
}

fn validate_inputs(spec: &ModelSpec) -> ValidationResult<()> {
    for (feature, input) in &spec.inputs {
        if !spec.feature_order.contains(feature) {
            return Err(ValidationError::SemanticError(format!(
                "{}: input spec for unknown feature '{}'",
                spec.name, feature
            )));
        }
        for (bound, value) in [("min", input.min), ("max", input.max)] {
            if let Some(v) = value {
                if !v.is_finite() {
                    return Err(ValidationError::InvalidValue {
                        field: format!("{}.inputs.{}.{}", spec.name, feature, bound),
                        message: format!("Must be finite, got {}", v),
                    });
                }
            }
        }
        if let (Some(min), Some(max)) = (input.min, input.max) {
            if min >= max {
                return Err(ValidationError::InvalidValue {
                    field: format!("{}.inputs.{}", spec.name, feature),
                    message: format!("min ({}) must be below max ({})", min, max),
                });
            }
        }
    }
    Ok(())
}

/// Every normalized feature needs at least two strictly positive reference values.
fn validate_normalization(spec: &ModelSpec) -> ValidationResult<()> {
    let Some(normalization) = &spec.normalization else {
        return Ok(());
    };

    for feature in &spec.feature_order {
        let field = format!("{}.normalization.reference.{}", spec.name, feature);
        let sample = normalization
            .reference
            .get(feature)
            .ok_or_else(|| ValidationError::MissingField(field.clone()))?;

        if sample.len() < 2 {
            return Err(ValidationError::InvalidValue {
                field,
                message: format!("Need at least 2 observations, got {}", sample.len()),
            });
        }
        if let Some(bad) = sample.iter().find(|v| !v.is_finite() || **v <= 0.0) {
            return Err(ValidationError::InvalidValue {
                field,
                message: format!("Reference values must be > 0, got {}", bad),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preset::{get_preset, PresetName};

    #[test]
    fn missing_coefficient_rejected() {
        let mut spec = get_preset(PresetName::Lipid);
        spec.coefficients.remove("hdl");
        let err = validate_model(&spec).unwrap_err();
        assert!(matches!(err, ValidationError::MissingField(ref f) if f == "lipid.coefficients.hdl"));
    }

    #[test]
    fn extra_coefficients_allowed() {
        let mut spec = get_preset(PresetName::Lipid);
        spec.coefficients.insert("ldl".to_string(), 0.2);
        assert!(validate_model(&spec).is_ok());
    }

    #[test]
    fn duplicate_feature_rejected() {
        let mut spec = get_preset(PresetName::Clinical);
        spec.feature_order.push("bmi".to_string());
        assert!(matches!(
            validate_model(&spec),
            Err(ValidationError::SemanticError(_))
        ));
    }

    #[test]
    fn inverted_bands_rejected() {
        let mut spec = get_preset(PresetName::Clinical);
        spec.thresholds = Thresholds::Banded { low: 0.7, high: 0.4 };
        assert!(matches!(
            validate_model(&spec),
            Err(ValidationError::SemanticError(_))
        ));
    }

    #[test]
    fn threshold_outside_unit_interval_rejected() {
        let mut spec = get_preset(PresetName::Metabolomic4);
        spec.thresholds = Thresholds::Single { threshold: 1.0 };
        assert!(matches!(
            validate_model(&spec),
            Err(ValidationError::InvalidValue { .. })
        ));
    }

    #[test]
    fn non_positive_reference_rejected() {
        let mut spec = get_preset(PresetName::Metabolomic5);
        if let Some(n) = spec.normalization.as_mut() {
            n.reference.insert("MH3".to_string(), vec![1.0, 0.0, 2.0]);
        }
        let err = validate_model(&spec).unwrap_err();
        assert!(err.to_string().contains("MH3"));
    }

    #[test]
    fn missing_reference_rejected() {
        let mut spec = get_preset(PresetName::Metabolomic5);
        if let Some(n) = spec.normalization.as_mut() {
            n.reference.remove("Tyrosine");
        }
        assert!(matches!(
            validate_model(&spec),
            Err(ValidationError::MissingField(_))
        ));
    }

    #[test]
    fn input_bounds_must_ascend() {
        let mut spec = get_preset(PresetName::Clinical);
        if let Some(bmi) = spec.inputs.get_mut("bmi") {
            bmi.min = Some(60.0);
            bmi.max = Some(14.0);
        }
        assert!(validate_model(&spec).is_err());
    }

    #[test]
    fn converts_into_common_error() {
        let err: gdm_common::Error = ValidationError::UnknownModel("x".to_string()).into();
        assert_eq!(err.code(), 11);
        let err: gdm_common::Error = ValidationError::ParseError("bad".to_string()).into();
        assert_eq!(err.code(), 10);
    }
}
