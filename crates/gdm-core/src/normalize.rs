//! Feature normalization: log10 transform followed by Pareto scaling.
//!
//! ```text
//! z_k = (log10(raw_k) - mean_k) / sqrt(sd_k)
//! ```
//!
//! `mean_k` and `sd_k` are the mean and sample standard deviation of `log10`
//! of the model's fixed reference sample. They are computed once, when a model
//! is compiled, and handed to the model as an immutable value.

use gdm_common::{Error, InputProblem, Result};
use gdm_config::NormalizationSpec;
use gdm_math::log10_summary;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::warn;

use crate::input::FeatureSet;
use crate::logging::event_names;

/// Log10 statistics of one feature's reference sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeatureStats {
    /// Mean of `log10(reference)`.
    pub mean_log: f64,
    /// Sample standard deviation (`n - 1`) of `log10(reference)`.
    pub sd_log: f64,
    /// Reference sample size.
    pub n: usize,
}

impl FeatureStats {
    pub fn new(mean_log: f64, sd_log: f64, n: usize) -> Self {
        FeatureStats { mean_log, sd_log, n }
    }

    /// Zero spread in the reference sample.
    pub fn is_degenerate(&self) -> bool {
        self.sd_log == 0.0
    }

    /// Pareto divisor `sqrt(sd)`, or 1.0 when the sample has no spread.
    pub fn divisor(&self) -> f64 {
        if self.is_degenerate() {
            1.0
        } else {
            self.sd_log.sqrt()
        }
    }

    /// Scale a raw (strictly positive) value.
    pub fn scale(&self, raw: f64) -> f64 {
        (raw.log10() - self.mean_log) / self.divisor()
    }

    /// Raw value that normalizes to zero.
    pub fn center(&self) -> f64 {
        10f64.powf(self.mean_log)
    }
}

/// Per-feature reference statistics for one model.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NormalizationStats {
    features: BTreeMap<String, FeatureStats>,
}

impl NormalizationStats {
    /// Derive statistics from a reference sample per feature.
    ///
    /// A feature whose log10 values have zero spread is accepted with a
    /// warning; it then scales with a divisor of 1.0.
    pub fn from_reference(spec: &NormalizationSpec) -> Result<Self> {
        let mut stats = NormalizationStats::default();
        for (feature, sample) in &spec.reference {
            let summary = log10_summary(sample).ok_or_else(|| {
                Error::InvalidModel(format!(
                    "reference sample for {} needs at least 2 finite values > 0",
                    feature
                ))
            })?;
            let feature_stats = FeatureStats::new(summary.mean, summary.sd, summary.n);
            if feature_stats.is_degenerate() {
                warn!(
                    event = event_names::NORMALIZE_DEGENERATE_SD,
                    feature = %feature,
                    "reference standard deviation is zero, using unit divisor"
                );
            }
            stats.insert(feature.clone(), feature_stats);
        }
        Ok(stats)
    }

    pub fn insert(&mut self, feature: impl Into<String>, stats: FeatureStats) {
        self.features.insert(feature.into(), stats);
    }

    pub fn get(&self, feature: &str) -> Option<&FeatureStats> {
        self.features.get(feature)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FeatureStats)> {
        self.features.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Features scaled with the fallback divisor.
    pub fn degenerate_features(&self) -> Vec<&str> {
        self.features
            .iter()
            .filter(|(_, s)| s.is_degenerate())
            .map(|(k, _)| k.as_str())
            .collect()
    }

    /// Normalize `features` of `raw`. Every listed feature must be present,
    /// finite and strictly positive.
    pub fn normalize(&self, raw: &FeatureSet, features: &[String]) -> Result<FeatureSet> {
        let mut out = FeatureSet::new();
        for feature in features {
            let value = raw.require(feature)?;
            if !value.is_finite() {
                return Err(Error::invalid_input(
                    feature.as_str(),
                    InputProblem::NotFinite,
                ));
            }
            if value <= 0.0 {
                return Err(Error::invalid_input(
                    feature.as_str(),
                    InputProblem::NotPositive { value },
                ));
            }
            let stats = self.get(feature).ok_or_else(|| {
                Error::InvalidModel(format!("no reference statistics for {}", feature))
            })?;
            out.insert(feature.as_str(), stats.scale(value));
        }
        Ok(out)
    }
}
