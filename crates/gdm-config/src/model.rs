//! Logistic model specification types.
//!
//! A `ModelSpec` is pure data: the scoring crate compiles it into an
//! evaluable model. These types are the on-disk format of `models.json`.

use gdm_common::RiskSource;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A pre-fitted logistic regression and everything needed to apply it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSpec {
    /// Stable model name (usually the preset name).
    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    /// Which data source this model scores.
    pub source: RiskSource,

    pub intercept: f64,

    /// Order in which features enter the linear predictor.
    pub feature_order: Vec<String>,

    /// Coefficient per feature. Must cover every name in `feature_order`.
    pub coefficients: BTreeMap<String, f64>,

    /// Probability cutoffs for categorisation.
    pub thresholds: Thresholds,

    /// Accepted input domain per feature.
    #[serde(default)]
    pub inputs: BTreeMap<String, InputSpec>,

    /// Present when features are log10 + Pareto scaled before scoring.
    #[serde(default)]
    pub normalization: Option<NormalizationSpec>,

    /// Coefficients are placeholders; the model cannot score until refitted.
    #[serde(default)]
    pub provisional: bool,
}

impl ModelSpec {
    /// Coefficient for a feature, if present.
    pub fn coefficient(&self, feature: &str) -> Option<f64> {
        self.coefficients.get(feature).copied()
    }

    /// Whether features pass through the normalizer.
    pub fn is_normalized(&self) -> bool {
        self.normalization.is_some()
    }
}

/// Probability cutoffs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Thresholds {
    /// Binary split: `p >= threshold` is High, otherwise Low.
    Single { threshold: f64 },
    /// Three bands: `[0, low)` Low, `[low, high)` Intermediate, `[high, 1]` High.
    Banded { low: f64, high: f64 },
}

impl Thresholds {
    /// The cutoffs as a list, ascending.
    pub fn cutoffs(&self) -> Vec<f64> {
        match self {
            Thresholds::Single { threshold } => vec![*threshold],
            Thresholds::Banded { low, high } => vec![*low, *high],
        }
    }
}

/// Accepted input domain for one feature.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct InputSpec {
    #[serde(default)]
    pub unit: Option<String>,

    #[serde(default)]
    pub min: Option<f64>,

    #[serde(default)]
    pub max: Option<f64>,

    /// Only 0 and 1 are accepted.
    #[serde(default)]
    pub binary: bool,
}

impl InputSpec {
    pub fn range(unit: &str, min: f64, max: f64) -> Self {
        InputSpec {
            unit: Some(unit.to_string()),
            min: Some(min),
            max: Some(max),
            binary: false,
        }
    }

    pub fn flag() -> Self {
        InputSpec {
            unit: None,
            min: None,
            max: None,
            binary: true,
        }
    }

    pub fn unit_only(unit: &str) -> Self {
        InputSpec {
            unit: Some(unit.to_string()),
            ..InputSpec::default()
        }
    }
}

/// Reference training sample per feature, from which log10 mean/sd are derived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizationSpec {
    pub reference: BTreeMap<String, Vec<f64>>,
}
