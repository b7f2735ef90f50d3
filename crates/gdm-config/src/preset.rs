//! Built-in model presets.
//!
//! Provides the fitted configurations for:
//! - Clinical: BMI and first-degree family history of diabetes
//! - Lipid: triglycerides and HDL cholesterol
//! - Metabolomic5: five urinary amino-acid metabolites, three bands
//! - Metabolomic4: four metabolites, single Youden cutoff
//!
//! The two metabolomic presets are independent fits and are never mixed.

use crate::model::{InputSpec, ModelSpec, NormalizationSpec, Thresholds};
use gdm_common::RiskSource;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Canonical feature names.
pub mod features {
    pub const BMI: &str = "bmi";
    pub const FAMILY_HISTORY: &str = "family_history";
    pub const TRIGLYCERIDES: &str = "triglycerides";
    pub const HDL: &str = "hdl";
    pub const TYROSINE: &str = "Tyrosine";
    pub const ALPHA_AMINOADIPIC_ACID: &str = "AlphaAminoadipicAcid";
    pub const MH3: &str = "MH3";
    pub const PHOSPHOETHANOLAMINE: &str = "Phosphoethanolamine";
    pub const PHOSPHOSERINE: &str = "Phosphoserine";
}

use features::*;

const METABOLITE_UNIT: &str = "mmol/mol creatinine";

/// Reference training sample (10 subjects) per metabolite.
const TRAIN_TYROSINE: [f64; 10] = [
    45.31, 23.43, 15.03, 20.80, 19.32, 9.58, 12.33, 10.53, 10.17, 14.52,
];
const TRAIN_ALPHA_AMINOADIPIC_ACID: [f64; 10] =
    [0.95, 1.12, 1.02, 1.08, 1.00, 2.40, 2.20, 2.50, 2.10, 2.35];
const TRAIN_MH3: [f64; 10] = [
    46.08, 35.35, 39.78, 15.54, 36.53, 11.93, 10.46, 15.63, 16.70, 11.75,
];
const TRAIN_PHOSPHOETHANOLAMINE: [f64; 10] =
    [1.08, 0.55, 1.26, 1.09, 0.69, 2.93, 1.91, 1.91, 1.88, 2.20];
const TRAIN_PHOSPHOSERINE: [f64; 10] =
    [1.68, 2.12, 0.67, 0.53, 0.35, 8.00, 3.78, 3.59, 1.80, 2.52];

/// Available model presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresetName {
    /// BMI + family history, three bands
    Clinical,
    /// Triglycerides + HDL, three bands
    Lipid,
    /// Five metabolites, Pareto-scaled, three bands
    Metabolomic5,
    /// Four metabolites, Pareto-scaled, Youden cutoff
    Metabolomic4,
}

impl PresetName {
    /// All available preset names.
    pub const ALL: &'static [PresetName] = &[
        PresetName::Clinical,
        PresetName::Lipid,
        PresetName::Metabolomic5,
        PresetName::Metabolomic4,
    ];

    /// Get preset name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            PresetName::Clinical => "clinical",
            PresetName::Lipid => "lipid",
            PresetName::Metabolomic5 => "metabolomic5",
            PresetName::Metabolomic4 => "metabolomic4",
        }
    }

    /// Parse preset name from string.
    pub fn parse(s: &str) -> Option<PresetName> {
        match s.to_lowercase().as_str() {
            "clinical" | "base" | "baseline" => Some(PresetName::Clinical),
            "lipid" | "lipids" => Some(PresetName::Lipid),
            "metabolomic5" | "metabolomic" | "meta5" | "m5" => Some(PresetName::Metabolomic5),
            "metabolomic4" | "meta4" | "m4" | "youden" => Some(PresetName::Metabolomic4),
            _ => None,
        }
    }

    /// Which data source the preset scores.
    pub fn source(&self) -> RiskSource {
        match self {
            PresetName::Clinical => RiskSource::Clinical,
            PresetName::Lipid => RiskSource::Lipid,
            PresetName::Metabolomic5 | PresetName::Metabolomic4 => RiskSource::Metabolomic,
        }
    }

    /// Get a description of the preset.
    pub fn description(&self) -> &'static str {
        match self {
            PresetName::Clinical => "Baseline GDM risk from BMI and first-degree family history",
            PresetName::Lipid => "Complication risk from triglycerides and HDL cholesterol",
            PresetName::Metabolomic5 => {
                "Complication risk from five urinary amino acids (LASSO fit, cutoffs 0.05/0.1)"
            }
            PresetName::Metabolomic4 => {
                "Complication risk from four urinary amino acids (Youden cutoff 0.382)"
            }
        }
    }
}

impl fmt::Display for PresetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for PresetName {
    type Err = PresetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PresetName::parse(s).ok_or_else(|| PresetError::UnknownPreset(s.to_string()))
    }
}

/// Errors related to preset operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PresetError {
    #[error(
        "Unknown preset '{0}'. Available: {available}",
        available = PresetName::ALL.iter().map(|p| p.as_str()).collect::<Vec<_>>().join(", ")
    )]
    UnknownPreset(String),

    #[error("Preset {preset} cannot score {expected} data")]
    WrongSource {
        preset: PresetName,
        expected: RiskSource,
    },
}

/// Preset metadata for listings.
#[derive(Debug, Clone, Serialize)]
pub struct PresetInfo {
    pub name: PresetName,
    pub source: RiskSource,
    pub description: String,
    pub features: Vec<String>,
    pub thresholds: Thresholds,
    pub provisional: bool,
}

/// List all presets with their key parameters.
pub fn list_presets() -> Vec<PresetInfo> {
    PresetName::ALL
        .iter()
        .map(|name| {
            let spec = get_preset(*name);
            PresetInfo {
                name: *name,
                source: spec.source,
                description: name.description().to_string(),
                features: spec.feature_order.clone(),
                thresholds: spec.thresholds,
                provisional: spec.provisional,
            }
        })
        .collect()
}

/// Get the model specification for a preset.
pub fn get_preset(name: PresetName) -> ModelSpec {
    match name {
        PresetName::Clinical => clinical_preset(),
        PresetName::Lipid => lipid_preset(),
        PresetName::Metabolomic5 => metabolomic5_preset(),
        PresetName::Metabolomic4 => metabolomic4_preset(),
    }
}

fn coefficients(pairs: &[(&str, f64)]) -> BTreeMap<String, f64> {
    pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

fn order(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

/// BMI and family history feed the linear predictor raw.
fn clinical_preset() -> ModelSpec {
    let mut inputs = BTreeMap::new();
    inputs.insert(BMI.to_string(), InputSpec::range("kg/m2", 14.0, 60.0));
    inputs.insert(FAMILY_HISTORY.to_string(), InputSpec::flag());

    ModelSpec {
        name: PresetName::Clinical.as_str().to_string(),
        description: Some(PresetName::Clinical.description().to_string()),
        source: RiskSource::Clinical,
        intercept: -2.8830,
        feature_order: order(&[BMI, FAMILY_HISTORY]),
        coefficients: coefficients(&[(BMI, 0.1043), (FAMILY_HISTORY, 0.8860)]),
        thresholds: Thresholds::Banded {
            low: 0.388,
            high: 0.607,
        },
        inputs,
        normalization: None,
        provisional: false,
    }
}

fn lipid_preset() -> ModelSpec {
    let mut inputs = BTreeMap::new();
    inputs.insert(TRIGLYCERIDES.to_string(), InputSpec::range("mmol/L", 0.1, 20.0));
    inputs.insert(HDL.to_string(), InputSpec::range("mmol/L", 0.1, 5.0));

    ModelSpec {
        name: PresetName::Lipid.as_str().to_string(),
        description: Some(PresetName::Lipid.description().to_string()),
        source: RiskSource::Lipid,
        intercept: -2.837,
        feature_order: order(&[TRIGLYCERIDES, HDL]),
        coefficients: coefficients(&[(TRIGLYCERIDES, 2.431), (HDL, -1.323)]),
        thresholds: Thresholds::Banded {
            low: 0.35,
            high: 0.689,
        },
        inputs,
        normalization: None,
        provisional: false,
    }
}

fn metabolite_inputs(names: &[&str]) -> BTreeMap<String, InputSpec> {
    names
        .iter()
        .map(|n| (n.to_string(), InputSpec::unit_only(METABOLITE_UNIT)))
        .collect()
}

fn metabolite_reference(names: &[&str]) -> NormalizationSpec {
    let all: [(&str, &[f64]); 5] = [
        (TYROSINE, &TRAIN_TYROSINE[..]),
        (ALPHA_AMINOADIPIC_ACID, &TRAIN_ALPHA_AMINOADIPIC_ACID[..]),
        (MH3, &TRAIN_MH3[..]),
        (PHOSPHOETHANOLAMINE, &TRAIN_PHOSPHOETHANOLAMINE[..]),
        (PHOSPHOSERINE, &TRAIN_PHOSPHOSERINE[..]),
    ];
    NormalizationSpec {
        reference: all
            .iter()
            .filter(|(k, _)| names.contains(k))
            .map(|(k, v)| (k.to_string(), v.to_vec()))
            .collect(),
    }
}

/// Five-metabolite LASSO fit; no intercept.
fn metabolomic5_preset() -> ModelSpec {
    let names = [
        TYROSINE,
        ALPHA_AMINOADIPIC_ACID,
        MH3,
        PHOSPHOETHANOLAMINE,
        PHOSPHOSERINE,
    ];
    ModelSpec {
        name: PresetName::Metabolomic5.as_str().to_string(),
        description: Some(PresetName::Metabolomic5.description().to_string()),
        source: RiskSource::Metabolomic,
        intercept: 0.0,
        feature_order: order(&names),
        coefficients: coefficients(&[
            (TYROSINE, 2.33),
            (ALPHA_AMINOADIPIC_ACID, 0.96),
            (MH3, 1.13),
            (PHOSPHOETHANOLAMINE, -2.89),
            (PHOSPHOSERINE, -2.48),
        ]),
        thresholds: Thresholds::Banded {
            low: 0.05,
            high: 0.1,
        },
        inputs: metabolite_inputs(&names),
        normalization: Some(metabolite_reference(&names)),
        provisional: false,
    }
}

/// Four-metabolite fit with a single Youden cutoff.
///
/// Only the feature set, reference sample and cutoff of this fit were
/// published. The coefficients are zero placeholders and the preset is marked
/// provisional, so it refuses to compile until a models file supplies a refit.
fn metabolomic4_preset() -> ModelSpec {
    let names = [TYROSINE, MH3, PHOSPHOETHANOLAMINE, PHOSPHOSERINE];
    ModelSpec {
        name: PresetName::Metabolomic4.as_str().to_string(),
        description: Some(PresetName::Metabolomic4.description().to_string()),
        source: RiskSource::Metabolomic,
        intercept: 0.0,
        feature_order: order(&names),
        coefficients: coefficients(&[
            (TYROSINE, 0.0),
            (MH3, 0.0),
            (PHOSPHOETHANOLAMINE, 0.0),
            (PHOSPHOSERINE, 0.0),
        ]),
        thresholds: Thresholds::Single { threshold: 0.382 },
        inputs: metabolite_inputs(&names),
        normalization: Some(metabolite_reference(&names)),
        provisional: true,
    }
}
