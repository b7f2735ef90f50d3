//! Compiled risk models and the engine holding one per data source.
//!
//! A [`RiskModel`] is a validated [`ModelSpec`] turned into an evaluable
//! pipeline: input checks → normalization (if any) → logistic score →
//! category. Compilation happens once; evaluation is pure.

use gdm_common::{Error, Result, RiskCategory, RiskSource};
use gdm_config::preset::features;
use gdm_config::{
    validate_model, InputSpec, ModelCatalog, ModelSpec, PresetError, PresetName, Thresholds,
};
use schemars::JsonSchema;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::categorize::categorize;
use crate::input::{check_value, FeatureSet, RangePolicy};
use crate::logging::event_names;
use crate::model::{Contribution, LinearModel};
use crate::normalize::NormalizationStats;

/// Result of scoring one data source for one subject.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct RiskResult {
    /// Model (preset) that produced the score.
    pub model: String,
    pub source: RiskSource,
    /// Probability in [0, 1].
    pub probability: f64,
    pub category: RiskCategory,
    /// Logit before the sigmoid.
    pub linear_predictor: f64,
    pub contributions: Vec<Contribution>,
}

impl RiskResult {
    /// Probability as a percentage.
    pub fn percent(&self) -> f64 {
        self.probability * 100.0
    }
}

/// A model compiled from its specification.
#[derive(Debug, Clone)]
pub struct RiskModel {
    source: RiskSource,
    linear: LinearModel,
    stats: Option<NormalizationStats>,
    thresholds: Thresholds,
    inputs: BTreeMap<String, InputSpec>,
    range_policy: RangePolicy,
}

impl RiskModel {
    /// Validate `spec` and derive its normalization statistics.
    pub fn compile(spec: &ModelSpec, range_policy: RangePolicy) -> Result<Self> {
        validate_model(spec)?;
        let stats = spec
            .normalization
            .as_ref()
            .map(NormalizationStats::from_reference)
            .transpose()?;
        Self::assemble(spec, stats, range_policy)
    }

    /// Compile the catalog model that scores `source` under `options`.
    pub fn for_source(
        catalog: &ModelCatalog,
        source: RiskSource,
        options: &EngineOptions,
    ) -> Result<Self> {
        let preset = options.preset_for(source)?;
        Self::compile(catalog.spec(preset)?, options.range_policy)
    }

    /// Build with explicitly supplied normalization statistics.
    ///
    /// `stats` must cover every feature when present.
    pub fn with_stats(
        spec: &ModelSpec,
        stats: Option<NormalizationStats>,
        range_policy: RangePolicy,
    ) -> Result<Self> {
        validate_model(spec)?;
        Self::assemble(spec, stats, range_policy)
    }

    fn assemble(
        spec: &ModelSpec,
        stats: Option<NormalizationStats>,
        range_policy: RangePolicy,
    ) -> Result<Self> {
        if spec.provisional {
            return Err(Error::InvalidModel(format!(
                "{} requires a refit via models.json",
                spec.name
            )));
        }
        let linear = LinearModel::from_spec(spec)?;
        if let Some(stats) = &stats {
            if let Some(uncovered) = spec.feature_order.iter().find(|f| stats.get(f).is_none()) {
                return Err(Error::InvalidModel(format!(
                    "{}: no reference statistics for {}",
                    spec.name, uncovered
                )));
            }
        }

        info!(
            event = event_names::MODEL_COMPILED,
            model = %spec.name,
            source = %spec.source,
            features = spec.feature_order.len(),
            normalized = stats.is_some(),
            "model compiled"
        );

        Ok(RiskModel {
            source: spec.source,
            linear,
            stats,
            thresholds: spec.thresholds,
            inputs: spec.inputs.clone(),
            range_policy,
        })
    }

    pub fn name(&self) -> &str {
        self.linear.name()
    }

    pub fn source(&self) -> RiskSource {
        self.source
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    pub fn stats(&self) -> Option<&NormalizationStats> {
        self.stats.as_ref()
    }

    pub fn range_policy(&self) -> RangePolicy {
        self.range_policy
    }

    /// Features a caller must supply, in model order.
    pub fn required_features(&self) -> &[String] {
        self.linear.feature_order()
    }

    /// Check every required feature against its domain.
    ///
    /// Returns only the model's features, with clamping applied if the range
    /// policy allows it.
    pub fn check_input(&self, raw: &FeatureSet) -> Result<FeatureSet> {
        let mut checked = FeatureSet::new();
        for feature in self.required_features() {
            let value = raw.require(feature)?;
            let value = check_value(
                feature,
                value,
                self.inputs.get(feature),
                self.stats.is_some(),
                self.range_policy,
            )?;
            checked.insert(feature.as_str(), value);
        }
        Ok(checked)
    }

    /// Score one subject.
    pub fn evaluate(&self, raw: &FeatureSet) -> Result<RiskResult> {
        let checked = self.check_input(raw)?;
        let model_input = match &self.stats {
            Some(stats) => stats.normalize(&checked, self.required_features())?,
            None => checked,
        };

        let score = self.linear.score(&model_input)?;
        let category = categorize(score.probability, &self.thresholds);

        debug!(
            event = event_names::SCORE_EVALUATED,
            model = %self.name(),
            z = score.linear_predictor,
            probability = score.probability,
            category = %category,
            "score evaluated"
        );

        Ok(RiskResult {
            model: self.name().to_string(),
            source: self.source,
            probability: score.probability,
            category,
            linear_predictor: score.linear_predictor,
            contributions: score.contributions,
        })
    }
}

/// Engine construction options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineOptions {
    /// Which metabolomic preset scores the metabolomic source.
    pub metabolomic_preset: PresetName,
    pub range_policy: RangePolicy,
}

impl EngineOptions {
    /// Preset scoring `source`.
    pub fn preset_for(&self, source: RiskSource) -> Result<PresetName> {
        match source {
            RiskSource::Clinical => Ok(PresetName::Clinical),
            RiskSource::Lipid => Ok(PresetName::Lipid),
            RiskSource::Metabolomic if self.metabolomic_preset.source() == source => {
                Ok(self.metabolomic_preset)
            }
            RiskSource::Metabolomic => Err(Error::Config(
                PresetError::WrongSource {
                    preset: self.metabolomic_preset,
                    expected: source,
                }
                .to_string(),
            )),
        }
    }
}

impl Default for EngineOptions {
    fn default() -> Self {
        EngineOptions {
            metabolomic_preset: PresetName::Metabolomic5,
            range_policy: RangePolicy::Reject,
        }
    }
}

/// One compiled model per data source.
#[derive(Debug, Clone)]
pub struct RiskEngine {
    clinical: RiskModel,
    lipid: RiskModel,
    metabolomic: RiskModel,
}

impl RiskEngine {
    /// Compile all three models from a catalog.
    ///
    /// Fails if any one of them does not compile; callers scoring a single
    /// source should use [`RiskModel::for_source`].
    pub fn from_catalog(catalog: &ModelCatalog, options: &EngineOptions) -> Result<Self> {
        let metabolomic = RiskModel::for_source(catalog, RiskSource::Metabolomic, options)?;
        Ok(RiskEngine {
            clinical: RiskModel::for_source(catalog, RiskSource::Clinical, options)?,
            lipid: RiskModel::for_source(catalog, RiskSource::Lipid, options)?,
            metabolomic,
        })
    }

    /// Engine over the built-in presets.
    pub fn builtin(options: &EngineOptions) -> Result<Self> {
        Self::from_catalog(&ModelCatalog::builtin(), options)
    }

    pub fn model(&self, source: RiskSource) -> &RiskModel {
        match source {
            RiskSource::Clinical => &self.clinical,
            RiskSource::Lipid => &self.lipid,
            RiskSource::Metabolomic => &self.metabolomic,
        }
    }

    pub fn evaluate(&self, source: RiskSource, raw: &FeatureSet) -> Result<RiskResult> {
        self.model(source).evaluate(raw)
    }

    /// Baseline GDM risk from BMI and family history.
    pub fn clinical(&self, bmi: f64, family_history: bool) -> Result<RiskResult> {
        self.clinical.evaluate(&clinical_features(bmi, family_history))
    }

    /// Complication risk from the lipid panel (mmol/L).
    pub fn lipid(&self, triglycerides: f64, hdl: f64) -> Result<RiskResult> {
        self.lipid.evaluate(&lipid_features(triglycerides, hdl))
    }

    pub fn metabolomic(&self, raw: &FeatureSet) -> Result<RiskResult> {
        self.metabolomic.evaluate(raw)
    }
}

/// Clinical model input.
pub fn clinical_features(bmi: f64, family_history: bool) -> FeatureSet {
    FeatureSet::new()
        .with(features::BMI, bmi)
        .with(features::FAMILY_HISTORY, if family_history { 1.0 } else { 0.0 })
}

/// Lipid model input.
pub fn lipid_features(triglycerides: f64, hdl: f64) -> FeatureSet {
    FeatureSet::new()
        .with(features::TRIGLYCERIDES, triglycerides)
        .with(features::HDL, hdl)
}
