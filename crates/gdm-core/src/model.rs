//! Logistic regression evaluation.
//!
//! `z = intercept + Σ coefficient_k · x_k` over the model's feature order,
//! `p = sigmoid(z)` with the logit clamped so `exp` never overflows.

use gdm_common::{Error, Result};
use gdm_config::ModelSpec;
use gdm_math::sigmoid;
use schemars::JsonSchema;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::input::FeatureSet;

/// A fitted logistic regression.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearModel {
    name: String,
    intercept: f64,
    feature_order: Vec<String>,
    coefficients: BTreeMap<String, f64>,
}

/// One feature's share of the linear predictor.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct Contribution {
    pub feature: String,
    /// Value entering the model (after normalization, if any).
    pub value: f64,
    pub coefficient: f64,
    /// `coefficient * value`
    pub term: f64,
}

/// Output of evaluating a [`LinearModel`].
#[derive(Debug, Clone, PartialEq)]
pub struct Score {
    pub linear_predictor: f64,
    pub probability: f64,
    pub contributions: Vec<Contribution>,
}

impl LinearModel {
    /// Build a model; every feature in `feature_order` needs a coefficient.
    pub fn new(
        name: impl Into<String>,
        intercept: f64,
        feature_order: Vec<String>,
        coefficients: BTreeMap<String, f64>,
    ) -> Result<Self> {
        let name = name.into();
        if let Some(uncovered) = feature_order
            .iter()
            .find(|f| !coefficients.contains_key(f.as_str()))
        {
            return Err(Error::InvalidModel(format!(
                "{}: no coefficient for feature {}",
                name, uncovered
            )));
        }
        Ok(LinearModel {
            name,
            intercept,
            feature_order,
            coefficients,
        })
    }

    pub fn from_spec(spec: &ModelSpec) -> Result<Self> {
        Self::new(
            spec.name.clone(),
            spec.intercept,
            spec.feature_order.clone(),
            spec.coefficients.clone(),
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    pub fn feature_order(&self) -> &[String] {
        &self.feature_order
    }

    pub fn coefficient(&self, feature: &str) -> Option<f64> {
        self.coefficients.get(feature).copied()
    }

    /// Per-feature terms, in feature order.
    pub fn contributions(&self, features: &FeatureSet) -> Result<Vec<Contribution>> {
        self.feature_order
            .iter()
            .map(|feature| {
                let value = features.require(feature)?;
                let coefficient = self.coefficient(feature).ok_or_else(|| {
                    Error::InvalidModel(format!("{}: no coefficient for {}", self.name, feature))
                })?;
                Ok(Contribution {
                    feature: feature.clone(),
                    value,
                    coefficient,
                    term: coefficient * value,
                })
            })
            .collect()
    }

    /// The logit `z`.
    pub fn linear_predictor(&self, features: &FeatureSet) -> Result<f64> {
        let terms = self.contributions(features)?;
        Ok(self.intercept + terms.iter().map(|c| c.term).sum::<f64>())
    }

    pub fn probability(&self, features: &FeatureSet) -> Result<f64> {
        Ok(sigmoid(self.linear_predictor(features)?))
    }

    pub fn score(&self, features: &FeatureSet) -> Result<Score> {
        let contributions = self.contributions(features)?;
        let linear_predictor =
            self.intercept + contributions.iter().map(|c| c.term).sum::<f64>();
        Ok(Score {
            linear_predictor,
            probability: sigmoid(linear_predictor),
            contributions,
        })
    }
}
