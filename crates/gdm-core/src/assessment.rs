//! Caller-side accumulation of component results into an overall verdict.

use gdm_common::{Result, RiskCategory, RiskSource, SCHEMA_VERSION};
use schemars::JsonSchema;
use serde::Serialize;

use crate::combine::combine;
use crate::scorer::RiskResult;

/// How many of the three sources have been scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum AssessmentStatus {
    /// No component yet; nothing to combine.
    Incomplete,
    /// Some components scored; the verdict may still rise.
    Partial,
    /// Every source scored.
    Complete,
}

/// Up to one result per data source.
#[derive(Debug, Clone, Default)]
pub struct Assessment {
    clinical: Option<RiskResult>,
    lipid: Option<RiskResult>,
    metabolomic: Option<RiskResult>,
}

impl Assessment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a result in its source's slot, replacing any earlier one.
    pub fn record(&mut self, result: RiskResult) {
        let slot = match result.source {
            RiskSource::Clinical => &mut self.clinical,
            RiskSource::Lipid => &mut self.lipid,
            RiskSource::Metabolomic => &mut self.metabolomic,
        };
        *slot = Some(result);
    }

    pub fn get(&self, source: RiskSource) -> Option<&RiskResult> {
        match source {
            RiskSource::Clinical => self.clinical.as_ref(),
            RiskSource::Lipid => self.lipid.as_ref(),
            RiskSource::Metabolomic => self.metabolomic.as_ref(),
        }
    }

    /// Recorded results in source order.
    pub fn components(&self) -> Vec<&RiskResult> {
        RiskSource::ALL.iter().filter_map(|s| self.get(*s)).collect()
    }

    /// Sources with no result yet.
    pub fn missing(&self) -> Vec<RiskSource> {
        RiskSource::ALL
            .iter()
            .copied()
            .filter(|s| self.get(*s).is_none())
            .collect()
    }

    pub fn status(&self) -> AssessmentStatus {
        match self.components().len() {
            0 => AssessmentStatus::Incomplete,
            n if n == RiskSource::ALL.len() => AssessmentStatus::Complete,
            _ => AssessmentStatus::Partial,
        }
    }

    /// Combined verdict over the recorded components.
    pub fn overall(&self) -> Result<RiskCategory> {
        let categories: Vec<RiskCategory> =
            self.components().iter().map(|r| r.category).collect();
        combine(&categories)
    }

    pub fn report(&self) -> AssessmentReport {
        AssessmentReport {
            schema_version: SCHEMA_VERSION.to_string(),
            status: self.status(),
            overall: self.overall().ok(),
            components: self.components().into_iter().cloned().collect(),
            missing: self.missing(),
        }
    }
}

/// Serializable view of an [`Assessment`].
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct AssessmentReport {
    pub schema_version: String,
    pub status: AssessmentStatus,
    /// Absent while the assessment is incomplete.
    pub overall: Option<RiskCategory>,
    pub components: Vec<RiskResult>,
    pub missing: Vec<RiskSource>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scorer::{EngineOptions, RiskEngine};
    use gdm_common::Error;

    fn engine() -> RiskEngine {
        RiskEngine::builtin(&EngineOptions::default()).unwrap()
    }

    #[test]
    fn empty_assessment_is_incomplete() {
        let a = Assessment::new();
        assert_eq!(a.status(), AssessmentStatus::Incomplete);
        assert!(matches!(a.overall(), Err(Error::InsufficientData)));
        let report = a.report();
        assert!(report.overall.is_none());
        assert_eq!(report.missing.len(), 3);
    }

    #[test]
    fn partial_assessment_combines_available() {
        let engine = engine();
        let mut a = Assessment::new();
        // BMI 20, no family history: p ≈ 0.31 → Low
        a.record(engine.clinical(20.0, false).unwrap());
        assert_eq!(a.status(), AssessmentStatus::Partial);
        assert_eq!(a.overall().unwrap(), RiskCategory::Low);

        a.record(engine.lipid(2.0, 1.2).unwrap());
        assert_eq!(a.overall().unwrap(), RiskCategory::Intermediate);
        assert_eq!(a.missing(), vec![RiskSource::Metabolomic]);
    }

    #[test]
    fn rerecord_replaces_slot() {
        let engine = engine();
        let mut a = Assessment::new();
        a.record(engine.clinical(60.0, true).unwrap());
        assert_eq!(a.overall().unwrap(), RiskCategory::High);
        a.record(engine.clinical(20.0, false).unwrap());
        assert_eq!(a.components().len(), 1);
        assert_eq!(a.overall().unwrap(), RiskCategory::Low);
    }

    #[test]
    fn report_serializes_status() {
        let mut a = Assessment::new();
        a.record(engine().clinical(27.0, false).unwrap());
        let json = serde_json::to_value(a.report()).unwrap();
        assert_eq!(json["status"], "partial");
        assert_eq!(json["overall"], "intermediate");
        assert_eq!(json["components"][0]["source"], "clinical");
    }
}
