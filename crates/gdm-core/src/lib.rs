//! Gestational diabetes risk scoring.
//!
//! The pipeline, leaf first:
//! - [`input`]: lenient decimal parsing, feature sets, domain checks
//! - [`normalize`]: log10 + Pareto scaling against fixed reference statistics
//! - [`model`]: logistic regression evaluation
//! - [`categorize`]: probability → Low / Intermediate / High
//! - [`combine`]: most-severe-wins combination across sources
//! - [`scorer`]: compiled models and the per-source engine
//! - [`assessment`]: caller-side accumulation of partial results
//! - [`batch`]: CSV scoring
//! - [`output`]: json / md / summary rendering

pub mod assessment;
pub mod batch;
pub mod categorize;
pub mod combine;
pub mod exit_codes;
pub mod input;
pub mod logging;
pub mod model;
pub mod normalize;
pub mod output;
pub mod scorer;

pub use assessment::{Assessment, AssessmentReport, AssessmentStatus};
pub use batch::{score_csv, BatchSummary, RowErrorPolicy};
pub use categorize::categorize;
pub use combine::combine;
pub use input::{parse_decimal, FeatureSet, RangePolicy};
pub use model::{Contribution, LinearModel};
pub use normalize::{FeatureStats, NormalizationStats};
pub use scorer::{EngineOptions, RiskEngine, RiskModel, RiskResult};

/// JSON schema of the assessment document printed by `gdm-risk assess`.
pub fn assessment_schema() -> serde_json::Value {
    serde_json::to_value(schemars::schema_for!(AssessmentReport)).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_names_result_fields() {
        let schema = assessment_schema().to_string();
        assert!(schema.contains("probability"));
        assert!(schema.contains("contributions"));
        assert!(schema.contains("intermediate"));
    }
}
