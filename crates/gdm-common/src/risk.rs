//! Risk categories and data sources.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Discrete risk band produced by the categorizer.
///
/// Variants are declared in severity order so the derived `Ord` ranks
/// `Low < Intermediate < High`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum RiskCategory {
    Low,
    Intermediate,
    High,
}

impl RiskCategory {
    /// All categories, least severe first.
    pub const ALL: &'static [RiskCategory] = &[
        RiskCategory::Low,
        RiskCategory::Intermediate,
        RiskCategory::High,
    ];

    /// Numeric severity rank (Low=0, Intermediate=1, High=2).
    pub fn rank(&self) -> u8 {
        match self {
            RiskCategory::Low => 0,
            RiskCategory::Intermediate => 1,
            RiskCategory::High => 2,
        }
    }

    /// Stable machine label.
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskCategory::Low => "low",
            RiskCategory::Intermediate => "intermediate",
            RiskCategory::High => "high",
        }
    }

    /// Capitalised label for human output.
    pub fn title(&self) -> &'static str {
        match self {
            RiskCategory::Low => "Low",
            RiskCategory::Intermediate => "Intermediate",
            RiskCategory::High => "High",
        }
    }

    /// Russian clinical label as shown on the patient-facing form.
    pub fn russian_label(&self) -> &'static str {
        match self {
            RiskCategory::Low => "Низкий",
            RiskCategory::Intermediate => "Промежуточный",
            RiskCategory::High => "Высокий",
        }
    }

    /// Parse a label in English or Russian, case-insensitively.
    pub fn parse(s: &str) -> Option<RiskCategory> {
        match s.trim().to_lowercase().as_str() {
            "low" | "l" | "0" | "низкий" => Some(RiskCategory::Low),
            "intermediate" | "mid" | "medium" | "i" | "1" | "промежуточный" => {
                Some(RiskCategory::Intermediate)
            }
            "high" | "h" | "2" | "высокий" => Some(RiskCategory::High),
            _ => None,
        }
    }
}

impl fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for RiskCategory {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        RiskCategory::parse(s).ok_or_else(|| format!("unknown risk category: {}", s))
    }
}

/// Independent source of patient data feeding one model.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum RiskSource {
    /// Anthropometric and family-history data.
    Clinical,
    /// Lipid panel.
    Lipid,
    /// Urinary amino-acid metabolites.
    Metabolomic,
}

impl RiskSource {
    pub const ALL: &'static [RiskSource] = &[
        RiskSource::Clinical,
        RiskSource::Lipid,
        RiskSource::Metabolomic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskSource::Clinical => "clinical",
            RiskSource::Lipid => "lipid",
            RiskSource::Metabolomic => "metabolomic",
        }
    }

    /// Noun phrase used in one-line summaries.
    pub fn risk_phrase(&self) -> &'static str {
        match self {
            RiskSource::Clinical => "baseline GDM risk",
            RiskSource::Lipid => "complication risk",
            RiskSource::Metabolomic => "metabolomic risk",
        }
    }
}

impl fmt::Display for RiskSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
