//! Configuration snapshots for auditability.
//!
//! A snapshot captures the exact model configuration in effect, so a score can
//! be traced back to the coefficients that produced it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::catalog::LoadedCatalog;
use crate::model::Thresholds;

/// A frozen snapshot of configuration state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSnapshot {
    /// When this snapshot was taken.
    pub timestamp: DateTime<Utc>,

    /// Schema version of the configuration.
    pub schema_version: String,

    /// Source of the models configuration.
    pub source: String,

    /// Path where the models file was loaded from.
    #[serde(default)]
    pub path: Option<String>,

    /// SHA-256 of the models file content.
    #[serde(default)]
    pub file_hash: Option<String>,

    /// SHA-256 of the effective catalog (built-ins plus overrides).
    pub catalog_hash: String,

    /// Presets replaced by the models file.
    #[serde(default)]
    pub overridden: Vec<String>,

    /// Key values per model.
    pub models: Vec<ModelSummary>,
}

/// Summary of one model in the effective catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSummary {
    pub name: String,
    pub intercept: f64,
    pub features: Vec<String>,
    pub thresholds: Thresholds,
    pub normalized: bool,
    pub provisional: bool,
}

impl ConfigSnapshot {
    /// Capture a snapshot of a loaded catalog.
    pub fn capture(loaded: &LoadedCatalog) -> Self {
        let catalog = &loaded.catalog;
        let models = catalog
            .models
            .iter()
            .map(|(key, spec)| ModelSummary {
                name: key.clone(),
                intercept: spec.intercept,
                features: spec.feature_order.clone(),
                thresholds: spec.thresholds,
                normalized: spec.is_normalized(),
                provisional: spec.provisional,
            })
            .collect();

        ConfigSnapshot {
            timestamp: Utc::now(),
            schema_version: catalog.schema_version.clone(),
            source: loaded.resolved.source.to_string(),
            path: loaded
                .resolved
                .path
                .as_ref()
                .map(|p| p.display().to_string()),
            file_hash: loaded.file_hash.clone(),
            catalog_hash: hash_content(&catalog.canonical_json()),
            overridden: loaded.overridden.clone(),
            models,
        }
    }

    /// Serialize snapshot to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Check if this snapshot describes the same configuration as another.
    pub fn matches(&self, other: &ConfigSnapshot) -> bool {
        self.catalog_hash == other.catalog_hash
    }

    /// Get a short identifier for this snapshot (first 12 chars of hash).
    pub fn short_id(&self) -> &str {
        &self.catalog_hash[..12.min(self.catalog_hash.len())]
    }
}

/// Hex SHA-256 of a string.
pub fn hash_content(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}
