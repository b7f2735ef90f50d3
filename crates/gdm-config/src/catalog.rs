//! Model catalog: the set of model specifications in effect.
//!
//! The built-in catalog holds every preset. A `models.json` file has the same
//! shape and replaces individual presets by name:
//!
//! ```json
//! {
//!   "schema_version": "1.0.0",
//!   "models": {
//!     "metabolomic4": { "name": "metabolomic4", "source": "metabolomic", ... }
//!   }
//! }
//! ```

use crate::model::ModelSpec;
use crate::preset::{get_preset, PresetName};
use crate::resolve::{resolve_models_path, ResolvedPath};
use crate::snapshot::hash_content;
use crate::validate::{validate_model, ValidationError, ValidationResult};
use crate::CONFIG_SCHEMA_VERSION;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// A named set of model specifications.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelCatalog {
    pub schema_version: String,

    #[serde(default)]
    pub description: Option<String>,

    /// Model specs keyed by preset name.
    #[serde(default)]
    pub models: BTreeMap<String, ModelSpec>,
}

impl ModelCatalog {
    /// Catalog holding every built-in preset.
    pub fn builtin() -> Self {
        ModelCatalog {
            schema_version: CONFIG_SCHEMA_VERSION.to_string(),
            description: Some("Built-in presets".to_string()),
            models: PresetName::ALL
                .iter()
                .map(|p| (p.as_str().to_string(), get_preset(*p)))
                .collect(),
        }
    }

    /// Parse a catalog from JSON text and check its schema version.
    pub fn from_json_str(content: &str) -> ValidationResult<Self> {
        let catalog: ModelCatalog =
            serde_json::from_str(content).map_err(|e| ValidationError::ParseError(e.to_string()))?;
        if catalog.schema_version != CONFIG_SCHEMA_VERSION {
            return Err(ValidationError::VersionMismatch {
                expected: CONFIG_SCHEMA_VERSION.to_string(),
                actual: catalog.schema_version,
            });
        }
        Ok(catalog)
    }

    /// Validate every model and check that keys name known presets of the right source.
    pub fn validate(&self) -> ValidationResult<()> {
        for (key, spec) in &self.models {
            let preset =
                PresetName::parse(key).ok_or_else(|| ValidationError::UnknownModel(key.clone()))?;
            if spec.source != preset.source() {
                return Err(ValidationError::SemanticError(format!(
                    "model '{}' declares source '{}' but preset {} scores '{}'",
                    key,
                    spec.source,
                    preset,
                    preset.source()
                )));
            }
            validate_model(spec)?;
        }
        Ok(())
    }

    /// Replace models in `self` with those present in `overrides`.
    ///
    /// Returns the merged catalog and the names of replaced models.
    pub fn overlay(mut self, overrides: ModelCatalog) -> (Self, Vec<String>) {
        let mut replaced = Vec::new();
        for (key, spec) in overrides.models {
            let key = PresetName::parse(&key)
                .map(|p| p.as_str().to_string())
                .unwrap_or(key);
            replaced.push(key.clone());
            self.models.insert(key, spec);
        }
        if overrides.description.is_some() {
            self.description = overrides.description;
        }
        (self, replaced)
    }

    /// Model spec for a preset, if present.
    pub fn get(&self, preset: PresetName) -> Option<&ModelSpec> {
        self.models.get(preset.as_str())
    }

    /// Model spec for a preset, or an error naming it.
    pub fn spec(&self, preset: PresetName) -> ValidationResult<&ModelSpec> {
        self.get(preset)
            .ok_or_else(|| ValidationError::MissingField(format!("models.{}", preset)))
    }

    /// Deterministic JSON used for hashing.
    pub fn canonical_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// The effective catalog and where it came from.
#[derive(Debug, Clone)]
pub struct LoadedCatalog {
    /// Built-in presets with any file overrides applied.
    pub catalog: ModelCatalog,

    /// Resolved models file path and source.
    pub resolved: ResolvedPath,

    /// SHA-256 of the models file content (None when using built-ins only).
    pub file_hash: Option<String>,

    /// Presets replaced by the models file.
    pub overridden: Vec<String>,
}

/// Resolve, read, merge and validate the model catalog.
pub fn load_catalog(cli_path: Option<&Path>) -> ValidationResult<LoadedCatalog> {
    let resolved = resolve_models_path(cli_path);

    let Some(path) = resolved.path.clone() else {
        let catalog = ModelCatalog::builtin();
        catalog.validate()?;
        return Ok(LoadedCatalog {
            catalog,
            resolved,
            file_hash: None,
            overridden: Vec::new(),
        });
    };

    let content = std::fs::read_to_string(&path)
        .map_err(|e| ValidationError::IoError(format!("{}: {}", path.display(), e)))?;
    let file_catalog = ModelCatalog::from_json_str(&content)?;
    file_catalog.validate()?;

    let (catalog, overridden) = ModelCatalog::builtin().overlay(file_catalog);
    catalog.validate()?;

    Ok(LoadedCatalog {
        catalog,
        resolved,
        file_hash: Some(hash_content(&content)),
        overridden,
    })
}
