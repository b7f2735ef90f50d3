//! GDM risk model configuration loading and validation.
//!
//! This crate provides:
//! - Typed, serde-backed model specifications (`ModelSpec`)
//! - Built-in presets for the clinical, lipid and metabolomic models
//! - A models catalog file that can override presets
//! - Config resolution (CLI → env → XDG → system → built-in)
//! - Semantic validation
//! - Config snapshots for auditability

pub mod catalog;
pub mod model;
pub mod preset;
pub mod resolve;
pub mod snapshot;
pub mod validate;

pub use catalog::{load_catalog, LoadedCatalog, ModelCatalog};
pub use model::{InputSpec, ModelSpec, NormalizationSpec, Thresholds};
pub use preset::{get_preset, list_presets, PresetError, PresetInfo, PresetName};
pub use resolve::{resolve_models_path, ConfigSource, ResolvedPath};
pub use snapshot::ConfigSnapshot;
pub use validate::{validate_model, ValidationError, ValidationResult};

/// Schema version for configuration files.
pub const CONFIG_SCHEMA_VERSION: &str = "1.0.0";
