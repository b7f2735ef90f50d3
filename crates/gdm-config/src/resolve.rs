//! Configuration resolution and path discovery.
//!
//! Resolution order: CLI argument → environment variables → XDG paths →
//! system config → built-in presets.

use std::path::{Path, PathBuf};

/// Where a models file was found.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConfigSource {
    /// Explicitly provided via CLI argument.
    CliArgument,

    /// Set via environment variable.
    Environment,

    /// Found in XDG config directory.
    XdgConfig,

    /// Found in /etc/gdm-risk/.
    SystemConfig,

    /// Using built-in presets.
    #[default]
    BuiltinDefault,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::CliArgument => write!(f, "CLI argument"),
            ConfigSource::Environment => write!(f, "environment variable"),
            ConfigSource::XdgConfig => write!(f, "XDG config"),
            ConfigSource::SystemConfig => write!(f, "system config"),
            ConfigSource::BuiltinDefault => write!(f, "builtin default"),
        }
    }
}

/// A resolved models file path with its provenance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedPath {
    /// Path to the models file (None when falling back to built-in presets).
    pub path: Option<PathBuf>,

    /// Where the path came from.
    pub source: ConfigSource,
}

/// Environment variable names.
pub const ENV_MODELS_PATH: &str = "GDM_MODELS";
pub const ENV_CONFIG_DIR: &str = "GDM_CONFIG_DIR";

/// Standard models file name.
pub const MODELS_FILENAME: &str = "models.json";

/// Application name for XDG directories.
const APP_NAME: &str = "gdm-risk";

/// Resolve the models file path using the standard resolution order.
///
/// 1. Explicit CLI path (returned even if it does not exist, so loading
///    reports the error instead of silently falling back)
/// 2. `GDM_MODELS` environment variable
/// 3. `GDM_CONFIG_DIR` environment variable + `models.json`
/// 4. XDG config directory (`~/.config/gdm-risk/models.json`)
/// 5. System config (`/etc/gdm-risk/models.json`)
/// 6. Built-in presets (None)
pub fn resolve_models_path(cli_path: Option<&Path>) -> ResolvedPath {
    if let Some(path) = cli_path {
        return ResolvedPath {
            path: Some(path.to_path_buf()),
            source: ConfigSource::CliArgument,
        };
    }

    if let Ok(env_path) = std::env::var(ENV_MODELS_PATH) {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return ResolvedPath {
                path: Some(path),
                source: ConfigSource::Environment,
            };
        }
    }

    if let Ok(config_dir) = std::env::var(ENV_CONFIG_DIR) {
        let path = PathBuf::from(config_dir).join(MODELS_FILENAME);
        if path.exists() {
            return ResolvedPath {
                path: Some(path),
                source: ConfigSource::Environment,
            };
        }
    }

    if let Some(dir) = xdg_config_dir() {
        let path = dir.join(MODELS_FILENAME);
        if path.exists() {
            return ResolvedPath {
                path: Some(path),
                source: ConfigSource::XdgConfig,
            };
        }
    }

    let system_path = system_config_dir().join(MODELS_FILENAME);
    if system_path.exists() {
        return ResolvedPath {
            path: Some(system_path),
            source: ConfigSource::SystemConfig,
        };
    }

    ResolvedPath::default()
}

/// Get the XDG config directory for gdm-risk.
pub fn xdg_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_NAME))
}

/// Get the system config directory.
pub fn system_config_dir() -> PathBuf {
    PathBuf::from("/etc").join(APP_NAME)
}
