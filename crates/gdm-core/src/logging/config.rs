//! Log level and format resolution.
//!
//! Precedence, lowest first: built-in default (`warn`, human), `RUST_LOG`,
//! `GDM_LOG` / `GDM_LOG_FORMAT`, then the `-v` / `-q` flags. A `RUST_LOG`
//! directive is applied verbatim only while nothing above it set the level.

use serde::{Deserialize, Serialize};

/// Log level override.
pub const ENV_LOG_LEVEL: &str = "GDM_LOG";

/// Log format override (`human` or `jsonl`).
pub const ENV_LOG_FORMAT: &str = "GDM_LOG_FORMAT";

/// Generic tracing filter, consulted when `GDM_LOG` is unset.
pub const ENV_RUST_LOG: &str = "RUST_LOG";

/// How log lines are written to stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Human,
    /// One JSON object per line.
    Jsonl,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "human" | "text" | "pretty" => Ok(LogFormat::Human),
            "jsonl" | "json" => Ok(LogFormat::Jsonl),
            other => Err(format!("unknown log format '{}'", other)),
        }
    }
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            LogFormat::Human => "human",
            LogFormat::Jsonl => "jsonl",
        })
    }
}

/// Minimum level of events that are written.
///
/// Declared from most to least verbose, so `a < b` means `a` lets more through.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    /// Model compilation, config resolution, batch totals.
    Info,
    /// Clamped inputs and degenerate reference statistics.
    #[default]
    Warn,
    Error,
    Off,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Off => "off",
        }
    }

    /// Most verbose level named anywhere in a `RUST_LOG`-style directive,
    /// e.g. `gdm_core=debug,warn` gives `Debug`.
    pub fn from_directive(directive: &str) -> Option<LogLevel> {
        directive
            .split(',')
            .filter_map(|part| {
                let level = part.rsplit('=').next().unwrap_or(part);
                level.parse::<LogLevel>().ok()
            })
            .min()
    }
}

impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            "off" | "none" => Ok(LogLevel::Off),
            other => Err(format!("unknown log level '{}'", other)),
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolved logging settings for one process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub format: LogFormat,
    pub level: LogLevel,
    /// Timestamps on human output. JSONL lines always carry one.
    pub timestamps: bool,
    /// Raw `RUST_LOG` directive, kept only when it decided the level.
    pub directive: Option<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            format: LogFormat::Human,
            level: LogLevel::Warn,
            timestamps: true,
            directive: None,
        }
    }
}

impl LogConfig {
    /// Resolve from the process environment, with `cli_level` winning.
    pub fn from_env(cli_level: Option<LogLevel>) -> Self {
        Self::resolve(|key| std::env::var(key).ok(), cli_level)
    }

    /// Resolve from an arbitrary variable lookup.
    ///
    /// Unparseable values are ignored and the next lower source applies.
    pub fn resolve<F>(lookup: F, cli_level: Option<LogLevel>) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = LogConfig::default();

        match lookup(ENV_LOG_LEVEL) {
            Some(val) => {
                if let Ok(level) = val.parse::<LogLevel>() {
                    config.level = level;
                }
            }
            None => {
                if let Some(val) = lookup(ENV_RUST_LOG) {
                    if let Some(level) = LogLevel::from_directive(&val) {
                        config.level = level;
                    }
                    config.directive = Some(val);
                }
            }
        }

        if let Some(format) = lookup(ENV_LOG_FORMAT).and_then(|v| v.parse().ok()) {
            config.format = format;
        }

        if let Some(level) = cli_level {
            config.level = level;
            config.directive = None;
        }
        config
    }

    /// Level implied by `-v` count and `-q`; `None` leaves the environment in charge.
    pub fn level_from_verbosity(verbose: u8, quiet: bool) -> Option<LogLevel> {
        if quiet {
            return Some(LogLevel::Error);
        }
        match verbose {
            0 => None,
            1 => Some(LogLevel::Info),
            2 => Some(LogLevel::Debug),
            _ => Some(LogLevel::Trace),
        }
    }
}
