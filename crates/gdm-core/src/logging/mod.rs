//! Structured logging for the scoring pipeline.
//!
//! Library code only emits `tracing` events named in [`event_names`]; the
//! binary installs the subscriber once via [`init_logging`]. Human output is
//! the default, `GDM_LOG_FORMAT=jsonl` switches to one JSON object per line.
//! Either way logs go to stderr; stdout carries result documents only.
//!
//! ```ignore
//! use gdm_core::logging::{init_logging, LogConfig};
//!
//! init_logging(&LogConfig::from_env(None));
//! ```

pub mod config;
pub mod events;

pub use config::{
    LogConfig, LogFormat, LogLevel, ENV_LOG_FORMAT, ENV_LOG_LEVEL, ENV_RUST_LOG,
};
pub use events::event_names;

use std::io::IsTerminal;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Crates whose events pass the default filter.
const LOG_TARGETS: &[&str] = &["gdm_core", "gdm_risk"];

/// Filter directive for `level` over the scoring crates.
fn default_directive(level: LogLevel) -> String {
    LOG_TARGETS
        .iter()
        .map(|t| format!("{}={}", t, level))
        .collect::<Vec<_>>()
        .join(",")
}

/// Install the global subscriber. Call once, before the first event.
///
/// A valid `RUST_LOG` directive carried by `config` is used as-is; otherwise
/// the filter admits `config.level` and above from the scoring crates only.
pub fn init_logging(config: &LogConfig) {
    let filter = config
        .directive
        .as_deref()
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(default_directive(config.level)));
    let registry = tracing_subscriber::registry().with(filter);

    if config.format == LogFormat::Jsonl {
        registry
            .with(
                fmt::layer()
                    .json()
                    .flatten_event(true)
                    .with_current_span(true)
                    .with_writer(std::io::stderr),
            )
            .init();
        return;
    }

    let human = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_ansi(std::io::stderr().is_terminal());
    if config.timestamps {
        registry.with(human).init();
    } else {
        registry.with(human.without_time()).init();
    }
}

/// `run-` followed by 12 random hex digits.
pub fn generate_run_id() -> String {
    let hex = uuid::Uuid::new_v4().simple().to_string();
    format!("run-{}", &hex[..12])
}
