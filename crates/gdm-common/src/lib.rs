//! GDM risk scoring common types and errors.
//!
//! This crate provides foundational types shared across the scoring crates:
//! - Risk categories and their severity ordering
//! - Data sources feeding the combined verdict
//! - The unified error taxonomy with stable codes
//! - Output formats

pub mod error;
pub mod output;
pub mod risk;

pub use error::{Error, ErrorCategory, ErrorReport, InputProblem, Result};
pub use output::OutputFormat;
pub use risk::{RiskCategory, RiskSource};

/// Schema version of result documents emitted by the CLI.
pub const SCHEMA_VERSION: &str = "1.0.0";
