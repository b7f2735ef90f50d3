//! Error types for GDM risk scoring.
//!
//! This module provides structured error handling with:
//! - Stable error codes for machine parsing
//! - Category classification for error grouping
//! - Remediation hints for humans
//!
//! Every input failure names the offending feature so the caller can point the
//! user at the exact field. Errors serialize to structured JSON through
//! [`ErrorReport`]:
//! ```json
//! {
//!   "code": 20,
//!   "category": "input",
//!   "message": "invalid input for Tyrosine: value must be > 0, got 0",
//!   "context": { "feature": "Tyrosine" }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Result type alias for risk scoring operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error categories for grouping related errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Model configuration errors (presets, models file, schema).
    Config,
    /// Invalid or missing patient input.
    Input,
    /// Combination / aggregation errors.
    Scoring,
    /// File I/O, CSV and serialization errors.
    Io,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCategory::Config => write!(f, "config"),
            ErrorCategory::Input => write!(f, "input"),
            ErrorCategory::Scoring => write!(f, "scoring"),
            ErrorCategory::Io => write!(f, "io"),
        }
    }
}

/// What exactly is wrong with a single input feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InputProblem {
    /// The feature was not supplied, or its text did not parse to a number.
    Missing,
    /// Raw text that could not be read as a number.
    NotNumeric { raw: String },
    /// NaN or infinite.
    NotFinite,
    /// Log-transformed features must be strictly positive.
    NotPositive { value: f64 },
    /// Outside the accepted input range.
    OutOfRange { value: f64, min: f64, max: f64 },
    /// Binary flags accept only 0 or 1.
    NotBinary { value: f64 },
}

impl fmt::Display for InputProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputProblem::Missing => write!(f, "value is missing"),
            InputProblem::NotNumeric { raw } => write!(f, "'{}' is not a number", raw),
            InputProblem::NotFinite => write!(f, "value must be finite"),
            InputProblem::NotPositive { value } => {
                write!(f, "value must be > 0, got {}", value)
            }
            InputProblem::OutOfRange { value, min, max } => {
                write!(f, "value {} outside accepted range [{}, {}]", value, min, max)
            }
            InputProblem::NotBinary { value } => write!(f, "flag must be 0 or 1, got {}", value),
        }
    }
}

/// Unified error type for risk scoring.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors (10-19)
    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid model specification: {0}")]
    InvalidModel(String),

    // Input errors (20-29)
    #[error("invalid input for {feature}: {problem}")]
    InvalidInput {
        feature: String,
        problem: InputProblem,
    },

    // Scoring errors (30-39)
    #[error("insufficient data: at least one component risk is required")]
    InsufficientData,

    // I/O errors (40-49)
    #[error("CSV error{}: {message}", row_suffix(.row))]
    Csv {
        row: Option<usize>,
        message: String,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

fn row_suffix(row: &Option<usize>) -> String {
    row.map(|r| format!(" at row {}", r)).unwrap_or_default()
}

impl Error {
    /// Shorthand for an [`Error::InvalidInput`].
    pub fn invalid_input(feature: impl Into<String>, problem: InputProblem) -> Self {
        Error::InvalidInput {
            feature: feature.into(),
            problem,
        }
    }

    /// Shorthand for a missing feature.
    pub fn missing(feature: impl Into<String>) -> Self {
        Error::invalid_input(feature, InputProblem::Missing)
    }

    /// Returns the error code for this error type.
    ///
    /// Error codes are stable and grouped by category:
    /// - 10-19: Configuration errors
    /// - 20-29: Input errors
    /// - 30-39: Scoring errors
    /// - 40-49: I/O errors
    pub fn code(&self) -> u32 {
        match self {
            Error::Config(_) => 10,
            Error::InvalidModel(_) => 11,
            Error::InvalidInput { .. } => 20,
            Error::InsufficientData => 30,
            Error::Csv { .. } => 40,
            Error::Io(_) => 41,
            Error::Json(_) => 42,
        }
    }

    /// Returns the error category for grouping and filtering.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Config(_) | Error::InvalidModel(_) => ErrorCategory::Config,
            Error::InvalidInput { .. } => ErrorCategory::Input,
            Error::InsufficientData => ErrorCategory::Scoring,
            Error::Csv { .. } | Error::Io(_) | Error::Json(_) => ErrorCategory::Io,
        }
    }

    /// The feature an input error refers to, if any.
    pub fn feature(&self) -> Option<&str> {
        match self {
            Error::InvalidInput { feature, .. } => Some(feature),
            _ => None,
        }
    }

    /// Returns a short headline for human-readable output.
    pub fn headline(&self) -> &'static str {
        match self {
            Error::Config(_) => "Configuration Error",
            Error::InvalidModel(_) => "Invalid Model Specification",
            Error::InvalidInput { .. } => "Invalid Input",
            Error::InsufficientData => "Incomplete Assessment",
            Error::Csv { .. } => "CSV Error",
            Error::Io(_) => "I/O Error",
            Error::Json(_) => "JSON Error",
        }
    }

    /// Returns a human-readable remediation hint.
    pub fn remediation(&self) -> &'static str {
        match self {
            Error::Config(_) | Error::InvalidModel(_) => {
                "Run 'gdm-risk config validate' on the models file, or remove it to use built-in presets."
            }
            Error::InvalidInput { .. } => {
                "Enter a numeric value for the named field (',' or '.' as decimal separator)."
            }
            Error::InsufficientData => "Compute at least one component risk before combining.",
            Error::Csv { .. } => {
                "Check that the header contains every required feature name and each row is numeric."
            }
            Error::Io(_) => "Check that the file exists and is readable.",
            Error::Json(_) => "Check the JSON syntax of the file.",
        }
    }
}

/// Structured error response for JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorReport {
    /// Stable error code.
    pub code: u32,

    /// Error category for grouping.
    pub category: ErrorCategory,

    /// Human-readable error message.
    pub message: String,

    /// Remediation hint.
    pub remediation: String,

    /// Additional structured context (feature, row, ...).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub context: BTreeMap<String, serde_json::Value>,
}

impl From<&Error> for ErrorReport {
    fn from(err: &Error) -> Self {
        let mut context = BTreeMap::new();

        match err {
            Error::InvalidInput { feature, problem } => {
                context.insert("feature".to_string(), serde_json::json!(feature));
                if let Ok(v) = serde_json::to_value(problem) {
                    context.insert("problem".to_string(), v);
                }
            }
            Error::Csv { row: Some(row), .. } => {
                context.insert("row".to_string(), serde_json::json!(row));
            }
            _ => {}
        }

        ErrorReport {
            code: err.code(),
            category: err.category(),
            message: err.to_string(),
            remediation: err.remediation().to_string(),
            context,
        }
    }
}

impl ErrorReport {
    /// Serialize to pretty JSON string.
    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self)
            .unwrap_or_else(|_| format!(r#"{{"code":{},"error":"serialization_failed"}}"#, self.code))
    }
}
