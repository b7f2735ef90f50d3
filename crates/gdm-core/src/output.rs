//! Rendering of result documents for stdout.
//!
//! `json` wraps every payload in an envelope carrying the schema version, run
//! id and generation time. `md` is a Markdown report; `summary` is one line
//! per result.

use chrono::Utc;
use gdm_common::{Error, ErrorReport, OutputFormat, Result, RiskCategory, SCHEMA_VERSION};
use gdm_config::{ConfigSnapshot, PresetInfo, Thresholds};
use serde::Serialize;
use std::fmt::Write as _;

use crate::assessment::{AssessmentReport, AssessmentStatus};
use crate::batch::BatchSummary;
use crate::scorer::RiskResult;

/// JSON envelope around a payload.
#[derive(Serialize)]
struct Envelope<'a, T: Serialize> {
    schema_version: &'static str,
    run_id: &'a str,
    generated_at: String,
    #[serde(flatten)]
    payload: &'a T,
}

/// One-line summary of a component result, e.g.
/// `Intermediate baseline GDM risk (48.3%)`.
pub fn summary_line(result: &RiskResult) -> String {
    format!(
        "{} {} ({:.1}%)",
        result.category.title(),
        result.source.risk_phrase(),
        result.percent()
    )
}

fn thresholds_label(thresholds: &Thresholds) -> String {
    match thresholds {
        Thresholds::Single { threshold } => format!("≥ {} high", threshold),
        Thresholds::Banded { low, high } => format!("{} / {}", low, high),
    }
}

/// Renders payloads in the selected output format.
#[derive(Debug, Clone)]
pub struct Renderer {
    format: OutputFormat,
    run_id: String,
}

impl Renderer {
    pub fn new(format: OutputFormat, run_id: impl Into<String>) -> Self {
        Renderer {
            format,
            run_id: run_id.into(),
        }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    fn json<T: Serialize>(&self, payload: &T) -> Result<String> {
        let envelope = Envelope {
            schema_version: SCHEMA_VERSION,
            run_id: &self.run_id,
            generated_at: Utc::now().to_rfc3339(),
            payload,
        };
        Ok(serde_json::to_string_pretty(&envelope)?)
    }

    /// A single component result.
    pub fn result(&self, result: &RiskResult) -> Result<String> {
        match self.format {
            OutputFormat::Json => self.json(&serde_json::json!({ "result": result })),
            OutputFormat::Summary => Ok(summary_line(result)),
            OutputFormat::Md => {
                let mut out = String::new();
                write_result_md(&mut out, result);
                Ok(out)
            }
        }
    }

    /// Every scored component and the combined verdict.
    pub fn assessment(&self, report: &AssessmentReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => self.json(&serde_json::json!({ "assessment": report })),
            OutputFormat::Summary => {
                let mut lines: Vec<String> = report.components.iter().map(summary_line).collect();
                lines.push(match report.overall {
                    Some(category) => format!(
                        "Overall: {} ({})",
                        category.title(),
                        status_label(report.status)
                    ),
                    None => "Overall: incomplete (no component could be scored)".to_string(),
                });
                Ok(lines.join("\n"))
            }
            OutputFormat::Md => {
                let mut out = String::from("# GDM risk assessment\n\n");
                match report.overall {
                    Some(category) => {
                        let _ = writeln!(
                            out,
                            "**Overall: {}** ({})\n",
                            category.title(),
                            status_label(report.status)
                        );
                    }
                    None => out.push_str("**Overall: incomplete**\n\n"),
                }
                for result in &report.components {
                    write_result_md(&mut out, result);
                    out.push('\n');
                }
                if !report.missing.is_empty() {
                    let missing: Vec<&str> = report.missing.iter().map(|s| s.as_str()).collect();
                    let _ = writeln!(out, "Not assessed: {}", missing.join(", "));
                }
                Ok(out)
            }
        }
    }

    /// Result of combining explicit category labels.
    pub fn combined(&self, inputs: &[RiskCategory], overall: RiskCategory) -> Result<String> {
        match self.format {
            OutputFormat::Json => self.json(&serde_json::json!({
                "inputs": inputs,
                "overall": overall,
            })),
            OutputFormat::Summary => Ok(format!("Overall: {}", overall.title())),
            OutputFormat::Md => {
                let labels: Vec<&str> = inputs.iter().map(|c| c.title()).collect();
                Ok(format!(
                    "# Combined risk\n\nInputs: {}\n\n**Overall: {}** ({})\n",
                    labels.join(", "),
                    overall.title(),
                    overall.russian_label()
                ))
            }
        }
    }

    pub fn presets(&self, presets: &[PresetInfo]) -> Result<String> {
        match self.format {
            OutputFormat::Json => self.json(&serde_json::json!({ "presets": presets })),
            OutputFormat::Summary => Ok(presets
                .iter()
                .map(|p| format!("{:<13} {}", p.name.as_str(), p.description))
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Md => {
                let mut out = String::from(
                    "# Presets\n\n| Preset | Source | Features | Cutoffs | Description |\n|---|---|---|---|---|\n",
                );
                for p in presets {
                    let name = if p.provisional {
                        format!("{} (refit required)", p.name)
                    } else {
                        p.name.to_string()
                    };
                    let _ = writeln!(
                        out,
                        "| {} | {} | {} | {} | {} |",
                        name,
                        p.source,
                        p.features.join(", "),
                        thresholds_label(&p.thresholds),
                        p.description
                    );
                }
                Ok(out)
            }
        }
    }

    pub fn snapshot(&self, snapshot: &ConfigSnapshot) -> Result<String> {
        match self.format {
            OutputFormat::Json => self.json(&serde_json::json!({ "config": snapshot })),
            OutputFormat::Summary => Ok(self.snapshot_line(snapshot)),
            OutputFormat::Md => {
                let mut out = String::from("# Model configuration\n\n");
                let _ = writeln!(out, "Source: {}", snapshot.source);
                if let Some(path) = &snapshot.path {
                    let _ = writeln!(out, "Path: {}", path);
                }
                let _ = writeln!(out, "Catalog hash: {}\n", snapshot.catalog_hash);
                out.push_str("| Model | Intercept | Features | Cutoffs | Normalized |\n|---|---:|---|---|---|\n");
                for m in &snapshot.models {
                    let _ = writeln!(
                        out,
                        "| {}{} | {} | {} | {} | {} |",
                        m.name,
                        if m.provisional { " (refit required)" } else { "" },
                        m.intercept,
                        m.features.join(", "),
                        thresholds_label(&m.thresholds),
                        if m.normalized { "yes" } else { "no" }
                    );
                }
                Ok(out)
            }
        }
    }

    /// Outcome of `config validate`.
    pub fn validated(&self, snapshot: &ConfigSnapshot) -> Result<String> {
        match self.format {
            OutputFormat::Json => self.json(&serde_json::json!({
                "status": "valid",
                "config": snapshot,
            })),
            OutputFormat::Summary | OutputFormat::Md => {
                Ok(format!("valid: {}", self.snapshot_line(snapshot)))
            }
        }
    }

    fn snapshot_line(&self, snapshot: &ConfigSnapshot) -> String {
        format!(
            "config {} from {}{}",
            snapshot.short_id(),
            snapshot.source,
            snapshot
                .path
                .as_ref()
                .map(|p| format!(" ({})", p))
                .unwrap_or_default()
        )
    }

    pub fn batch(&self, summary: &BatchSummary) -> Result<String> {
        match self.format {
            OutputFormat::Json => self.json(&serde_json::json!({ "batch": summary })),
            OutputFormat::Summary | OutputFormat::Md => {
                let counts: Vec<String> = RiskCategory::ALL
                    .iter()
                    .map(|c| {
                        format!(
                            "{} {}",
                            summary.by_category.get(c.as_str()).copied().unwrap_or(0),
                            c.as_str()
                        )
                    })
                    .collect();
                Ok(format!(
                    "{}: {} rows, {} scored ({}), {} invalid",
                    summary.model,
                    summary.rows,
                    summary.scored,
                    counts.join(", "),
                    summary.invalid
                ))
            }
        }
    }

    /// An error, for stderr.
    pub fn error(&self, err: &Error) -> String {
        let report = ErrorReport::from(err);
        match self.format {
            OutputFormat::Json => report.to_json_pretty(),
            OutputFormat::Summary => format!("error {}: {}", report.code, report.message),
            OutputFormat::Md => format!(
                "# {}\n\nError: {}\n\nHint: {}",
                err.headline(),
                report.message,
                report.remediation
            ),
        }
    }
}

fn status_label(status: AssessmentStatus) -> &'static str {
    match status {
        AssessmentStatus::Complete => "all sources assessed",
        AssessmentStatus::Partial => "partial, may rise as more data arrives",
        AssessmentStatus::Incomplete => "incomplete",
    }
}

fn write_result_md(out: &mut String, result: &RiskResult) {
    let _ = writeln!(
        out,
        "## {} risk: {} ({})\n",
        result.source.as_str(),
        result.category.title(),
        result.category.russian_label()
    );
    let _ = writeln!(out, "| | |\n|---|---|");
    let _ = writeln!(out, "| Model | {} |", result.model);
    let _ = writeln!(out, "| Probability | {:.1}% |", result.percent());
    let _ = writeln!(out, "| Linear predictor | {:.4} |", result.linear_predictor);
    out.push_str("\n| Feature | Value | Coefficient | Term |\n|---|---:|---:|---:|\n");
    for c in &result.contributions {
        let _ = writeln!(
            out,
            "| {} | {:.4} | {:.4} | {:.4} |",
            c.feature, c.value, c.coefficient, c.term
        );
    }
}
