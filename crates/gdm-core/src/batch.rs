//! Batch CSV scoring.
//!
//! One row per subject. The header must name every feature the model needs;
//! other columns pass through untouched. Each output row is the input row
//! followed by `probability` and `class_at_threshold`, so the input must not
//! already carry either column. A row whose field count differs from the
//! header's is unscorable; under [`RowErrorPolicy::Mark`] it is padded or cut
//! to the header width so the appended columns stay aligned.

use gdm_common::{Error, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::{Read, Write};
use tracing::{info, warn};

use crate::input::{parse_field, FeatureSet};
use crate::logging::event_names;
use crate::scorer::{RiskModel, RiskResult};

pub const PROBABILITY_COLUMN: &str = "probability";
pub const CLASS_COLUMN: &str = "class_at_threshold";

/// Class written for rows that could not be scored under [`RowErrorPolicy::Mark`].
pub const INVALID_CLASS: &str = "invalid";

/// What to do when a row cannot be scored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RowErrorPolicy {
    /// Stop at the first bad row.
    #[default]
    Abort,
    /// Write the row with an empty probability and `invalid` class, then continue.
    Mark,
}

/// Counts from one batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub model: String,
    pub rows: usize,
    pub scored: usize,
    pub invalid: usize,
    /// Scored rows per category label.
    pub by_category: BTreeMap<String, usize>,
}

fn csv_error(row: Option<usize>) -> impl Fn(csv::Error) -> Error {
    move |e| Error::Csv {
        row,
        message: e.to_string(),
    }
}

/// Score every row of `input` with `model`, writing the augmented table to `output`.
///
/// Row numbers in errors are 1-based and exclude the header.
pub fn score_csv<R: Read, W: Write>(
    model: &RiskModel,
    input: R,
    output: W,
    policy: RowErrorPolicy,
) -> Result<BatchSummary> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(input);
    let headers = reader.headers().map_err(csv_error(None))?.clone();

    let mut columns = Vec::with_capacity(model.required_features().len());
    for feature in model.required_features() {
        let idx = headers
            .iter()
            .position(|h| h == feature.as_str())
            .ok_or_else(|| Error::Csv {
                row: None,
                message: format!("missing required column '{}'", feature),
            })?;
        columns.push((feature.as_str(), idx));
    }
    if let Some(taken) = headers
        .iter()
        .find(|h| *h == PROBABILITY_COLUMN || *h == CLASS_COLUMN)
    {
        return Err(Error::Csv {
            row: None,
            message: format!("input already has a '{}' column", taken),
        });
    }
    let width = headers.len();

    let mut writer = csv::Writer::from_writer(output);
    let mut out_headers = headers.clone();
    out_headers.push_field(PROBABILITY_COLUMN);
    out_headers.push_field(CLASS_COLUMN);
    writer.write_record(&out_headers).map_err(csv_error(None))?;

    let mut summary = BatchSummary {
        model: model.name().to_string(),
        ..BatchSummary::default()
    };

    for (idx, record) in reader.records().enumerate() {
        let row = idx + 1;
        let mut record = record.map_err(csv_error(Some(row)))?;
        summary.rows += 1;

        let outcome = check_width(&record, width, row)
            .and_then(|()| score_record(model, &record, &columns));
        match outcome {
            Ok(result) => {
                record.push_field(&format!("{:.6}", result.probability));
                record.push_field(result.category.as_str());
                summary.scored += 1;
                *summary
                    .by_category
                    .entry(result.category.as_str().to_string())
                    .or_default() += 1;
            }
            Err(err) => match policy {
                RowErrorPolicy::Abort => {
                    return Err(match err {
                        Error::Csv { .. } => err,
                        other => Error::Csv {
                            row: Some(row),
                            message: other.to_string(),
                        },
                    });
                }
                RowErrorPolicy::Mark => {
                    warn!(
                        event = event_names::BATCH_ROW_FAILED,
                        row,
                        feature = err.feature().unwrap_or(""),
                        error = %err,
                        "row could not be scored"
                    );
                    if record.len() != width {
                        record = fit_width(&record, width);
                    }
                    record.push_field("");
                    record.push_field(INVALID_CLASS);
                    summary.invalid += 1;
                }
            },
        }

        writer.write_record(&record).map_err(csv_error(Some(row)))?;
    }

    writer.flush()?;

    info!(
        event = event_names::BATCH_FINISHED,
        model = %summary.model,
        rows = summary.rows,
        scored = summary.scored,
        invalid = summary.invalid,
        "batch finished"
    );

    Ok(summary)
}

fn check_width(record: &csv::StringRecord, width: usize, row: usize) -> Result<()> {
    if record.len() == width {
        return Ok(());
    }
    Err(Error::Csv {
        row: Some(row),
        message: format!("row has {} fields, header has {}", record.len(), width),
    })
}

/// Pad with empty cells or drop trailing cells.
fn fit_width(record: &csv::StringRecord, width: usize) -> csv::StringRecord {
    let mut fitted: csv::StringRecord = record.iter().take(width).collect();
    while fitted.len() < width {
        fitted.push_field("");
    }
    fitted
}

fn score_record(
    model: &RiskModel,
    record: &csv::StringRecord,
    columns: &[(&str, usize)],
) -> Result<RiskResult> {
    let mut features = FeatureSet::new();
    for (feature, idx) in columns {
        let cell = record.get(*idx).ok_or_else(|| Error::missing(*feature))?;
        features.insert(*feature, parse_field(feature, cell)?);
    }
    model.evaluate(&features)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::RangePolicy;
    use gdm_config::{get_preset, PresetName};

    fn lipid() -> RiskModel {
        RiskModel::compile(&get_preset(PresetName::Lipid), RangePolicy::Reject).unwrap()
    }

    fn run(input: &str, policy: RowErrorPolicy) -> Result<(BatchSummary, String)> {
        let mut out = Vec::new();
        let summary = score_csv(&lipid(), input.as_bytes(), &mut out, policy)?;
        Ok((summary, String::from_utf8(out).unwrap()))
    }

    #[test]
    fn appends_probability_and_class() {
        let input = "id,triglycerides,hdl\n1,2.0,1.2\n2,\"0,8\",1.9\n";
        let (summary, out) = run(input, RowErrorPolicy::Abort).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "id,triglycerides,hdl,probability,class_at_threshold");
        assert_eq!(lines[1], "1,2.0,1.2,0.607639,intermediate");
        assert!(lines[2].starts_with("2,\"0,8\",1.9,"));
        assert!(lines[2].ends_with(",low"));
        assert_eq!(summary.rows, 2);
        assert_eq!(summary.scored, 2);
        assert_eq!(summary.by_category.get("intermediate"), Some(&1));
    }

    #[test]
    fn missing_column_is_header_error() {
        let err = run("id,triglycerides\n1,2.0\n", RowErrorPolicy::Abort).unwrap_err();
        assert!(matches!(err, Error::Csv { row: None, ref message } if message.contains("hdl")));
    }

    #[test]
    fn abort_reports_row_and_feature() {
        let input = "triglycerides,hdl\n2.0,1.2\n2.0,abc\n";
        let err = run(input, RowErrorPolicy::Abort).unwrap_err();
        match err {
            Error::Csv { row, message } => {
                assert_eq!(row, Some(2));
                assert!(message.contains("hdl"), "{message}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn mark_continues_past_bad_rows() {
        let input = "triglycerides,hdl\n2.0,1.2\n,1.2\n30,1.0\n";
        let (summary, out) = run(input, RowErrorPolicy::Mark).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[2], ",1.2,,invalid");
        assert_eq!(lines[3], "30,1.0,,invalid");
        assert_eq!(summary.rows, 3);
        assert_eq!(summary.scored, 1);
        assert_eq!(summary.invalid, 2);
    }

    #[test]
    fn mark_survives_ragged_rows() {
        let input = "id,triglycerides,hdl\n1,2.0,1.2\n2,2.0\n3,1.0,1.5\n4,1.0,1.5,extra\n";
        let (summary, out) = run(input, RowErrorPolicy::Mark).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[2], "2,2.0,,,invalid");
        assert!(lines[3].starts_with("3,1.0,1.5,0."), "{}", lines[3]);
        assert_eq!(lines[4], "4,1.0,1.5,,invalid");
        assert_eq!(summary.rows, 4);
        assert_eq!(summary.scored, 2);
        assert_eq!(summary.invalid, 2);
    }

    #[test]
    fn abort_on_short_row_names_row() {
        let input = "id,triglycerides,hdl\n1,2.0,1.2\n2,2.0\n";
        let err = run(input, RowErrorPolicy::Abort).unwrap_err();
        match err {
            Error::Csv { row, message } => {
                assert_eq!(row, Some(2));
                assert_eq!(message, "row has 2 fields, header has 3");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn existing_output_columns_rejected() {
        for header in ["triglycerides,hdl,probability", "class_at_threshold,triglycerides,hdl"] {
            let input = format!("{header}\n2.0,1.2,x\n");
            let err = run(&input, RowErrorPolicy::Mark).unwrap_err();
            assert!(
                matches!(err, Error::Csv { row: None, ref message } if message.contains("already has")),
                "{header}: {err}"
            );
        }
    }

    #[test]
    fn header_only_input_is_empty_batch() {
        let (summary, out) = run("triglycerides,hdl\n", RowErrorPolicy::Abort).unwrap();
        assert_eq!(summary.rows, 0);
        assert_eq!(out.lines().count(), 1);
    }
}
