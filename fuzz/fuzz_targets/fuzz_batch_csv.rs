//! Fuzz target for batch CSV scoring.
//!
//! Feeds arbitrary tables to the lipid model under both row policies.

#![no_main]

use arbitrary::Arbitrary;
use gdm_config::{get_preset, PresetName};
use gdm_core::{score_csv, RangePolicy, RiskModel, RowErrorPolicy};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Input {
    mark_invalid: bool,
    clamp: bool,
    table: Vec<u8>,
}

fuzz_target!(|input: Input| {
    let policy = if input.clamp {
        RangePolicy::Clamp
    } else {
        RangePolicy::Reject
    };
    let Ok(model) = RiskModel::compile(&get_preset(PresetName::Lipid), policy) else {
        return;
    };
    let rows = if input.mark_invalid {
        RowErrorPolicy::Mark
    } else {
        RowErrorPolicy::Abort
    };

    let mut out = Vec::new();
    if let Ok(summary) = score_csv(&model, input.table.as_slice(), &mut out, rows) {
        assert_eq!(summary.rows, summary.scored + summary.invalid);
    }
});
