//! Fuzz target for models.json parsing.
//!
//! Tests that catalog parsing and model compilation handle arbitrary input
//! without panicking.

#![no_main]

use gdm_config::ModelCatalog;
use gdm_core::{RangePolicy, RiskModel};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    let Ok(catalog) = ModelCatalog::from_json_str(data) else {
        return;
    };
    // Validation may reject; compilation must not panic either way.
    let _ = catalog.validate();
    for spec in catalog.models.values() {
        let _ = RiskModel::compile(spec, RangePolicy::Reject);
    }
});
