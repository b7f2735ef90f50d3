//! Fuzz target for lenient decimal parsing.
//!
//! Tests that `parse_decimal` and `parse_flag` handle arbitrary input without
//! panicking and never yield a non-finite value.

#![no_main]

use gdm_core::input::{parse_decimal, parse_flag};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    if let Some(v) = parse_decimal(data) {
        assert!(v.is_finite());
    }
    if let Ok(v) = parse_flag("family_history", data) {
        assert!(v == 0.0 || v == 1.0);
    }
});
