//! Property-based tests for gdm-math numerical functions.
//!
//! Uses proptest to verify mathematical properties hold across many random inputs.

use gdm_math::{log10_summary, mean, sample_std_dev, sigmoid};
use proptest::prelude::*;

/// Tolerance for floating point comparisons.
const TOL: f64 = 1e-10;

fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
    if a.is_nan() || b.is_nan() {
        return false;
    }
    (a - b).abs() <= tol.max(tol * a.abs().max(b.abs()))
}

// ============================================================================
// sigmoid properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    /// Over the range linear predictors actually reach, the output is strictly inside (0, 1).
    #[test]
    fn sigmoid_open_unit_interval(z in -30.0..30.0f64) {
        let p = sigmoid(z);
        prop_assert!(p > 0.0 && p < 1.0, "sigmoid({})={}", z, p);
    }

    /// sigmoid(-z) = 1 - sigmoid(z).
    #[test]
    fn sigmoid_symmetry(z in -40.0..40.0f64) {
        let lhs = sigmoid(-z);
        let rhs = 1.0 - sigmoid(z);
        prop_assert!(approx_eq(lhs, rhs, 1e-12), "sigmoid(-{})={} vs {}", z, lhs, rhs);
    }

    /// Strictly increasing where f64 can resolve the difference.
    #[test]
    fn sigmoid_monotone(a in -20.0..20.0f64, delta in 1e-3..5.0f64) {
        prop_assert!(sigmoid(a + delta) > sigmoid(a));
    }

    /// Arbitrary finite inputs never produce NaN or leave [0, 1].
    #[test]
    fn sigmoid_total_on_finite(z in proptest::num::f64::NORMAL) {
        let p = sigmoid(z);
        prop_assert!(!p.is_nan());
        prop_assert!((0.0..=1.0).contains(&p));
    }

    /// The log-odds of the output recover the linear predictor.
    #[test]
    fn sigmoid_log_odds_recover_input(z in -15.0..15.0f64) {
        let p = sigmoid(z);
        let back = (p / (1.0 - p)).ln();
        prop_assert!(approx_eq(back, z, 1e-7), "log-odds of sigmoid({})={}", z, back);
    }
}

// ============================================================================
// summary statistics properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Standard deviation is shift invariant.
    #[test]
    fn std_dev_shift_invariant(values in prop::collection::vec(-100.0..100.0f64, 2..20), shift in -50.0..50.0f64) {
        let shifted: Vec<f64> = values.iter().map(|v| v + shift).collect();
        let a = sample_std_dev(&values).unwrap();
        let b = sample_std_dev(&shifted).unwrap();
        prop_assert!(approx_eq(a, b, 1e-8), "sd {} vs shifted {}", a, b);
    }

    /// Mean lies between min and max.
    #[test]
    fn mean_bounded(values in prop::collection::vec(-1000.0..1000.0f64, 1..30)) {
        let m = mean(&values).unwrap();
        let lo = values.iter().cloned().fold(f64::INFINITY, f64::min);
        let hi = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        prop_assert!(m >= lo - TOL && m <= hi + TOL);
    }

    /// Scaling a positive sample by 10 shifts the log mean by exactly 1 and keeps the sd.
    #[test]
    fn log10_summary_scale(values in prop::collection::vec(0.01..500.0f64, 2..15)) {
        let scaled: Vec<f64> = values.iter().map(|v| v * 10.0).collect();
        let a = log10_summary(&values).unwrap();
        let b = log10_summary(&scaled).unwrap();
        prop_assert!(approx_eq(b.mean - a.mean, 1.0, 1e-9));
        prop_assert!(approx_eq(a.sd, b.sd, 1e-9));
    }
}

// ============================================================================
// Edge case tests
// ============================================================================

#[test]
fn edge_case_sigmoid_nan() {
    assert!(sigmoid(f64::NAN).is_nan());
}

#[test]
fn edge_case_empty_mean() {
    assert!(mean(&[]).is_none());
}

#[test]
fn edge_case_summary_needs_two_points() {
    assert!(log10_summary(&[3.0]).is_none());
}
