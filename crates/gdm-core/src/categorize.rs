//! Probability to risk category.

use gdm_common::RiskCategory;
use gdm_config::Thresholds;

/// Map a probability onto the model's cutoffs.
///
/// Banded: `[0, low)` Low, `[low, high)` Intermediate, `[high, 1]` High.
/// Single: `p >= threshold` High, otherwise Low. A cutoff value itself always
/// falls into the upper band.
pub fn categorize(probability: f64, thresholds: &Thresholds) -> RiskCategory {
    match *thresholds {
        Thresholds::Single { threshold } => {
            if probability >= threshold {
                RiskCategory::High
            } else {
                RiskCategory::Low
            }
        }
        Thresholds::Banded { low, high } => {
            if probability < low {
                RiskCategory::Low
            } else if probability < high {
                RiskCategory::Intermediate
            } else {
                RiskCategory::High
            }
        }
    }
}
