//! Conservative multi-source combination.

use gdm_common::{Error, Result, RiskCategory};

/// Most severe category among the available component results.
///
/// Order does not matter and duplicates are harmless. An empty slice means no
/// component was scored and yields [`Error::InsufficientData`].
pub fn combine(categories: &[RiskCategory]) -> Result<RiskCategory> {
    categories
        .iter()
        .copied()
        .max()
        .ok_or(Error::InsufficientData)
}
