//! Numerically stable primitives for the logistic link.

/// Largest magnitude of a linear predictor passed to `exp`.
///
/// `exp(709.78)` is the last finite f64; clamping well below keeps every
/// intermediate finite without changing any probability that is representable.
pub const MAX_LOGIT: f64 = 700.0;

/// Clamp a linear predictor into `[-MAX_LOGIT, MAX_LOGIT]`.
///
/// NaN is passed through unchanged.
pub fn clamp_logit(z: f64) -> f64 {
    if z.is_nan() {
        return z;
    }
    z.clamp(-MAX_LOGIT, MAX_LOGIT)
}

/// Stable logistic function `1 / (1 + exp(-z))`.
///
/// Uses the split form so `exp` is only ever evaluated on a non-positive
/// argument. Returns NaN for NaN input.
pub fn sigmoid(z: f64) -> f64 {
    if z.is_nan() {
        return f64::NAN;
    }
    let z = clamp_logit(z);
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}
