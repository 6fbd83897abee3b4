//! Score rounding shared by the resolvers and the evaluator.
//!
//! Weighted sums such as `60 * 0.4 + x * 0.6` pick up binary noise; both
//! helpers snap values lying within `NOISE` of an integer onto it before
//! rounding so that `(50 - 20) / 0.6` needs 50, not 51.

const NOISE: f64 = 1e-9;

pub(crate) const MIN_SCORE: f64 = 0.0;
pub(crate) const MAX_SCORE: f64 = 100.0;

fn snap(value: f64) -> f64 {
    let nearest = value.round();
    if (value - nearest).abs() < NOISE {
        nearest
    } else {
        value
    }
}

/// Rounds to the nearest integer, halves going up. Values within `NOISE` of a
/// half are snapped onto it first, so `39.49999999999999` rounds to 40.
pub(crate) fn round_half_up(value: f64) -> f64 {
    (snap(value * 2.0) / 2.0 + 0.5).floor()
}

/// Smallest integer not below `value`.
pub(crate) fn ceil_needed(value: f64) -> f64 {
    snap(value).ceil()
}

/// Rounds a coefficient to two decimals for presentation-stable results.
pub(crate) fn round_coefficient(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Clamps a score into `[0, 100]`; NaN collapses to zero.
pub(crate) fn clamp_score(value: f64) -> f64 {
    if value.is_nan() {
        return MIN_SCORE;
    }
    value.clamp(MIN_SCORE, MAX_SCORE)
}
