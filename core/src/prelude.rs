/// Identifier of a fixed-length recorded traffic segment.
pub type ChunkId = u32;

/// Identifier of a signal head at the intersection, e.g. `ID-1`.
pub type SignalId = String;

/// Replaces any non-finite or negative figure with zero so that nothing
/// like `NaN` or `inf` reaches a display.
pub fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// Division that yields zero instead of faulting when the denominator is not positive.
pub fn ratio_or_zero(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 && denominator.is_finite() {
        finite_or_zero(numerator / denominator)
    } else {
        0.0
    }
}
