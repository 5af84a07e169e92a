//! Map raw measurements onto the unit interval.

/// Normalise `value` into `0.0..=1.0` given declared bounds.
///
/// A degenerate range (`max == min`) yields `0.0` rather than an error, and
/// values outside the bounds are clamped so measurement noise cannot push a
/// score out of range. Non-finite inputs also yield `0.0`.
///
/// # Examples
///
/// ```rust
/// use photorank_core::normalise;
///
/// assert_eq!(normalise(500.0, 0.0, 1000.0), 0.5);
/// assert_eq!(normalise(2000.0, 0.0, 1000.0), 1.0);
/// assert_eq!(normalise(3.0, 7.0, 7.0), 0.0);
/// ```
#[expect(
    clippy::float_arithmetic,
    reason = "normalisation is a linear rescale of the input"
)]
#[must_use]
pub fn normalise(value: f64, min: f64, max: f64) -> f64 {
    let span = max - min;
    if span == 0.0_f64 || !span.is_finite() || !value.is_finite() {
        return 0.0;
    }
    sanitise_unit((value - min) / span)
}

/// Clamp a score into `0.0..=1.0`, mapping non-finite values to `0.0`.
#[must_use]
pub fn sanitise_unit(score: f64) -> f64 {
    if !score.is_finite() {
        return 0.0;
    }
    score.clamp(0.0, 1.0)
}
