//! Mathematical utility functions for DSP.
//!
//! # Level Conversions
//!
//! - [`db_to_linear`] / [`linear_to_db`] - Convert between dB and linear gain
//!
//! # Utilities
//!
//! - [`lerp`] - Linear interpolation
//! - [`flush_denormal`] - Keeps feedback paths out of the subnormal range

use libm::{expf, logf};

/// Smallest linear value considered when converting to decibels.
pub const LEVEL_FLOOR: f32 = 1e-10;

/// Convert decibels to linear gain.
///
/// # Example
/// ```rust
/// use voxshift_core::db_to_linear;
///
/// assert!((db_to_linear(0.0) - 1.0).abs() < 0.001);
/// assert!((db_to_linear(-6.02) - 0.5).abs() < 0.01);
/// ```
#[inline]
pub fn db_to_linear(db: f32) -> f32 {
    // 10^(dB/20) = e^(dB * ln(10)/20)
    const FACTOR: f32 = core::f32::consts::LN_10 / 20.0;
    expf(db * FACTOR)
}

/// Convert linear gain to decibels, flooring the input at [`LEVEL_FLOOR`].
///
/// Silence maps to -200 dB instead of negative infinity.
///
/// # Example
/// ```rust
/// use voxshift_core::linear_to_db;
///
/// assert!((linear_to_db(0.5) - (-6.02)).abs() < 0.01);
/// assert!((linear_to_db(0.0) + 200.0).abs() < 0.01);
/// ```
#[inline]
pub fn linear_to_db(linear: f32) -> f32 {
    // 20 * log10(linear) = 20 * ln(linear) / ln(10)
    const FACTOR: f32 = 20.0 / core::f32::consts::LN_10;
    logf(linear.max(LEVEL_FLOOR)) * FACTOR
}

/// Linear interpolation from `a` to `b`.
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Flush values below 1e-20 to zero.
///
/// Use in feedback loops (biquad history, the echo loop) where a signal can
/// decay toward zero forever.
#[allow(clippy::inline_always)]
#[inline(always)]
pub fn flush_denormal(x: f32) -> f32 {
    if x.abs() < 1e-20 { 0.0 } else { x }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn db_round_trip() {
        for db in [-60.0, -24.0, -1.0, 0.0, 6.0] {
            assert!((linear_to_db(db_to_linear(db)) - db).abs() < 1e-3);
        }
    }

    #[test]
    fn silence_is_floored() {
        assert!((linear_to_db(0.0) + 200.0).abs() < 1e-3);
        assert!(linear_to_db(-1.0).is_finite());
    }

    #[test]
    fn flush_denormal_zeroes_tiny_values() {
        assert_eq!(flush_denormal(1e-25), 0.0);
        assert_eq!(flush_denormal(0.5), 0.5);
    }
}
