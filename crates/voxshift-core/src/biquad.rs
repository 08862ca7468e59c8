//! Biquad (bi-quadratic) filter structure.
//!
//! Provides a second-order IIR filter plus the RBJ Audio EQ Cookbook designs
//! the voice graph uses: low-pass and high-pass for the tone filter, peaking
//! for the de-esser, and a high shelf for presence.

use core::f32::consts::{PI, SQRT_2};
use libm::{cosf, powf, sinf, sqrtf};

/// Filter response selectable on a biquad node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterType {
    /// Second-order low-pass
    #[default]
    Lowpass,
    /// Second-order high-pass
    Highpass,
    /// Bell boost or cut around the center frequency
    Peaking,
    /// Boost or cut above the corner frequency (slope 1, Q ignored)
    HighShelf,
}

/// Generic biquad filter coefficients and state.
///
/// Implements the Direct Form I biquad structure:
/// ```text
/// y[n] = b0*x[n] + b1*x[n-1] + b2*x[n-2]
///                - a1*y[n-1] - a2*y[n-2]
/// ```
#[derive(Debug, Clone)]
pub struct Biquad {
    b0: f32,
    b1: f32,
    b2: f32,
    a1: f32,
    a2: f32,

    /// Input history: x[n-1], x[n-2]
    x1: f32,
    x2: f32,

    /// Output history: y[n-1], y[n-2]
    y1: f32,
    y2: f32,
}

impl Biquad {
    /// Creates a new biquad with passthrough coefficients.
    pub fn new() -> Self {
        Self {
            b0: 1.0,
            b1: 0.0,
            b2: 0.0,
            a1: 0.0,
            a2: 0.0,
            x1: 0.0,
            x2: 0.0,
            y1: 0.0,
            y2: 0.0,
        }
    }

    /// Sets the biquad coefficients, normalizing by `a0`.
    pub fn set_coefficients(&mut self, b0: f32, b1: f32, b2: f32, a0: f32, a1: f32, a2: f32) {
        let a0_inv = 1.0 / a0;
        self.b0 = b0 * a0_inv;
        self.b1 = b1 * a0_inv;
        self.b2 = b2 * a0_inv;
        self.a1 = a1 * a0_inv;
        self.a2 = a2 * a0_inv;
    }

    /// Sets coefficients from a `(b0, b1, b2, a0, a1, a2)` tuple.
    pub fn set_coefficient_tuple(&mut self, c: (f32, f32, f32, f32, f32, f32)) {
        self.set_coefficients(c.0, c.1, c.2, c.3, c.4, c.5);
    }

    /// Processes a single sample through the biquad filter.
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let output = self.b0 * input + self.b1 * self.x1 + self.b2 * self.x2
            - self.a1 * self.y1
            - self.a2 * self.y2;

        self.x2 = self.x1;
        self.x1 = input;
        self.y2 = self.y1;
        self.y1 = crate::flush_denormal(output);

        output
    }

    /// Clears the filter state without changing coefficients.
    pub fn clear(&mut self) {
        self.x1 = 0.0;
        self.x2 = 0.0;
        self.y1 = 0.0;
        self.y2 = 0.0;
    }
}

impl Default for Biquad {
    fn default() -> Self {
        Self::new()
    }
}

/// Keeps designs away from DC, Nyquist and zero Q where the cookbook
/// formulas blow up.
fn sanitize(frequency: f32, q: f32, sample_rate: f32) -> (f32, f32) {
    let nyquist = sample_rate * 0.5;
    let frequency = frequency.clamp(1.0, nyquist * 0.999);
    let q = if q.is_finite() { q.max(1e-4) } else { 1e-4 };
    (frequency, q)
}

/// Calculates coefficients for any [`FilterType`].
///
/// `gain_db` only applies to [`FilterType::Peaking`] and
/// [`FilterType::HighShelf`]; `q` is ignored by the shelf.
pub fn coefficients(
    filter: FilterType,
    frequency: f32,
    q: f32,
    gain_db: f32,
    sample_rate: f32,
) -> (f32, f32, f32, f32, f32, f32) {
    let (frequency, q) = sanitize(frequency, q, sample_rate);
    match filter {
        FilterType::Lowpass => lowpass_coefficients(frequency, q, sample_rate),
        FilterType::Highpass => highpass_coefficients(frequency, q, sample_rate),
        FilterType::Peaking => peaking_eq_coefficients(frequency, q, gain_db, sample_rate),
        FilterType::HighShelf => highshelf_coefficients(frequency, gain_db, sample_rate),
    }
}

/// Low-pass coefficients (RBJ cookbook).
///
/// # Returns
///
/// (b0, b1, b2, a0, a1, a2) coefficients
pub fn lowpass_coefficients(
    frequency: f32,
    q: f32,
    sample_rate: f32,
) -> (f32, f32, f32, f32, f32, f32) {
    let omega = 2.0 * PI * frequency / sample_rate;
    let cos_omega = cosf(omega);
    let alpha = sinf(omega) / (2.0 * q);

    let b0 = (1.0 - cos_omega) / 2.0;
    let b1 = 1.0 - cos_omega;
    let b2 = (1.0 - cos_omega) / 2.0;
    let a0 = 1.0 + alpha;
    let a1 = -2.0 * cos_omega;
    let a2 = 1.0 - alpha;

    (b0, b1, b2, a0, a1, a2)
}

/// High-pass coefficients (RBJ cookbook).
pub fn highpass_coefficients(
    frequency: f32,
    q: f32,
    sample_rate: f32,
) -> (f32, f32, f32, f32, f32, f32) {
    let omega = 2.0 * PI * frequency / sample_rate;
    let cos_omega = cosf(omega);
    let alpha = sinf(omega) / (2.0 * q);

    let b0 = (1.0 + cos_omega) / 2.0;
    let b1 = -(1.0 + cos_omega);
    let b2 = (1.0 + cos_omega) / 2.0;
    let a0 = 1.0 + alpha;
    let a1 = -2.0 * cos_omega;
    let a2 = 1.0 - alpha;

    (b0, b1, b2, a0, a1, a2)
}

/// Peaking EQ coefficients (RBJ cookbook).
///
/// Boosts or cuts around a center frequency with bandwidth `frequency / q`.
pub fn peaking_eq_coefficients(
    frequency: f32,
    q: f32,
    gain_db: f32,
    sample_rate: f32,
) -> (f32, f32, f32, f32, f32, f32) {
    let a = powf(10.0, gain_db / 40.0);
    let omega = 2.0 * PI * frequency / sample_rate;
    let cos_omega = cosf(omega);
    let alpha = sinf(omega) / (2.0 * q);

    let b0 = 1.0 + alpha * a;
    let b1 = -2.0 * cos_omega;
    let b2 = 1.0 - alpha * a;
    let a0 = 1.0 + alpha / a;
    let a1 = -2.0 * cos_omega;
    let a2 = 1.0 - alpha / a;

    (b0, b1, b2, a0, a1, a2)
}

/// High-shelf coefficients (RBJ cookbook, shelf slope S = 1).
///
/// At S = 1 the shelf alpha reduces to `sin(w0) / 2 * sqrt(2)`.
pub fn highshelf_coefficients(
    frequency: f32,
    gain_db: f32,
    sample_rate: f32,
) -> (f32, f32, f32, f32, f32, f32) {
    let a = powf(10.0, gain_db / 40.0);
    let omega = 2.0 * PI * frequency / sample_rate;
    let cos_omega = cosf(omega);
    let alpha = sinf(omega) / 2.0 * SQRT_2;
    let two_sqrt_a_alpha = 2.0 * sqrtf(a) * alpha;

    let b0 = a * ((a + 1.0) + (a - 1.0) * cos_omega + two_sqrt_a_alpha);
    let b1 = -2.0 * a * ((a - 1.0) + (a + 1.0) * cos_omega);
    let b2 = a * ((a + 1.0) + (a - 1.0) * cos_omega - two_sqrt_a_alpha);
    let a0 = (a + 1.0) - (a - 1.0) * cos_omega + two_sqrt_a_alpha;
    let a1 = 2.0 * ((a - 1.0) - (a + 1.0) * cos_omega);
    let a2 = (a + 1.0) - (a - 1.0) * cos_omega - two_sqrt_a_alpha;

    (b0, b1, b2, a0, a1, a2)
}
