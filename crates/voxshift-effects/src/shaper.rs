//! Table-driven waveshaper.
//!
//! The transfer table spans inputs `[-1, 1]`. An input `x` maps to the
//! fractional index `v = (N - 1) / 2 * (x + 1)`; the output linearly
//! interpolates neighbouring entries and holds the end entries outside the
//! domain. Tables are shared (`Arc<[f32]>`) so a new curve can be built off
//! the audio thread and swapped in without copying.

use std::sync::Arc;
use voxshift_core::{Effect, lerp};

/// Waveshaper node.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use voxshift_core::{Effect, soft_clip_curve};
/// use voxshift_effects::WaveShaper;
///
/// let mut shaper = WaveShaper::new(Arc::from(soft_clip_curve(1.0)));
/// let y = shaper.process(0.5);
/// assert!((y - 0.9167).abs() < 1e-3);
/// ```
#[derive(Debug, Clone)]
pub struct WaveShaper {
    curve: Arc<[f32]>,
}

impl WaveShaper {
    /// Create a shaper using `curve` as its transfer table.
    pub fn new(curve: Arc<[f32]>) -> Self {
        Self { curve }
    }

    /// Replace the transfer table. An empty table makes the shaper a
    /// passthrough.
    pub fn set_curve(&mut self, curve: Arc<[f32]>) {
        self.curve = curve;
    }

    /// Borrow the current table.
    pub fn curve(&self) -> &[f32] {
        &self.curve
    }

    #[inline]
    fn lookup(&self, x: f32) -> f32 {
        let n = self.curve.len();
        match n {
            0 => x,
            1 => self.curve[0],
            _ => {
                let v = (n - 1) as f32 * 0.5 * (x + 1.0);
                if v <= 0.0 {
                    self.curve[0]
                } else if v >= (n - 1) as f32 {
                    self.curve[n - 1]
                } else {
                    let index = v as usize;
                    lerp(self.curve[index], self.curve[index + 1], v - index as f32)
                }
            }
        }
    }
}

impl Effect for WaveShaper {
    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        if input.is_nan() {
            return input;
        }
        self.lookup(input)
    }

    fn set_sample_rate(&mut self, _sample_rate: f32) {}

    fn reset(&mut self) {}
}
