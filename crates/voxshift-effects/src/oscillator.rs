//! Free-running sine oscillator.
//!
//! The carrier for ring modulation. Its output is not heard directly: it is
//! connected to a gain parameter, so the modulated signal is
//! `input * (1 + sin(2 pi f t))`. At 0 Hz the phase stops advancing and the
//! output holds, which leaves the gain constant.
//!
//! An oscillator is silent until [`start`](SineOscillator::start) is called
//! and runs until it is dropped.

use core::f32::consts::TAU;
use libm::sinf;
use voxshift_core::SmoothedParam;

/// Phase-accumulator sine oscillator with a smoothed frequency.
///
/// # Example
///
/// ```rust
/// use voxshift_effects::SineOscillator;
///
/// let mut osc = SineOscillator::new(48000.0, 12000.0);
/// let mut out = [0.0; 4];
/// osc.render(&mut out);
/// assert_eq!(out, [0.0; 4]); // not started
///
/// osc.start();
/// osc.render(&mut out);
/// assert!((out[1] - 1.0).abs() < 1e-6); // quarter period at fs/4
/// ```
#[derive(Debug, Clone)]
pub struct SineOscillator {
    /// Phase in [0, 1)
    phase: f32,
    frequency: SmoothedParam,
    sample_rate: f32,
    running: bool,
}

impl SineOscillator {
    /// Create a stopped oscillator at `frequency` Hz.
    pub fn new(sample_rate: f32, frequency: f32) -> Self {
        Self {
            phase: 0.0,
            frequency: SmoothedParam::with_time_constant(frequency, sample_rate, 0.0),
            sample_rate,
            running: false,
        }
    }

    /// Start producing output.
    pub fn start(&mut self) {
        self.running = true;
    }

    /// True once started.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Frequency in Hz.
    pub fn frequency_mut(&mut self) -> &mut SmoothedParam {
        &mut self.frequency
    }

    /// Current smoothed frequency in Hz.
    pub fn frequency(&self) -> f32 {
        self.frequency.get()
    }

    /// Fill `output` with the next samples.
    pub fn render(&mut self, output: &mut [f32]) {
        if !self.running {
            output.fill(0.0);
            return;
        }
        let inv_sr = 1.0 / self.sample_rate;
        for out in output.iter_mut() {
            *out = sinf(TAU * self.phase);
            let freq = self.frequency.advance();
            self.phase += freq * inv_sr;
            self.phase -= libm::floorf(self.phase);
        }
    }
}
