//! Automatic gain control for the capture stage.
//!
//! Browsers and voice-chat stacks level microphone input before the
//! application sees it. On hosts without a platform AGC the source node runs
//! this one instead: a slow RMS detector drives a gain toward a target level,
//! bounded by a maximum boost so background noise is not pumped up, and
//! frozen while the input is below a silence floor.

use voxshift_core::{Effect, SmoothedParam, db_to_linear, linear_to_db};

/// Level the AGC steers speech toward, dBFS RMS.
pub const TARGET_LEVEL_DB: f32 = -20.0;
/// Largest boost applied, dB.
pub const MAX_GAIN_DB: f32 = 20.0;
/// Inputs below this are treated as silence and leave the gain alone, dBFS.
pub const SILENCE_FLOOR_DB: f32 = -60.0;

/// Slow-acting input leveller.
///
/// # Example
///
/// ```rust
/// use voxshift_core::Effect;
/// use voxshift_effects::AutoGainControl;
///
/// let mut agc = AutoGainControl::new(48000.0);
/// let mut y = 0.0;
/// for i in 0..96000 {
///     let x = 0.01 * if i % 2 == 0 { 1.0 } else { -1.0 };
///     y = agc.process(x);
/// }
/// assert!(y.abs() > 0.05); // quiet input is lifted
/// ```
#[derive(Debug, Clone)]
pub struct AutoGainControl {
    /// Mean-square detector
    power: f32,
    power_coeff: f32,
    gain: SmoothedParam,
    sample_rate: f32,
}

impl AutoGainControl {
    /// Detector time constant, seconds.
    const DETECTOR_TIME: f32 = 0.3;
    /// Gain ramp time constant, seconds.
    const GAIN_TIME: f32 = 0.5;

    /// Create an AGC at unity gain.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            power: 0.0,
            power_coeff: Self::coeff(sample_rate),
            gain: SmoothedParam::with_time_constant(1.0, sample_rate, Self::GAIN_TIME),
            sample_rate,
        }
    }

    fn coeff(sample_rate: f32) -> f32 {
        1.0 - libm::expf(-1.0 / (Self::DETECTOR_TIME * sample_rate))
    }

    /// Current linear gain.
    pub fn gain(&self) -> f32 {
        self.gain.get()
    }
}

impl Effect for AutoGainControl {
    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        self.power += self.power_coeff * (input * input - self.power);
        let level_db = linear_to_db(self.power.sqrt());
        if level_db > SILENCE_FLOOR_DB {
            let wanted = (TARGET_LEVEL_DB - level_db).min(MAX_GAIN_DB);
            self.gain.set_target(db_to_linear(wanted));
        }
        input * self.gain.advance()
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.power_coeff = Self::coeff(sample_rate);
        self.gain.set_sample_rate(sample_rate);
    }

    fn reset(&mut self) {
        self.power = 0.0;
        self.gain.set_immediate(1.0);
    }
}
