//! Parameter handling with smoothing for click-free changes.
//!
//! Every control change in the graph is a move toward a new target, never a
//! jump. [`SmoothedParam`] approaches its target exponentially: after one time
//! constant it has covered 63.2% of the distance, after five about 99.3%.
//!
//! ## Usage
//!
//! ```rust
//! use voxshift_core::SmoothedParam;
//!
//! let mut gain = SmoothedParam::with_time_constant(1.0, 48000.0, 0.05);
//! gain.set_target(0.0);
//!
//! for _ in 0..2400 { // one time constant at 48 kHz
//!     let _g = gain.advance();
//! }
//! assert!((gain.get() - 0.368).abs() < 0.01);
//! ```

use libm::expf;

/// Time constant used for every mapped control change, in seconds.
pub const DEFAULT_TIME_CONSTANT: f32 = 0.05;

/// A parameter that approaches its target with a one-pole exponential curve.
///
/// `value[n] = value[n-1] + coeff * (target - value[n-1])` with
/// `coeff = 1 - exp(-1 / (tau * sample_rate))`.
#[derive(Debug, Clone)]
pub struct SmoothedParam {
    /// Current smoothed value
    current: f32,
    /// Target value we're smoothing towards
    target: f32,
    /// Smoothing coefficient (1 = instant)
    coeff: f32,
    /// Sample rate in Hz
    sample_rate: f32,
    /// Time constant in seconds
    time_constant: f32,
}

impl SmoothedParam {
    /// Create a parameter that jumps straight to new targets.
    ///
    /// Call [`set_sample_rate`](Self::set_sample_rate) and give a time
    /// constant to [`set_target_at`](Self::set_target_at) to enable smoothing.
    pub fn new(initial: f32) -> Self {
        Self {
            current: initial,
            target: initial,
            coeff: 1.0,
            sample_rate: 44100.0,
            time_constant: 0.0,
        }
    }

    /// Create a smoothed parameter with full configuration.
    ///
    /// # Arguments
    /// * `initial` - Initial parameter value
    /// * `sample_rate` - Sample rate in Hz
    /// * `time_constant` - Time constant in seconds
    pub fn with_time_constant(initial: f32, sample_rate: f32, time_constant: f32) -> Self {
        let mut param = Self::new(initial);
        param.sample_rate = sample_rate;
        param.time_constant = time_constant;
        param.recalculate_coeff();
        param
    }

    /// Set the target value, keeping the current time constant.
    #[inline]
    pub fn set_target(&mut self, target: f32) {
        self.target = target;
    }

    /// Start a new approach toward `target` with the given time constant.
    ///
    /// The ramp starts from wherever the value currently is, so a change that
    /// interrupts an earlier ramp continues smoothly.
    pub fn set_target_at(&mut self, target: f32, time_constant: f32) {
        self.target = target;
        if time_constant != self.time_constant {
            self.time_constant = time_constant;
            self.recalculate_coeff();
        }
    }

    /// Set target and immediately snap to it.
    #[inline]
    pub fn set_immediate(&mut self, value: f32) {
        self.target = value;
        self.current = value;
    }

    /// Update sample rate and recalculate the smoothing coefficient.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.recalculate_coeff();
    }

    /// Get the next smoothed value (advances by one sample).
    #[inline]
    pub fn advance(&mut self) -> f32 {
        self.current += self.coeff * (self.target - self.current);
        self.current
    }

    /// Advance by `samples` steps at once, returning the value afterwards.
    ///
    /// Closed form of calling [`advance`](Self::advance) `samples` times.
    pub fn advance_by(&mut self, samples: usize) -> f32 {
        if samples == 0 {
            return self.current;
        }
        let remaining = libm::powf(1.0 - self.coeff, samples as f32);
        self.current = self.target + (self.current - self.target) * remaining;
        self.current
    }

    /// Get the current smoothed value without advancing.
    #[inline]
    pub fn get(&self) -> f32 {
        self.current
    }

    /// Get the target value.
    #[inline]
    pub fn target(&self) -> f32 {
        self.target
    }

    /// Time constant in seconds.
    pub fn time_constant(&self) -> f32 {
        self.time_constant
    }

    /// True once the value is within `1e-6` of the target, relative to the
    /// target's magnitude when that exceeds 1.
    #[inline]
    pub fn is_settled(&self) -> bool {
        (self.current - self.target).abs() <= 1e-6 * self.target.abs().max(1.0)
    }

    /// Skip ahead to the target value immediately.
    #[inline]
    pub fn snap_to_target(&mut self) {
        self.current = self.target;
    }

    fn recalculate_coeff(&mut self) {
        if self.time_constant <= 0.0 || self.sample_rate <= 0.0 {
            self.coeff = 1.0;
        } else {
            let samples = self.time_constant * self.sample_rate;
            self.coeff = 1.0 - expf(-1.0 / samples);
        }
    }
}

impl Default for SmoothedParam {
    fn default() -> Self {
        Self::new(0.0)
    }
}
