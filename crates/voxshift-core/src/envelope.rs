//! Envelope follower for tracking signal amplitude.
//!
//! Drives the compressor's detector.

use libm::expf;

/// Peak envelope follower with separate attack and release.
///
/// # Example
///
/// ```rust
/// use voxshift_core::EnvelopeFollower;
///
/// let mut env = EnvelopeFollower::with_times(48000.0, 0.003, 0.25);
/// let level = env.process(-0.5);
/// assert!(level > 0.0);
/// ```
#[derive(Debug, Clone)]
pub struct EnvelopeFollower {
    envelope: f32,
    attack_coeff: f32,
    release_coeff: f32,
    sample_rate: f32,
    /// Attack time in seconds
    attack: f32,
    /// Release time in seconds
    release: f32,
}

impl EnvelopeFollower {
    /// Create with attack and release times in seconds.
    pub fn with_times(sample_rate: f32, attack: f32, release: f32) -> Self {
        let mut follower = Self {
            envelope: 0.0,
            attack_coeff: 0.0,
            release_coeff: 0.0,
            sample_rate,
            attack,
            release,
        };
        follower.recalculate_coefficients();
        follower
    }

    /// Update sample rate and recalculate coefficients.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.recalculate_coefficients();
    }

    /// Process a sample and return the current envelope level.
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let input_abs = input.abs();
        let coeff = if input_abs > self.envelope {
            self.attack_coeff
        } else {
            self.release_coeff
        };
        self.envelope = coeff * self.envelope + (1.0 - coeff) * input_abs;
        self.envelope
    }

    /// Current envelope level.
    pub fn level(&self) -> f32 {
        self.envelope
    }

    /// Reset the envelope to zero.
    pub fn reset(&mut self) {
        self.envelope = 0.0;
    }

    fn recalculate_coefficients(&mut self) {
        self.attack_coeff = Self::coeff(self.attack, self.sample_rate);
        self.release_coeff = Self::coeff(self.release, self.sample_rate);
    }

    // Zero time means instant tracking.
    fn coeff(seconds: f32, sample_rate: f32) -> f32 {
        let samples = seconds * sample_rate;
        if samples <= 0.0 {
            0.0
        } else {
            expf(-1.0 / samples)
        }
    }
}
