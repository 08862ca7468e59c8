//! Feed-forward dynamics compressor.
//!
//! One processor covers both dynamics stages of the voice graph: the speech
//! compressor after the de-esser and the output limiter before master gain.
//!
//! # Signal Flow
//!
//! ```text
//! Input → Envelope Follower → dB → Gain Computer → Gain Reduction → Output
//! ```
//!
//! # Knee
//!
//! The knee starts at the threshold and spans `knee_db` above it. Inside the
//! knee the reduction grows quadratically, `(1 - 1/R) * o^2 / (2 W)` for
//! overshoot `o`, and joins the straight ratio line at `threshold + knee`.
//!
//! # Presets
//!
//! | Preset | Threshold | Knee | Ratio | Attack | Release |
//! |--------|-----------|------|-------|--------|---------|
//! | [`CompressorSettings::voice`] | -24 dB | 30 dB | 12:1 | 3 ms | 250 ms |
//! | [`CompressorSettings::limiter`] | -1 dB | 0 dB | 20:1 | 1 ms | 250 ms |

use voxshift_core::{Effect, EnvelopeFollower, db_to_linear, linear_to_db};

/// Static compressor configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompressorSettings {
    /// Level where reduction begins, dB
    pub threshold_db: f32,
    /// Knee width above the threshold, dB
    pub knee_db: f32,
    /// Input/output slope above the knee
    pub ratio: f32,
    /// Attack time in seconds
    pub attack: f32,
    /// Release time in seconds
    pub release: f32,
}

impl CompressorSettings {
    /// Speech compressor after the de-esser.
    pub const fn voice() -> Self {
        Self {
            threshold_db: -24.0,
            knee_db: 30.0,
            ratio: 12.0,
            attack: 0.003,
            release: 0.25,
        }
    }

    /// Output limiter with a -1 dB ceiling. Hard knee, steep ratio.
    pub const fn limiter() -> Self {
        Self {
            threshold_db: -1.0,
            knee_db: 0.0,
            ratio: 20.0,
            attack: 0.001,
            release: 0.25,
        }
    }
}

impl Default for CompressorSettings {
    fn default() -> Self {
        Self::voice()
    }
}

#[derive(Debug, Clone, Copy)]
struct GainComputer {
    threshold_db: f32,
    knee_db: f32,
    ratio: f32,
}

impl GainComputer {
    #[inline]
    fn compute_gain_db(&self, input_db: f32) -> f32 {
        let overshoot = input_db - self.threshold_db;
        let slope = 1.0 - 1.0 / self.ratio.max(1.0);

        if overshoot <= 0.0 {
            0.0
        } else if overshoot < self.knee_db {
            -slope * overshoot * overshoot / (2.0 * self.knee_db)
        } else {
            -slope * (overshoot - self.knee_db / 2.0)
        }
    }
}

/// Dynamics compressor effect.
///
/// # Example
///
/// ```rust
/// use voxshift_core::Effect;
/// use voxshift_effects::Compressor;
///
/// let mut comp = Compressor::voice(44100.0);
/// for _ in 0..4410 {
///     comp.process(0.9);
/// }
/// assert!(comp.gain_reduction_db() < -6.0);
/// ```
#[derive(Debug, Clone)]
pub struct Compressor {
    envelope_follower: EnvelopeFollower,
    gain_computer: GainComputer,
    settings: CompressorSettings,
    /// Last computed gain reduction in dB (always non-positive).
    last_gain_reduction_db: f32,
}

impl Compressor {
    /// Create a compressor from explicit settings.
    pub fn new(sample_rate: f32, settings: CompressorSettings) -> Self {
        Self {
            envelope_follower: EnvelopeFollower::with_times(
                sample_rate,
                settings.attack,
                settings.release,
            ),
            gain_computer: GainComputer {
                threshold_db: settings.threshold_db,
                knee_db: settings.knee_db,
                ratio: settings.ratio,
            },
            settings,
            last_gain_reduction_db: 0.0,
        }
    }

    /// Speech compressor preset.
    pub fn voice(sample_rate: f32) -> Self {
        Self::new(sample_rate, CompressorSettings::voice())
    }

    /// Output limiter preset.
    pub fn limiter(sample_rate: f32) -> Self {
        Self::new(sample_rate, CompressorSettings::limiter())
    }

    /// Current configuration.
    pub fn settings(&self) -> CompressorSettings {
        self.settings
    }

    /// Returns the last computed gain reduction in dB (always non-positive).
    pub fn gain_reduction_db(&self) -> f32 {
        self.last_gain_reduction_db
    }
}

impl Effect for Compressor {
    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        let envelope = self.envelope_follower.process(input);
        let gain_reduction_db = self.gain_computer.compute_gain_db(linear_to_db(envelope));
        self.last_gain_reduction_db = gain_reduction_db;
        input * db_to_linear(gain_reduction_db)
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.envelope_follower.set_sample_rate(sample_rate);
    }

    fn reset(&mut self) {
        self.envelope_follower.reset();
        self.last_gain_reduction_db = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiet_signal_passes_unchanged() {
        let mut comp = Compressor::voice(48000.0);
        // -40 dB, below threshold
        for _ in 0..4800 {
            let out = comp.process(0.01);
            assert!((out - 0.01).abs() < 1e-6);
        }
        assert_eq!(comp.gain_reduction_db(), 0.0);
    }

    #[test]
    fn knee_is_continuous() {
        let gc = GainComputer {
            threshold_db: -24.0,
            knee_db: 30.0,
            ratio: 12.0,
        };
        let at_knee_top = gc.compute_gain_db(-24.0 + 30.0);
        let just_below = gc.compute_gain_db(-24.0 + 29.999);
        assert!((at_knee_top - just_below).abs() < 1e-2);
        assert_eq!(gc.compute_gain_db(-24.0), 0.0);
    }

    #[test]
    fn ratio_slope_above_knee() {
        let gc = GainComputer {
            threshold_db: -24.0,
            knee_db: 0.0,
            ratio: 12.0,
        };
        // 12 dB over threshold at 12:1 comes out 1 dB over.
        let reduction = gc.compute_gain_db(-12.0);
        assert!((reduction + 11.0).abs() < 1e-4);
    }

    #[test]
    fn limiter_holds_loud_signal_near_ceiling() {
        let mut limiter = Compressor::limiter(48000.0);
        let mut out = 0.0;
        for _ in 0..48000 {
            out = limiter.process(2.0);
        }
        assert!(out < 1.0, "got {out}");
    }

    #[test]
    fn reset_clears_detector() {
        let mut comp = Compressor::voice(48000.0);
        for _ in 0..1000 {
            comp.process(1.0);
        }
        comp.reset();
        assert_eq!(comp.gain_reduction_db(), 0.0);
        let out = comp.process(0.001);
        assert!((out - 0.001).abs() < 1e-6);
    }
}
