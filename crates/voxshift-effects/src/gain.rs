//! Gain stage with an audio-rate modulation input.
//!
//! The effective gain per sample is the smoothed intrinsic value plus the sum
//! of whatever signals are connected to the gain parameter. With an intrinsic
//! gain of 1 and a sine carrier connected, the output is
//! `input * (1 + sin(wt))`, which is how the ring modulator is built.

use voxshift_core::SmoothedParam;

/// Smoothed gain node.
///
/// # Example
///
/// ```rust
/// use voxshift_effects::GainStage;
///
/// let mut gain = GainStage::new(48000.0, 0.5);
/// let input = [1.0; 4];
/// let mut out = [0.0; 4];
/// gain.process_block(&input, None, &mut out);
/// assert_eq!(out, [0.5; 4]);
/// ```
#[derive(Debug, Clone)]
pub struct GainStage {
    gain: SmoothedParam,
}

impl GainStage {
    /// Create a gain stage at `initial` linear gain.
    pub fn new(sample_rate: f32, initial: f32) -> Self {
        Self {
            gain: SmoothedParam::with_time_constant(initial, sample_rate, 0.0),
        }
    }

    /// The intrinsic gain parameter.
    pub fn gain_mut(&mut self) -> &mut SmoothedParam {
        &mut self.gain
    }

    /// Current intrinsic gain (without modulation).
    pub fn gain(&self) -> f32 {
        self.gain.get()
    }

    /// Update the sample rate used for smoothing.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.gain.set_sample_rate(sample_rate);
    }

    /// Apply the gain to a block.
    ///
    /// `modulation`, when present, is added to the intrinsic gain sample by
    /// sample and must be as long as `input`.
    pub fn process_block(&mut self, input: &[f32], modulation: Option<&[f32]>, output: &mut [f32]) {
        debug_assert_eq!(input.len(), output.len());
        match modulation {
            Some(modulation) => {
                debug_assert_eq!(modulation.len(), input.len());
                for ((out, &x), &m) in output.iter_mut().zip(input).zip(modulation) {
                    *out = x * (self.gain.advance() + m);
                }
            }
            None => {
                if self.gain.is_settled() {
                    let g = self.gain.get();
                    for (out, &x) in output.iter_mut().zip(input) {
                        *out = x * g;
                    }
                } else {
                    for (out, &x) in output.iter_mut().zip(input) {
                        *out = x * self.gain.advance();
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modulation_adds_to_intrinsic_gain() {
        let mut gain = GainStage::new(48000.0, 1.0);
        let input = [0.5; 3];
        let modulation = [-1.0, 0.0, 1.0];
        let mut out = [0.0; 3];
        gain.process_block(&input, Some(&modulation), &mut out);
        assert_eq!(out, [0.0, 0.5, 1.0]);
    }

    #[test]
    fn gain_ramps_toward_target() {
        let mut gain = GainStage::new(48000.0, 1.0);
        gain.gain_mut().set_target_at(0.0, 0.05);
        let input = [1.0; 128];
        let mut out = [0.0; 128];
        gain.process_block(&input, None, &mut out);
        assert!(out[0] < 1.0 && out[0] > 0.99);
        assert!(out.windows(2).all(|w| w[1] <= w[0]));
    }
}
