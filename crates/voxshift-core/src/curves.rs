//! Procedurally generated transfer curves.
//!
//! Two derived artifacts feed the graph:
//!
//! | Generator | Consumer | Regenerated |
//! |-----------|----------|-------------|
//! | [`soft_clip_curve`] | waveshaper | whenever the distortion amount changes |
//! | [`reverb_impulse`] | convolver | once per session |
//!
//! Both are pure given their inputs (the impulse takes its noise source as an
//! argument so tests can seed it).

use libm::{fabsf, powf};
use rand::Rng;

/// Number of entries in a waveshaper transfer table.
pub const CURVE_RESOLUTION: usize = 44_100;

/// Length of the synthetic room response, in seconds.
pub const REVERB_DURATION_SECS: f32 = 1.5;

/// Power-law exponent of the impulse decay envelope.
pub const REVERB_DECAY: f32 = 2.0;

/// Rational soft clipper `(1 + k) x / (1 + k |x|)` with `k = amount * 10`.
///
/// Odd in `x`, identity at `amount = 0`, and maps ±1 to ±1 for every amount.
///
/// # Example
/// ```rust
/// use voxshift_core::soft_clip;
///
/// assert!((soft_clip(1.0, 0.5) - 11.0 * 0.5 / 6.0).abs() < 1e-6);
/// assert_eq!(soft_clip(0.0, 0.3), 0.3);
/// ```
#[inline]
pub fn soft_clip(amount: f32, x: f32) -> f32 {
    let k = amount * 10.0;
    (1.0 + k) * x / (1.0 + k * fabsf(x))
}

/// Builds the [`CURVE_RESOLUTION`]-entry waveshaper table for `amount`.
///
/// Entry `i` holds `soft_clip(amount, i * 2 / N - 1)`, so the table spans the
/// input domain `[-1, 1)` with the midpoint entry at exactly zero.
pub fn soft_clip_curve(amount: f32) -> Vec<f32> {
    let n = CURVE_RESOLUTION as f32;
    (0..CURVE_RESOLUTION)
        .map(|i| {
            let x = i as f32 * 2.0 / n - 1.0;
            soft_clip(amount, x)
        })
        .collect()
}

/// A multi-channel impulse response buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct ImpulseResponse {
    channels: Vec<Vec<f32>>,
    sample_rate: f32,
}

impl ImpulseResponse {
    /// Wraps existing channel data. All channels must have equal length.
    pub fn from_channels(channels: Vec<Vec<f32>>, sample_rate: f32) -> Self {
        debug_assert!(channels.windows(2).all(|w| w[0].len() == w[1].len()));
        Self {
            channels,
            sample_rate,
        }
    }

    /// Number of channels.
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Samples per channel.
    pub fn len(&self) -> usize {
        self.channels.first().map_or(0, Vec::len)
    }

    /// True if the response holds no samples.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sample rate the response was generated for.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Borrow one channel.
    pub fn channel(&self, index: usize) -> Option<&[f32]> {
        self.channels.get(index).map(Vec::as_slice)
    }

    /// Iterate over all channels.
    pub fn channels(&self) -> impl Iterator<Item = &[f32]> {
        self.channels.iter().map(Vec::as_slice)
    }

    /// Average of all channels, for convolving into a mono bus.
    pub fn downmix(&self) -> Vec<f32> {
        let count = self.channel_count().max(1) as f32;
        let mut mono = vec![0.0; self.len()];
        for channel in &self.channels {
            for (m, &s) in mono.iter_mut().zip(channel) {
                *m += s;
            }
        }
        for m in &mut mono {
            *m /= count;
        }
        mono
    }
}

/// Generates a stereo decaying-noise impulse.
///
/// Each channel holds `sample_rate * duration_secs` samples, truncated; sample `j` of
/// length `L` is `uniform(-1, 1) * (1 - j / L)^decay`.
///
/// # Example
/// ```rust
/// use rand::{SeedableRng, rngs::SmallRng};
/// use voxshift_core::{REVERB_DECAY, REVERB_DURATION_SECS, reverb_impulse};
///
/// let mut rng = SmallRng::seed_from_u64(7);
/// let ir = reverb_impulse(44100.0, REVERB_DURATION_SECS, REVERB_DECAY, &mut rng);
/// assert_eq!(ir.channel_count(), 2);
/// assert_eq!(ir.len(), 66150);
/// ```
pub fn reverb_impulse<R: Rng + ?Sized>(
    sample_rate: f32,
    duration_secs: f32,
    decay: f32,
    rng: &mut R,
) -> ImpulseResponse {
    let length = (sample_rate * duration_secs) as usize;
    let channels = (0..2)
        .map(|_| {
            (0..length)
                .map(|j| {
                    let envelope = powf(1.0 - j as f32 / length as f32, decay);
                    rng.gen_range(-1.0f32..1.0) * envelope
                })
                .collect()
        })
        .collect();
    ImpulseResponse::from_channels(channels, sample_rate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn curve_has_fixed_resolution() {
        assert_eq!(soft_clip_curve(0.4).len(), CURVE_RESOLUTION);
    }

    #[test]
    fn zero_amount_is_identity() {
        let curve = soft_clip_curve(0.0);
        for (i, &y) in curve.iter().enumerate().step_by(97) {
            let x = i as f32 * 2.0 / CURVE_RESOLUTION as f32 - 1.0;
            assert!((y - x).abs() < 1e-6);
        }
    }

    #[test]
    fn full_amount_at_half() {
        assert!((soft_clip(1.0, 0.5) - 0.9167).abs() < 1e-4);
    }

    #[test]
    fn curve_midpoint_is_zero() {
        let curve = soft_clip_curve(0.6);
        assert_eq!(curve[CURVE_RESOLUTION / 2], 0.0);
    }

    #[test]
    fn impulse_decays_and_stays_bounded() {
        let mut rng = SmallRng::seed_from_u64(42);
        let ir = reverb_impulse(48000.0, REVERB_DURATION_SECS, REVERB_DECAY, &mut rng);
        assert_eq!(ir.len(), 72000);
        for channel in ir.channels() {
            assert!(channel.iter().all(|s| (-1.0..=1.0).contains(s)));
            let head: f32 = channel[..4800].iter().map(|s| s * s).sum();
            let tail: f32 = channel[channel.len() - 4800..].iter().map(|s| s * s).sum();
            assert!(tail < head * 0.01, "tail energy should be far below head");
        }
    }

    #[test]
    fn impulse_length_truncates() {
        let mut rng = SmallRng::seed_from_u64(3);
        // 22050 * 0.99999 = 22049.78
        let ir = reverb_impulse(22050.0, 0.99999, REVERB_DECAY, &mut rng);
        assert_eq!(ir.len(), 22049);
    }

    #[test]
    fn impulse_channels_are_independent() {
        let mut rng = SmallRng::seed_from_u64(1);
        let ir = reverb_impulse(8000.0, 0.5, REVERB_DECAY, &mut rng);
        assert_ne!(ir.channel(0), ir.channel(1));
    }

    #[test]
    fn downmix_averages_channels() {
        let ir = ImpulseResponse::from_channels(vec![vec![1.0, 0.0], vec![0.0, 1.0]], 44100.0);
        assert_eq!(ir.downmix(), vec![0.5, 0.5]);
    }
}
