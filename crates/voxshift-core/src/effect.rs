//! Core Effect trait.
//!
//! The [`Effect`] trait is the contract every mono, sample-rate-aware
//! processor in the graph meets.
//!
//! ## Design Decisions
//!
//! - **Mono processing**: the voice bus is mono from capture to output.
//! - **Object-safe**: render graphs hold `Box<dyn Effect + Send>`.
//! - **No allocations**: all methods are callable from the audio thread.

/// Core trait for mono audio processors.
///
/// # Example
///
/// ```rust
/// use voxshift_core::Effect;
///
/// struct Halve;
///
/// impl Effect for Halve {
///     fn process(&mut self, input: f32) -> f32 {
///         input * 0.5
///     }
///
///     fn set_sample_rate(&mut self, _sample_rate: f32) {}
///
///     fn reset(&mut self) {}
/// }
///
/// let mut fx = Halve;
/// let mut buf = [1.0, -1.0];
/// fx.process_block_inplace(&mut buf);
/// assert_eq!(buf, [0.5, -0.5]);
/// ```
pub trait Effect {
    /// Process a single sample.
    fn process(&mut self, input: f32) -> f32;

    /// Process a block of samples.
    ///
    /// Default implementation calls `process()` for each sample.
    fn process_block(&mut self, input: &[f32], output: &mut [f32]) {
        debug_assert_eq!(
            input.len(),
            output.len(),
            "Input and output buffers must have same length"
        );
        for (inp, out) in input.iter().zip(output.iter_mut()) {
            *out = self.process(*inp);
        }
    }

    /// Process a block of samples in-place.
    fn process_block_inplace(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.process(*sample);
        }
    }

    /// Update the sample rate and recompute rate-dependent coefficients.
    fn set_sample_rate(&mut self, sample_rate: f32);

    /// Clear internal state (histories, delay buffers) without changing
    /// parameters.
    fn reset(&mut self);

    /// Processing latency in samples. Default 0.
    fn latency_samples(&self) -> usize {
        0
    }
}
