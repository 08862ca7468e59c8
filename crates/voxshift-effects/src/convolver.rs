//! Uniformly partitioned FFT convolution.
//!
//! Long impulse responses (1.5 s is ~66k taps at 44.1 kHz) are far too
//! expensive to convolve directly. The response is split into partitions of
//! `block` samples, each transformed once at construction. Every input block
//! is transformed once and pushed into a frequency-domain delay line; the
//! output block is the inverse transform of the sum of delayed input spectra
//! multiplied by their partition spectra (overlap-save).
//!
//! # Cost
//!
//! Per block: one forward FFT, one inverse FFT of size `2 * block`, and
//! `partitions * 2 * block` complex multiply-adds.
//!
//! # Latency
//!
//! Samples are collected into blocks, so output lags input by `block`
//! samples ([`Effect::latency_samples`]).
//!
//! # Normalization
//!
//! With normalization on, the response is scaled the way browser convolver
//! nodes scale theirs: by the inverse of its RMS power, a -58 dB calibration
//! gain and `44100 / sample_rate`. Responses of very different loudness then
//! produce comparable output levels.

use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};
use std::sync::Arc;
use voxshift_core::{Effect, ImpulseResponse, db_to_linear};

const GAIN_CALIBRATION_DB: f32 = -58.0;
const GAIN_CALIBRATION_SAMPLE_RATE: f32 = 44100.0;
const MIN_POWER: f32 = 0.000125;

/// Partitioned convolver.
///
/// Multi-channel responses are averaged into one mono response, so the
/// output equals the mono downmix of convolving with each channel.
///
/// # Example
///
/// ```rust
/// use voxshift_core::{Effect, ImpulseResponse};
/// use voxshift_effects::Convolver;
///
/// // Unit impulse: output is the input delayed by one block.
/// let ir = ImpulseResponse::from_channels(vec![vec![1.0]], 48000.0);
/// let mut conv = Convolver::new(&ir, 4, false);
/// let input = [1.0, 2.0, 3.0, 4.0, 0.0, 0.0, 0.0, 0.0];
/// let mut out = [0.0; 8];
/// conv.process_block(&input, &mut out);
/// assert!((out[4] - 1.0).abs() < 1e-5 && (out[7] - 4.0).abs() < 1e-5);
/// ```
pub struct Convolver {
    block: usize,
    forward: Arc<dyn Fft<f32>>,
    inverse: Arc<dyn Fft<f32>>,
    /// Spectrum of each response partition
    partitions: Vec<Vec<Complex<f32>>>,
    /// Frequency-domain delay line, one spectrum per partition
    history: Vec<Vec<Complex<f32>>>,
    /// Index of the newest spectrum in `history`
    head: usize,
    /// Previous block followed by the block being filled
    window: Vec<f32>,
    fill: usize,
    /// Output block being played back
    output: Vec<f32>,
    spectrum: Vec<Complex<f32>>,
    accum: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
}

impl Convolver {
    /// Build a convolver for `ir` with `block`-sample partitions.
    ///
    /// # Panics
    ///
    /// Panics if `block` is 0.
    pub fn new(ir: &ImpulseResponse, block: usize, normalize: bool) -> Self {
        assert!(block > 0, "Partition size must be > 0");
        let fft_len = block * 2;
        let mut planner = FftPlanner::<f32>::new();
        let forward = planner.plan_fft_forward(fft_len);
        let inverse = planner.plan_fft_inverse(fft_len);
        let scratch_len = forward
            .get_inplace_scratch_len()
            .max(inverse.get_inplace_scratch_len());
        let mut scratch = vec![Complex::default(); scratch_len];

        let mut response = ir.downmix();
        if normalize {
            let scale = Self::normalization_scale(ir);
            for s in &mut response {
                *s *= scale;
            }
        }

        let partition_count = response.len().div_ceil(block).max(1);
        let partitions = (0..partition_count)
            .map(|p| {
                let mut spectrum = vec![Complex::default(); fft_len];
                let start = p * block;
                let end = (start + block).min(response.len());
                if start < end {
                    for (bin, &s) in spectrum.iter_mut().zip(&response[start..end]) {
                        bin.re = s;
                    }
                }
                forward.process_with_scratch(&mut spectrum, &mut scratch);
                spectrum
            })
            .collect();

        Self {
            block,
            forward,
            inverse,
            partitions,
            history: vec![vec![Complex::default(); fft_len]; partition_count],
            head: 0,
            window: vec![0.0; fft_len],
            fill: 0,
            output: vec![0.0; block],
            spectrum: vec![Complex::default(); fft_len],
            accum: vec![Complex::default(); fft_len],
            scratch,
        }
    }

    /// Gain applied to `ir` when normalization is on.
    pub fn normalization_scale(ir: &ImpulseResponse) -> f32 {
        let count = (ir.channel_count() * ir.len()).max(1) as f32;
        let energy: f32 = ir.channels().flat_map(|c| c.iter()).map(|s| s * s).sum();
        let mut power = (energy / count).sqrt();
        if !power.is_finite() || power < MIN_POWER {
            power = MIN_POWER;
        }
        let mut scale = db_to_linear(GAIN_CALIBRATION_DB) / power;
        if ir.sample_rate() > 0.0 {
            scale *= GAIN_CALIBRATION_SAMPLE_RATE / ir.sample_rate();
        }
        scale
    }

    /// Partition length in samples.
    pub fn block_size(&self) -> usize {
        self.block
    }

    /// Number of response partitions.
    pub fn partition_count(&self) -> usize {
        self.partitions.len()
    }

    fn convolve_block(&mut self) {
        let fft_len = self.block * 2;
        let partition_count = self.partitions.len();

        for (bin, &s) in self.spectrum.iter_mut().zip(&self.window) {
            *bin = Complex::new(s, 0.0);
        }
        self.forward
            .process_with_scratch(&mut self.spectrum, &mut self.scratch);

        self.head = (self.head + partition_count - 1) % partition_count;
        self.history[self.head].copy_from_slice(&self.spectrum);

        self.accum.fill(Complex::default());
        for (p, partition) in self.partitions.iter().enumerate() {
            let delayed = &self.history[(self.head + p) % partition_count];
            for ((acc, &x), &h) in self.accum.iter_mut().zip(delayed).zip(partition) {
                *acc += x * h;
            }
        }
        self.inverse
            .process_with_scratch(&mut self.accum, &mut self.scratch);

        let norm = 1.0 / fft_len as f32;
        for (out, bin) in self.output.iter_mut().zip(&self.accum[self.block..]) {
            *out = bin.re * norm;
        }

        // Slide: the block just filled becomes the previous block.
        self.window.copy_within(self.block.., 0);
    }
}

impl Effect for Convolver {
    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        let out = self.output[self.fill];
        self.window[self.block + self.fill] = input;
        self.fill += 1;
        if self.fill == self.block {
            self.fill = 0;
            self.convolve_block();
        }
        out
    }

    fn set_sample_rate(&mut self, _sample_rate: f32) {}

    fn reset(&mut self) {
        for spectrum in &mut self.history {
            spectrum.fill(Complex::default());
        }
        self.window.fill(0.0);
        self.output.fill(0.0);
        self.fill = 0;
    }

    fn latency_samples(&self) -> usize {
        self.block
    }
}

impl std::fmt::Debug for Convolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Convolver")
            .field("block", &self.block)
            .field("partitions", &self.partitions.len())
            .finish_non_exhaustive()
    }
}
