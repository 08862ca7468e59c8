//! FFT wrapper with windowing functions

use rustfft::{FftPlanner, num_complex::Complex};
use std::f32::consts::PI;
use std::sync::Arc;

/// Window function types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Window {
    /// Rectangular (no windowing)
    Rectangular,
    /// Hann window (raised cosine)
    Hann,
    /// Blackman window, used by the spectrum readout
    Blackman,
}

impl Window {
    /// Apply window to a buffer
    pub fn apply(&self, buffer: &mut [f32]) {
        let n = buffer.len() as f32;
        match self {
            Window::Rectangular => {}
            Window::Hann => {
                for (i, sample) in buffer.iter_mut().enumerate() {
                    *sample *= 0.5 * (1.0 - (2.0 * PI * i as f32 / n).cos());
                }
            }
            Window::Blackman => {
                for (i, sample) in buffer.iter_mut().enumerate() {
                    let x = 2.0 * PI * i as f32 / n;
                    *sample *= 0.42 - 0.5 * x.cos() + 0.08 * (2.0 * x).cos();
                }
            }
        }
    }

    /// Get window coefficients
    pub fn coefficients(&self, size: usize) -> Vec<f32> {
        let mut coeffs = vec![1.0; size];
        self.apply(&mut coeffs);
        coeffs
    }
}

/// Forward FFT of a fixed size over real input.
pub struct Fft {
    fft: Arc<dyn rustfft::Fft<f32>>,
    buffer: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
    size: usize,
}

impl Fft {
    /// Create a new FFT processor for the given size
    pub fn new(size: usize) -> Self {
        let fft = FftPlanner::new().plan_fft_forward(size);
        let scratch = vec![Complex::default(); fft.get_inplace_scratch_len()];
        Self {
            fft,
            buffer: vec![Complex::default(); size],
            scratch,
            size,
        }
    }

    /// Get FFT size
    pub fn size(&self) -> usize {
        self.size
    }

    /// Magnitudes of bins `0..size/2` for real `input`, scaled by `1/size`.
    ///
    /// `input` is zero-padded or truncated to the FFT size. `out` receives
    /// up to `size / 2` values.
    pub fn magnitudes(&mut self, input: &[f32], out: &mut [f32]) {
        for (i, bin) in self.buffer.iter_mut().enumerate() {
            *bin = Complex::new(input.get(i).copied().unwrap_or(0.0), 0.0);
        }
        self.fft
            .process_with_scratch(&mut self.buffer, &mut self.scratch);
        let scale = 1.0 / self.size as f32;
        for (o, c) in out.iter_mut().zip(&self.buffer[..self.size / 2]) {
            *o = c.norm() * scale;
        }
    }
}

impl std::fmt::Debug for Fft {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fft").field("size", &self.size).finish()
    }
}
