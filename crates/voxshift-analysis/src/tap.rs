//! Pass-through analysis tap.
//!
//! An [`AnalysisTap`] sits on the audio thread and records the most recent
//! `fft_size` samples that flow through it without touching the signal.
//! [`AnalysisHandle`]s are cheap clones handed to control code (the gate
//! monitor, visualizers) which read time-domain snapshots and smoothed
//! spectra.
//!
//! The audio thread only ever `try_lock`s the ring: if a reader happens to
//! hold it, that block is skipped rather than blocking the callback.
//!
//! # Spectrum
//!
//! | Method | Scale |
//! |--------|-------|
//! | [`AnalysisHandle::frequency_db`] | dBFS per bin, Blackman window, smoothed over time |
//! | [`AnalysisHandle::byte_frequency`] | `[MIN_DB, MAX_DB]` mapped to `0..=255` |

use crate::fft::{Fft, Window};
use crate::level::block_level_db;
use parking_lot::Mutex;
use std::sync::Arc;
use voxshift_core::linear_to_db;

/// Analysis window length used by the graph's taps.
pub const DEFAULT_FFT_SIZE: usize = 1024;
/// Weight of the previous spectrum when smoothing.
pub const SMOOTHING: f32 = 0.8;
/// Level mapped to byte 0.
pub const MIN_DB: f32 = -100.0;
/// Level mapped to byte 255.
pub const MAX_DB: f32 = -30.0;

#[derive(Debug)]
struct Ring {
    samples: Vec<f32>,
    write_pos: usize,
}

#[derive(Debug)]
struct Spectrum {
    fft: Fft,
    window: Vec<f32>,
    frame: Vec<f32>,
    magnitudes: Vec<f32>,
    smoothed: Vec<f32>,
}

#[derive(Debug)]
struct Shared {
    fft_size: usize,
    sample_rate: f32,
    ring: Mutex<Ring>,
    spectrum: Mutex<Spectrum>,
}

/// Audio-thread side of the tap.
#[derive(Debug)]
pub struct AnalysisTap {
    shared: Arc<Shared>,
}

/// Control-side reader for an [`AnalysisTap`].
///
/// # Example
///
/// ```rust
/// use voxshift_analysis::AnalysisTap;
///
/// let tap = AnalysisTap::new(1024, 48000.0);
/// let handle = tap.handle();
///
/// let block = [0.25f32; 128];
/// let mut out = [0.0; 128];
/// tap.process(&block, &mut out);
/// assert_eq!(out, block); // pass-through
///
/// let mut snapshot = vec![0.0; 1024];
/// handle.time_domain(&mut snapshot);
/// assert_eq!(snapshot[1023], 0.25);
/// ```
#[derive(Debug, Clone)]
pub struct AnalysisHandle {
    shared: Arc<Shared>,
}

impl AnalysisTap {
    /// Create a tap keeping `fft_size` samples.
    ///
    /// # Panics
    ///
    /// Panics if `fft_size` is 0.
    pub fn new(fft_size: usize, sample_rate: f32) -> Self {
        assert!(fft_size > 0, "FFT size must be > 0");
        let bins = fft_size / 2;
        Self {
            shared: Arc::new(Shared {
                fft_size,
                sample_rate,
                ring: Mutex::new(Ring {
                    samples: vec![0.0; fft_size],
                    write_pos: 0,
                }),
                spectrum: Mutex::new(Spectrum {
                    fft: Fft::new(fft_size),
                    window: Window::Blackman.coefficients(fft_size),
                    frame: vec![0.0; fft_size],
                    magnitudes: vec![0.0; bins],
                    smoothed: vec![0.0; bins],
                }),
            }),
        }
    }

    /// A reader for this tap.
    pub fn handle(&self) -> AnalysisHandle {
        AnalysisHandle {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Record `input` and copy it to `output` unchanged.
    pub fn process(&self, input: &[f32], output: &mut [f32]) {
        output.copy_from_slice(input);
        self.record(input);
    }

    /// Record `input` without producing output.
    pub fn record(&self, input: &[f32]) {
        let Some(mut ring) = self.shared.ring.try_lock() else {
            return;
        };
        let len = ring.samples.len();
        for &s in input {
            let pos = ring.write_pos;
            ring.samples[pos] = s;
            ring.write_pos = (pos + 1) % len;
        }
    }
}

impl AnalysisHandle {
    /// Window length in samples.
    pub fn fft_size(&self) -> usize {
        self.shared.fft_size
    }

    /// Number of spectrum bins, `fft_size / 2`.
    pub fn frequency_bin_count(&self) -> usize {
        self.shared.fft_size / 2
    }

    /// Sample rate of the tapped signal.
    pub fn sample_rate(&self) -> f32 {
        self.shared.sample_rate
    }

    /// Copy the most recent samples, oldest first, into `out`.
    ///
    /// Fills `min(out.len(), fft_size)` values, ending with the newest
    /// sample, and returns that count.
    pub fn time_domain(&self, out: &mut [f32]) -> usize {
        let ring = self.shared.ring.lock();
        let len = ring.samples.len();
        let count = out.len().min(len);
        let start = (ring.write_pos + len - count) % len;
        for (i, o) in out[..count].iter_mut().enumerate() {
            *o = ring.samples[(start + i) % len];
        }
        count
    }

    /// RMS level of the current window in dBFS.
    pub fn level_db(&self) -> f32 {
        let mut frame = vec![0.0; self.shared.fft_size];
        self.time_domain(&mut frame);
        block_level_db(&frame)
    }

    /// Smoothed magnitude spectrum in dB, one value per bin.
    ///
    /// Each call advances the temporal smoothing by one frame.
    pub fn frequency_db(&self, out: &mut [f32]) {
        let mut guard = self.shared.spectrum.lock();
        let spectrum = &mut *guard;
        self.time_domain(&mut spectrum.frame);
        for (s, w) in spectrum.frame.iter_mut().zip(&spectrum.window) {
            *s *= w;
        }
        spectrum
            .fft
            .magnitudes(&spectrum.frame, &mut spectrum.magnitudes);
        for (smoothed, &mag) in spectrum.smoothed.iter_mut().zip(&spectrum.magnitudes) {
            *smoothed = SMOOTHING * *smoothed + (1.0 - SMOOTHING) * mag;
        }
        for (o, &s) in out.iter_mut().zip(&spectrum.smoothed) {
            *o = linear_to_db(s);
        }
    }

    /// Smoothed spectrum scaled to bytes for display.
    pub fn byte_frequency(&self, out: &mut [u8]) {
        let mut db = vec![0.0; self.frequency_bin_count()];
        self.frequency_db(&mut db);
        for (o, &d) in out.iter_mut().zip(&db) {
            *o = db_to_byte(d);
        }
    }
}

fn db_to_byte(db: f32) -> u8 {
    let scaled = 255.0 * (db - MIN_DB) / (MAX_DB - MIN_DB);
    scaled.clamp(0.0, 255.0) as u8
}
