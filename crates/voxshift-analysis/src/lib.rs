//! Voxshift Analysis - read-only views of the signal
//!
//! - [`level`] - RMS and dB level of a sample block (what the noise gate keys on)
//! - [`fft`] - FFT wrapper and analysis windows
//! - [`tap`] - [`AnalysisTap`] / [`AnalysisHandle`], the pass-through tap the
//!   graph exposes to visualizers and the gate monitor

pub mod fft;
pub mod level;
pub mod tap;

pub use fft::{Fft, Window};
pub use level::{block_level_db, rms};
pub use tap::{AnalysisHandle, AnalysisTap, DEFAULT_FFT_SIZE};
