//! Voxshift Effects - processing nodes for the voice graph
//!
//! Each type here is the DSP body of one node kind:
//!
//! - [`GainStage`] - Smoothed gain with an audio-rate modulation input
//! - [`FilterNode`] - Biquad with smoothed cutoff, Q and gain
//! - [`Compressor`] - Feed-forward dynamics compressor, also used as the limiter
//! - [`WaveShaper`] - Table-driven nonlinearity
//! - [`Convolver`] - Uniformly partitioned FFT convolution
//! - [`DelayNode`] - Block delay usable inside feedback cycles
//! - [`SineOscillator`] - Free-running carrier for ring modulation
//! - [`AutoGainControl`] - Slow input leveller for the capture stage
//!
//! ## Example
//!
//! ```rust
//! use voxshift_core::{Effect, FilterType};
//! use voxshift_effects::{Compressor, FilterNode};
//!
//! let mut de_esser = FilterNode::new(48000.0, FilterType::Peaking, 6000.0, 4.0, -12.0);
//! let mut comp = Compressor::voice(48000.0);
//!
//! let out = comp.process(de_esser.process(0.25));
//! assert!(out.is_finite());
//! ```

pub mod agc;
pub mod compressor;
pub mod convolver;
pub mod delay;
pub mod filter;
pub mod gain;
pub mod oscillator;
pub mod shaper;

pub use agc::AutoGainControl;
pub use compressor::{Compressor, CompressorSettings};
pub use convolver::Convolver;
pub use delay::DelayNode;
pub use filter::FilterNode;
pub use gain::GainStage;
pub use oscillator::SineOscillator;
pub use shaper::WaveShaper;
