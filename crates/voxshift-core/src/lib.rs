//! Voxshift Core - DSP primitives for the voice-changer signal graph
//!
//! This crate holds the building blocks every processing node is made of.
//! Nothing here allocates in the per-sample path.
//!
//! # Core Abstractions
//!
//! ## Effect System
//!
//! - [`Effect`] - Object-safe trait for mono sample processors
//!
//! ## Parameter Smoothing
//!
//! - [`SmoothedParam`] - Exponential approach to a target with a time constant,
//!   the same response as a Web Audio `setTargetAtTime` ramp
//!
//! ## Filters
//!
//! - [`Biquad`] - Second-order IIR filter
//! - [`FilterType`] + [`coefficients`] - RBJ cookbook designs (low-pass,
//!   high-pass, peaking, high shelf)
//!
//! ## Delay & Dynamics
//!
//! - [`DelayLine`] - Fractional delay line for echo
//! - [`EnvelopeFollower`] - Peak envelope for compressors
//!
//! ## Curve Generators
//!
//! - [`soft_clip_curve`] - Waveshaper transfer table
//! - [`reverb_impulse`] - Synthetic decaying-noise room response
//!
//! ## Utilities
//!
//! - [`db_to_linear`], [`linear_to_db`], [`flush_denormal`], [`lerp`]

pub mod biquad;
pub mod curves;
pub mod delay;
pub mod effect;
pub mod envelope;
pub mod math;
pub mod param;

pub use biquad::{
    Biquad, FilterType, coefficients, highpass_coefficients, highshelf_coefficients,
    lowpass_coefficients, peaking_eq_coefficients,
};
pub use curves::{
    CURVE_RESOLUTION, ImpulseResponse, REVERB_DECAY, REVERB_DURATION_SECS, reverb_impulse,
    soft_clip, soft_clip_curve,
};
pub use delay::DelayLine;
pub use effect::Effect;
pub use envelope::EnvelopeFollower;
pub use math::{db_to_linear, flush_denormal, lerp, linear_to_db};
pub use param::{DEFAULT_TIME_CONSTANT, SmoothedParam};
