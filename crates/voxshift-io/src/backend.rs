//! Pluggable audio backend abstraction.
//!
//! The live host never talks to a platform audio API directly. It asks an
//! [`AudioBackend`] for one output stream (the render graph's sink) and one
//! input stream per acquired microphone, and keeps each alive through a
//! [`StreamHandle`]. [`CpalBackend`](crate::CpalBackend) is the default
//! implementation; tests and embedders can substitute their own.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────┐
//! │      voxshift-engine NativeHost  │
//! └──────────────┬───────────────────┘
//!                │ AudioBackend
//!                ▼
//! ┌──────────────────────────────────┐
//! │  list_devices / build_*_stream   │
//! └──────────────┬───────────────────┘
//!                ▼
//!          CpalBackend (ALSA, CoreAudio, WASAPI)
//! ```
//!
//! The trait uses boxed closures for callbacks, so it stays object-safe and a
//! backend can be picked at runtime.

use crate::{AudioDevice, Result};

/// Configuration for building an audio stream.
#[derive(Debug, Clone)]
pub struct BackendStreamConfig {
    /// Requested sample rate in Hz.
    pub sample_rate: u32,
    /// Preferred buffer size in frames.
    pub buffer_size: u32,
    /// Number of channels. `0` lets the backend use the device default.
    pub channels: u16,
    /// Optional device name (uses system default if `None`).
    pub device_name: Option<String>,
}

impl Default for BackendStreamConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            buffer_size: 256,
            channels: 2,
            device_name: None,
        }
    }
}

/// Type-erased audio stream handle.
///
/// The stream is active while this handle exists; dropping it stops playback
/// or capture.
pub struct StreamHandle {
    _inner: Box<dyn Send>,
}

impl StreamHandle {
    /// Wrap a backend-specific stream object, keeping it alive until the
    /// handle is dropped.
    pub fn new<T: Send + 'static>(stream: T) -> Self {
        Self {
            _inner: Box::new(stream),
        }
    }
}

impl std::fmt::Debug for StreamHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamHandle").finish_non_exhaustive()
    }
}

/// Audio output callback.
///
/// Runs on the real-time audio thread and must fill the interleaved buffer
/// (`[L0, R0, L1, R1, ...]`, length `frames * channels`). Implementations must
/// not block, lock contended mutexes, or perform I/O.
pub type OutputCallback = Box<dyn FnMut(&mut [f32], u16) + Send>;

/// Audio input callback.
///
/// Receives captured audio already mixed down to mono.
pub type InputCallback = Box<dyn FnMut(&[f32]) + Send>;

/// Error callback, called with a human-readable message when the backend
/// reports a streaming error.
pub type ErrorCallback = Box<dyn FnMut(&str) + Send>;

/// Pluggable audio backend.
pub trait AudioBackend: Send {
    /// Human-readable name of this backend (e.g., "cpal").
    fn name(&self) -> &str;

    /// List all available audio devices.
    fn list_devices(&self) -> Result<Vec<AudioDevice>>;

    /// Get the default output device, if any.
    fn default_output_device(&self) -> Result<Option<AudioDevice>>;

    /// Get the default input device, if any.
    fn default_input_device(&self) -> Result<Option<AudioDevice>>;

    /// Build and start an output stream.
    ///
    /// `callback` receives the interleaved buffer and its channel count.
    fn build_output_stream(
        &self,
        config: &BackendStreamConfig,
        callback: OutputCallback,
        error_callback: ErrorCallback,
    ) -> Result<StreamHandle>;

    /// Build and start an input stream delivering mono samples.
    ///
    /// Fails with [`Error::DeviceNotFound`](crate::Error::DeviceNotFound) when
    /// `config.device_name` matches nothing, and with
    /// [`Error::PermissionDenied`](crate::Error::PermissionDenied) when the
    /// platform refuses access.
    fn build_input_stream(
        &self,
        config: &BackendStreamConfig,
        callback: InputCallback,
        error_callback: ErrorCallback,
    ) -> Result<StreamHandle>;

    /// The sample rate the backend will actually run `config` at.
    ///
    /// Defaults to the requested rate.
    fn actual_sample_rate(&self, config: &BackendStreamConfig) -> u32 {
        config.sample_rate
    }
}
