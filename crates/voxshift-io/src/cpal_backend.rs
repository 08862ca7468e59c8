//! cpal-based audio backend.
//!
//! [`CpalBackend`] wraps [cpal](https://crates.io/crates/cpal) for
//! cross-platform device enumeration and stream construction (ALSA on Linux,
//! CoreAudio on macOS, WASAPI on Windows).
//!
//! ## Usage
//!
//! ```rust,ignore
//! use voxshift_io::{AudioBackend, BackendStreamConfig, CpalBackend};
//!
//! let backend = CpalBackend::new();
//! let stream = backend.build_output_stream(
//!     &BackendStreamConfig::default(),
//!     Box::new(|buffer: &mut [f32], _channels| buffer.fill(0.0)),
//!     Box::new(|err| eprintln!("Audio error: {}", err)),
//! )?;
//! // Stream plays until `stream` is dropped.
//! ```

use crate::backend::{
    AudioBackend, BackendStreamConfig, ErrorCallback, InputCallback, OutputCallback, StreamHandle,
};
use crate::stream::device_name;
use crate::{AudioDevice, Error, Result};
use cpal::Host;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

/// cpal-based audio backend.
///
/// Holds the platform's default cpal [`Host`].
pub struct CpalBackend {
    host: Host,
}

impl CpalBackend {
    /// Create a backend on the platform's default audio host.
    pub fn new() -> Self {
        let host = cpal::default_host();
        tracing::info!(host = host.id().name(), "cpal backend initialized");
        Self { host }
    }

    fn find_device(&self, name: Option<&str>, is_input: bool) -> Result<cpal::Device> {
        let kind = if is_input { "input" } else { "output" };
        let Some(search) = name else {
            let device = if is_input {
                self.host.default_input_device()
            } else {
                self.host.default_output_device()
            };
            return device.ok_or(Error::NoDevice);
        };

        let devices = if is_input {
            self.host.input_devices()
        } else {
            self.host.output_devices()
        }
        .map_err(|e| Error::Stream(e.to_string()))?;

        let named = devices.filter_map(|d| device_name(&d).ok().map(|n| (n, d)));
        exact_match(named, search)
            .ok_or_else(|| Error::DeviceNotFound(format!("no {} device named '{}'", kind, search)))
    }
}

/// The candidate whose name is exactly `search`.
///
/// Stream construction never guesses: partial names are resolved by the
/// caller (see [`crate::resolve_device_name`]) before a stream is opened.
fn exact_match<T>(candidates: impl IntoIterator<Item = (String, T)>, search: &str) -> Option<T> {
    candidates
        .into_iter()
        .find_map(|(name, item)| (name == search).then_some(item))
}

impl Default for CpalBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Classify a stream construction failure.
fn build_error(err: cpal::BuildStreamError, device: &str) -> Error {
    match err {
        cpal::BuildStreamError::DeviceNotAvailable => {
            Error::DeviceNotFound(format!("'{}' is no longer available", device))
        }
        other => {
            let message = other.to_string();
            let lower = message.to_lowercase();
            if lower.contains("permission") || lower.contains("denied") {
                Error::PermissionDenied(message)
            } else {
                Error::Stream(message)
            }
        }
    }
}

impl AudioBackend for CpalBackend {
    fn name(&self) -> &'static str {
        "cpal"
    }

    fn list_devices(&self) -> Result<Vec<AudioDevice>> {
        crate::stream::list_devices()
    }

    fn default_output_device(&self) -> Result<Option<AudioDevice>> {
        let (_, output) = crate::stream::default_device()?;
        Ok(output)
    }

    fn default_input_device(&self) -> Result<Option<AudioDevice>> {
        let (input, _) = crate::stream::default_device()?;
        Ok(input)
    }

    fn build_output_stream(
        &self,
        config: &BackendStreamConfig,
        mut callback: OutputCallback,
        mut error_callback: ErrorCallback,
    ) -> Result<StreamHandle> {
        let device = self.find_device(config.device_name.as_deref(), false)?;
        let name = device_name(&device).unwrap_or_default();
        let channels = if config.channels == 0 {
            device
                .default_output_config()
                .map(|c| c.channels())
                .unwrap_or(2)
        } else {
            config.channels
        };

        let stream_config = cpal::StreamConfig {
            channels,
            sample_rate: config.sample_rate,
            buffer_size: cpal::BufferSize::Fixed(config.buffer_size),
        };

        let stream = device
            .build_output_stream(
                &stream_config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    callback(data, channels);
                },
                move |err| {
                    error_callback(&err.to_string());
                },
                None,
            )
            .map_err(|e| build_error(e, &name))?;

        stream.play().map_err(|e| Error::Stream(e.to_string()))?;
        tracing::info!(
            device = %name,
            channels,
            sample_rate = config.sample_rate,
            "output stream started"
        );

        Ok(StreamHandle::new(stream))
    }

    fn build_input_stream(
        &self,
        config: &BackendStreamConfig,
        mut callback: InputCallback,
        mut error_callback: ErrorCallback,
    ) -> Result<StreamHandle> {
        let device = self.find_device(config.device_name.as_deref(), true)?;
        let name = device_name(&device).unwrap_or_default();
        let channels = if config.channels == 0 {
            device
                .default_input_config()
                .map(|c| c.channels())
                .unwrap_or(1)
        } else {
            config.channels
        };

        let stream_config = cpal::StreamConfig {
            channels,
            sample_rate: config.sample_rate,
            buffer_size: cpal::BufferSize::Fixed(config.buffer_size),
        };

        let width = usize::from(channels.max(1));
        let mut mono = Vec::with_capacity(config.buffer_size as usize * 2);
        let stream = device
            .build_input_stream(
                &stream_config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    if width == 1 {
                        callback(data);
                        return;
                    }
                    mono.clear();
                    mono.extend(
                        data.chunks(width)
                            .map(|frame| frame.iter().sum::<f32>() / width as f32),
                    );
                    callback(&mono);
                },
                move |err| {
                    error_callback(&err.to_string());
                },
                None,
            )
            .map_err(|e| build_error(e, &name))?;

        stream.play().map_err(|e| Error::Stream(e.to_string()))?;
        tracing::info!(
            device = %name,
            channels,
            sample_rate = config.sample_rate,
            "input stream started"
        );

        Ok(StreamHandle::new(stream))
    }
}
