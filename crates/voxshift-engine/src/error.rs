//! Engine error types.

use thiserror::Error;

/// Why a capture stream could not be opened.
///
/// Returned by [`VoiceSession::initialize`](crate::VoiceSession::initialize).
/// When it is returned, nothing of the new session is left running.
#[derive(Debug, Error)]
pub enum DeviceAcquisitionError {
    /// The system has no input device.
    #[error("no audio input device available")]
    NoDevice,

    /// The requested input device does not exist.
    #[error("input device not found: {0}")]
    DeviceNotFound(String),

    /// The platform refused microphone access.
    #[error("microphone access denied: {0}")]
    PermissionDenied(String),

    /// The device exists but a stream could not be started on it.
    #[error("could not start capture: {0}")]
    Stream(String),
}

impl From<voxshift_io::Error> for DeviceAcquisitionError {
    fn from(err: voxshift_io::Error) -> Self {
        match err {
            voxshift_io::Error::NoDevice => Self::NoDevice,
            voxshift_io::Error::DeviceNotFound(name) => Self::DeviceNotFound(name),
            voxshift_io::Error::PermissionDenied(msg) => Self::PermissionDenied(msg),
            other => Self::Stream(other.to_string()),
        }
    }
}

/// Failure of a [`SettingsGenerator`](crate::SettingsGenerator).
#[derive(Debug, Error)]
pub enum GeneratorError {
    /// The generator could not produce a response.
    #[error("generator request failed: {0}")]
    Request(String),

    /// The response was not a valid settings object.
    #[error("malformed generator response: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Errors from opening or running a native render host.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The output stream could not be opened.
    #[error("output stream: {0}")]
    Output(#[from] voxshift_io::Error),
}
