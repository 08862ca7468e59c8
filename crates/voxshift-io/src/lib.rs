//! Audio I/O layer for voxshift.
//!
//! This crate provides:
//!
//! - **Backends**: the [`AudioBackend`] trait and its cpal implementation,
//!   [`CpalBackend`], which the live host builds its streams through
//! - **Devices**: [`list_devices`] and the [`select_devices`] routing heuristic
//! - **Capture constraints**: [`CaptureConstraints`], the processing a
//!   microphone stream is requested with
//! - **WAV file I/O**: [`read_wav`] and [`write_wav`] for offline rendering
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use voxshift_io::{list_devices, select_devices};
//!
//! let devices = list_devices()?;
//! let route = select_devices(&devices);
//! println!("mic: {:?}, out: {:?}", route.input, route.output);
//! ```

pub mod backend;
mod constraints;
pub mod cpal_backend;
mod stream;
mod wav;

pub use backend::{
    AudioBackend, BackendStreamConfig, ErrorCallback, InputCallback, OutputCallback, StreamHandle,
};
pub use constraints::CaptureConstraints;
pub use cpal_backend::CpalBackend;
pub use stream::{
    AudioDevice, DeviceSelection, default_device, list_devices, match_device, resolve_device_name,
    select_devices,
};
pub use wav::{WavSpec, read_wav, write_wav};

/// Error types for audio I/O operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// WAV file read/write error.
    #[error("WAV file error: {0}")]
    Wav(#[from] hound::Error),

    /// Audio stream setup or runtime error.
    #[error("Audio stream error: {0}")]
    Stream(String),

    /// No audio device available on the system.
    #[error("No audio device available")]
    NoDevice,

    /// The platform refused access to the device.
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// The requested audio device was not found.
    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    /// I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for audio I/O operations.
pub type Result<T> = std::result::Result<T, Error>;
