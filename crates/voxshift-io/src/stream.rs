//! Device enumeration and routing.

use crate::{Error, Result};
use cpal::Device;
use cpal::traits::{DeviceTrait, HostTrait};

/// Extract device name via `description()` (cpal 0.17+).
pub(crate) fn device_name(device: &Device) -> std::result::Result<String, cpal::DeviceNameError> {
    device.description().map(|d| d.name().to_string())
}

/// Audio device information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioDevice {
    /// Human-readable device name.
    pub name: String,
    /// Whether the device supports audio input.
    pub is_input: bool,
    /// Whether the device supports audio output.
    pub is_output: bool,
    /// Default sample rate in Hz.
    pub default_sample_rate: u32,
}

/// List all available audio devices.
///
/// Duplex devices appear once, with both flags set.
pub fn list_devices() -> Result<Vec<AudioDevice>> {
    let host = cpal::default_host();
    let mut devices = Vec::new();

    if let Ok(inputs) = host.input_devices() {
        for device in inputs {
            if let Ok(name) = device_name(&device) {
                let sample_rate = device
                    .default_input_config()
                    .map(|c| c.sample_rate())
                    .unwrap_or(44100);
                devices.push(AudioDevice {
                    name,
                    is_input: true,
                    is_output: device.default_output_config().is_ok(),
                    default_sample_rate: sample_rate,
                });
            }
        }
    }

    if let Ok(outputs) = host.output_devices() {
        for device in outputs {
            if let Ok(name) = device_name(&device) {
                if devices.iter().any(|d| d.name == name) {
                    continue;
                }
                let sample_rate = device
                    .default_output_config()
                    .map(|c| c.sample_rate())
                    .unwrap_or(44100);
                devices.push(AudioDevice {
                    name,
                    is_input: false,
                    is_output: true,
                    default_sample_rate: sample_rate,
                });
            }
        }
    }

    tracing::debug!(count = devices.len(), "enumerated audio devices");
    Ok(devices)
}

/// The system default `(input, output)` devices.
pub fn default_device() -> Result<(Option<AudioDevice>, Option<AudioDevice>)> {
    let host = cpal::default_host();

    let input = host.default_input_device().and_then(|d| {
        device_name(&d).ok().map(|name| AudioDevice {
            name,
            is_input: true,
            is_output: false,
            default_sample_rate: d
                .default_input_config()
                .map(|c| c.sample_rate())
                .unwrap_or(44100),
        })
    });

    let output = host.default_output_device().and_then(|d| {
        device_name(&d).ok().map(|name| AudioDevice {
            name,
            is_input: false,
            is_output: true,
            default_sample_rate: d
                .default_output_config()
                .map(|c| c.sample_rate())
                .unwrap_or(44100),
        })
    });

    Ok((input, output))
}

/// Pick a device for a user-typed name.
///
/// An exact name wins; otherwise the first device of the right direction
/// whose name contains `search`, ignoring case.
pub fn match_device<'a>(
    devices: &'a [AudioDevice],
    search: &str,
    is_input: bool,
) -> Option<&'a AudioDevice> {
    let search_lower = search.to_lowercase();
    let candidates = || {
        devices
            .iter()
            .filter(move |d| if is_input { d.is_input } else { d.is_output })
    };
    candidates()
        .find(|d| d.name == search)
        .or_else(|| candidates().find(|d| d.name.to_lowercase().contains(&search_lower)))
}

/// Resolve a user-typed device name to the exact name of a present device.
///
/// ```rust,ignore
/// use voxshift_io::resolve_device_name;
///
/// let mic = resolve_device_name("usb", true)?;
/// ```
pub fn resolve_device_name(search: &str, is_input: bool) -> Result<String> {
    let devices = list_devices()?;
    match_device(&devices, search, is_input)
        .map(|d| d.name.clone())
        .ok_or_else(|| {
            Error::DeviceNotFound(format!(
                "no {} device matching '{}'",
                if is_input { "input" } else { "output" },
                search
            ))
        })
}

/// Devices picked for a voice-changing session.
///
/// `None` means "use the system default".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceSelection {
    /// Microphone to capture from.
    pub input: Option<String>,
    /// Device to play the processed voice into.
    pub output: Option<String>,
}

/// Pick a microphone and an output for routing the changed voice.
///
/// The first input whose name mentions "mic" or "input" wins. For output, a
/// virtual cable ("cable input", "vb-audio") is preferred so other
/// applications can pick the voice up as their microphone. Anything not
/// matched falls back to the default device.
///
/// # Example
///
/// ```rust
/// use voxshift_io::{AudioDevice, select_devices};
///
/// let dev = |name: &str, input: bool| AudioDevice {
///     name: name.into(),
///     is_input: input,
///     is_output: !input,
///     default_sample_rate: 48000,
/// };
/// let devices = [
///     dev("Line 1", true),
///     dev("USB Microphone", true),
///     dev("Speakers", false),
///     dev("CABLE Input (VB-Audio Virtual Cable)", false),
/// ];
/// let route = select_devices(&devices);
/// assert_eq!(route.input.as_deref(), Some("USB Microphone"));
/// assert_eq!(route.output.as_deref(), Some("CABLE Input (VB-Audio Virtual Cable)"));
/// ```
pub fn select_devices(devices: &[AudioDevice]) -> DeviceSelection {
    let input = devices
        .iter()
        .filter(|d| d.is_input)
        .find(|d| {
            let name = d.name.to_lowercase();
            name.contains("mic") || name.contains("input")
        })
        .map(|d| d.name.clone());

    let output = devices
        .iter()
        .filter(|d| d.is_output)
        .find(|d| {
            let name = d.name.to_lowercase();
            name.contains("cable input") || name.contains("vb-audio")
        })
        .map(|d| d.name.clone());

    tracing::info!(
        input = input.as_deref().unwrap_or("<default>"),
        output = output.as_deref().unwrap_or("<default>"),
        "selected devices"
    );
    DeviceSelection { input, output }
}
