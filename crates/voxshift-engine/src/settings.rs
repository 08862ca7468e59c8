//! The user-facing effect settings.

use serde::{Deserialize, Serialize};

/// One complete set of voice-changer controls.
///
/// Values are applied as given. The documented ranges describe what the
/// controls are designed for, not limits that are enforced anywhere.
///
/// Field names serialize in camelCase (`robotFreq`, `dryWet`, ...), the shape
/// shared by preset files and generator responses. Missing fields take the
/// [`Default`] values, which are the "Natural" preset.
///
/// # Example
///
/// ```rust
/// use voxshift_engine::EffectSettings;
///
/// let s = EffectSettings::from_json(r#"{"pitch": -6, "robotFreq": 30}"#).unwrap();
/// assert_eq!(s.pitch, -6.0);
/// assert_eq!(s.robot_freq, 30.0);
/// assert_eq!(s.filter_freq, 12000.0); // default
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EffectSettings {
    /// Semitones, -12..12. Only selects the tone filter type.
    pub pitch: f32,
    /// Ring-modulator rate in Hz, 0..100.
    pub robot_freq: f32,
    /// Shaper intensity, 0..1.
    pub distortion: f32,
    /// Tone filter cutoff in Hz, 500..15000.
    pub filter_freq: f32,
    /// Master gain multiplier, nominally 0..2.
    pub gain: f32,
    /// Wet share of the mix, 0..1.
    pub dry_wet: f32,
    /// Route only the dry path to the output.
    pub bypass: bool,
    /// Presence-shelf boost, 0..1 (0 to +12 dB).
    pub clarity: f32,
    /// Tone filter Q, 0.1..20.
    pub resonance: f32,
}

impl Default for EffectSettings {
    fn default() -> Self {
        Self {
            pitch: 0.0,
            robot_freq: 0.0,
            distortion: 0.0,
            filter_freq: 12000.0,
            gain: 1.0,
            dry_wet: 1.0,
            bypass: false,
            clarity: 0.5,
            resonance: 1.0,
        }
    }
}

impl EffectSettings {
    /// Parse a JSON settings object. Unknown keys are ignored.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize to a JSON object with camelCase keys.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// A copy with `bypass` set.
    pub fn with_bypass(mut self, bypass: bool) -> Self {
        self.bypass = bypass;
        self
    }
}
