//! Range checks for preset values.
//!
//! Out-of-range values are reported, never corrected: settings are applied
//! to the graph exactly as given, so a warning is all a caller gets.
//!
//! # Example
//!
//! ```rust
//! use voxshift_config::validate_settings;
//! use voxshift_engine::EffectSettings;
//!
//! let settings = EffectSettings { dry_wet: 1.4, ..EffectSettings::default() };
//! let warnings = validate_settings(&settings);
//! assert_eq!(warnings.len(), 1);
//! assert_eq!(warnings[0].field, "dryWet");
//! ```

use crate::Preset;
use thiserror::Error;
use voxshift_engine::EffectSettings;

/// A value outside the range a control is designed for.
#[derive(Debug, Error, Clone, PartialEq)]
#[error("'{field}' = {value} is outside [{min}, {max}]")]
pub struct ValidationWarning {
    /// Serialized field name.
    pub field: &'static str,
    /// The value found.
    pub value: f32,
    /// Lower end of the designed range.
    pub min: f32,
    /// Upper end of the designed range.
    pub max: f32,
}

/// Designed range of each numeric setting, by serialized name.
pub const SETTING_RANGES: &[(&str, f32, f32)] = &[
    ("pitch", -12.0, 12.0),
    ("robotFreq", 0.0, 100.0),
    ("distortion", 0.0, 1.0),
    ("filterFreq", 20.0, 20000.0),
    ("gain", 0.0, 2.0),
    ("dryWet", 0.0, 1.0),
    ("clarity", 0.0, 1.0),
    ("resonance", 0.1, 20.0),
];

/// Designed range of the gate threshold, dBFS.
pub const GATE_THRESHOLD_RANGE: (f32, f32) = (-100.0, 0.0);

fn values(settings: &EffectSettings) -> [f32; 8] {
    [
        settings.pitch,
        settings.robot_freq,
        settings.distortion,
        settings.filter_freq,
        settings.gain,
        settings.dry_wet,
        settings.clarity,
        settings.resonance,
    ]
}

fn check(field: &'static str, value: f32, min: f32, max: f32) -> Option<ValidationWarning> {
    // NaN fails the range test too.
    (!(min..=max).contains(&value)).then_some(ValidationWarning {
        field,
        value,
        min,
        max,
    })
}

/// Warnings for every setting outside its designed range.
pub fn validate_settings(settings: &EffectSettings) -> Vec<ValidationWarning> {
    SETTING_RANGES
        .iter()
        .zip(values(settings))
        .filter_map(|(&(field, min, max), value)| check(field, value, min, max))
        .collect()
}

/// Warnings for a whole preset, settings first.
pub fn validate_preset(preset: &Preset) -> Vec<ValidationWarning> {
    let mut warnings = validate_settings(&preset.settings);
    let (min, max) = GATE_THRESHOLD_RANGE;
    warnings.extend(check("gate_threshold_db", preset.gate_threshold_db, min, max));
    warnings
}
