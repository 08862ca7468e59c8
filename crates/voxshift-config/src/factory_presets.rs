//! Factory voices bundled with voxshift.
//!
//! These are always available without files on disk. Each one is keyed by a
//! short lowercase id (`"girl"`, `"demon"`) and also answers to its display
//! name (`"Young Girl"`, `"Underworld"`).

use crate::Preset;

/// Ids of the factory presets, in catalog order.
pub static FACTORY_PRESET_NAMES: &[&str] = &[
    "natural", "girl", "woman", "man", "uncle", "demon", "robot", "radio",
];

/// TOML content for factory presets, embedded at compile time.
static FACTORY_PRESETS_TOML: &[(&str, &str)] = &[
    ("natural", NATURAL_PRESET),
    ("girl", GIRL_PRESET),
    ("woman", WOMAN_PRESET),
    ("man", MAN_PRESET),
    ("uncle", UNCLE_PRESET),
    ("demon", DEMON_PRESET),
    ("robot", ROBOT_PRESET),
    ("radio", RADIO_PRESET),
];

const NATURAL_PRESET: &str = r#"
name = "Natural"
description = "Your own voice, cleaned up"

[settings]
pitch = 0.0
robotFreq = 0.0
distortion = 0.0
filterFreq = 12000.0
gain = 1.0
dryWet = 1.0
bypass = false
clarity = 0.5
resonance = 1.0
"#;

const GIRL_PRESET: &str = r#"
name = "Young Girl"
description = "Bright and light"

[settings]
pitch = 7.0
robotFreq = 0.0
distortion = 0.0
filterFreq = 8000.0
gain = 1.0
dryWet = 1.0
bypass = false
clarity = 0.8
resonance = 2.0
"#;

const WOMAN_PRESET: &str = r#"
name = "Woman"
description = "Lifted, with a softer top end"

[settings]
pitch = 3.0
robotFreq = 0.0
distortion = 0.0
filterFreq = 6000.0
gain = 1.0
dryWet = 1.0
bypass = false
clarity = 0.6
resonance = 1.5
"#;

const MAN_PRESET: &str = r#"
name = "Man"
description = "Darker and fuller"

[settings]
pitch = -3.0
robotFreq = 0.0
distortion = 0.0
filterFreq = 4000.0
gain = 1.1
dryWet = 1.0
bypass = false
clarity = 0.4
resonance = 1.2
"#;

const UNCLE_PRESET: &str = r#"
name = "Old Uncle"
description = "Low, rough and a little wobbly"

[settings]
pitch = -6.0
robotFreq = 5.0
distortion = 0.1
filterFreq = 3000.0
gain = 1.2
dryWet = 0.9
bypass = false
clarity = 0.3
resonance = 3.0
"#;

const DEMON_PRESET: &str = r#"
name = "Underworld"
description = "Growling, distorted and resonant"

[settings]
pitch = -10.0
robotFreq = 20.0
distortion = 0.6
filterFreq = 2000.0
gain = 1.3
dryWet = 0.8
bypass = false
clarity = 0.2
resonance = 5.0
"#;

const ROBOT_PRESET: &str = r#"
name = "Cybernetic"
description = "Ring-modulated machine voice"

[settings]
pitch = -2.0
robotFreq = 60.0
distortion = 0.3
filterFreq = 5000.0
gain = 1.1
dryWet = 0.7
bypass = false
clarity = 0.7
resonance = 4.0
"#;

const RADIO_PRESET: &str = r#"
name = "Vintage Radio"
description = "Narrow band, overdriven speaker"

[settings]
pitch = 0.0
robotFreq = 0.0
distortion = 0.5
filterFreq = 2500.0
gain = 1.0
dryWet = 1.0
bypass = false
clarity = 0.9
resonance = 8.0
"#;

/// All factory presets, in catalog order.
pub fn factory_presets() -> Vec<Preset> {
    FACTORY_PRESETS_TOML
        .iter()
        .filter_map(|(_, toml)| Preset::from_toml(toml).ok())
        .collect()
}

/// Look up a factory preset by id or display name, ignoring case.
///
/// ```rust
/// use voxshift_config::get_factory_preset;
///
/// let demon = get_factory_preset("demon").unwrap();
/// assert_eq!(demon.name, "Underworld");
/// assert_eq!(get_factory_preset("UNDERWORLD"), Some(demon));
/// assert!(get_factory_preset("chipmunk").is_none());
/// ```
pub fn get_factory_preset(name: &str) -> Option<Preset> {
    let name_lower = name.to_lowercase();

    if let Some((_, toml)) = FACTORY_PRESETS_TOML
        .iter()
        .find(|(id, _)| *id == name_lower)
    {
        return Preset::from_toml(toml).ok();
    }

    factory_presets()
        .into_iter()
        .find(|preset| preset.name.to_lowercase() == name_lower)
}

/// Ids of the factory presets.
pub fn factory_preset_names() -> Vec<&'static str> {
    FACTORY_PRESETS_TOML.iter().map(|(name, _)| *name).collect()
}

/// Whether `name` is a factory id or display name.
pub fn is_factory_preset(name: &str) -> bool {
    get_factory_preset(name).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_factory_preset_parses() {
        for (id, toml) in FACTORY_PRESETS_TOML {
            let preset = Preset::from_toml(toml);
            assert!(preset.is_ok(), "factory preset '{id}' failed: {:?}", preset.err());
        }
        assert_eq!(factory_presets().len(), FACTORY_PRESET_NAMES.len());
    }

    #[test]
    fn names_match_table() {
        assert_eq!(factory_preset_names(), FACTORY_PRESET_NAMES);
    }

    #[test]
    fn factory_presets_are_in_range() {
        for preset in factory_presets() {
            let warnings = preset.validate();
            assert!(warnings.is_empty(), "{}: {warnings:?}", preset.name);
        }
    }

    #[test]
    fn natural_is_the_default_voice() {
        let natural = get_factory_preset("natural").unwrap();
        assert_eq!(natural.settings, voxshift_engine::EffectSettings::default());
    }

    #[test]
    fn robot_values() {
        let robot = get_factory_preset("robot").unwrap();
        assert_eq!(robot.settings.robot_freq, 60.0);
        assert_eq!(robot.settings.dry_wet, 0.7);
        assert_eq!(robot.settings.resonance, 4.0);
        assert!(!robot.settings.bypass);
    }

    #[test]
    fn lookup_ignores_case() {
        assert!(is_factory_preset("Vintage Radio"));
        assert!(is_factory_preset("RADIO"));
        assert!(!is_factory_preset("radio2"));
    }
}
