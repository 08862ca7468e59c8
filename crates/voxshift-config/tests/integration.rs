//! Preset files on disk.

use tempfile::TempDir;
use voxshift_config::{ConfigError, IoAction, Preset, get_factory_preset, resolve_preset};
use voxshift_engine::EffectSettings;

#[test]
fn save_then_load_preserves_the_preset() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("nested").join("voices").join("gravel.toml");

    let preset = Preset::new("Gravel")
        .with_description("Deep and dirty")
        .with_gate_threshold(-38.0)
        .with_settings(EffectSettings {
            pitch: -8.0,
            distortion: 0.45,
            filter_freq: 2200.0,
            ..EffectSettings::default()
        });
    preset.save(&path).unwrap();
    assert!(path.is_file());

    let loaded = Preset::load(&path).unwrap();
    assert_eq!(loaded, preset);
}

#[test]
fn factory_preset_can_be_copied_to_disk() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("demon.toml");
    let demon = get_factory_preset("demon").unwrap();
    demon.save(&path).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains("name = \"Underworld\""));
    assert!(text.contains("robotFreq = 20.0"));
    assert_eq!(Preset::load(&path).unwrap().settings, demon.settings);
}

#[test]
fn loading_a_missing_file_names_it() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("absent.toml");
    let err = Preset::load(&path).unwrap_err();
    assert!(matches!(
        err,
        ConfigError::Io { action: IoAction::Read, path: ref p, .. } if *p == path
    ));
}

#[test]
fn malformed_file_is_a_parse_error() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("bad.toml");
    std::fs::write(&path, "name = [unclosed").unwrap();
    assert!(matches!(Preset::load(&path), Err(ConfigError::TomlParse(_))));
}

#[test]
fn preset_file_by_path_resolves() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("mine.toml");
    Preset::new("Mine").save(&path).unwrap();

    let resolved = resolve_preset(path.to_str().unwrap()).unwrap();
    assert_eq!(resolved.name, "Mine");
    assert_eq!(resolve_preset("Cybernetic").unwrap().settings.robot_freq, 60.0);
    assert!(matches!(
        resolve_preset("definitely-not-a-voice-xyz"),
        Err(ConfigError::PresetNotFound(_))
    ));
}
