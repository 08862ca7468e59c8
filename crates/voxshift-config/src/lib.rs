//! Voice presets for voxshift.
//!
//! - **Presets**: named [`EffectSettings`](voxshift_engine::EffectSettings)
//!   plus a gate threshold, stored as TOML
//! - **Factory presets**: the built-in voice catalog
//! - **Validation**: warnings for values outside their designed ranges
//! - **Paths**: the per-user presets directory
//!
//! # Example
//!
//! ```rust,no_run
//! use voxshift_config::{Preset, get_factory_preset, user_presets_dir};
//!
//! let mut preset = get_factory_preset("uncle").unwrap();
//! preset.name = "Grumpy Uncle".to_string();
//! preset.settings.distortion = 0.3;
//! preset.save(user_presets_dir().join("grumpy_uncle.toml")).unwrap();
//!
//! let loaded = Preset::load(user_presets_dir().join("grumpy_uncle.toml")).unwrap();
//! assert_eq!(loaded, preset);
//! ```

mod error;
mod preset;

/// Platform-specific paths for presets.
pub mod paths;

/// Range checks for preset values.
pub mod validation;

/// Factory presets bundled with the library.
pub mod factory_presets;

pub use error::{ConfigError, IoAction, Result};
pub use factory_presets::{
    FACTORY_PRESET_NAMES, factory_preset_names, factory_presets, get_factory_preset,
    is_factory_preset,
};
pub use paths::{find_preset, list_user_presets, user_presets_dir};
pub use preset::Preset;
pub use validation::{ValidationWarning, validate_preset, validate_settings};

/// Resolve a preset name: factory presets first, then user preset files.
pub fn resolve_preset(name: &str) -> Result<Preset> {
    if let Some(preset) = get_factory_preset(name) {
        return Ok(preset);
    }
    match find_preset(name) {
        Some(path) => Preset::load(path),
        None => Err(ConfigError::PresetNotFound(name.to_string())),
    }
}
