//! Preset file format and operations.

use serde::{Deserialize, Serialize};
use std::path::Path;
use voxshift_engine::{DEFAULT_GATE_THRESHOLD_DB, EffectSettings};

use crate::error::{ConfigError, IoAction, Result};
use crate::validation::{ValidationWarning, validate_preset};

/// A named voice: effect settings plus the gate threshold to run them with.
///
/// # TOML Format
///
/// ```toml
/// name = "Old Uncle"
/// description = "Low, rough and a little wobbly"
/// gate_threshold_db = -50.0
///
/// [settings]
/// pitch = -6.0
/// robotFreq = 5.0
/// distortion = 0.1
/// filterFreq = 3000.0
/// gain = 1.2
/// dryWet = 0.9
/// bypass = false
/// clarity = 0.3
/// resonance = 3.0
/// ```
///
/// Settings keys use the same camelCase names as generator responses.
/// Missing settings take the "Natural" defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Preset {
    /// Name of the preset.
    pub name: String,

    /// Optional description of the preset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Noise gate threshold, dBFS.
    #[serde(default = "default_gate_threshold")]
    pub gate_threshold_db: f32,

    /// Effect settings.
    #[serde(default)]
    pub settings: EffectSettings,
}

fn default_gate_threshold() -> f32 {
    DEFAULT_GATE_THRESHOLD_DB
}

impl Preset {
    /// A preset with default settings.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            gate_threshold_db: DEFAULT_GATE_THRESHOLD_DB,
            settings: EffectSettings::default(),
        }
    }

    /// Create a preset with a description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the effect settings.
    pub fn with_settings(mut self, settings: EffectSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Set the gate threshold, dBFS.
    pub fn with_gate_threshold(mut self, db: f32) -> Self {
        self.gate_threshold_db = db;
        self
    }

    /// Load a preset from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::io(IoAction::Read, path, e))?;
        Self::from_toml(&content)
    }

    /// Load a preset from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Save the preset to a TOML file, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)
                .map_err(|e| ConfigError::io(IoAction::CreateDir, parent, e))?;
        }

        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| ConfigError::io(IoAction::Write, path, e))?;
        Ok(())
    }

    /// Convert the preset to a TOML string.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Values outside their designed ranges. They are still applied as given.
    pub fn validate(&self) -> Vec<ValidationWarning> {
        validate_preset(self)
    }
}

impl Default for Preset {
    fn default() -> Self {
        Self::new("Untitled")
    }
}
