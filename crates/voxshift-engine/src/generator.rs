//! Settings from a text-to-parameters generator.
//!
//! A generator turns a free-form description ("make me sound like a tired
//! robot") into [`EffectSettings`]. The network client is outside this crate;
//! anything that can produce the JSON object can be plugged in through
//! [`JsonSettingsGenerator`].

use crate::error::GeneratorError;
use crate::host::AudioHost;
use crate::session::VoiceSession;
use crate::settings::EffectSettings;

/// Produces settings for a prompt.
pub trait SettingsGenerator {
    /// Settings describing `prompt`.
    fn generate(&self, prompt: &str) -> Result<EffectSettings, GeneratorError>;
}

/// Adapts a function returning a JSON response into a [`SettingsGenerator`].
///
/// Missing fields take their defaults. Values are not range-checked.
///
/// ```rust
/// use voxshift_engine::{JsonSettingsGenerator, SettingsGenerator};
///
/// let generator = JsonSettingsGenerator::new(|_prompt: &str| {
///     Ok::<_, std::io::Error>(r#"{"robotFreq": 40, "dryWet": 0.9}"#.to_string())
/// });
/// let settings = generator.generate("robot").unwrap();
/// assert_eq!(settings.robot_freq, 40.0);
/// assert_eq!(settings.dry_wet, 0.9);
/// ```
pub struct JsonSettingsGenerator<F> {
    respond: F,
}

impl<F, E> JsonSettingsGenerator<F>
where
    F: Fn(&str) -> Result<String, E>,
    E: std::fmt::Display,
{
    /// Wrap `respond`.
    pub fn new(respond: F) -> Self {
        Self { respond }
    }
}

impl<F, E> SettingsGenerator for JsonSettingsGenerator<F>
where
    F: Fn(&str) -> Result<String, E>,
    E: std::fmt::Display,
{
    fn generate(&self, prompt: &str) -> Result<EffectSettings, GeneratorError> {
        let response =
            (self.respond)(prompt).map_err(|err| GeneratorError::Request(err.to_string()))?;
        Ok(EffectSettings::from_json(strip_code_fence(&response))?)
    }
}

impl<F> std::fmt::Debug for JsonSettingsGenerator<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonSettingsGenerator").finish_non_exhaustive()
    }
}

/// Text generators often wrap JSON in a markdown fence.
fn strip_code_fence(response: &str) -> &str {
    let trimmed = response.trim();
    let Some(body) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = body.strip_prefix("json").unwrap_or(body);
    body.strip_suffix("```").unwrap_or(body).trim()
}

/// Ask `generator` for settings and apply them to `session`.
///
/// Generator errors are returned unchanged and nothing is applied. On
/// success the settings are returned whether or not the session was active.
pub fn apply_generated<H, G>(
    session: &mut VoiceSession<H>,
    generator: &G,
    prompt: &str,
) -> Result<EffectSettings, GeneratorError>
where
    H: AudioHost + 'static,
    G: SettingsGenerator + ?Sized,
{
    let settings = generator.generate(prompt)?;
    tracing::info!(prompt, "applying generated settings");
    session.update_settings(&settings);
    Ok(settings)
}
