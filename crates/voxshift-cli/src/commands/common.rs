//! Helpers shared by several commands.

use anyhow::Context;
use clap::Args;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use voxshift_config::{Preset, resolve_preset};
use voxshift_engine::{EffectSettings, MonitorMode, OfflineHost, RENDER_QUANTUM, VoiceSession};

/// Where the voice comes from: a preset or a settings JSON file.
#[derive(Args, Debug, Clone)]
pub struct VoiceArgs {
    /// Preset name (factory or user) or path to a preset TOML file
    #[arg(short, long, default_value = "natural")]
    pub preset: String,

    /// Settings JSON file (camelCase keys); overrides --preset
    #[arg(long)]
    pub settings: Option<PathBuf>,

    /// Noise gate threshold in dBFS; overrides the preset's
    #[arg(short, long, allow_negative_numbers = true)]
    pub gate: Option<f32>,
}

impl VoiceArgs {
    /// Resolve to a preset, warning about out-of-range values.
    pub fn load(&self) -> anyhow::Result<Preset> {
        let mut preset = match &self.settings {
            Some(path) => settings_preset(path)?,
            None => resolve_preset(&self.preset)
                .with_context(|| format!("loading preset '{}'", self.preset))?,
        };
        if let Some(db) = self.gate {
            preset.gate_threshold_db = db;
        }
        for warning in preset.validate() {
            tracing::warn!(preset = %preset.name, "{warning}");
        }
        Ok(preset)
    }
}

/// Wrap a settings JSON file as an unnamed preset.
pub fn settings_preset(path: &Path) -> anyhow::Result<Preset> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading settings file {}", path.display()))?;
    let settings = EffectSettings::from_json(&json)
        .with_context(|| format!("parsing settings file {}", path.display()))?;
    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("settings");
    Ok(Preset::new(name).with_settings(settings))
}

/// Offline render parameters.
#[derive(Debug, Clone, Copy)]
pub struct OfflineRender {
    /// Sample rate of the material, Hz.
    pub sample_rate: u32,
    /// Silence appended so reverb and echo can ring out, seconds.
    pub tail_seconds: f32,
    /// Seed for the reverb impulse.
    pub seed: u64,
}

impl OfflineRender {
    /// Frames between gate decisions: one 60 Hz display frame, rounded to
    /// whole render quanta so chunks never render padding.
    pub fn gate_interval(&self) -> usize {
        let quanta = (self.sample_rate as f32 / 60.0 / RENDER_QUANTUM as f32).round() as usize;
        quanta.max(1) * RENDER_QUANTUM
    }

    /// Run `input` through a fresh voice session configured by `configure`.
    ///
    /// The gate is stepped after every interval of rendered audio, as the
    /// monitor thread would in real time.
    pub fn run(
        &self,
        input: &[f32],
        gate_threshold_db: f32,
        configure: impl FnOnce(&mut VoiceSession<OfflineHost>) -> anyhow::Result<()>,
    ) -> anyhow::Result<Vec<f32>> {
        let host = Arc::new(OfflineHost::new(self.sample_rate as f32));
        let mut session = VoiceSession::with_monitor_mode(Arc::clone(&host), MonitorMode::Manual)
            .with_seed(self.seed);
        session.set_gate_threshold(gate_threshold_db);
        session
            .initialize(None)
            .context("starting offline session")?;
        configure(&mut session)?;

        let tail = (self.tail_seconds.max(0.0) * self.sample_rate as f32) as usize;
        let mut padded = Vec::with_capacity(input.len() + tail);
        padded.extend_from_slice(input);
        padded.resize(input.len() + tail, 0.0);

        let mut output = Vec::with_capacity(padded.len());
        for chunk in padded.chunks(self.gate_interval()) {
            output.extend(host.render(chunk));
            session.step_gate();
        }
        session.stop();
        Ok(output)
    }
}
