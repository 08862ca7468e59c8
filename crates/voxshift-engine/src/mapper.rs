//! Settings to node targets.
//!
//! Mapping is split in two: [`SettingsPlan::from_settings`] decides every
//! target without touching a host, and [`apply_settings`] schedules the plan
//! on a graph. All moves use [`DEFAULT_TIME_CONSTANT`].

use crate::host::{AudioHost, ParamName};
use crate::settings::EffectSettings;
use crate::topology::GraphHandles;
use std::sync::Arc;
use voxshift_core::{DEFAULT_TIME_CONSTANT, FilterType, soft_clip_curve};

/// Presence shelf boost at `clarity == 1`, dB.
pub const MAX_PRESENCE_DB: f32 = 12.0;

/// Dry and wet path levels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MixTargets {
    /// Dry path gain.
    pub dry: f32,
    /// Wet bus gain.
    pub wet: f32,
}

impl MixTargets {
    /// Bypass routes everything dry; otherwise `dry_wet` splits the mix.
    ///
    /// ```rust
    /// use voxshift_engine::{EffectSettings, MixTargets};
    ///
    /// let s = EffectSettings { dry_wet: 0.25, ..EffectSettings::default() };
    /// assert_eq!(MixTargets::from_settings(&s), MixTargets { dry: 0.75, wet: 0.25 });
    ///
    /// let bypassed = s.with_bypass(true);
    /// assert_eq!(MixTargets::from_settings(&bypassed), MixTargets { dry: 1.0, wet: 0.0 });
    /// ```
    pub fn from_settings(settings: &EffectSettings) -> Self {
        if settings.bypass {
            Self { dry: 1.0, wet: 0.0 }
        } else {
            Self {
                dry: 1.0 - settings.dry_wet,
                wet: settings.dry_wet,
            }
        }
    }
}

/// Tone filter configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToneTargets {
    /// Lowpass for a lowered voice, highpass otherwise.
    pub filter: FilterType,
    /// Cutoff, Hz.
    pub frequency: f32,
    /// Resonance.
    pub q: f32,
}

impl ToneTargets {
    /// Derive the tone filter from `pitch`, `filter_freq` and `resonance`.
    pub fn from_settings(settings: &EffectSettings) -> Self {
        Self {
            filter: if settings.pitch < 0.0 {
                FilterType::Lowpass
            } else {
                FilterType::Highpass
            },
            frequency: settings.filter_freq,
            q: settings.resonance,
        }
    }
}

/// Wet-path character targets. Left alone while bypassed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoiceTargets {
    /// Tone filter.
    pub tone: ToneTargets,
    /// Presence shelf gain, dB.
    pub presence_db: f32,
    /// Ring-mod carrier frequency, Hz.
    pub robot_freq: f32,
    /// Amount the shaper curve is built for.
    pub distortion: f32,
    /// Master output gain.
    pub master_gain: f32,
}

/// Everything one settings update changes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SettingsPlan {
    /// Mix levels, always applied.
    pub mix: MixTargets,
    /// `None` when bypassed.
    pub voice: Option<VoiceTargets>,
}

impl SettingsPlan {
    /// Plan an update. Values are used as given, without clamping.
    pub fn from_settings(settings: &EffectSettings) -> Self {
        let mix = MixTargets::from_settings(settings);
        if settings.bypass {
            return Self { mix, voice: None };
        }
        Self {
            mix,
            voice: Some(VoiceTargets {
                tone: ToneTargets::from_settings(settings),
                presence_db: settings.clarity * MAX_PRESENCE_DB,
                robot_freq: settings.robot_freq,
                distortion: settings.distortion,
                master_gain: settings.gain,
            }),
        }
    }
}

/// Schedule `settings` on a live graph and return the plan that was applied.
pub fn apply_settings<H: AudioHost + ?Sized>(
    host: &H,
    graph: &GraphHandles,
    settings: &EffectSettings,
) -> SettingsPlan {
    let plan = SettingsPlan::from_settings(settings);
    let tc = DEFAULT_TIME_CONSTANT;

    host.set_target(graph.dry_gain, ParamName::Gain, plan.mix.dry, tc);
    host.set_target(graph.wet_bus, ParamName::Gain, plan.mix.wet, tc);

    let Some(voice) = plan.voice else {
        tracing::debug!("bypass: wet path muted");
        return plan;
    };

    host.set_filter_type(graph.tone_filter, voice.tone.filter);
    host.set_target(
        graph.tone_filter,
        ParamName::Frequency,
        voice.tone.frequency,
        tc,
    );
    host.set_target(graph.tone_filter, ParamName::Q, voice.tone.q, tc);
    host.set_target(graph.presence_shelf, ParamName::GainDb, voice.presence_db, tc);
    host.set_target(graph.ring_mod_osc, ParamName::Frequency, voice.robot_freq, tc);
    host.set_curve(graph.shaper, Arc::from(soft_clip_curve(voice.distortion)));
    host.set_target(graph.master_gain, ParamName::Gain, voice.master_gain, tc);

    tracing::debug!(?plan, "settings applied");
    plan
}
