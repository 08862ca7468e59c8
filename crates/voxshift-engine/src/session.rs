//! Session lifecycle.
//!
//! A [`VoiceSession`] ties the pieces together: it acquires the microphone,
//! wires the graph, starts the ring-mod carrier and the gate monitor, applies
//! settings, and tears everything down again.
//!
//! ```text
//!              initialize ok
//! Uninitialized ────────────▶ Active ──stop──▶ Closed
//!       ▲                      │  ▲               │
//!       └──initialize failed───┘  └──initialize───┘
//! ```
//!
//! Re-initializing an active session closes the old graph first, so two
//! sessions never run at once. Settings applied in an earlier session are
//! re-applied to the new graph; the gate threshold carries over as well.

use crate::error::DeviceAcquisitionError;
use crate::gate::{GateCycle, GateMonitor, GateThreshold, MONITOR_INTERVAL};
use crate::host::{AudioHost, CaptureId};
use crate::mapper::{SettingsPlan, apply_settings};
use crate::settings::EffectSettings;
use crate::topology::{GraphHandles, build_graph, teardown};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use std::sync::Arc;
use std::time::Duration;
use voxshift_analysis::AnalysisHandle;
use voxshift_core::{REVERB_DECAY, REVERB_DURATION_SECS, reverb_impulse};
use voxshift_io::CaptureConstraints;

/// How the noise gate is driven.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorMode {
    /// A monitor thread runs a cycle every interval.
    Threaded(Duration),
    /// Cycles run only when [`VoiceSession::step_gate`] is called. Used for
    /// offline rendering, where audio does not advance in real time.
    Manual,
}

impl Default for MonitorMode {
    fn default() -> Self {
        Self::Threaded(MONITOR_INTERVAL)
    }
}

/// Lifecycle state, without the data it carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Never initialized, or the last initialization failed.
    Uninitialized,
    /// Graph running.
    Active,
    /// Stopped.
    Closed,
}

enum GateDriver<H: AudioHost + 'static> {
    Thread(GateMonitor),
    Manual(GateCycle<H>),
}

struct ActiveGraph<H: AudioHost + 'static> {
    handles: GraphHandles,
    capture: CaptureId,
    gate: GateDriver<H>,
}

enum State<H: AudioHost + 'static> {
    Uninitialized,
    Active(ActiveGraph<H>),
    Closed,
}

/// A voice-changing session on a host.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use voxshift_engine::{EffectSettings, MonitorMode, OfflineHost, VoiceSession};
///
/// let host = Arc::new(OfflineHost::new(44100.0));
/// let mut session = VoiceSession::with_monitor_mode(Arc::clone(&host), MonitorMode::Manual);
///
/// session.update_settings(&EffectSettings::default()); // ignored, not running yet
/// session.initialize(None).unwrap();
/// session.update_settings(&EffectSettings { robot_freq: 30.0, ..EffectSettings::default() });
/// session.set_gate_threshold(-120.0);
///
/// let out = host.render(&vec![0.1; 4410]);
/// assert_eq!(out.len(), 4410);
///
/// session.stop();
/// session.stop(); // idempotent
/// ```
pub struct VoiceSession<H: AudioHost + 'static> {
    host: Arc<H>,
    state: State<H>,
    threshold: GateThreshold,
    last_settings: Option<EffectSettings>,
    monitor_mode: MonitorMode,
    seed: Option<u64>,
}

impl<H: AudioHost + 'static> VoiceSession<H> {
    /// A session whose gate runs on a monitor thread at display-frame rate.
    pub fn new(host: Arc<H>) -> Self {
        Self::with_monitor_mode(host, MonitorMode::default())
    }

    /// A session with an explicit gate driver.
    pub fn with_monitor_mode(host: Arc<H>, monitor_mode: MonitorMode) -> Self {
        Self {
            host,
            state: State::Uninitialized,
            threshold: GateThreshold::default(),
            last_settings: None,
            monitor_mode,
            seed: None,
        }
    }

    /// Generate reverb impulses from a fixed seed instead of entropy.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// The host this session renders on.
    pub fn host(&self) -> &Arc<H> {
        &self.host
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        match self.state {
            State::Uninitialized => SessionState::Uninitialized,
            State::Active(_) => SessionState::Active,
            State::Closed => SessionState::Closed,
        }
    }

    /// True while a graph is running.
    pub fn is_active(&self) -> bool {
        matches!(self.state, State::Active(_))
    }

    /// Node ids of the running graph.
    pub fn handles(&self) -> Option<&GraphHandles> {
        match &self.state {
            State::Active(active) => Some(&active.handles),
            _ => None,
        }
    }

    /// The settings most recently applied to a graph.
    pub fn settings(&self) -> Option<EffectSettings> {
        self.last_settings
    }

    /// Start a session capturing from `device` (the default input if `None`).
    ///
    /// Any running session is stopped first. On error nothing is left
    /// running and the session is not active.
    pub fn initialize(&mut self, device: Option<&str>) -> Result<(), DeviceAcquisitionError> {
        if self.is_active() {
            self.stop();
        }

        let host = Arc::clone(&self.host);
        let constraints = CaptureConstraints::voice(device);
        let capture = match host.acquire_capture(&constraints) {
            Ok(capture) => capture,
            Err(err) => {
                tracing::warn!(device = ?device, error = %err, "capture acquisition failed");
                return Err(err);
            }
        };

        let mut rng = match self.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        let impulse = reverb_impulse(
            host.sample_rate(),
            REVERB_DURATION_SECS,
            REVERB_DECAY,
            &mut rng,
        );
        let handles = build_graph(host.as_ref(), capture, Arc::new(impulse));
        host.start(handles.ring_mod_osc);

        let cycle = GateCycle::new(
            Arc::clone(&host),
            handles.gate_key,
            handles.noise_gate,
            self.threshold.clone(),
        );
        let gate = match self.monitor_mode {
            MonitorMode::Manual => GateDriver::Manual(cycle),
            MonitorMode::Threaded(interval) => match GateMonitor::spawn(cycle, interval) {
                Ok(monitor) => GateDriver::Thread(monitor),
                Err(err) => {
                    teardown(host.as_ref(), &handles);
                    host.release_capture(capture);
                    return Err(DeviceAcquisitionError::Stream(format!(
                        "gate monitor: {err}"
                    )));
                }
            },
        };

        if let Some(settings) = self.last_settings {
            apply_settings(host.as_ref(), &handles, &settings);
        }

        tracing::info!(
            device = device.unwrap_or("<default>"),
            sample_rate = host.sample_rate(),
            "voice session started"
        );
        self.state = State::Active(ActiveGraph {
            handles,
            capture,
            gate,
        });
        Ok(())
    }

    /// Apply `settings` to the running graph.
    ///
    /// Ignored when no session is active; the settings are not remembered
    /// in that case.
    pub fn update_settings(&mut self, settings: &EffectSettings) -> Option<SettingsPlan> {
        let State::Active(active) = &self.state else {
            tracing::debug!("settings update ignored, no active session");
            return None;
        };
        let plan = apply_settings(self.host.as_ref(), &active.handles, settings);
        self.last_settings = Some(*settings);
        Some(plan)
    }

    /// Set the gate threshold in dB. Takes effect on the next gate cycle,
    /// in this session and later ones.
    pub fn set_gate_threshold(&self, db: f32) {
        self.threshold.set(db);
        tracing::debug!(threshold_db = db, "gate threshold set");
    }

    /// Current gate threshold in dB.
    pub fn gate_threshold(&self) -> f32 {
        self.threshold.get()
    }

    /// Run one gate cycle now, if the gate is driven manually.
    ///
    /// Returns the scheduled gate target, or `None` when the session is not
    /// active or its gate runs on a monitor thread.
    pub fn step_gate(&mut self) -> Option<f32> {
        match &mut self.state {
            State::Active(ActiveGraph {
                gate: GateDriver::Manual(cycle),
                ..
            }) => Some(cycle.run_once()),
            _ => None,
        }
    }

    /// Reader for the output analysis tap.
    pub fn analysis_tap(&self) -> Option<AnalysisHandle> {
        self.handles()
            .and_then(|handles| self.host.analysis(handles.analyser))
    }

    /// Stop the gate, release the microphone and dismantle the graph.
    ///
    /// Safe to call at any time, any number of times.
    pub fn stop(&mut self) {
        let state = std::mem::replace(&mut self.state, State::Closed);
        let State::Active(mut active) = state else {
            // Uninitialized and Closed sessions stay as they are.
            self.state = state;
            return;
        };
        if let GateDriver::Thread(monitor) = &mut active.gate {
            monitor.stop();
        }
        self.host.release_capture(active.capture);
        teardown(self.host.as_ref(), &active.handles);
        tracing::info!("voice session stopped");
    }
}

impl<H: AudioHost + 'static> Drop for VoiceSession<H> {
    fn drop(&mut self) {
        self.stop();
    }
}

impl<H: AudioHost + 'static> std::fmt::Debug for VoiceSession<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VoiceSession")
            .field("state", &self.state())
            .field("gate_threshold_db", &self.threshold.get())
            .field("last_settings", &self.last_settings)
            .finish_non_exhaustive()
    }
}
