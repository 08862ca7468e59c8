//! Voxshift Engine - the voice-changer signal graph and its lifecycle
//!
//! The engine is written against [`AudioHost`], a small capability trait for
//! building and steering an audio node graph. Two hosts are provided:
//!
//! - [`NativeHost`] - renders live through an [`AudioBackend`](voxshift_io::AudioBackend)
//!   (cpal), with the graph living inside the output callback
//! - [`OfflineHost`] - renders buffers on demand, for files and tests
//!
//! On top of the host:
//!
//! - [`topology`] - the fixed voice graph ([`build_graph`], [`GraphHandles`])
//! - [`mapper`] - [`EffectSettings`] to node targets ([`apply_settings`])
//! - [`gate`] - the noise-gate control loop ([`GateCycle`], [`GateMonitor`])
//! - [`session`] - [`VoiceSession`], which owns one running graph
//! - [`generator`] - plugging in a text-to-settings generator
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use voxshift_engine::{EffectSettings, MonitorMode, OfflineHost, VoiceSession};
//!
//! let host = Arc::new(OfflineHost::new(44100.0));
//! let mut session = VoiceSession::with_monitor_mode(Arc::clone(&host), MonitorMode::Manual)
//!     .with_seed(7);
//! session.initialize(None).unwrap();
//! session.update_settings(&EffectSettings { pitch: -4.0, ..EffectSettings::default() });
//!
//! let voice: Vec<f32> = (0..4410).map(|i| (i as f32 * 0.05).sin() * 0.3).collect();
//! session.step_gate();
//! let out = host.render(&voice);
//! assert!(out.iter().all(|s| s.is_finite()));
//! ```

pub mod error;
pub mod gate;
pub mod generator;
pub mod host;
pub mod mapper;
pub mod native;
pub mod offline;
pub mod render;
pub mod session;
pub mod settings;
pub mod topology;

pub use error::{DeviceAcquisitionError, GeneratorError, RenderError};
pub use gate::{
    DEFAULT_GATE_THRESHOLD_DB, GateCycle, GateMonitor, GateThreshold, MONITOR_INTERVAL,
    gate_target,
};
pub use generator::{JsonSettingsGenerator, SettingsGenerator, apply_generated};
pub use host::{AudioHost, CaptureId, NodeId, NodeSpec, ParamName};
pub use mapper::{MixTargets, SettingsPlan, ToneTargets, VoiceTargets, apply_settings};
pub use native::{NativeConfig, NativeHost};
pub use offline::OfflineHost;
pub use render::{Block, GraphCommand, NodeProcessor, RENDER_QUANTUM, RenderGraph};
pub use session::{MonitorMode, SessionState, VoiceSession};
pub use settings::EffectSettings;
pub use topology::{GraphHandles, build_graph, teardown};
