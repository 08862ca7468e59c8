//! The fixed voice-changer graph.
//!
//! ```text
//! source → preamp → noise_gate → de_esser → compressor ─┬─ dry_gain ─────────────────────────┐
//!    │                                                  │                                    │
//!    │    (preamp) → gate_key                           └─ tone_filter → presence_shelf →    │
//!    │                                                     shaper → ring_mod_gain → wet_bus  │
//!    │                     ring_mod_osc ──(gain param)──┘                │                   │
//!    │                                                   ┌───────────────┼──────────┐        │
//!    │                                                   │         convolver   echo_delay ⇄ echo_feedback
//!    │                                                   │               │          │        │
//!    │                                                   │         reverb_send      │        │
//!    │                                                   ▼               ▼          ▼        ▼
//!    │                                                 limiter → master_gain → analyser → destination
//! ```
//!
//! The graph is wired once per session. Afterwards only parameter targets,
//! the tone filter type and the shaper curve change.

use crate::host::{AudioHost, CaptureId, NodeId, NodeSpec, ParamName};
use crate::render::RENDER_QUANTUM;
use std::sync::Arc;
use voxshift_analysis::DEFAULT_FFT_SIZE;
use voxshift_core::{FilterType, ImpulseResponse, soft_clip_curve};
use voxshift_effects::CompressorSettings;

/// De-esser center frequency, Hz.
pub const DE_ESSER_FREQUENCY: f32 = 6000.0;
/// De-esser Q.
pub const DE_ESSER_Q: f32 = 4.0;
/// De-esser cut, dB.
pub const DE_ESSER_GAIN_DB: f32 = -12.0;
/// Presence shelf corner, Hz.
pub const PRESENCE_FREQUENCY: f32 = 8000.0;
/// Reverb send level.
pub const REVERB_SEND: f32 = 0.05;
/// Echo feedback gain.
pub const ECHO_FEEDBACK: f32 = 0.2;
/// Longest echo delay the line is sized for, seconds.
pub const ECHO_MAX_SECONDS: f32 = 1.0;
/// Shaper amount before the first settings are applied.
pub const INITIAL_DISTORTION: f32 = 0.1;
/// Tone filter cutoff before the first settings are applied, Hz.
pub const INITIAL_TONE_FREQUENCY: f32 = 350.0;

/// Ids of every node in one session's graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphHandles {
    /// Microphone input.
    pub source: NodeId,
    /// Input gain.
    pub preamp: NodeId,
    /// Gain driven open/closed by the gate monitor.
    pub noise_gate: NodeId,
    /// Peaking cut on sibilance.
    pub de_esser: NodeId,
    /// Voice compressor.
    pub compressor: NodeId,
    /// Dry path level.
    pub dry_gain: NodeId,
    /// Low/high pass tone filter.
    pub tone_filter: NodeId,
    /// High shelf adding presence.
    pub presence_shelf: NodeId,
    /// Soft-clip distortion.
    pub shaper: NodeId,
    /// Gain modulated by the ring-mod oscillator.
    pub ring_mod_gain: NodeId,
    /// Ring-mod carrier.
    pub ring_mod_osc: NodeId,
    /// Wet path level, feeding the limiter, reverb and echo.
    pub wet_bus: NodeId,
    /// Reverb convolver.
    pub convolver: NodeId,
    /// Reverb return level.
    pub reverb_send: NodeId,
    /// Echo line.
    pub echo_delay: NodeId,
    /// Echo feedback gain.
    pub echo_feedback: NodeId,
    /// Output limiter.
    pub limiter: NodeId,
    /// Output level.
    pub master_gain: NodeId,
    /// Output analysis tap.
    pub analyser: NodeId,
    /// Pre-gate analysis tap the gate monitor keys on.
    pub gate_key: NodeId,
    /// Host output.
    pub destination: NodeId,
}

impl GraphHandles {
    /// Every node, in creation order.
    pub fn all_nodes(&self) -> [NodeId; 21] {
        [
            self.source,
            self.preamp,
            self.noise_gate,
            self.gate_key,
            self.de_esser,
            self.compressor,
            self.dry_gain,
            self.tone_filter,
            self.presence_shelf,
            self.shaper,
            self.ring_mod_osc,
            self.ring_mod_gain,
            self.wet_bus,
            self.convolver,
            self.reverb_send,
            self.echo_delay,
            self.echo_feedback,
            self.limiter,
            self.master_gain,
            self.analyser,
            self.destination,
        ]
    }
}

/// Create and wire the voice graph on `host`.
///
/// The ring-mod oscillator is created stopped; the session starts it.
pub fn build_graph<H: AudioHost + ?Sized>(
    host: &H,
    capture: CaptureId,
    impulse: Arc<ImpulseResponse>,
) -> GraphHandles {
    let sample_rate = host.sample_rate();
    let gain = |gain: f32| host.create_node(NodeSpec::Gain { gain });

    let source = host.create_node(NodeSpec::Source { capture });
    let preamp = gain(1.0);
    let noise_gate = gain(1.0);
    let gate_key = host.create_node(NodeSpec::Analyser {
        fft_size: DEFAULT_FFT_SIZE,
    });
    let de_esser = host.create_node(NodeSpec::Biquad {
        filter: FilterType::Peaking,
        frequency: DE_ESSER_FREQUENCY,
        q: DE_ESSER_Q,
        gain_db: DE_ESSER_GAIN_DB,
    });
    let compressor = host.create_node(NodeSpec::Compressor(CompressorSettings::voice()));

    let dry_gain = gain(1.0);

    let tone_filter = host.create_node(NodeSpec::Biquad {
        filter: FilterType::Lowpass,
        frequency: INITIAL_TONE_FREQUENCY,
        q: 1.0,
        gain_db: 0.0,
    });
    let presence_shelf = host.create_node(NodeSpec::Biquad {
        filter: FilterType::HighShelf,
        frequency: PRESENCE_FREQUENCY,
        q: 1.0,
        gain_db: 0.0,
    });
    let shaper = host.create_node(NodeSpec::Shaper {
        curve: Arc::from(soft_clip_curve(INITIAL_DISTORTION)),
    });
    let ring_mod_osc = host.create_node(NodeSpec::Oscillator { frequency: 0.0 });
    let ring_mod_gain = gain(1.0);
    let wet_bus = gain(1.0);

    let convolver = host.create_node(NodeSpec::Convolver {
        impulse,
        normalize: true,
    });
    let reverb_send = gain(REVERB_SEND);
    let echo_delay = host.create_node(NodeSpec::Delay {
        max_seconds: ECHO_MAX_SECONDS,
        delay_seconds: RENDER_QUANTUM as f32 / sample_rate,
    });
    let echo_feedback = gain(ECHO_FEEDBACK);

    let limiter = host.create_node(NodeSpec::Compressor(CompressorSettings::limiter()));
    let master_gain = gain(1.0);
    let analyser = host.create_node(NodeSpec::Analyser {
        fft_size: DEFAULT_FFT_SIZE,
    });
    let destination = host.create_node(NodeSpec::Destination);

    // Input chain
    host.connect(source, preamp);
    host.connect(preamp, noise_gate);
    host.connect(preamp, gate_key);
    host.connect(noise_gate, de_esser);
    host.connect(de_esser, compressor);

    // Dry
    host.connect(compressor, dry_gain);
    host.connect(dry_gain, limiter);

    // Wet
    host.connect(compressor, tone_filter);
    host.connect(tone_filter, presence_shelf);
    host.connect(presence_shelf, shaper);
    host.connect(shaper, ring_mod_gain);
    host.connect_param(ring_mod_osc, ring_mod_gain, ParamName::Gain);
    host.connect(ring_mod_gain, wet_bus);

    // Spatial
    host.connect(wet_bus, convolver);
    host.connect(convolver, reverb_send);
    host.connect(reverb_send, limiter);

    host.connect(wet_bus, echo_delay);
    host.connect(echo_delay, echo_feedback);
    host.connect(echo_feedback, echo_delay);
    host.connect(echo_delay, limiter);

    host.connect(wet_bus, limiter);

    // Output
    host.connect(limiter, master_gain);
    host.connect(master_gain, analyser);
    host.connect(analyser, destination);

    tracing::debug!(sample_rate, "voice graph wired");

    GraphHandles {
        source,
        preamp,
        noise_gate,
        de_esser,
        compressor,
        dry_gain,
        tone_filter,
        presence_shelf,
        shaper,
        ring_mod_gain,
        ring_mod_osc,
        wet_bus,
        convolver,
        reverb_send,
        echo_delay,
        echo_feedback,
        limiter,
        master_gain,
        analyser,
        gate_key,
        destination,
    }
}

/// Disconnect and release every node of a graph.
pub fn teardown<H: AudioHost + ?Sized>(host: &H, handles: &GraphHandles) {
    for node in handles.all_nodes() {
        host.disconnect(node);
    }
}
