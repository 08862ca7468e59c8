//! The audio host capability interface.
//!
//! Everything above this trait (topology wiring, the parameter mapper, the
//! gate monitor, the session) is host-agnostic. A host owns the actual
//! processing: [`NativeHost`](crate::NativeHost) renders to a cpal output,
//! [`OfflineHost`](crate::OfflineHost) renders buffers synchronously, and
//! tests substitute a recording fake.
//!
//! All methods take `&self`; hosts are shared between the session and the gate
//! monitor thread.

use crate::DeviceAcquisitionError;
use std::sync::Arc;
use voxshift_analysis::AnalysisHandle;
use voxshift_core::{FilterType, ImpulseResponse};
use voxshift_effects::CompressorSettings;
use voxshift_io::CaptureConstraints;

/// Identifies a node inside one host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

/// Identifies an acquired capture stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CaptureId(pub u32);

/// What to build in [`AudioHost::create_node`].
#[derive(Debug, Clone)]
pub enum NodeSpec {
    /// Audio from an acquired capture stream.
    Source {
        /// The stream to read.
        capture: CaptureId,
    },
    /// The host's output.
    Destination,
    /// Smoothed gain; its `Gain` parameter accepts modulation.
    Gain {
        /// Initial linear gain.
        gain: f32,
    },
    /// Second-order filter.
    Biquad {
        /// Response type.
        filter: FilterType,
        /// Cutoff or center frequency, Hz.
        frequency: f32,
        /// Quality factor.
        q: f32,
        /// Gain for peaking and shelf types, dB.
        gain_db: f32,
    },
    /// Dynamics compressor.
    Compressor(CompressorSettings),
    /// Convolution with a fixed impulse response.
    Convolver {
        /// The response, shared so a host can build it off the audio thread.
        impulse: Arc<ImpulseResponse>,
        /// Apply equal-power normalization to the response.
        normalize: bool,
    },
    /// Delay line.
    Delay {
        /// Longest settable delay, seconds.
        max_seconds: f32,
        /// Initial delay, seconds.
        delay_seconds: f32,
    },
    /// Sine oscillator, silent until started.
    Oscillator {
        /// Initial frequency, Hz.
        frequency: f32,
    },
    /// Table waveshaper.
    Shaper {
        /// Transfer table over `[-1, 1]`.
        curve: Arc<[f32]>,
    },
    /// Pass-through analysis tap.
    Analyser {
        /// Analysis window length.
        fft_size: usize,
    },
}

impl NodeSpec {
    /// Short node-kind name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            NodeSpec::Source { .. } => "source",
            NodeSpec::Destination => "destination",
            NodeSpec::Gain { .. } => "gain",
            NodeSpec::Biquad { .. } => "biquad",
            NodeSpec::Compressor(_) => "compressor",
            NodeSpec::Convolver { .. } => "convolver",
            NodeSpec::Delay { .. } => "delay",
            NodeSpec::Oscillator { .. } => "oscillator",
            NodeSpec::Shaper { .. } => "shaper",
            NodeSpec::Analyser { .. } => "analyser",
        }
    }
}

/// A schedulable node parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamName {
    /// Linear gain of a gain node.
    Gain,
    /// Filter cutoff or oscillator frequency, Hz.
    Frequency,
    /// Filter Q.
    Q,
    /// Filter gain, dB.
    GainDb,
    /// Delay time, seconds.
    DelayTime,
}

/// Audio graph capabilities the voice engine is built on.
///
/// Operations on unknown node ids, or parameters a node does not have, are
/// ignored.
pub trait AudioHost: Send + Sync {
    /// Render sample rate, Hz.
    fn sample_rate(&self) -> f32;

    /// Open a capture stream.
    fn acquire_capture(
        &self,
        constraints: &CaptureConstraints,
    ) -> Result<CaptureId, DeviceAcquisitionError>;

    /// Stop and close a capture stream.
    fn release_capture(&self, capture: CaptureId);

    /// Create a node.
    fn create_node(&self, spec: NodeSpec) -> NodeId;

    /// Route `from`'s output into `to`'s input. Inputs sum.
    fn connect(&self, from: NodeId, to: NodeId);

    /// Route `from`'s output into a parameter of `to`, added to its value.
    fn connect_param(&self, from: NodeId, to: NodeId, param: ParamName);

    /// Remove every connection of `node` and release it. The id is dead
    /// afterwards.
    fn disconnect(&self, node: NodeId);

    /// Start a scheduled source (oscillators).
    fn start(&self, node: NodeId);

    /// Move a parameter toward `value`, approaching it exponentially with
    /// `time_constant` seconds.
    fn set_target(&self, node: NodeId, param: ParamName, value: f32, time_constant: f32);

    /// Change a biquad's response type.
    fn set_filter_type(&self, node: NodeId, filter: FilterType);

    /// Replace a shaper's transfer table.
    fn set_curve(&self, node: NodeId, curve: Arc<[f32]>);

    /// Copy an analyser's most recent samples, oldest first. Returns how many
    /// were written; 0 for a node that is not an analyser.
    fn read_time_domain(&self, node: NodeId, out: &mut [f32]) -> usize;

    /// A reader for an analyser node.
    fn analysis(&self, node: NodeId) -> Option<AnalysisHandle>;
}
