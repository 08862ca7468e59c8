//! Per-node DSP bodies.

use super::{Block, RENDER_QUANTUM};
use crate::host::{NodeSpec, ParamName};
use std::sync::Arc;
use voxshift_analysis::{AnalysisHandle, AnalysisTap};
use voxshift_core::{Effect, FilterType, SmoothedParam};
use voxshift_effects::{
    AutoGainControl, Compressor, Convolver, DelayNode, FilterNode, GainStage, SineOscillator,
    WaveShaper,
};

/// The processor behind one render graph node.
#[derive(Debug)]
pub enum NodeProcessor {
    /// Copies the external input, optionally through an AGC.
    Source(Option<AutoGainControl>),
    /// Passes its input to the graph output.
    Destination,
    /// Smoothed gain with modulation.
    Gain(GainStage),
    /// Biquad.
    Filter(FilterNode),
    /// Compressor or limiter.
    Compressor(Compressor),
    /// Partitioned convolution.
    Convolver(Box<Convolver>),
    /// Delay line, rendered in two phases.
    Delay(DelayNode),
    /// Sine carrier.
    Oscillator(SineOscillator),
    /// Waveshaper.
    Shaper(WaveShaper),
    /// Pass-through analysis tap.
    Analyser(AnalysisTap),
}

impl NodeProcessor {
    /// Build the processor for `spec`.
    ///
    /// `auto_gain` only affects source nodes. Delays are floored at one render
    /// quantum so they can close feedback cycles.
    pub fn from_spec(spec: &NodeSpec, sample_rate: f32, auto_gain: bool) -> Self {
        match spec {
            NodeSpec::Source { .. } => {
                Self::Source(auto_gain.then(|| AutoGainControl::new(sample_rate)))
            }
            NodeSpec::Destination => Self::Destination,
            NodeSpec::Gain { gain } => Self::Gain(GainStage::new(sample_rate, *gain)),
            NodeSpec::Biquad {
                filter,
                frequency,
                q,
                gain_db,
            } => Self::Filter(FilterNode::new(
                sample_rate,
                *filter,
                *frequency,
                *q,
                *gain_db,
            )),
            NodeSpec::Compressor(settings) => {
                Self::Compressor(Compressor::new(sample_rate, *settings))
            }
            NodeSpec::Convolver { impulse, normalize } => Self::Convolver(Box::new(
                Convolver::new(impulse, RENDER_QUANTUM, *normalize),
            )),
            NodeSpec::Delay {
                max_seconds,
                delay_seconds,
            } => Self::Delay(DelayNode::new(
                sample_rate,
                *max_seconds,
                *delay_seconds,
                RENDER_QUANTUM,
            )),
            NodeSpec::Oscillator { frequency } => {
                Self::Oscillator(SineOscillator::new(sample_rate, *frequency))
            }
            NodeSpec::Shaper { curve } => Self::Shaper(WaveShaper::new(Arc::clone(curve))),
            NodeSpec::Analyser { fft_size } => {
                Self::Analyser(AnalysisTap::new(*fft_size, sample_rate))
            }
        }
    }

    /// Reader for an analyser node.
    pub fn analysis_handle(&self) -> Option<AnalysisHandle> {
        match self {
            Self::Analyser(tap) => Some(tap.handle()),
            _ => None,
        }
    }

    pub(crate) fn is_delay(&self) -> bool {
        matches!(self, Self::Delay(_))
    }

    pub(crate) fn is_destination(&self) -> bool {
        matches!(self, Self::Destination)
    }

    /// The schedulable parameter `param`, if this node has one.
    pub fn param_mut(&mut self, param: ParamName) -> Option<&mut SmoothedParam> {
        match (self, param) {
            (Self::Gain(gain), ParamName::Gain) => Some(gain.gain_mut()),
            (Self::Filter(filter), ParamName::Frequency) => Some(filter.frequency_mut()),
            (Self::Filter(filter), ParamName::Q) => Some(filter.q_mut()),
            (Self::Filter(filter), ParamName::GainDb) => Some(filter.gain_db_mut()),
            (Self::Oscillator(osc), ParamName::Frequency) => Some(osc.frequency_mut()),
            (Self::Delay(delay), ParamName::DelayTime) => Some(delay.delay_time_mut()),
            _ => None,
        }
    }

    pub(crate) fn start(&mut self) {
        if let Self::Oscillator(osc) = self {
            osc.start();
        }
    }

    pub(crate) fn set_filter_type(&mut self, filter: FilterType) {
        if let Self::Filter(node) = self {
            node.set_filter_type(filter);
        }
    }

    pub(crate) fn set_curve(&mut self, curve: Arc<[f32]>) {
        if let Self::Shaper(shaper) = self {
            shaper.set_curve(curve);
        }
    }

    /// First phase for delays: emit the block from history.
    pub(crate) fn read_delayed(&mut self, output: &mut Block) {
        if let Self::Delay(delay) = self {
            delay.read_block(output);
        }
    }

    /// Render one quantum.
    ///
    /// `input` is the sum of connected inputs, `modulation` the sum of
    /// signals connected to the gain parameter, `external` the capture block.
    /// A delay only absorbs `input` here; its output came from
    /// [`read_delayed`](Self::read_delayed).
    pub(crate) fn process(
        &mut self,
        input: &Block,
        modulation: Option<&Block>,
        external: &Block,
        output: &mut Block,
    ) {
        match self {
            Self::Source(agc) => {
                output.copy_from_slice(external);
                if let Some(agc) = agc {
                    agc.process_block_inplace(output);
                }
            }
            Self::Destination => output.copy_from_slice(input),
            Self::Gain(gain) => {
                gain.process_block(input, modulation.map(|m| &m[..]), output);
            }
            Self::Filter(filter) => filter.process_block(input, output),
            Self::Compressor(comp) => comp.process_block(input, output),
            Self::Convolver(conv) => conv.process_block(input, output),
            Self::Delay(delay) => delay.write_block(input),
            Self::Oscillator(osc) => osc.render(output),
            Self::Shaper(shaper) => shaper.process_block(input, output),
            Self::Analyser(tap) => tap.process(input, output),
        }
    }
}
