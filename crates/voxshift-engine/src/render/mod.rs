//! Block-based render graph.
//!
//! A [`RenderGraph`] owns every node processor and renders audio one
//! [`RENDER_QUANTUM`] at a time. Nodes run in dependency order; each node's
//! input is the sum of the outputs connected to it.
//!
//! Cycles are allowed only through delay nodes. A delay renders in two
//! phases: before anything else it emits its block from history, and in its
//! place in the order it absorbs the block's input. Edges leaving a delay
//! therefore carry no ordering constraint, which is what lets
//! `delay → feedback → delay` render. A cycle without a delay is rendered in
//! insertion order from the previous block's outputs.
//!
//! All mutation arrives as [`GraphCommand`]s, so the same graph can sit
//! behind a lock (offline) or inside an audio callback fed by a channel
//! (native).

mod processor;

pub use processor::NodeProcessor;

use crate::host::{NodeId, ParamName};
use std::collections::HashMap;
use std::sync::Arc;
use voxshift_core::FilterType;

/// Frames per render block.
pub const RENDER_QUANTUM: usize = 128;

/// One render block of mono audio.
pub type Block = [f32; RENDER_QUANTUM];

/// Nodes the graph reserves room for without reallocating.
const INITIAL_CAPACITY: usize = 64;

/// A mutation of the render graph.
#[derive(Debug)]
pub enum GraphCommand {
    /// Add a node with a pre-built processor.
    Insert {
        /// Id the node is addressed by.
        id: NodeId,
        /// Its processor.
        processor: Box<NodeProcessor>,
    },
    /// Audio edge.
    Connect {
        /// Upstream node.
        from: NodeId,
        /// Downstream node.
        to: NodeId,
    },
    /// Edge into a parameter.
    ConnectParam {
        /// Modulating node.
        from: NodeId,
        /// Modulated node.
        to: NodeId,
        /// Parameter receiving the signal.
        param: ParamName,
    },
    /// Remove a node and all its edges.
    Disconnect(NodeId),
    /// Start a scheduled source.
    Start(NodeId),
    /// Schedule a parameter move.
    SetTarget {
        /// Node owning the parameter.
        node: NodeId,
        /// Parameter.
        param: ParamName,
        /// Target value.
        value: f32,
        /// Approach time constant, seconds.
        time_constant: f32,
    },
    /// Change a filter's response.
    SetFilterType {
        /// Filter node.
        node: NodeId,
        /// New response.
        filter: FilterType,
    },
    /// Swap a shaper's table.
    SetCurve {
        /// Shaper node.
        node: NodeId,
        /// New table.
        curve: Arc<[f32]>,
    },
}

#[derive(Debug)]
struct RenderNode {
    id: NodeId,
    processor: Box<NodeProcessor>,
    inputs: Vec<NodeId>,
    param_inputs: Vec<(NodeId, ParamName)>,
    output: Block,
}

/// The node set and its render order.
#[derive(Debug)]
pub struct RenderGraph {
    sample_rate: f32,
    nodes: Vec<RenderNode>,
    index: HashMap<NodeId, usize>,
    order: Vec<usize>,
    placed: Vec<bool>,
    order_dirty: bool,
    mix: Block,
    modulation: Block,
}

impl RenderGraph {
    /// An empty graph rendering at `sample_rate`.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            sample_rate,
            nodes: Vec::with_capacity(INITIAL_CAPACITY),
            index: HashMap::with_capacity(INITIAL_CAPACITY),
            order: Vec::with_capacity(INITIAL_CAPACITY),
            placed: Vec::with_capacity(INITIAL_CAPACITY),
            order_dirty: false,
            mix: [0.0; RENDER_QUANTUM],
            modulation: [0.0; RENDER_QUANTUM],
        }
    }

    /// Render sample rate.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Number of live nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// True if `id` is a live node.
    pub fn contains(&self, id: NodeId) -> bool {
        self.index.contains_key(&id)
    }

    /// Number of audio edges into `id`.
    pub fn input_count(&self, id: NodeId) -> usize {
        self.node(id).map_or(0, |n| n.inputs.len())
    }

    fn node(&self, id: NodeId) -> Option<&RenderNode> {
        self.index.get(&id).map(|&i| &self.nodes[i])
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut RenderNode> {
        self.index.get(&id).map(|&i| &mut self.nodes[i])
    }

    /// Apply one mutation. Commands naming unknown nodes are dropped.
    pub fn apply(&mut self, command: GraphCommand) {
        match command {
            GraphCommand::Insert { id, processor } => {
                self.index.insert(id, self.nodes.len());
                self.nodes.push(RenderNode {
                    id,
                    processor,
                    inputs: Vec::new(),
                    param_inputs: Vec::new(),
                    output: [0.0; RENDER_QUANTUM],
                });
                self.order_dirty = true;
            }
            GraphCommand::Connect { from, to } => {
                if self.contains(from)
                    && let Some(node) = self.node_mut(to)
                    && !node.inputs.contains(&from)
                {
                    node.inputs.push(from);
                    self.order_dirty = true;
                }
            }
            GraphCommand::ConnectParam { from, to, param } => {
                if self.contains(from)
                    && let Some(node) = self.node_mut(to)
                    && !node.param_inputs.contains(&(from, param))
                {
                    node.param_inputs.push((from, param));
                    self.order_dirty = true;
                }
            }
            GraphCommand::Disconnect(id) => self.remove(id),
            GraphCommand::Start(id) => {
                if let Some(node) = self.node_mut(id) {
                    node.processor.start();
                }
            }
            GraphCommand::SetTarget {
                node,
                param,
                value,
                time_constant,
            } => {
                if let Some(p) = self
                    .node_mut(node)
                    .and_then(|n| n.processor.param_mut(param))
                {
                    p.set_target_at(value, time_constant);
                }
            }
            GraphCommand::SetFilterType { node, filter } => {
                if let Some(n) = self.node_mut(node) {
                    n.processor.set_filter_type(filter);
                }
            }
            GraphCommand::SetCurve { node, curve } => {
                if let Some(n) = self.node_mut(node) {
                    n.processor.set_curve(curve);
                }
            }
        }
    }

    fn remove(&mut self, id: NodeId) {
        let Some(slot) = self.index.remove(&id) else {
            return;
        };
        self.nodes.swap_remove(slot);
        if let Some(moved) = self.nodes.get(slot) {
            self.index.insert(moved.id, slot);
        }
        for node in &mut self.nodes {
            node.inputs.retain(|&src| src != id);
            node.param_inputs.retain(|&(src, _)| src != id);
        }
        self.order_dirty = true;
    }

    /// Recompute the render order.
    ///
    /// A node is ready once every non-delay node feeding it (audio or
    /// parameter) is placed.
    fn rebuild_order(&mut self) {
        let count = self.nodes.len();
        self.order.clear();
        self.placed.clear();
        self.placed.resize(count, false);

        loop {
            let mut progressed = false;
            for i in 0..count {
                if self.placed[i] {
                    continue;
                }
                let node = &self.nodes[i];
                let ready = node
                    .inputs
                    .iter()
                    .chain(node.param_inputs.iter().map(|(src, _)| src))
                    .filter_map(|src| self.index.get(src))
                    .all(|&j| self.placed[j] || self.nodes[j].processor.is_delay());
                if ready {
                    self.placed[i] = true;
                    self.order.push(i);
                    progressed = true;
                }
            }
            if !progressed {
                break;
            }
        }

        if self.order.len() < count {
            tracing::warn!(
                unordered = count - self.order.len(),
                "render graph has a cycle without a delay"
            );
            for i in 0..count {
                if !self.placed[i] {
                    self.order.push(i);
                }
            }
        }
        self.order_dirty = false;
    }

    /// Render one quantum of `input` (the capture block) into `output`.
    ///
    /// `output` receives the sum of all destination nodes.
    pub fn render_quantum(&mut self, input: &Block, output: &mut Block) {
        if self.order_dirty {
            self.rebuild_order();
        }

        for node in &mut self.nodes {
            if node.processor.is_delay() {
                node.processor.read_delayed(&mut node.output);
            }
        }

        for step in 0..self.order.len() {
            let i = self.order[step];

            self.mix.fill(0.0);
            for src in &self.nodes[i].inputs {
                if let Some(&j) = self.index.get(src) {
                    for (m, s) in self.mix.iter_mut().zip(&self.nodes[j].output) {
                        *m += s;
                    }
                }
            }

            let mut modulated = false;
            self.modulation.fill(0.0);
            for (src, param) in &self.nodes[i].param_inputs {
                if *param != ParamName::Gain {
                    continue;
                }
                if let Some(&j) = self.index.get(src) {
                    modulated = true;
                    for (m, s) in self.modulation.iter_mut().zip(&self.nodes[j].output) {
                        *m += s;
                    }
                }
            }

            let node = &mut self.nodes[i];
            node.processor.process(
                &self.mix,
                modulated.then_some(&self.modulation),
                input,
                &mut node.output,
            );
        }

        output.fill(0.0);
        for node in &self.nodes {
            if node.processor.is_destination() {
                for (o, s) in output.iter_mut().zip(&node.output) {
                    *o += s;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::NodeSpec;

    fn insert(graph: &mut RenderGraph, id: u32, spec: NodeSpec) -> NodeId {
        let id = NodeId(id);
        graph.apply(GraphCommand::Insert {
            id,
            processor: Box::new(NodeProcessor::from_spec(&spec, graph.sample_rate(), false)),
        });
        id
    }

    fn connect(graph: &mut RenderGraph, from: NodeId, to: NodeId) {
        graph.apply(GraphCommand::Connect { from, to });
    }

    #[test]
    fn source_to_destination_through_gain() {
        let mut graph = RenderGraph::new(48000.0);
        // Inserted out of order on purpose.
        let dest = insert(&mut graph, 3, NodeSpec::Destination);
        let gain = insert(&mut graph, 2, NodeSpec::Gain { gain: 0.5 });
        let src = insert(&mut graph, 1, NodeSpec::Source { capture: crate::CaptureId(0) });
        connect(&mut graph, src, gain);
        connect(&mut graph, gain, dest);

        let input = [1.0; RENDER_QUANTUM];
        let mut out = [0.0; RENDER_QUANTUM];
        graph.render_quantum(&input, &mut out);
        assert!(out.iter().all(|&s| s == 0.5));
    }

    #[test]
    fn parallel_paths_sum() {
        let mut graph = RenderGraph::new(48000.0);
        let src = insert(&mut graph, 1, NodeSpec::Source { capture: crate::CaptureId(0) });
        let a = insert(&mut graph, 2, NodeSpec::Gain { gain: 0.25 });
        let b = insert(&mut graph, 3, NodeSpec::Gain { gain: 0.5 });
        let dest = insert(&mut graph, 4, NodeSpec::Destination);
        connect(&mut graph, src, a);
        connect(&mut graph, src, b);
        connect(&mut graph, a, dest);
        connect(&mut graph, b, dest);

        let mut out = [0.0; RENDER_QUANTUM];
        graph.render_quantum(&[1.0; RENDER_QUANTUM], &mut out);
        assert!(out.iter().all(|&s| (s - 0.75).abs() < 1e-6));
    }

    #[test]
    fn feedback_through_delay_repeats_and_decays() {
        let sr = 48000.0;
        let mut graph = RenderGraph::new(sr);
        let src = insert(&mut graph, 1, NodeSpec::Source { capture: crate::CaptureId(0) });
        let delay = insert(
            &mut graph,
            2,
            NodeSpec::Delay {
                max_seconds: 1.0,
                delay_seconds: RENDER_QUANTUM as f32 / sr,
            },
        );
        let feedback = insert(&mut graph, 3, NodeSpec::Gain { gain: 0.5 });
        let dest = insert(&mut graph, 4, NodeSpec::Destination);
        connect(&mut graph, src, delay);
        connect(&mut graph, delay, feedback);
        connect(&mut graph, feedback, delay);
        connect(&mut graph, delay, dest);

        let mut impulse = [0.0; RENDER_QUANTUM];
        impulse[0] = 1.0;
        let silence = [0.0; RENDER_QUANTUM];
        let mut out = [0.0; RENDER_QUANTUM];

        graph.render_quantum(&impulse, &mut out);
        assert!(out.iter().all(|&s| s == 0.0));

        let mut echoes = Vec::new();
        for _ in 0..3 {
            graph.render_quantum(&silence, &mut out);
            echoes.push(out[0]);
        }
        assert!((echoes[0] - 1.0).abs() < 1e-6);
        assert!((echoes[1] - 0.5).abs() < 1e-6);
        assert!((echoes[2] - 0.25).abs() < 1e-6);
    }

    #[test]
    fn oscillator_modulates_gain_parameter() {
        let sr = 48000.0;
        let mut graph = RenderGraph::new(sr);
        let src = insert(&mut graph, 1, NodeSpec::Source { capture: crate::CaptureId(0) });
        let ring = insert(&mut graph, 2, NodeSpec::Gain { gain: 1.0 });
        let osc = insert(&mut graph, 3, NodeSpec::Oscillator { frequency: 12000.0 });
        let dest = insert(&mut graph, 4, NodeSpec::Destination);
        connect(&mut graph, src, ring);
        connect(&mut graph, ring, dest);
        graph.apply(GraphCommand::ConnectParam {
            from: osc,
            to: ring,
            param: ParamName::Gain,
        });

        let mut out = [0.0; RENDER_QUANTUM];
        graph.render_quantum(&[1.0; RENDER_QUANTUM], &mut out);
        // Not started: intrinsic gain only.
        assert!(out.iter().all(|&s| s == 1.0));

        graph.apply(GraphCommand::Start(osc));
        graph.render_quantum(&[1.0; RENDER_QUANTUM], &mut out);
        // fs/4 carrier: 1 + sin cycles through 1, 2, 1, 0.
        assert!((out[1] - 2.0).abs() < 1e-4);
        assert!(out[3].abs() < 1e-4);
    }

    #[test]
    fn disconnect_removes_node_and_edges() {
        let mut graph = RenderGraph::new(48000.0);
        let src = insert(&mut graph, 1, NodeSpec::Source { capture: crate::CaptureId(0) });
        let gain = insert(&mut graph, 2, NodeSpec::Gain { gain: 1.0 });
        let dest = insert(&mut graph, 3, NodeSpec::Destination);
        connect(&mut graph, src, gain);
        connect(&mut graph, gain, dest);

        graph.apply(GraphCommand::Disconnect(gain));
        assert!(!graph.contains(gain));
        assert_eq!(graph.input_count(dest), 0);
        assert_eq!(graph.node_count(), 2);

        let mut out = [1.0; RENDER_QUANTUM];
        graph.render_quantum(&[1.0; RENDER_QUANTUM], &mut out);
        assert!(out.iter().all(|&s| s == 0.0));

        // Commands for the dead id are ignored.
        graph.apply(GraphCommand::Start(gain));
        connect(&mut graph, src, gain);
        assert_eq!(graph.node_count(), 2);
    }

    #[test]
    fn set_target_ramps_gain() {
        let mut graph = RenderGraph::new(48000.0);
        let src = insert(&mut graph, 1, NodeSpec::Source { capture: crate::CaptureId(0) });
        let gain = insert(&mut graph, 2, NodeSpec::Gain { gain: 1.0 });
        let dest = insert(&mut graph, 3, NodeSpec::Destination);
        connect(&mut graph, src, gain);
        connect(&mut graph, gain, dest);
        graph.apply(GraphCommand::SetTarget {
            node: gain,
            param: ParamName::Gain,
            value: 0.0,
            time_constant: 0.05,
        });

        let mut out = [0.0; RENDER_QUANTUM];
        graph.render_quantum(&[1.0; RENDER_QUANTUM], &mut out);
        assert!(out[0] < 1.0 && out[0] > 0.99);
        assert!(out[RENDER_QUANTUM - 1] < out[0]);
    }
}
