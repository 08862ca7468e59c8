//! A host that records every call instead of rendering audio.

#![allow(dead_code)]

use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use voxshift_analysis::{AnalysisHandle, AnalysisTap};
use voxshift_core::FilterType;
use voxshift_engine::{AudioHost, CaptureId, DeviceAcquisitionError, NodeId, NodeSpec, ParamName};
use voxshift_io::CaptureConstraints;

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Acquire(CaptureId, CaptureConstraints),
    Release(CaptureId),
    Create(NodeId, &'static str),
    Connect(NodeId, NodeId),
    ConnectParam(NodeId, NodeId, ParamName),
    Disconnect(NodeId),
    Start(NodeId),
    SetTarget {
        node: NodeId,
        param: ParamName,
        value: f32,
        time_constant: f32,
    },
    SetFilterType(NodeId, FilterType),
    SetCurve(NodeId, usize),
}

#[derive(Default)]
struct State {
    events: Vec<Event>,
    live: HashSet<NodeId>,
    captures: HashSet<CaptureId>,
    analysers: HashMap<NodeId, AnalysisHandle>,
    next_node: u32,
    next_capture: u32,
    fail_next: Option<DeviceAcquisitionError>,
}

/// Records calls. Analysers report a constant signal at a scriptable level.
pub struct RecordingHost {
    state: Mutex<State>,
    level_db: Mutex<f32>,
}

impl RecordingHost {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(State::default()),
            level_db: Mutex::new(-200.0),
        })
    }

    /// Make the next `acquire_capture` fail with `err`.
    pub fn fail_next_acquire(&self, err: DeviceAcquisitionError) {
        self.state.lock().fail_next = Some(err);
    }

    /// Level every analyser reports from now on.
    pub fn set_level_db(&self, db: f32) {
        *self.level_db.lock() = db;
    }

    pub fn events(&self) -> Vec<Event> {
        self.state.lock().events.clone()
    }

    pub fn clear_events(&self) {
        self.state.lock().events.clear();
    }

    pub fn live_nodes(&self) -> usize {
        self.state.lock().live.len()
    }

    pub fn is_live(&self, node: NodeId) -> bool {
        self.state.lock().live.contains(&node)
    }

    pub fn open_captures(&self) -> usize {
        self.state.lock().captures.len()
    }

    /// Every value scheduled on `node.param`, in order.
    pub fn targets(&self, node: NodeId, param: ParamName) -> Vec<f32> {
        self.state
            .lock()
            .events
            .iter()
            .filter_map(|e| match *e {
                Event::SetTarget {
                    node: n,
                    param: p,
                    value,
                    ..
                } if n == node && p == param => Some(value),
                _ => None,
            })
            .collect()
    }

    pub fn last_target(&self, node: NodeId, param: ParamName) -> Option<f32> {
        self.targets(node, param).last().copied()
    }

    pub fn count(&self, pred: impl Fn(&Event) -> bool) -> usize {
        self.state.lock().events.iter().filter(|e| pred(e)).count()
    }

    fn record(&self, event: Event) {
        self.state.lock().events.push(event);
    }
}

impl AudioHost for RecordingHost {
    fn sample_rate(&self) -> f32 {
        48000.0
    }

    fn acquire_capture(
        &self,
        constraints: &CaptureConstraints,
    ) -> Result<CaptureId, DeviceAcquisitionError> {
        let mut state = self.state.lock();
        if let Some(err) = state.fail_next.take() {
            return Err(err);
        }
        state.next_capture += 1;
        let id = CaptureId(state.next_capture);
        state.captures.insert(id);
        state.events.push(Event::Acquire(id, constraints.clone()));
        Ok(id)
    }

    fn release_capture(&self, capture: CaptureId) {
        let mut state = self.state.lock();
        state.captures.remove(&capture);
        state.events.push(Event::Release(capture));
    }

    fn create_node(&self, spec: NodeSpec) -> NodeId {
        let mut state = self.state.lock();
        state.next_node += 1;
        let id = NodeId(state.next_node);
        if let NodeSpec::Analyser { fft_size } = &spec {
            state
                .analysers
                .insert(id, AnalysisTap::new(*fft_size, 48000.0).handle());
        }
        state.live.insert(id);
        state.events.push(Event::Create(id, spec.kind()));
        id
    }

    fn connect(&self, from: NodeId, to: NodeId) {
        self.record(Event::Connect(from, to));
    }

    fn connect_param(&self, from: NodeId, to: NodeId, param: ParamName) {
        self.record(Event::ConnectParam(from, to, param));
    }

    fn disconnect(&self, node: NodeId) {
        let mut state = self.state.lock();
        state.live.remove(&node);
        state.analysers.remove(&node);
        state.events.push(Event::Disconnect(node));
    }

    fn start(&self, node: NodeId) {
        self.record(Event::Start(node));
    }

    fn set_target(&self, node: NodeId, param: ParamName, value: f32, time_constant: f32) {
        self.record(Event::SetTarget {
            node,
            param,
            value,
            time_constant,
        });
    }

    fn set_filter_type(&self, node: NodeId, filter: FilterType) {
        self.record(Event::SetFilterType(node, filter));
    }

    fn set_curve(&self, node: NodeId, curve: Arc<[f32]>) {
        self.record(Event::SetCurve(node, curve.len()));
    }

    fn read_time_domain(&self, node: NodeId, out: &mut [f32]) -> usize {
        if !self.state.lock().analysers.contains_key(&node) {
            return 0;
        }
        let amplitude = 10f32.powf(*self.level_db.lock() / 20.0);
        out.fill(amplitude);
        out.len()
    }

    fn analysis(&self, node: NodeId) -> Option<AnalysisHandle> {
        self.state.lock().analysers.get(&node).cloned()
    }
}
