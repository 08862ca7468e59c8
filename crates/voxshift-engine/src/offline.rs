//! Synchronous host for rendering buffers.
//!
//! [`OfflineHost`] keeps its [`RenderGraph`] behind a mutex and applies every
//! operation immediately. Audio only moves when [`OfflineHost::render`] is
//! called, which makes it the host for file rendering and for tests that
//! need deterministic output.

use crate::DeviceAcquisitionError;
use crate::host::{AudioHost, CaptureId, NodeId, NodeSpec, ParamName};
use crate::render::{GraphCommand, NodeProcessor, RENDER_QUANTUM, RenderGraph};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use voxshift_analysis::AnalysisHandle;
use voxshift_core::FilterType;
use voxshift_io::CaptureConstraints;

/// Host that renders on demand.
///
/// # Example
///
/// ```rust
/// use voxshift_engine::{AudioHost, NodeSpec, OfflineHost};
/// use voxshift_io::CaptureConstraints;
///
/// let host = OfflineHost::new(44100.0);
/// let capture = host.acquire_capture(&CaptureConstraints::default()).unwrap();
/// let src = host.create_node(NodeSpec::Source { capture });
/// let gain = host.create_node(NodeSpec::Gain { gain: 0.5 });
/// let out = host.create_node(NodeSpec::Destination);
/// host.connect(src, gain);
/// host.connect(gain, out);
///
/// let rendered = host.render(&[1.0; 200]);
/// assert_eq!(rendered.len(), 200);
/// assert_eq!(rendered[0], 0.5);
/// ```
#[derive(Debug)]
pub struct OfflineHost {
    sample_rate: f32,
    graph: Mutex<RenderGraph>,
    analysers: Mutex<HashMap<NodeId, AnalysisHandle>>,
    captures: Mutex<HashMap<CaptureId, CaptureConstraints>>,
    devices: Option<Vec<String>>,
    apply_agc: bool,
    next_node: AtomicU32,
    next_capture: AtomicU32,
}

impl OfflineHost {
    /// A host accepting any capture device, without input AGC.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            sample_rate,
            graph: Mutex::new(RenderGraph::new(sample_rate)),
            analysers: Mutex::new(HashMap::new()),
            captures: Mutex::new(HashMap::new()),
            devices: None,
            apply_agc: false,
            next_node: AtomicU32::new(1),
            next_capture: AtomicU32::new(1),
        }
    }

    /// Only accept captures naming one of `devices` (or no device).
    pub fn with_devices<I, S>(mut self, devices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.devices = Some(devices.into_iter().map(Into::into).collect());
        self
    }

    /// Run the source AGC when a capture asks for it.
    ///
    /// Off by default: files are usually already levelled, and the AGC's
    /// slow ramp makes short renders hard to reason about.
    pub fn with_input_agc(mut self, enabled: bool) -> Self {
        self.apply_agc = enabled;
        self
    }

    /// Number of open captures.
    pub fn open_captures(&self) -> usize {
        self.captures.lock().len()
    }

    /// Number of live nodes.
    pub fn node_count(&self) -> usize {
        self.graph.lock().node_count()
    }

    /// Render `input` through the graph and return the destination output.
    ///
    /// A trailing partial quantum is padded with silence; the result has the
    /// same length as `input`.
    pub fn render(&self, input: &[f32]) -> Vec<f32> {
        let mut output = Vec::with_capacity(input.len());
        let mut graph = self.graph.lock();
        let mut block_in = [0.0; RENDER_QUANTUM];
        let mut block_out = [0.0; RENDER_QUANTUM];
        for chunk in input.chunks(RENDER_QUANTUM) {
            block_in[..chunk.len()].copy_from_slice(chunk);
            block_in[chunk.len()..].fill(0.0);
            graph.render_quantum(&block_in, &mut block_out);
            output.extend_from_slice(&block_out[..chunk.len()]);
        }
        output
    }

    /// Render `frames` of silent input.
    pub fn render_silence(&self, frames: usize) -> Vec<f32> {
        self.render(&vec![0.0; frames])
    }

    fn apply(&self, command: GraphCommand) {
        self.graph.lock().apply(command);
    }
}

impl AudioHost for OfflineHost {
    fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    fn acquire_capture(
        &self,
        constraints: &CaptureConstraints,
    ) -> Result<CaptureId, DeviceAcquisitionError> {
        if let (Some(devices), Some(wanted)) = (&self.devices, &constraints.device) {
            if devices.is_empty() {
                return Err(DeviceAcquisitionError::NoDevice);
            }
            if !devices.iter().any(|d| d == wanted) {
                return Err(DeviceAcquisitionError::DeviceNotFound(wanted.clone()));
            }
        }
        let id = CaptureId(self.next_capture.fetch_add(1, Ordering::Relaxed));
        self.captures.lock().insert(id, constraints.clone());
        tracing::debug!(capture = id.0, "offline capture opened");
        Ok(id)
    }

    fn release_capture(&self, capture: CaptureId) {
        if self.captures.lock().remove(&capture).is_some() {
            tracing::debug!(capture = capture.0, "offline capture closed");
        }
    }

    fn create_node(&self, spec: NodeSpec) -> NodeId {
        let id = NodeId(self.next_node.fetch_add(1, Ordering::Relaxed));
        let auto_gain = match &spec {
            NodeSpec::Source { capture } => {
                self.apply_agc
                    && self
                        .captures
                        .lock()
                        .get(capture)
                        .is_some_and(|c| c.auto_gain_control)
            }
            _ => false,
        };
        let processor = NodeProcessor::from_spec(&spec, self.sample_rate, auto_gain);
        if let Some(handle) = processor.analysis_handle() {
            self.analysers.lock().insert(id, handle);
        }
        self.apply(GraphCommand::Insert {
            id,
            processor: Box::new(processor),
        });
        id
    }

    fn connect(&self, from: NodeId, to: NodeId) {
        self.apply(GraphCommand::Connect { from, to });
    }

    fn connect_param(&self, from: NodeId, to: NodeId, param: ParamName) {
        self.apply(GraphCommand::ConnectParam { from, to, param });
    }

    fn disconnect(&self, node: NodeId) {
        self.analysers.lock().remove(&node);
        self.apply(GraphCommand::Disconnect(node));
    }

    fn start(&self, node: NodeId) {
        self.apply(GraphCommand::Start(node));
    }

    fn set_target(&self, node: NodeId, param: ParamName, value: f32, time_constant: f32) {
        self.apply(GraphCommand::SetTarget {
            node,
            param,
            value,
            time_constant,
        });
    }

    fn set_filter_type(&self, node: NodeId, filter: FilterType) {
        self.apply(GraphCommand::SetFilterType { node, filter });
    }

    fn set_curve(&self, node: NodeId, curve: Arc<[f32]>) {
        self.apply(GraphCommand::SetCurve { node, curve });
    }

    fn read_time_domain(&self, node: NodeId, out: &mut [f32]) -> usize {
        self.analysers
            .lock()
            .get(&node)
            .map_or(0, |handle| handle.time_domain(out))
    }

    fn analysis(&self, node: NodeId) -> Option<AnalysisHandle> {
        self.analysers.lock().get(&node).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_device_is_rejected() {
        let host = OfflineHost::new(44100.0).with_devices(["Desk Mic"]);
        let err = host
            .acquire_capture(&CaptureConstraints::voice(Some("Headset")))
            .unwrap_err();
        assert!(matches!(err, DeviceAcquisitionError::DeviceNotFound(ref d) if d == "Headset"));
        assert!(host.acquire_capture(&CaptureConstraints::voice(Some("Desk Mic"))).is_ok());
        assert!(host.acquire_capture(&CaptureConstraints::voice(None)).is_ok());
        assert_eq!(host.open_captures(), 2);
    }

    #[test]
    fn no_devices_means_no_device() {
        let host = OfflineHost::new(44100.0).with_devices(Vec::<String>::new());
        let err = host
            .acquire_capture(&CaptureConstraints::voice(Some("anything")))
            .unwrap_err();
        assert!(matches!(err, DeviceAcquisitionError::NoDevice));
    }

    #[test]
    fn analyser_reads_what_passed_through() {
        let host = OfflineHost::new(44100.0);
        let capture = host.acquire_capture(&CaptureConstraints::default()).unwrap();
        let src = host.create_node(NodeSpec::Source { capture });
        let tap = host.create_node(NodeSpec::Analyser { fft_size: 256 });
        host.connect(src, tap);
        host.render(&[0.5; 512]);

        let mut frame = [0.0; 256];
        assert_eq!(host.read_time_domain(tap, &mut frame), 256);
        assert!(frame.iter().all(|&s| s == 0.5));
        assert_eq!(host.read_time_domain(src, &mut frame), 0);

        host.disconnect(tap);
        assert!(host.analysis(tap).is_none());
    }

    #[test]
    fn input_agc_lifts_quiet_capture_only_when_enabled() {
        let render_quiet = |host: OfflineHost| {
            let capture = host.acquire_capture(&CaptureConstraints::voice(None)).unwrap();
            let src = host.create_node(NodeSpec::Source { capture });
            let dest = host.create_node(NodeSpec::Destination);
            host.connect(src, dest);
            let quiet: Vec<f32> = (0..88_200)
                .map(|i| if i % 2 == 0 { 0.01 } else { -0.01 })
                .collect();
            let out = host.render(&quiet);
            out[out.len() - 1].abs()
        };
        assert!((render_quiet(OfflineHost::new(44100.0)) - 0.01).abs() < 1e-6);
        assert!(render_quiet(OfflineHost::new(44100.0).with_input_agc(true)) > 0.05);
    }
}
