//! Live host on an [`AudioBackend`].
//!
//! The [`RenderGraph`] lives inside the output stream's callback. Control
//! calls become [`GraphCommand`]s on a bounded channel that the callback
//! drains at every quantum boundary, so the audio thread never waits on a
//! lock. Control calls never wait either: when the callback stops draining
//! (device unplugged, stream stalled) commands are dropped and counted. Capture streams push mono blocks through a second channel that the
//! source nodes read.
//!
//! ```text
//!  control thread ──GraphCommand──▶ ┌──────────────────────┐
//!                                   │ output callback      │──▶ speakers / virtual cable
//!  mic callback ─────Block────────▶ │   RenderGraph        │
//!                                   └──────────────────────┘
//! ```

use crate::DeviceAcquisitionError;
use crate::error::RenderError;
use crate::host::{AudioHost, CaptureId, NodeId, NodeSpec, ParamName};
use crate::render::{Block, GraphCommand, NodeProcessor, RENDER_QUANTUM, RenderGraph};
use crossbeam_channel::{Receiver, Sender, TrySendError, bounded};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use voxshift_analysis::AnalysisHandle;
use voxshift_core::FilterType;
use voxshift_io::{AudioBackend, BackendStreamConfig, CaptureConstraints, StreamHandle};

/// Commands queued for the output callback; further commands are dropped.
const COMMAND_CAPACITY: usize = 1024;
/// Capture blocks buffered between the mic and output callbacks.
const CAPTURE_CAPACITY: usize = 16;
/// Capture backlog the output callback lets build up before skipping ahead.
const MAX_CAPTURE_BACKLOG: usize = 4;

/// Stream settings for a [`NativeHost`].
#[derive(Debug, Clone)]
pub struct NativeConfig {
    /// Sample rate for both capture and output, Hz.
    pub sample_rate: u32,
    /// Preferred device buffer size, frames.
    pub buffer_size: u32,
    /// Output device; `None` is the system default.
    pub output_device: Option<String>,
}

impl Default for NativeConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            buffer_size: 256,
            output_device: None,
        }
    }
}

struct OpenCapture {
    _stream: StreamHandle,
    auto_gain: bool,
}

/// Real-time host rendering to an output device.
pub struct NativeHost<B: AudioBackend> {
    backend: Mutex<B>,
    config: NativeConfig,
    sample_rate: f32,
    commands: Sender<GraphCommand>,
    capture_tx: Sender<Block>,
    capture_rx: Receiver<Block>,
    dropped_blocks: Arc<AtomicU64>,
    dropped_commands: AtomicU64,
    _output: Mutex<StreamHandle>,
    captures: Mutex<HashMap<CaptureId, OpenCapture>>,
    analysers: Mutex<HashMap<NodeId, AnalysisHandle>>,
    next_node: AtomicU32,
    next_capture: AtomicU32,
}

impl<B: AudioBackend> NativeHost<B> {
    /// Open the output stream and start rendering (silence until nodes are
    /// connected to a destination).
    pub fn new(backend: B, config: NativeConfig) -> Result<Self, RenderError> {
        let output_config = BackendStreamConfig {
            sample_rate: config.sample_rate,
            buffer_size: config.buffer_size,
            channels: 0,
            device_name: config.output_device.clone(),
        };
        let sample_rate = backend.actual_sample_rate(&output_config) as f32;

        let (commands, command_rx) = bounded::<GraphCommand>(COMMAND_CAPACITY);
        let (capture_tx, capture_rx) = bounded::<Block>(CAPTURE_CAPACITY);

        let mut graph = RenderGraph::new(sample_rate);
        let captured = capture_rx.clone();
        let mut rendered = [0.0; RENDER_QUANTUM];
        let mut cursor = RENDER_QUANTUM;
        let output = backend.build_output_stream(
            &output_config,
            Box::new(move |data: &mut [f32], channels: u16| {
                let channels = usize::from(channels.max(1));
                for frame in data.chunks_mut(channels) {
                    if cursor == RENDER_QUANTUM {
                        while let Ok(command) = command_rx.try_recv() {
                            graph.apply(command);
                        }
                        while captured.len() > MAX_CAPTURE_BACKLOG {
                            let _ = captured.try_recv();
                        }
                        let input = captured.try_recv().unwrap_or([0.0; RENDER_QUANTUM]);
                        graph.render_quantum(&input, &mut rendered);
                        cursor = 0;
                    }
                    frame.fill(rendered[cursor]);
                    cursor += 1;
                }
            }),
            Box::new(|err: &str| tracing::warn!(error = err, "output stream error")),
        )?;

        tracing::info!(
            backend = backend.name(),
            sample_rate,
            "native host started"
        );

        Ok(Self {
            backend: Mutex::new(backend),
            config,
            sample_rate,
            commands,
            capture_tx,
            capture_rx,
            dropped_blocks: Arc::new(AtomicU64::new(0)),
            dropped_commands: AtomicU64::new(0),
            _output: Mutex::new(output),
            captures: Mutex::new(HashMap::new()),
            analysers: Mutex::new(HashMap::new()),
            next_node: AtomicU32::new(1),
            next_capture: AtomicU32::new(1),
        })
    }

    /// Capture blocks lost because the output side fell behind.
    pub fn dropped_blocks(&self) -> u64 {
        self.dropped_blocks.load(Ordering::Relaxed)
    }

    /// Control commands lost because the output callback stopped draining.
    pub fn dropped_commands(&self) -> u64 {
        self.dropped_commands.load(Ordering::Relaxed)
    }

    fn send(&self, command: GraphCommand) {
        match self.commands.try_send(command) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                let dropped = self.dropped_commands.fetch_add(1, Ordering::Relaxed) + 1;
                if dropped.is_power_of_two() {
                    tracing::warn!(dropped, "output stream not draining, command dropped");
                }
            }
            Err(TrySendError::Disconnected(_)) => {
                tracing::debug!("output stream gone, command dropped");
            }
        }
    }
}

impl<B: AudioBackend> AudioHost for NativeHost<B> {
    fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    fn acquire_capture(
        &self,
        constraints: &CaptureConstraints,
    ) -> Result<CaptureId, DeviceAcquisitionError> {
        if constraints.noise_suppression || constraints.echo_cancellation {
            tracing::debug!(
                noise_suppression = constraints.noise_suppression,
                echo_cancellation = constraints.echo_cancellation,
                "platform voice processing not available, capturing raw"
            );
        }

        let input_config = BackendStreamConfig {
            sample_rate: self.config.sample_rate,
            buffer_size: self.config.buffer_size,
            channels: 0,
            device_name: constraints.device.clone(),
        };

        let tx = self.capture_tx.clone();
        let dropped = Arc::clone(&self.dropped_blocks);
        let mut block = [0.0; RENDER_QUANTUM];
        let mut fill = 0;
        let stream = self.backend.lock().build_input_stream(
            &input_config,
            Box::new(move |samples: &[f32]| {
                for &s in samples {
                    block[fill] = s;
                    fill += 1;
                    if fill == RENDER_QUANTUM {
                        fill = 0;
                        if let Err(TrySendError::Full(_)) = tx.try_send(block) {
                            dropped.fetch_add(1, Ordering::Relaxed);
                        }
                    }
                }
            }),
            Box::new(|err: &str| tracing::warn!(error = err, "capture stream error")),
        )?;

        let id = CaptureId(self.next_capture.fetch_add(1, Ordering::Relaxed));
        self.captures.lock().insert(
            id,
            OpenCapture {
                _stream: stream,
                auto_gain: constraints.auto_gain_control,
            },
        );
        tracing::info!(
            capture = id.0,
            device = constraints.device.as_deref().unwrap_or("<default>"),
            "capture opened"
        );
        Ok(id)
    }

    fn release_capture(&self, capture: CaptureId) {
        let Some(open) = self.captures.lock().remove(&capture) else {
            return;
        };
        drop(open);
        // Blocks still queued belong to the closed stream.
        while self.capture_rx.try_recv().is_ok() {}
        tracing::info!(
            capture = capture.0,
            dropped_blocks = self.dropped_blocks(),
            "capture closed"
        );
    }

    fn create_node(&self, spec: NodeSpec) -> NodeId {
        let id = NodeId(self.next_node.fetch_add(1, Ordering::Relaxed));
        let auto_gain = match &spec {
            NodeSpec::Source { capture } => self
                .captures
                .lock()
                .get(capture)
                .is_some_and(|c| c.auto_gain),
            _ => false,
        };
        let processor = NodeProcessor::from_spec(&spec, self.sample_rate, auto_gain);
        if let Some(handle) = processor.analysis_handle() {
            self.analysers.lock().insert(id, handle);
        }
        tracing::trace!(node = id.0, kind = spec.kind(), "node created");
        self.send(GraphCommand::Insert {
            id,
            processor: Box::new(processor),
        });
        id
    }

    fn connect(&self, from: NodeId, to: NodeId) {
        self.send(GraphCommand::Connect { from, to });
    }

    fn connect_param(&self, from: NodeId, to: NodeId, param: ParamName) {
        self.send(GraphCommand::ConnectParam { from, to, param });
    }

    fn disconnect(&self, node: NodeId) {
        self.analysers.lock().remove(&node);
        self.send(GraphCommand::Disconnect(node));
    }

    fn start(&self, node: NodeId) {
        self.send(GraphCommand::Start(node));
    }

    fn set_target(&self, node: NodeId, param: ParamName, value: f32, time_constant: f32) {
        self.send(GraphCommand::SetTarget {
            node,
            param,
            value,
            time_constant,
        });
    }

    fn set_filter_type(&self, node: NodeId, filter: FilterType) {
        self.send(GraphCommand::SetFilterType { node, filter });
    }

    fn set_curve(&self, node: NodeId, curve: Arc<[f32]>) {
        self.send(GraphCommand::SetCurve { node, curve });
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

impl<B: AudioBackend> std::fmt::Debug for NativeHost<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeHost")
            .field("sample_rate", &self.sample_rate)
            .field("config", &self.config)
            .field("captures", &self.captures.lock().len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MonitorMode, SessionState, VoiceSession};
    use std::thread;
    use std::time::{Duration, Instant};
    use voxshift_io::{AudioDevice, ErrorCallback, InputCallback, OutputCallback};

    type SharedOutput = Arc<Mutex<Option<OutputCallback>>>;
    type SharedInput = Arc<Mutex<Option<InputCallback>>>;

    /// Backend whose callbacks the test drives by hand.
    #[derive(Default)]
    struct ManualBackend {
        output: SharedOutput,
        input: SharedInput,
        fail_input: Option<fn() -> voxshift_io::Error>,
    }

    impl AudioBackend for ManualBackend {
        fn name(&self) -> &str {
            "manual"
        }

        fn list_devices(&self) -> voxshift_io::Result<Vec<AudioDevice>> {
            Ok(Vec::new())
        }

        fn default_output_device(&self) -> voxshift_io::Result<Option<AudioDevice>> {
            Ok(None)
        }

        fn default_input_device(&self) -> voxshift_io::Result<Option<AudioDevice>> {
            Ok(None)
        }

        fn build_output_stream(
            &self,
            _config: &BackendStreamConfig,
            callback: OutputCallback,
            _error_callback: ErrorCallback,
        ) -> voxshift_io::Result<StreamHandle> {
            *self.output.lock() = Some(callback);
            Ok(StreamHandle::new(()))
        }

        fn build_input_stream(
            &self,
            _config: &BackendStreamConfig,
            callback: InputCallback,
            _error_callback: ErrorCallback,
        ) -> voxshift_io::Result<StreamHandle> {
            if let Some(fail) = self.fail_input {
                return Err(fail());
            }
            *self.input.lock() = Some(callback);
            Ok(StreamHandle::new(()))
        }
    }

    fn pull(output: &SharedOutput, frames: usize) -> Vec<f32> {
        let mut buffer = vec![0.0; frames * 2];
        if let Some(callback) = output.lock().as_mut() {
            callback(&mut buffer, 2);
        }
        buffer
    }

    #[test]
    fn captured_audio_reaches_every_output_channel() {
        let backend = ManualBackend::default();
        let output = Arc::clone(&backend.output);
        let input = Arc::clone(&backend.input);
        let host = NativeHost::new(backend, NativeConfig::default()).unwrap();

        let capture = host.acquire_capture(&CaptureConstraints::voice(None)).unwrap();
        let src = host.create_node(NodeSpec::Source { capture });
        let gain = host.create_node(NodeSpec::Gain { gain: 0.5 });
        let dest = host.create_node(NodeSpec::Destination);
        host.connect(src, gain);
        host.connect(gain, dest);

        if let Some(callback) = input.lock().as_mut() {
            callback(&[0.8; RENDER_QUANTUM]);
        }
        let frames = pull(&output, RENDER_QUANTUM);
        // The AGC starts at unity gain, so the first block is just halved.
        assert!((frames[0] - 0.4).abs() < 1e-3);
        assert_eq!(frames[0], frames[1]);
    }

    #[test]
    fn capture_errors_keep_their_kind() {
        let backend = ManualBackend {
            fail_input: Some(|| voxshift_io::Error::PermissionDenied("mic".into())),
            ..ManualBackend::default()
        };
        let host = NativeHost::new(backend, NativeConfig::default()).unwrap();
        let err = host
            .acquire_capture(&CaptureConstraints::default())
            .unwrap_err();
        assert!(matches!(err, DeviceAcquisitionError::PermissionDenied(_)));
    }

    #[test]
    fn silence_without_capture() {
        let backend = ManualBackend::default();
        let output = Arc::clone(&backend.output);
        let host = NativeHost::new(backend, NativeConfig::default()).unwrap();
        let osc = host.create_node(NodeSpec::Oscillator { frequency: 440.0 });
        let dest = host.create_node(NodeSpec::Destination);
        host.connect(osc, dest);
        assert!(pull(&output, 300).iter().all(|&s| s == 0.0));

        host.start(osc);
        assert!(pull(&output, 300).iter().any(|&s| s.abs() > 0.1));
    }

    #[test]
    fn control_calls_never_wait_on_a_stalled_output() {
        let host =
            Arc::new(NativeHost::new(ManualBackend::default(), NativeConfig::default()).unwrap());
        let osc = host.create_node(NodeSpec::Oscillator { frequency: 0.0 });
        for _ in 0..COMMAND_CAPACITY * 2 {
            host.set_target(osc, ParamName::Frequency, 220.0, 0.05);
        }
        assert!(host.dropped_commands() >= COMMAND_CAPACITY as u64);
    }

    #[test]
    fn stop_returns_while_output_is_stalled() {
        // The output callback is never pulled, so queued commands pile up.
        let host =
            Arc::new(NativeHost::new(ManualBackend::default(), NativeConfig::default()).unwrap());
        let mut session = VoiceSession::with_monitor_mode(
            Arc::clone(&host),
            MonitorMode::Threaded(Duration::from_micros(200)),
        );
        session.initialize(None).unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        while host.dropped_commands() == 0 && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(10));
        }
        assert!(host.dropped_commands() > 0, "gate never filled the queue");

        let (done_tx, done) = bounded(1);
        let stopper = thread::spawn(move || {
            session.stop();
            let _ = done_tx.send(session.state());
        });
        let state = done
            .recv_timeout(Duration::from_secs(3))
            .expect("stop() did not return");
        assert_eq!(state, SessionState::Closed);
        stopper.join().unwrap();
    }
}
