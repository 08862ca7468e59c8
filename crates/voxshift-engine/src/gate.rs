//! Noise-gate monitor.
//!
//! The gate node is a plain gain. A control loop outside the audio thread
//! opens it (target 1) while the pre-gate signal is louder than the threshold
//! and closes it (target 0) otherwise. The threshold lives in a
//! [`GateThreshold`] shared with the session, so changes reach the loop on its
//! next cycle.
//!
//! [`GateCycle`] is one measurement and decision; [`GateMonitor`] runs cycles
//! on a dedicated thread at display-frame cadence until stopped.

use crate::host::{AudioHost, NodeId, ParamName};
use crossbeam_channel::{Sender, bounded};
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use voxshift_analysis::{DEFAULT_FFT_SIZE, block_level_db};
use voxshift_core::DEFAULT_TIME_CONSTANT;

/// Threshold used until one is set, dBFS.
pub const DEFAULT_GATE_THRESHOLD_DB: f32 = -50.0;

/// Time between gate decisions (one 60 Hz display frame).
pub const MONITOR_INTERVAL: Duration = Duration::from_micros(16_667);

/// Shared, lock-free gate threshold in dB.
///
/// ```rust
/// use voxshift_engine::GateThreshold;
///
/// let threshold = GateThreshold::default();
/// let monitor_view = threshold.clone();
/// threshold.set(-35.0);
/// assert_eq!(monitor_view.get(), -35.0);
/// ```
#[derive(Debug, Clone)]
pub struct GateThreshold(Arc<AtomicU32>);

impl GateThreshold {
    /// A threshold starting at `db`.
    pub fn new(db: f32) -> Self {
        Self(Arc::new(AtomicU32::new(db.to_bits())))
    }

    /// Current threshold, dB.
    pub fn get(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Relaxed))
    }

    /// Store a new threshold, dB.
    pub fn set(&self, db: f32) {
        self.0.store(db.to_bits(), Ordering::Relaxed);
    }
}

impl Default for GateThreshold {
    fn default() -> Self {
        Self::new(DEFAULT_GATE_THRESHOLD_DB)
    }
}

/// Gate gain target for a measured level: open strictly above the threshold.
///
/// ```rust
/// use voxshift_engine::gate_target;
///
/// assert_eq!(gate_target(-40.0, -50.0), 1.0);
/// assert_eq!(gate_target(-50.0, -50.0), 0.0);
/// ```
pub fn gate_target(level_db: f32, threshold_db: f32) -> f32 {
    if level_db > threshold_db { 1.0 } else { 0.0 }
}

/// One gate measurement and decision against a host.
pub struct GateCycle<H: AudioHost + ?Sized> {
    host: Arc<H>,
    key: NodeId,
    gate: NodeId,
    threshold: GateThreshold,
    frame: Vec<f32>,
    last_target: Option<f32>,
}

impl<H: AudioHost + ?Sized> GateCycle<H> {
    /// Measure `key` (an analyser) and drive the gain of `gate`.
    pub fn new(host: Arc<H>, key: NodeId, gate: NodeId, threshold: GateThreshold) -> Self {
        Self {
            host,
            key,
            gate,
            threshold,
            frame: vec![0.0; DEFAULT_FFT_SIZE],
            last_target: None,
        }
    }

    /// Run one cycle and return the target scheduled on the gate.
    ///
    /// The target is re-scheduled every cycle, even when unchanged.
    pub fn run_once(&mut self) -> f32 {
        let count = self.host.read_time_domain(self.key, &mut self.frame);
        let level_db = block_level_db(&self.frame[..count]);
        let threshold_db = self.threshold.get();
        let target = gate_target(level_db, threshold_db);
        self.host
            .set_target(self.gate, ParamName::Gain, target, DEFAULT_TIME_CONSTANT);
        if self.last_target != Some(target) {
            tracing::debug!(
                level_db,
                threshold_db,
                open = target > 0.5,
                "noise gate changed"
            );
            self.last_target = Some(target);
        }
        target
    }

    /// The most recent target, if a cycle has run.
    pub fn last_target(&self) -> Option<f32> {
        self.last_target
    }
}

impl<H: AudioHost + ?Sized> std::fmt::Debug for GateCycle<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GateCycle")
            .field("key", &self.key)
            .field("gate", &self.gate)
            .field("threshold_db", &self.threshold.get())
            .field("last_target", &self.last_target)
            .finish_non_exhaustive()
    }
}

/// A [`GateCycle`] running periodically on its own thread.
///
/// Dropping the monitor stops it.
#[derive(Debug)]
pub struct GateMonitor {
    cancel: Option<Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl GateMonitor {
    /// Start running `cycle` every `interval`.
    pub fn spawn<H: AudioHost + ?Sized + 'static>(
        mut cycle: GateCycle<H>,
        interval: Duration,
    ) -> std::io::Result<Self> {
        let (cancel, cancelled) = bounded::<()>(1);
        let thread = thread::Builder::new()
            .name("voxshift-gate".into())
            .spawn(move || {
                // Either a stop message or a dropped sender ends the loop.
                while let Err(crossbeam_channel::RecvTimeoutError::Timeout) =
                    cancelled.recv_timeout(interval)
                {
                    cycle.run_once();
                }
            })?;
        tracing::debug!(interval_ms = interval.as_secs_f32() * 1000.0, "gate monitor started");
        Ok(Self {
            cancel: Some(cancel),
            thread: Some(thread),
        })
    }

    /// Stop the loop and wait for it. No cycle runs after this returns.
    pub fn stop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            let _ = cancel.try_send(());
        }
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                tracing::warn!("gate monitor thread panicked");
            } else {
                tracing::debug!("gate monitor stopped");
            }
        }
    }

    /// True until [`stop`](Self::stop) has been called.
    pub fn is_running(&self) -> bool {
        self.thread.is_some()
    }
}

impl Drop for GateMonitor {
    fn drop(&mut self) {
        self.stop();
    }
}
