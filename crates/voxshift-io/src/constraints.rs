//! Capture stream constraints.

/// Processing requested from the platform when opening a microphone.
///
/// Hosts honour what they can: the native host runs its own automatic gain
/// control in the source node and has no echo canceller or noise suppressor
/// to switch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureConstraints {
    /// Exact device to capture from; `None` takes the default input.
    pub device: Option<String>,
    /// Level the input before it reaches the graph.
    pub auto_gain_control: bool,
    /// Platform noise suppression. The graph gates noise itself.
    pub noise_suppression: bool,
    /// Platform acoustic echo cancellation.
    pub echo_cancellation: bool,
}

impl CaptureConstraints {
    /// Constraints for a voice-changing session.
    ///
    /// ```rust
    /// use voxshift_io::CaptureConstraints;
    ///
    /// let c = CaptureConstraints::voice(Some("USB Mic"));
    /// assert!(c.auto_gain_control && c.echo_cancellation);
    /// assert!(!c.noise_suppression);
    /// ```
    pub fn voice(device: Option<&str>) -> Self {
        Self {
            device: device.map(str::to_owned),
            auto_gain_control: true,
            noise_suppression: false,
            echo_cancellation: true,
        }
    }
}

impl Default for CaptureConstraints {
    fn default() -> Self {
        Self::voice(None)
    }
}
