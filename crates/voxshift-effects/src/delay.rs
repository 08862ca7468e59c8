//! Block delay for feedback cycles.
//!
//! A feedback loop (delay → gain → back into the delay) can only be rendered
//! block by block if the delay's output for the current block is known before
//! its input is. [`DelayNode`] therefore splits processing in two:
//! [`read_block`](DelayNode::read_block) produces output from history alone,
//! then [`write_block`](DelayNode::write_block) appends the new input. This
//! requires the delay time to be at least one block, which
//! [`DelayNode::new`] enforces through `min_delay_samples`.

use voxshift_core::{DelayLine, SmoothedParam, flush_denormal};

/// Delay node with a smoothed delay time in seconds.
///
/// # Example
///
/// ```rust
/// use voxshift_effects::DelayNode;
///
/// let mut delay = DelayNode::new(48000.0, 1.0, 4.0 / 48000.0, 4);
/// let mut out = [0.0; 4];
/// delay.read_block(&mut out);
/// delay.write_block(&[1.0, 0.0, 0.0, 0.0]);
/// delay.read_block(&mut out);
/// assert_eq!(out, [1.0, 0.0, 0.0, 0.0]);
/// ```
#[derive(Debug, Clone)]
pub struct DelayNode {
    line: DelayLine,
    delay_time: SmoothedParam,
    sample_rate: f32,
    min_delay_samples: f32,
}

impl DelayNode {
    /// Create a delay holding up to `max_seconds`, starting at
    /// `delay_seconds`. The effective delay never drops below
    /// `min_delay_samples`.
    pub fn new(
        sample_rate: f32,
        max_seconds: f32,
        delay_seconds: f32,
        min_delay_samples: usize,
    ) -> Self {
        let capacity_seconds = max_seconds.max((min_delay_samples + 1) as f32 / sample_rate);
        Self {
            line: DelayLine::from_time(sample_rate, capacity_seconds),
            delay_time: SmoothedParam::with_time_constant(delay_seconds, sample_rate, 0.0),
            sample_rate,
            min_delay_samples: min_delay_samples.max(1) as f32,
        }
    }

    /// Delay time in seconds.
    pub fn delay_time_mut(&mut self) -> &mut SmoothedParam {
        &mut self.delay_time
    }

    /// Current smoothed delay time in seconds.
    pub fn delay_time(&self) -> f32 {
        self.delay_time.get()
    }

    /// Produce the next block of output from already-written samples.
    pub fn read_block(&mut self, output: &mut [f32]) {
        let max = self.line.capacity() as f32;
        for (i, out) in output.iter_mut().enumerate() {
            let delay = (self.delay_time.advance() * self.sample_rate)
                .clamp(self.min_delay_samples, max);
            // Sample i of this block is (delay - i) writes behind once the
            // block has been written; i writes have not happened yet.
            *out = self.line.read((delay - i as f32).max(1.0));
        }
    }

    /// Append the block's input to the line.
    pub fn write_block(&mut self, input: &[f32]) {
        for &x in input {
            self.line.write(flush_denormal(x));
        }
    }

    /// Clear the delay line.
    pub fn reset(&mut self) {
        self.line.clear();
        self.delay_time.snap_to_target();
    }
}
