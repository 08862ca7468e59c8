//! Delay line for the echo path.
//!
//! A circular buffer read at a fractional position with linear interpolation,
//! so the delay time can glide without zipper noise.

/// Interpolated delay line using a circular buffer.
///
/// The buffer is allocated once at construction; reads and writes never
/// allocate.
///
/// # Example
///
/// ```rust
/// use voxshift_core::DelayLine;
///
/// let mut delay = DelayLine::from_time(44100.0, 1.0);
/// delay.write(1.0);
/// delay.write(0.0);
/// assert_eq!(delay.read(1.0), 0.0);
/// assert_eq!(delay.read(2.0), 1.0);
/// ```
#[derive(Debug, Clone)]
pub struct DelayLine {
    buffer: Vec<f32>,
    write_pos: usize,
}

impl DelayLine {
    /// Creates a delay line holding up to `max_delay_samples` samples.
    ///
    /// # Panics
    ///
    /// Panics if `max_delay_samples` is 0.
    pub fn new(max_delay_samples: usize) -> Self {
        assert!(max_delay_samples > 0, "Delay size must be > 0");
        Self {
            buffer: vec![0.0; max_delay_samples + 1],
            write_pos: 0,
        }
    }

    /// Creates a delay line sized for `max_seconds` at `sample_rate`.
    pub fn from_time(sample_rate: f32, max_seconds: f32) -> Self {
        Self::new(((sample_rate * max_seconds) as usize).max(1))
    }

    /// Reads the sample written `delay_samples` writes ago.
    ///
    /// `read(1.0)` returns the most recently written sample. Values outside
    /// `[1, capacity]` are clamped.
    #[inline]
    pub fn read(&self, delay_samples: f32) -> f32 {
        let len = self.buffer.len();
        let delay = delay_samples.clamp(1.0, (len - 1) as f32);
        let whole = delay as usize;
        let frac = delay - whole as f32;

        let newer = (self.write_pos + len - whole) % len;
        let older = (newer + len - 1) % len;
        crate::lerp(self.buffer[newer], self.buffer[older], frac)
    }

    /// Writes a sample and advances the write position.
    #[inline]
    pub fn write(&mut self, sample: f32) {
        self.buffer[self.write_pos] = sample;
        self.write_pos = (self.write_pos + 1) % self.buffer.len();
    }

    /// Clears the delay line.
    pub fn clear(&mut self) {
        self.buffer.fill(0.0);
        self.write_pos = 0;
    }

    /// Maximum delay in samples.
    pub fn capacity(&self) -> usize {
        self.buffer.len() - 1
    }
}
