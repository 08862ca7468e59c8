//! Biquad filter node with smoothed controls.
//!
//! Cutoff, Q and gain are [`SmoothedParam`]s. While any of them is still
//! moving, coefficients are recomputed every [`COEFF_INTERVAL`] samples; once
//! all are settled the filter runs on cached coefficients.
//!
//! Changing the response type switches the design immediately. Filter state
//! is kept, so the switch does not reset the history.

use voxshift_core::{Biquad, Effect, FilterType, SmoothedParam, coefficients};

/// Samples between coefficient updates while a control is ramping.
pub const COEFF_INTERVAL: usize = 16;

/// Biquad node.
///
/// # Example
///
/// ```rust
/// use voxshift_core::{Effect, FilterType};
/// use voxshift_effects::FilterNode;
///
/// let mut shelf = FilterNode::new(44100.0, FilterType::HighShelf, 8000.0, 1.0, 0.0);
/// shelf.gain_db_mut().set_target_at(6.0, 0.05);
/// let out = shelf.process(0.1);
/// assert!(out.is_finite());
/// ```
#[derive(Debug, Clone)]
pub struct FilterNode {
    biquad: Biquad,
    filter_type: FilterType,
    frequency: SmoothedParam,
    q: SmoothedParam,
    gain_db: SmoothedParam,
    sample_rate: f32,
    countdown: usize,
}

impl FilterNode {
    /// Create a filter with the given response and initial controls.
    pub fn new(
        sample_rate: f32,
        filter_type: FilterType,
        frequency: f32,
        q: f32,
        gain_db: f32,
    ) -> Self {
        let mut node = Self {
            biquad: Biquad::new(),
            filter_type,
            frequency: SmoothedParam::with_time_constant(frequency, sample_rate, 0.0),
            q: SmoothedParam::with_time_constant(q, sample_rate, 0.0),
            gain_db: SmoothedParam::with_time_constant(gain_db, sample_rate, 0.0),
            sample_rate,
            countdown: 0,
        };
        node.update_coefficients();
        node
    }

    /// Current response type.
    pub fn filter_type(&self) -> FilterType {
        self.filter_type
    }

    /// Switch the response type.
    pub fn set_filter_type(&mut self, filter_type: FilterType) {
        if self.filter_type != filter_type {
            self.filter_type = filter_type;
            self.update_coefficients();
        }
    }

    /// Cutoff or center frequency in Hz.
    pub fn frequency_mut(&mut self) -> &mut SmoothedParam {
        self.countdown = 0;
        &mut self.frequency
    }

    /// Quality factor.
    pub fn q_mut(&mut self) -> &mut SmoothedParam {
        self.countdown = 0;
        &mut self.q
    }

    /// Gain in dB (peaking and shelf responses).
    pub fn gain_db_mut(&mut self) -> &mut SmoothedParam {
        self.countdown = 0;
        &mut self.gain_db
    }

    /// Current (smoothed) cutoff in Hz.
    pub fn frequency(&self) -> f32 {
        self.frequency.get()
    }

    fn settled(&self) -> bool {
        self.frequency.is_settled() && self.q.is_settled() && self.gain_db.is_settled()
    }

    fn update_coefficients(&mut self) {
        self.biquad.set_coefficient_tuple(coefficients(
            self.filter_type,
            self.frequency.get(),
            self.q.get(),
            self.gain_db.get(),
            self.sample_rate,
        ));
    }
}

impl Effect for FilterNode {
    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        if !self.settled() {
            self.frequency.advance();
            self.q.advance();
            self.gain_db.advance();
            if self.countdown == 0 {
                self.update_coefficients();
                self.countdown = COEFF_INTERVAL;
            }
            self.countdown -= 1;
        } else if self.countdown != usize::MAX {
            // Final update once everything has landed.
            self.update_coefficients();
            self.countdown = usize::MAX;
        }
        self.biquad.process(input)
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.frequency.set_sample_rate(sample_rate);
        self.q.set_sample_rate(sample_rate);
        self.gain_db.set_sample_rate(sample_rate);
        self.update_coefficients();
    }

    fn reset(&mut self) {
        self.biquad.clear();
        self.frequency.snap_to_target();
        self.q.snap_to_target();
        self.gain_db.snap_to_target();
        self.update_coefficients();
    }
}
