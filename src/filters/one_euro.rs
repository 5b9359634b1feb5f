use super::low_pass::{smoothing_factor, LowPassFilter};
use super::SignalFilter;
use crate::constants::DEFAULT_DERIVATIVE_CUTOFF;

/// Adaptive low-pass filter whose cutoff rises with signal speed:
/// `cutoff = min_cutoff + beta * |rate|`. Slow drift is smoothed hard while
/// fast motion is tracked with little lag.
pub struct OneEuroFilter {
    min_cutoff: f64,
    beta: f64,
    derivative_cutoff: f64,
    value: LowPassFilter,
    rate: LowPassFilter,
    last_raw: Option<f64>,
    last_time: Option<f64>,
}

impl OneEuroFilter {
    /// Create a new adaptive filter
    ///
    /// # Panics
    ///
    /// Panics if `min_cutoff` is not positive or `beta` is negative
    #[must_use]
    pub fn new(min_cutoff: f64, beta: f64) -> Self {
        Self::with_derivative_cutoff(min_cutoff, beta, DEFAULT_DERIVATIVE_CUTOFF)
    }

    /// Create a new adaptive filter with an explicit cutoff for the rate estimate
    ///
    /// # Panics
    ///
    /// Panics if a cutoff is not positive or `beta` is negative
    #[must_use]
    pub fn with_derivative_cutoff(min_cutoff: f64, beta: f64, derivative_cutoff: f64) -> Self {
        assert!(min_cutoff > 0.0, "Cutoff frequency must be positive");
        assert!(derivative_cutoff > 0.0, "Cutoff frequency must be positive");
        assert!(beta >= 0.0, "Beta must be non-negative");
        Self {
            min_cutoff,
            beta,
            derivative_cutoff,
            value: LowPassFilter::new(),
            rate: LowPassFilter::new(),
            last_raw: None,
            last_time: None,
        }
    }
}

impl SignalFilter for OneEuroFilter {
    fn apply(&mut self, value: f64, timestamp: f64) -> f64 {
        let (Some(last_time), Some(last_raw)) = (self.last_time, self.last_raw) else {
            self.last_time = Some(timestamp);
            self.last_raw = Some(value);
            return self.value.apply(value, 1.0);
        };

        let dt = timestamp - last_time;
        if !(dt > 0.0) {
            // Repeated or reordered timestamp: no rate can be computed
            return self.value.last().unwrap_or(value);
        }

        let raw_rate = (value - last_raw) / dt;
        let rate = self.rate.apply(raw_rate, smoothing_factor(dt, self.derivative_cutoff));
        let cutoff = self.beta.mul_add(rate.abs(), self.min_cutoff);
        let filtered = self.value.apply(value, smoothing_factor(dt, cutoff));

        self.last_time = Some(timestamp);
        self.last_raw = Some(value);
        filtered
    }

    fn reset(&mut self) {
        self.value.reset();
        self.rate.reset();
        self.last_raw = None;
        self.last_time = None;
    }

    fn name(&self) -> &str {
        "OneEuroFilter"
    }
}
