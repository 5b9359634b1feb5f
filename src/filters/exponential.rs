use super::SignalFilter;

/// Fixed-factor exponential smoothing:
/// `output = factor * input + (1 - factor) * previous`
pub struct ExponentialFilter {
    factor: f64,
    last: Option<f64>,
}

impl ExponentialFilter {
    /// # Panics
    ///
    /// Panics if factor is not in the range (0, 1]
    #[must_use]
    pub fn new(factor: f64) -> Self {
        assert!(factor > 0.0 && factor <= 1.0, "Factor must be in (0, 1]");
        Self { factor, last: None }
    }
}

impl SignalFilter for ExponentialFilter {
    fn apply(&mut self, value: f64, _timestamp: f64) -> f64 {
        let filtered = match self.last {
            Some(last) => self.factor * value + (1.0 - self.factor) * last,
            None => value,
        };
        self.last = Some(filtered);
        filtered
    }

    fn reset(&mut self) {
        self.last = None;
    }

    fn name(&self) -> &str {
        "ExponentialFilter"
    }
}
