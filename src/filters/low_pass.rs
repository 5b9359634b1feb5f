//! First-order low-pass stage with a per-sample smoothing factor.

/// First-order low-pass filter
#[derive(Debug, Clone, Default)]
pub struct LowPassFilter {
    last: Option<f64>,
}

impl LowPassFilter {
    #[must_use]
    pub const fn new() -> Self {
        Self { last: None }
    }

    /// Blend `value` into the running output with weight `alpha`.
    /// The first sample passes through.
    pub fn apply(&mut self, value: f64, alpha: f64) -> f64 {
        let filtered = match self.last {
            Some(last) => alpha.mul_add(value - last, last),
            None => value,
        };
        self.last = Some(filtered);
        filtered
    }

    /// Last output, if any sample has been seen
    #[must_use]
    pub const fn last(&self) -> Option<f64> {
        self.last
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}

/// Smoothing factor for a low-pass with cutoff `cutoff` (Hz) sampled every
/// `dt` seconds: `alpha = r / (r + 1)`, `r = 2π·fc·dt`
#[must_use]
pub fn smoothing_factor(dt: f64, cutoff: f64) -> f64 {
    let r = 2.0 * std::f64::consts::PI * cutoff * dt;
    r / (r + 1.0)
}
