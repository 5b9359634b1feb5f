//! Signal filtering algorithms for stabilizing landmark streams.
//!
//! Every landmark coordinate is an independent scalar channel. A
//! [`LandmarkFilter`] owns one [`SignalFilter`] per landmark per axis and
//! removes frame-to-frame jitter before any geometry is computed.

/// First-order low-pass stage shared by the adaptive filter
pub mod low_pass;

/// Adaptive (speed-aware) low-pass filter
pub mod one_euro;

/// Fixed-factor exponential smoothing
pub mod exponential;

/// Centered moving average for recorded series with gaps
pub mod moving_average;

use crate::constants::{DEFAULT_BETA, DEFAULT_EXPONENTIAL_FACTOR, DEFAULT_MIN_CUTOFF, NUM_POSE_LANDMARKS};
use crate::landmark::{Landmark, PoseLandmarks};
use crate::Result;

/// Trait for all per-channel stabilization filters
pub trait SignalFilter: Send + Sync {
    /// Filter one sample; `timestamp` is in seconds and only needs to be
    /// monotonic within a session
    fn apply(&mut self, value: f64, timestamp: f64) -> f64;

    /// Reset filter state
    fn reset(&mut self);

    /// Get filter name
    fn name(&self) -> &str;
}

/// No-op filter that passes through values unchanged
pub struct NoFilter;

impl SignalFilter for NoFilter {
    fn apply(&mut self, value: f64, _timestamp: f64) -> f64 {
        value
    }

    fn reset(&mut self) {}

    fn name(&self) -> &str {
        "NoFilter"
    }
}

fn parse_param(filter_type: &str, raw: Option<&str>, default: f64) -> Result<f64> {
    match raw {
        None | Some("") => Ok(default),
        Some(s) => s
            .parse::<f64>()
            .map_err(|_| crate::Error::FilterError(format!("Invalid parameter '{s}' in filter spec: {filter_type}"))),
    }
}

/// Create a filter from a spec string such as `"one_euro"`,
/// `"one_euro:1.0:0.3"` or `"exponential:0.5"`
///
/// # Errors
///
/// Returns an error for unknown filter names or unparsable parameters
pub fn create_filter(filter_type: &str) -> Result<Box<dyn SignalFilter>> {
    let lowered = filter_type.to_lowercase();
    let mut parts = lowered.split(':');
    let name = parts.next().unwrap_or_default();
    let first = parts.next();
    let second = parts.next();

    match name {
        "none" | "nofilter" => Ok(Box::new(NoFilter)),
        "exponential" | "ema" => {
            let factor = parse_param(filter_type, first, DEFAULT_EXPONENTIAL_FACTOR)?;
            if !(factor > 0.0 && factor <= 1.0) {
                return Err(crate::Error::FilterError(format!(
                    "Exponential factor must be in (0, 1], got {factor}"
                )));
            }
            Ok(Box::new(exponential::ExponentialFilter::new(factor)))
        }
        "one_euro" | "oneeuro" | "adaptive" => {
            let min_cutoff = parse_param(filter_type, first, DEFAULT_MIN_CUTOFF)?;
            let beta = parse_param(filter_type, second, DEFAULT_BETA)?;
            if min_cutoff <= 0.0 || beta < 0.0 {
                return Err(crate::Error::FilterError(format!(
                    "Invalid one euro parameters: min_cutoff={min_cutoff}, beta={beta}"
                )));
            }
            Ok(Box::new(one_euro::OneEuroFilter::new(min_cutoff, beta)))
        }
        _ => Err(crate::Error::FilterError(format!("Unknown filter type: {filter_type}"))),
    }
}

/// Per-landmark, per-axis filter bank for one coordinate space
pub struct LandmarkFilter {
    channels: Vec<[Box<dyn SignalFilter>; 3]>,
}

impl LandmarkFilter {
    /// Build a bank with one fresh filter per channel
    pub fn new<F>(mut factory: F) -> Self
    where
        F: FnMut() -> Box<dyn SignalFilter>,
    {
        let channels = (0..NUM_POSE_LANDMARKS)
            .map(|_| std::array::from_fn(|_| factory()))
            .collect();
        Self { channels }
    }

    /// Build a bank from a filter spec string
    ///
    /// # Errors
    ///
    /// Returns an error if the spec is not a known filter
    pub fn from_spec(filter_type: &str) -> Result<Self> {
        // Validate once so the factory below cannot fail
        create_filter(filter_type)?;
        Ok(Self::new(|| create_filter(filter_type).unwrap_or_else(|_| Box::new(NoFilter) as Box<dyn SignalFilter>)))
    }

    /// Filter every reported landmark; missing landmarks stay missing and
    /// leave their channel history untouched. Confidence passes through.
    pub fn apply(&mut self, pose: &PoseLandmarks, timestamp: f64) -> PoseLandmarks {
        let mut out = PoseLandmarks::empty();
        for (index, (slot, channel)) in pose.iter().zip(self.channels.iter_mut()).enumerate() {
            if let Some(lm) = slot {
                let [fx, fy, fz] = channel;
                out.set(
                    index,
                    Some(Landmark::new(
                        fx.apply(lm.x, timestamp),
                        fy.apply(lm.y, timestamp),
                        fz.apply(lm.z, timestamp),
                        lm.confidence,
                    )),
                );
            }
        }
        out
    }

    /// Clear the history of every channel
    pub fn reset(&mut self) {
        for channel in &mut self.channels {
            for filter in channel.iter_mut() {
                filter.reset();
            }
        }
    }

    /// Name of the underlying filter
    #[must_use]
    pub fn name(&self) -> &str {
        self.channels.first().map_or("NoFilter", |c| c[0].name())
    }
}
