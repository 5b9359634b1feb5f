//! Small numeric helpers shared by segmentation and scoring.

/// Summary statistics of a sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Statistics {
    pub mean: f64,
    /// Sample (n-1) standard deviation; 0 for a single value
    pub std_dev: f64,
}

/// Arithmetic mean, or `None` for an empty slice
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn mean(data: &[f64]) -> Option<f64> {
    (!data.is_empty()).then(|| data.iter().sum::<f64>() / data.len() as f64)
}

/// Sample standard deviation with Bessel's correction.
///
/// A single value has no spread and yields `Some(0.0)`.
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn sample_std_dev(data: &[f64]) -> Option<f64> {
    let mean = mean(data)?;
    if data.len() < 2 {
        return Some(0.0);
    }
    let variance = data.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (data.len() - 1) as f64;
    Some(variance.sqrt())
}

/// Mean and sample spread, or `None` for an empty slice
#[must_use]
pub fn statistics(data: &[f64]) -> Option<Statistics> {
    Some(Statistics {
        mean: mean(data)?,
        std_dev: sample_std_dev(data)?,
    })
}
