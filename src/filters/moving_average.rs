//! Centered moving average over a recorded series.
//!
//! Unlike the streaming filters this runs offline over a whole session and
//! is symmetric, so it smooths without shifting extrema in time.

/// Average each present sample with the present samples within
/// `half_window` frames on either side. Absent samples stay absent.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn centered_moving_average(series: &[Option<f64>], half_window: usize) -> Vec<Option<f64>> {
    series
        .iter()
        .enumerate()
        .map(|(i, value)| {
            (*value)?;
            let start = i.saturating_sub(half_window);
            let end = (i + half_window + 1).min(series.len());
            let (sum, count) = series[start..end]
                .iter()
                .flatten()
                .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
            Some(sum / count as f64)
        })
        .collect()
}
