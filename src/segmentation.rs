//! Offline repetition segmentation over a completed session.
//!
//! The pipeline runs once over the whole recording:
//! 1. Hip height per frame (screen space, downward is larger), with gaps
//!    where the hips are not tracked
//! 2. Centered moving average that keeps those gaps
//! 3. Local maxima (deepest points) filtered by prominence and minimum
//!    distance
//! 4. Per-candidate validation: confident leg landmarks and a knee angle
//!    deep enough to be a squat
//! 5. Boundaries at the nearest standing minima on each side, or a fixed
//!    window when none is found
//! 6. Per-rep aggregates over the boundary window
//!
//! The result depends only on the frames and the configuration, so running
//! it twice yields identical reps. An empty result means no valid reps;
//! it is never an error at this level.

use crate::biomechanics::{hip_height, knee_angle, knee_valgus, symmetry_difference};
use crate::config::{BiomechanicsConfig, Config, SegmentationConfig};
use crate::filters::moving_average::centered_moving_average;
use crate::landmark::{Frame, PoseLandmarks, Side};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

/// One validated repetition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rep {
    /// First frame of the rep (standing)
    pub start_frame: usize,
    /// Last frame of the rep (standing)
    pub end_frame: usize,
    /// Deepest frame
    pub trough_frame: usize,
    /// Mean knee angle at the trough (degrees)
    pub depth_angle: f64,
    /// Peak normalized valgus deviation of the left knee
    pub max_left_valgus: f64,
    /// Peak normalized valgus deviation of the right knee
    pub max_right_valgus: f64,
    /// Mean left/right knee angle difference, if ever measurable
    pub symmetry: Option<f64>,
    /// Mean confidence of the leg landmarks over the rep
    pub confidence: f64,
}

impl Rep {
    /// Worse of the two knees
    #[must_use]
    pub fn max_valgus(&self) -> f64 {
        self.max_left_valgus.max(self.max_right_valgus)
    }

    /// Frames spanned, inclusive
    #[must_use]
    pub const fn frame_count(&self) -> usize {
        self.end_frame - self.start_frame + 1
    }

    /// Descent time at a nominal frame rate
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn eccentric_secs(&self, fps: f64) -> f64 {
        (self.trough_frame - self.start_frame) as f64 / fps
    }

    /// Ascent time at a nominal frame rate
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn concentric_secs(&self, fps: f64) -> f64 {
        (self.end_frame - self.trough_frame) as f64 / fps
    }
}

/// Offline repetition detector
#[derive(Debug, Clone)]
pub struct RepSegmenter {
    config: SegmentationConfig,
    biomechanics: BiomechanicsConfig,
}

impl RepSegmenter {
    #[must_use]
    pub const fn new(config: SegmentationConfig, biomechanics: BiomechanicsConfig) -> Self {
        Self { config, biomechanics }
    }

    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.segmentation.clone(), config.biomechanics.clone())
    }

    /// Hip height per frame; `None` where either hip is missing or unreliable
    #[must_use]
    pub fn hip_series(&self, frames: &[Frame]) -> Vec<Option<f64>> {
        frames
            .iter()
            .map(|f| hip_height(&f.screen, self.config.confidence_threshold))
            .collect()
    }

    /// Segment a whole session into validated reps, ordered by frame
    #[must_use]
    pub fn segment(&self, frames: &[Frame]) -> Vec<Rep> {
        let cfg = &self.config;
        if frames.len() < cfg.min_frames {
            warn!(
                "Session too short to segment: {} frames, need {}",
                frames.len(),
                cfg.min_frames
            );
            return Vec::new();
        }

        let raw = self.hip_series(frames);
        let tracked = raw.iter().flatten().count();
        if tracked < cfg.min_tracked_frames {
            warn!(
                "Too few tracked frames to segment: {tracked} of {}, need {}",
                frames.len(),
                cfg.min_tracked_frames
            );
            return Vec::new();
        }

        let smoothed = centered_moving_average(&raw, cfg.smoothing_half_window);
        let troughs = find_troughs(&smoothed, cfg);
        debug!("Trough candidates: {troughs:?}");

        let mut reps: Vec<Rep> = Vec::with_capacity(troughs.len());
        for (k, &trough) in troughs.iter().enumerate() {
            let Some(depth) = self.validate_trough(&frames[trough].world, trough) else {
                continue;
            };

            let left_fence = reps.last().map_or(0, |r: &Rep| r.end_frame + 1);
            let right_fence = troughs.get(k + 1).map_or(frames.len() - 1, |&next| next - 1);
            let Some((start, end)) = self.boundaries(&smoothed, trough, left_fence, right_fence) else {
                debug!("Rejected trough at frame {trough}: no room for rep boundaries");
                continue;
            };

            reps.push(self.aggregate(frames, start, end, trough, depth));
        }

        info!("Segmented {} reps from {} frames", reps.len(), frames.len());
        reps
    }

    /// Depth angle at an acceptable trough, `None` if it must be rejected
    fn validate_trough(&self, world: &PoseLandmarks, trough: usize) -> Option<f64> {
        let threshold = self.config.confidence_threshold;
        if !world.legs_confident(threshold) {
            debug!("Rejected trough at frame {trough}: low leg landmark confidence");
            return None;
        }

        let left = knee_angle(world, Side::Left, threshold);
        let right = knee_angle(world, Side::Right, threshold);
        let depth = match (left, right) {
            (Some(l), Some(r)) => (l + r) / 2.0,
            (Some(a), None) | (None, Some(a)) => a,
            (None, None) => {
                debug!("Rejected trough at frame {trough}: degenerate leg geometry");
                return None;
            }
        };

        if depth > self.config.max_depth_angle {
            debug!(
                "Rejected trough at frame {trough}: knee angle {depth:.1} above ceiling {:.1}",
                self.config.max_depth_angle
            );
            return None;
        }
        Some(depth)
    }

    /// Standing boundaries around `trough`, kept within the fences
    fn boundaries(
        &self,
        smoothed: &[Option<f64>],
        trough: usize,
        left_fence: usize,
        right_fence: usize,
    ) -> Option<(usize, usize)> {
        let budget = self.config.boundary_search_frames();
        let fallback = self.config.fallback_half_window;

        let start = descend(smoothed, trough, Direction::Backward, left_fence, budget)
            .unwrap_or_else(|| trough.saturating_sub(fallback).max(left_fence));
        let end = descend(smoothed, trough, Direction::Forward, right_fence, budget)
            .unwrap_or_else(|| (trough + fallback).min(right_fence));

        (start < end && start <= trough && trough <= end).then_some((start, end))
    }

    #[allow(clippy::cast_precision_loss)]
    fn aggregate(&self, frames: &[Frame], start: usize, end: usize, trough: usize, depth_angle: f64) -> Rep {
        let min_conf = self.biomechanics.landmark_confidence;
        let window = &frames[start..=end];

        let mut max_left_valgus = 0.0_f64;
        let mut max_right_valgus = 0.0_f64;
        let mut symmetry_sum = 0.0;
        let mut symmetry_frames = 0usize;
        let mut confidence_sum = 0.0;

        for frame in window {
            let world = &frame.world;
            max_left_valgus = max_left_valgus.max(knee_valgus(world, Side::Left, min_conf));
            max_right_valgus = max_right_valgus.max(knee_valgus(world, Side::Right, min_conf));

            if let (Some(l), Some(r)) = (
                knee_angle(world, Side::Left, min_conf),
                knee_angle(world, Side::Right, min_conf),
            ) {
                symmetry_sum += symmetry_difference(l, r);
                symmetry_frames += 1;
            }
            confidence_sum += world.leg_confidence();
        }

        Rep {
            start_frame: start,
            end_frame: end,
            trough_frame: trough,
            depth_angle,
            max_left_valgus,
            max_right_valgus,
            symmetry: (symmetry_frames > 0).then(|| symmetry_sum / symmetry_frames as f64),
            confidence: confidence_sum / window.len() as f64,
        }
    }
}

/// Convenience wrapper: segment with a full configuration
#[must_use]
pub fn segment_reps(frames: &[Frame], config: &Config) -> Vec<Rep> {
    RepSegmenter::from_config(config).segment(frames)
}

#[derive(Debug, Clone, Copy)]
enum Direction {
    Backward,
    Forward,
}

/// Walk from `from` while the smoothed value does not rise, stopping at the
/// fence, a gap, or the end of the series. Returns `None` if the walk could
/// not move or was still descending after `budget` steps.
fn descend(
    series: &[Option<f64>],
    from: usize,
    direction: Direction,
    fence: usize,
    budget: usize,
) -> Option<usize> {
    let step = |j: usize| -> Option<usize> {
        let next = match direction {
            Direction::Backward if j > fence => j - 1,
            Direction::Forward if j < fence && j + 1 < series.len() => j + 1,
            _ => return None,
        };
        let (Some(current), Some(candidate)) = (series[j], series[next]) else {
            return None;
        };
        (candidate <= current).then_some(next)
    };

    let mut j = from;
    let mut steps = 0;
    while let Some(next) = step(j) {
        if steps == budget {
            return None;
        }
        j = next;
        steps += 1;
    }
    (steps > 0).then_some(j)
}

/// Rise of the peak at `index` over the higher of the lowest points on each
/// side, searched up to `window` frames away and stopping at a higher value
#[must_use]
pub fn prominence(series: &[Option<f64>], index: usize, window: usize) -> f64 {
    let Some(peak) = series.get(index).copied().flatten() else {
        return 0.0;
    };

    let side_min = |range: &mut dyn Iterator<Item = usize>| -> Option<f64> {
        let mut lowest: Option<f64> = None;
        for j in range {
            let Some(v) = series[j] else { continue };
            if v > peak {
                break;
            }
            lowest = Some(lowest.map_or(v, |m| m.min(v)));
        }
        lowest
    };

    let left = side_min(&mut (index.saturating_sub(window)..index).rev());
    let right = side_min(&mut (index + 1..(index + window + 1).min(series.len())));

    match (left, right) {
        (Some(l), Some(r)) => peak - l.max(r),
        (Some(base), None) | (None, Some(base)) => peak - base,
        (None, None) => 0.0,
    }
}

/// Indices of accepted troughs (hip-height maxima) in frame order
#[must_use]
pub fn find_troughs(smoothed: &[Option<f64>], config: &SegmentationConfig) -> Vec<usize> {
    let mut candidates: Vec<(usize, f64)> = smoothed
        .windows(3)
        .enumerate()
        .filter_map(|(i, w)| match *w {
            [Some(prev), Some(cur), Some(next)] if cur > prev && cur >= next => Some((i + 1, cur)),
            _ => None,
        })
        .filter(|&(i, _)| prominence(smoothed, i, config.prominence_window) >= config.min_prominence)
        .collect();

    // Highest first, earlier frame on ties
    candidates.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));

    let mut accepted: Vec<usize> = Vec::with_capacity(candidates.len());
    for (i, _) in candidates {
        if accepted.iter().all(|&a| a.abs_diff(i) >= config.min_peak_distance) {
            accepted.push(i);
        }
    }
    accepted.sort_unstable();
    accepted
}
