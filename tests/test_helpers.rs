//! Helper functions for synthesising squat recordings in tests
#![allow(dead_code)]

use squat_analysis::config::{Config, FilterKind};
use squat_analysis::constants::{LEFT_ANKLE, LEFT_HIP, LEFT_KNEE, RIGHT_ANKLE, RIGHT_HIP, RIGHT_KNEE};
use squat_analysis::landmark::{Frame, Landmark, PoseLandmarks};
use squat_analysis::segmentation::Rep;
use std::f64::consts::PI;
use std::ops::Range;

/// Knee angle of the standing pose
pub const STANDING_ANGLE: f64 = 175.0;

/// Screen-space hip `y` when standing and at the bottom of a squat
pub const HIP_TOP: f64 = 0.5;
pub const HIP_BOTTOM: f64 = 0.6;

/// Build one frame with both knees flexed to `knee_angle`.
///
/// World-space legs flex in the sagittal plane with knees over ankles;
/// `knee_shift` moves both knees toward the midline to produce valgus.
pub fn squat_frame(hip_y: f64, knee_angle: f64, confidence: f64, knee_shift: f64) -> Frame {
    let mut screen = PoseLandmarks::empty();
    screen.set(LEFT_HIP, Some(Landmark::new(0.55, hip_y, 0.0, confidence)));
    screen.set(RIGHT_HIP, Some(Landmark::new(0.45, hip_y, 0.0, confidence)));
    screen.set(LEFT_KNEE, Some(Landmark::new(0.55, hip_y + 0.15, 0.0, confidence)));
    screen.set(RIGHT_KNEE, Some(Landmark::new(0.45, hip_y + 0.15, 0.0, confidence)));
    screen.set(LEFT_ANKLE, Some(Landmark::new(0.55, 0.9, 0.0, confidence)));
    screen.set(RIGHT_ANKLE, Some(Landmark::new(0.45, 0.9, 0.0, confidence)));

    let mut world = PoseLandmarks::empty();
    let theta = knee_angle.to_radians();
    for (hip, knee, ankle, x, inward) in [
        (LEFT_HIP, LEFT_KNEE, LEFT_ANKLE, 0.1, -1.0),
        (RIGHT_HIP, RIGHT_KNEE, RIGHT_ANKLE, -0.1, 1.0),
    ] {
        world.set(ankle, Some(Landmark::new(x, 0.8, 0.0, confidence)));
        world.set(knee, Some(Landmark::new(x + inward * knee_shift, 0.4, 0.0, confidence)));
        world.set(
            hip,
            Some(Landmark::new(x, 0.4 + 0.4 * theta.cos(), 0.4 * theta.sin(), confidence)),
        );
    }

    Frame::new(screen, world)
}

/// Squat depth fraction at frame `t`: 0 standing, 1 at the bottom
#[allow(clippy::cast_precision_loss)]
pub fn squat_phase(t: usize, period: f64) -> f64 {
    let phase = 2.0 * PI * t as f64 / period;
    (1.0 - phase.cos()) / 2.0
}

/// `n` frames of continuous squats with the given period and bottom angle
pub fn squat_frames(n: usize, period: f64, depth_angle: f64, confidence: f64) -> Vec<Frame> {
    caved_squat_frames(n, period, depth_angle, confidence, 0..0, 0.0)
}

/// Continuous squats whose knees cave in by `knee_shift` on the frames of
/// every cycle that fall inside `caved` (frame offsets within a cycle)
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
pub fn caved_squat_frames(
    n: usize,
    period: f64,
    depth_angle: f64,
    confidence: f64,
    caved: Range<usize>,
    knee_shift: f64,
) -> Vec<Frame> {
    (0..n)
        .map(|t| {
            let s = squat_phase(t, period);
            let offset = (t as f64 % period) as usize;
            let shift = if caved.contains(&offset) { knee_shift } else { 0.0 };
            squat_frame(
                HIP_TOP + (HIP_BOTTOM - HIP_TOP) * s,
                STANDING_ANGLE - (STANDING_ANGLE - depth_angle) * s,
                confidence,
                shift,
            )
        })
        .collect()
}

/// `n` frames of standing still
pub fn idle_frames(n: usize) -> Vec<Frame> {
    (0..n).map(|_| squat_frame(HIP_TOP, STANDING_ANGLE, 1.0, 0.0)).collect()
}

/// Timestamps at 30 fps
#[allow(clippy::cast_precision_loss)]
pub fn timestamps(n: usize) -> Vec<f64> {
    (0..n).map(|i| i as f64 / 30.0).collect()
}

/// Default configuration without stabilization, for exact assertions
pub fn unfiltered_config() -> Config {
    let mut config = Config::default();
    config.filter.kind = FilterKind::None;
    config
}

/// A rep record with the given aggregates
pub fn rep(depth_angle: f64, symmetry: Option<f64>, max_valgus: f64) -> Rep {
    Rep {
        start_frame: 0,
        end_frame: 30,
        trough_frame: 15,
        depth_angle,
        max_left_valgus: max_valgus,
        max_right_valgus: 0.0,
        symmetry,
        confidence: 1.0,
    }
}

/// `count` reps with consecutive, non-overlapping frame ranges
pub fn reps(count: usize, depth_angle: f64, symmetry: f64, max_valgus: f64) -> Vec<Rep> {
    (0..count)
        .map(|i| Rep {
            start_frame: i * 31,
            end_frame: i * 31 + 30,
            trough_frame: i * 31 + 15,
            ..rep(depth_angle, Some(symmetry), max_valgus)
        })
        .collect()
}
