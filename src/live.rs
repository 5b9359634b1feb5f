//! Live squat feedback: an UP/DOWN rep counter with hysteresis and
//! per-frame coaching cues.
//!
//! Nothing here is corrected retrospectively. A rep is counted the moment
//! the squatter stands back up; validation happens later in
//! [`crate::segmentation`].

use crate::biomechanics::{knee_angle, symmetry_difference, valgus_pair};
use crate::config::{BiomechanicsConfig, LiveConfig};
use crate::constants::{CUE_DEPTH, CUE_IDLE, CUE_VALGUS};
use crate::landmark::{PoseLandmarks, Side};
use log::debug;
use serde::{Deserialize, Serialize};

/// Rep counter state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Up,
    Down,
}

/// Quick quality grade of a live rep
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RepQuality {
    Good,
    Ok,
    Bad,
}

/// Summary recorded when a live rep completes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveRep {
    pub quality: RepQuality,
    /// Depth angle travelled since the previous rep (degrees)
    pub range_of_motion: f64,
    /// Left/right difference on the completing frame
    pub symmetry: Option<f64>,
    pub knee_valgus: bool,
    /// Time from going DOWN to standing back UP
    pub duration_secs: f64,
}

/// Per-frame live metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveOutput {
    /// Mean of the visible knee angles
    pub live_depth_angle: Option<f64>,
    /// Absolute left/right knee angle difference
    pub live_symmetry: Option<f64>,
    pub knee_valgus: bool,
    pub cue_text: String,
    pub rep_count: u32,
    pub phase: Phase,
}

/// Frame-by-frame rep counter owned by one session
#[derive(Debug, Clone)]
pub struct LiveTracker {
    live: LiveConfig,
    biomechanics: BiomechanicsConfig,
    phase: Phase,
    rep_count: u32,
    down_since: Option<f64>,
    angle_min: Option<f64>,
    angle_max: Option<f64>,
    history: Vec<LiveRep>,
}

impl LiveTracker {
    #[must_use]
    pub fn new(live: LiveConfig, biomechanics: BiomechanicsConfig) -> Self {
        Self {
            live,
            biomechanics,
            phase: Phase::Up,
            rep_count: 0,
            down_since: None,
            angle_min: None,
            angle_max: None,
            history: Vec::new(),
        }
    }

    /// Process one filtered world-space pose
    pub fn update(&mut self, world: &PoseLandmarks, timestamp: f64) -> LiveOutput {
        if world.is_blank() {
            debug!("No pose at {timestamp:.3}s, holding {:?}", self.phase);
            return self.output(None, None, false);
        }

        let left = knee_angle(world, Side::Left, self.live.knee_confidence);
        let right = knee_angle(world, Side::Right, self.live.knee_confidence);

        let live_symmetry = match (left, right) {
            (Some(l), Some(r)) => Some(symmetry_difference(l, r)),
            _ => None,
        };
        let knee_valgus = valgus_pair(world, self.biomechanics.landmark_confidence)
            .is_some_and(|(l, r)| l.max(r) > self.live.valgus_threshold);

        let live_depth_angle = match (left, right) {
            (Some(l), Some(r)) => Some((l + r) / 2.0),
            (Some(a), None) | (None, Some(a)) => Some(a),
            (None, None) => None,
        };

        if let Some(angle) = live_depth_angle {
            self.advance(angle, live_symmetry, knee_valgus, timestamp);
        }

        self.output(live_depth_angle, live_symmetry, knee_valgus)
    }

    fn output(&self, live_depth_angle: Option<f64>, live_symmetry: Option<f64>, knee_valgus: bool) -> LiveOutput {
        LiveOutput {
            live_depth_angle,
            live_symmetry,
            knee_valgus,
            cue_text: self.cue(live_depth_angle, knee_valgus).to_string(),
            rep_count: self.rep_count,
            phase: self.phase,
        }
    }

    fn advance(&mut self, angle: f64, symmetry: Option<f64>, knee_valgus: bool, timestamp: f64) {
        self.angle_min = Some(self.angle_min.map_or(angle, |m| m.min(angle)));
        self.angle_max = Some(self.angle_max.map_or(angle, |m| m.max(angle)));

        match self.phase {
            Phase::Up if angle < self.live.squat_threshold => {
                self.phase = Phase::Down;
                self.down_since = Some(timestamp);
            }
            Phase::Down if angle > self.live.standing_threshold => {
                self.phase = Phase::Up;
                self.rep_count += 1;

                let range_of_motion = match (self.angle_min, self.angle_max) {
                    (Some(lo), Some(hi)) => hi - lo,
                    _ => 0.0,
                };
                let rep = LiveRep {
                    quality: self.grade(range_of_motion, symmetry, knee_valgus),
                    range_of_motion,
                    symmetry,
                    knee_valgus,
                    duration_secs: self.down_since.map_or(0.0, |t| (timestamp - t).max(0.0)),
                };
                debug!("Live rep {} completed: {:?}", self.rep_count, rep.quality);
                self.history.push(rep);

                self.angle_min = None;
                self.angle_max = None;
                self.down_since = None;
            }
            _ => {}
        }
    }

    fn grade(&self, range_of_motion: f64, symmetry: Option<f64>, knee_valgus: bool) -> RepQuality {
        let shallow = range_of_motion < self.live.standing_threshold - self.live.squat_threshold - 10.0;
        let diff = symmetry.unwrap_or(0.0);
        if shallow || knee_valgus || diff > self.live.symmetry_limit {
            RepQuality::Bad
        } else if diff > self.live.symmetry_limit / 2.0 {
            RepQuality::Ok
        } else {
            RepQuality::Good
        }
    }

    /// Cue priority: valgus correction, then depth praise, then idle
    fn cue(&self, depth_angle: Option<f64>, knee_valgus: bool) -> &'static str {
        if knee_valgus {
            CUE_VALGUS
        } else if depth_angle.is_some_and(|a| a < self.live.squat_threshold) {
            CUE_DEPTH
        } else {
            CUE_IDLE
        }
    }

    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub const fn rep_count(&self) -> u32 {
        self.rep_count
    }

    /// Summaries of the reps counted so far
    #[must_use]
    pub fn history(&self) -> &[LiveRep] {
        &self.history
    }

    /// Reset the tracker
    pub fn reset(&mut self) {
        self.phase = Phase::Up;
        self.rep_count = 0;
        self.down_since = None;
        self.angle_min = None;
        self.angle_max = None;
        self.history.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{LEFT_ANKLE, LEFT_HIP, LEFT_KNEE, RIGHT_ANKLE, RIGHT_HIP, RIGHT_KNEE};
    use crate::landmark::Landmark;

    /// Both legs flexed to `angle` in the sagittal plane, knees over ankles
    fn pose_at(angle: f64, knee_shift: f64) -> PoseLandmarks {
        let mut pose = PoseLandmarks::empty();
        let theta = angle.to_radians();
        for (hip, knee, ankle, x, sign) in [
            (LEFT_HIP, LEFT_KNEE, LEFT_ANKLE, 0.1, -1.0),
            (RIGHT_HIP, RIGHT_KNEE, RIGHT_ANKLE, -0.1, 1.0),
        ] {
            pose.set(ankle, Some(Landmark::new(x, 0.8, 0.0, 1.0)));
            pose.set(knee, Some(Landmark::new(x + sign * knee_shift, 0.4, 0.0, 1.0)));
            pose.set(
                hip,
                Some(Landmark::new(x, 0.4 + 0.4 * theta.cos(), 0.4 * theta.sin(), 1.0)),
            );
        }
        pose
    }

    fn tracker() -> LiveTracker {
        LiveTracker::new(LiveConfig::default(), BiomechanicsConfig::default())
    }

    #[test]
    fn test_live_angle() {
        let mut t = tracker();
        let out = t.update(&pose_at(120.0, 0.0), 0.0);
        assert!((out.live_depth_angle.unwrap() - 120.0).abs() < 1e-6);
        assert!(out.live_symmetry.unwrap() < 1e-6);
        assert!(!out.knee_valgus);
        assert_eq!(out.cue_text, CUE_IDLE);
    }

    #[test]
    fn test_counts_one_rep_with_hysteresis() {
        let mut t = tracker();
        let angles = [175.0, 150.0, 115.0, 100.0, 85.0, 100.0, 130.0, 155.0, 165.0, 175.0];
        for (i, &a) in angles.iter().enumerate() {
            t.update(&pose_at(a, 0.0), i as f64 / 30.0);
        }
        assert_eq!(t.rep_count(), 1);
        assert_eq!(t.phase(), Phase::Up);
        let rep = &t.history()[0];
        assert_eq!(rep.quality, RepQuality::Good);
        assert!((rep.range_of_motion - 90.0).abs() < 1e-6);
        assert!(rep.duration_secs > 0.0);
    }

    #[test]
    fn test_oscillation_inside_band_does_not_count() {
        let mut t = tracker();
        for i in 0..20 {
            let a = if i % 2 == 0 { 105.0 } else { 155.0 };
            t.update(&pose_at(a, 0.0), f64::from(i) / 30.0);
        }
        assert_eq!(t.rep_count(), 0);
        assert_eq!(t.phase(), Phase::Down);
    }

    #[test]
    fn test_cue_priority() {
        let mut t = tracker();
        let deep = t.update(&pose_at(90.0, 0.0), 0.0);
        assert_eq!(deep.cue_text, CUE_DEPTH);

        // Knees collapse toward the midline: valgus outranks depth
        let caved = t.update(&pose_at(90.0, 0.05), 0.033);
        assert!(caved.knee_valgus);
        assert_eq!(caved.cue_text, CUE_VALGUS);
    }

    #[test]
    fn test_missing_landmarks_keep_state() {
        let mut t = tracker();
        t.update(&pose_at(90.0, 0.0), 0.0);
        let out = t.update(&PoseLandmarks::empty(), 0.033);
        assert!(out.live_depth_angle.is_none());
        assert_eq!(out.phase, Phase::Down);
        assert_eq!(out.cue_text, CUE_IDLE);
    }

    #[test]
    fn test_blank_frames_do_not_break_a_rep() {
        let mut t = tracker();
        t.update(&pose_at(170.0, 0.0), 0.0);
        t.update(&pose_at(85.0, 0.0), 0.1);
        for i in 0..5 {
            let out = t.update(&PoseLandmarks::empty(), 0.2 + f64::from(i) * 0.033);
            assert_eq!(out.phase, Phase::Down);
            assert_eq!(out.rep_count, 0);
            assert!(!out.knee_valgus);
        }
        t.update(&pose_at(170.0, 0.0), 0.5);

        assert_eq!(t.rep_count(), 1);
        // Range spans the visible frames only
        assert!((t.history()[0].range_of_motion - 85.0).abs() < 1e-6);
        assert!((t.history()[0].duration_secs - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_reset() {
        let mut t = tracker();
        for (i, a) in [170.0, 90.0, 170.0].into_iter().enumerate() {
            t.update(&pose_at(a, 0.0), i as f64);
        }
        assert_eq!(t.rep_count(), 1);
        t.reset();
        assert_eq!(t.rep_count(), 0);
        assert!(t.history().is_empty());
        assert_eq!(t.phase(), Phase::Up);
    }
}
