//! Edge case tests: occlusion, degenerate geometry and extreme values

mod test_helpers;

use nalgebra::Vector3;
use squat_analysis::biomechanics::{angle_between, knee_valgus_deviation, symmetry_percent};
use squat_analysis::config::Config;
use squat_analysis::filters::create_filter;
use squat_analysis::landmark::{Frame, Landmark, PoseLandmarks};
use squat_analysis::live::LiveTracker;
use squat_analysis::scoring::score_session;
use squat_analysis::segmentation::segment_reps;
use squat_analysis::session::Session;
use squat_analysis::Error;
use test_helpers::{rep, squat_frames, timestamps, unfiltered_config};

#[test]
fn test_filter_extreme_values() {
    for spec in ["none", "exponential:0.8", "one_euro", "one_euro:0.5:2.0"] {
        let mut filter = create_filter(spec).unwrap();
        let mut t = 0.0;
        for value in [f64::MAX, f64::MIN, 1e100, -1e100, 0.0, f64::NAN] {
            // Only checks that nothing panics
            let _ = filter.apply(value, t);
            t += 1.0 / 30.0;
        }
    }
}

#[test]
fn test_filter_non_increasing_timestamps() {
    let mut filter = create_filter("one_euro").unwrap();
    let first = filter.apply(1.0, 1.0);
    assert_eq!(filter.apply(5.0, 1.0), first);
    assert_eq!(filter.apply(9.0, 0.5), first);
    assert!(filter.apply(9.0, 1.1).is_finite());
}

#[test]
fn test_occluded_frames_are_tolerated() {
    let mut frames = squat_frames(150, 30.0, 80.0, 1.0);
    for frame in frames.iter_mut().step_by(10) {
        *frame = Frame::default();
    }
    let reps = segment_reps(&frames, &Config::default());
    assert_eq!(reps.len(), 5);
    for pair in reps.windows(2) {
        assert!(pair[0].end_frame < pair[1].start_frame);
    }
}

#[test]
fn test_empty_session() {
    let session = Session::new(Config::default()).unwrap();
    assert!(matches!(
        session.finish(),
        Err(Error::InsufficientData { frames: 0, required: 30 })
    ));
    assert!(segment_reps(&[], &Config::default()).is_empty());
}

#[test]
fn test_session_of_blank_frames() {
    let mut session = Session::new(unfiltered_config()).unwrap();
    for t in timestamps(60) {
        let out = session.ingest_frame(&Frame::default(), t);
        assert!(out.live_depth_angle.is_none());
        assert!(out.live_symmetry.is_none());
        assert!(!out.knee_valgus);
    }
    assert!(matches!(session.finish(), Err(Error::NoValidReps)));
    assert!(session.buffer().hip_height.iter().all(Option::is_none));
}

#[test]
fn test_scoring_empty_rep_list() {
    assert!(matches!(score_session(&[], &Config::default()), Err(Error::NoValidReps)));
}

#[test]
fn test_scoring_with_non_finite_values() {
    let reps = [rep(f64::NAN, Some(f64::NAN), f64::NAN), rep(90.0, Some(0.0), 0.0)];
    let report = score_session(&reps, &Config::default()).unwrap();
    assert!(report.subscores.depth.is_finite());
    assert!((report.avg_depth_angle - 90.0).abs() < 1e-12);
    assert_eq!(report.avg_symmetry_percent, Some(100.0));
    assert_eq!(report.valgus_rep_count, 0);
}

#[test]
fn test_degenerate_geometry_is_neutral() {
    let p = Vector3::new(0.2, 0.3, 0.0);
    assert!(angle_between(&p, &p, &Vector3::new(0.0, 1.0, 0.0)).is_none());
    assert_eq!(knee_valgus_deviation(&p, &p, &p, &Vector3::new(0.1, 0.0, 0.0)), 0.0);
    assert_eq!(symmetry_percent(0.0, 0.05), 100.0);
}

#[test]
fn test_coincident_leg_landmarks_in_live_tracker() {
    let mut pose = PoseLandmarks::empty();
    for index in squat_analysis::constants::LEG_LANDMARKS {
        pose.set(index, Some(Landmark::new(0.0, 0.0, 0.0, 1.0)));
    }
    let config = Config::default();
    let mut tracker = LiveTracker::new(config.live, config.biomechanics);
    let out = tracker.update(&pose, 0.0);
    assert!(out.live_depth_angle.is_none());
    assert!(!out.knee_valgus);
}

#[test]
fn test_too_many_landmarks_rejected() {
    let landmarks = vec![None; 34];
    assert!(matches!(PoseLandmarks::new(landmarks), Err(Error::InvalidInput(_))));
}
