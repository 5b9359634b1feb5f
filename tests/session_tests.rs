//! Tests for the recording session flow: ingestion, live feedback and finish

mod test_helpers;

use squat_analysis::config::Config;
use squat_analysis::constants::{CUE_DEPTH, CUE_IDLE, CUE_VALGUS};
use squat_analysis::live::Phase;
use squat_analysis::segmentation::RepSegmenter;
use squat_analysis::session::{RecordedFrame, Recording, Session};
use squat_analysis::Error;
use test_helpers::{idle_frames, squat_frame, squat_frames, timestamps, unfiltered_config};

fn padded_session_frames() -> Vec<squat_analysis::landmark::Frame> {
    let mut frames = idle_frames(60);
    frames.extend(squat_frames(150, 30.0, 80.0, 1.0));
    frames.extend(idle_frames(20));
    frames
}

#[test]
fn test_full_session() {
    let frames = padded_session_frames();
    let mut session = Session::new(unfiltered_config()).unwrap();

    let mut last = None;
    for (frame, t) in frames.iter().zip(timestamps(frames.len())) {
        last = Some(session.ingest_frame(frame, t));
    }
    let last = last.unwrap();
    assert_eq!(last.rep_count, 5);
    assert_eq!(last.phase, Phase::Up);
    assert_eq!(session.tracker().history().len(), 5);

    let outcome = session.finish().unwrap();
    assert_eq!(outcome.reps.len(), 5);
    assert_eq!(outcome.report.rep_count, 5);
    assert_eq!(outcome.report.total_score, 100);

    // Leading idle frames are cropped away, keeping a short pad
    assert_eq!(outcome.reps[0].start_frame, 60);
    assert_eq!(outcome.crop_offset, 57);
    assert_eq!(outcome.buffer.len(), frames.len() - 57);
    assert_eq!(outcome.buffer.hip_height.len(), outcome.buffer.len());
    assert_eq!(outcome.buffer.symmetry_percent.len(), outcome.buffer.len());
    assert_eq!(outcome.buffer.valgus_percent.len(), outcome.buffer.len());
    assert!((outcome.buffer.timestamps[0] - 57.0 / 30.0).abs() < 1e-12);
}

#[test]
fn test_filtered_session_finds_reps() {
    let frames = padded_session_frames();
    let mut session = Session::new(Config::default()).unwrap();
    for (frame, t) in frames.iter().zip(timestamps(frames.len())) {
        session.ingest_frame(frame, t);
    }
    let outcome = session.finish().unwrap();
    assert_eq!(outcome.reps.len(), 5);
    assert!(outcome.report.total_score > 75);
}

#[test]
fn test_live_cues() {
    let mut session = Session::new(unfiltered_config()).unwrap();

    let standing = session.ingest_frame(&squat_frame(0.5, 175.0, 1.0, 0.0), 0.0);
    assert_eq!(standing.cue_text, CUE_IDLE);
    assert!(!standing.knee_valgus);

    let deep = session.ingest_frame(&squat_frame(0.6, 85.0, 1.0, 0.0), 0.033);
    assert_eq!(deep.cue_text, CUE_DEPTH);
    assert_eq!(deep.phase, Phase::Down);
    assert!((deep.live_depth_angle.unwrap() - 85.0).abs() < 1e-6);

    let caved = session.ingest_frame(&squat_frame(0.6, 85.0, 1.0, 0.06), 0.066);
    assert!(caved.knee_valgus);
    assert_eq!(caved.cue_text, CUE_VALGUS);
}

#[test]
fn test_standing_only_session_has_no_reps() {
    let frames = idle_frames(90);
    let mut session = Session::new(unfiltered_config()).unwrap();
    for (frame, t) in frames.iter().zip(timestamps(frames.len())) {
        session.ingest_frame(frame, t);
    }
    assert!(matches!(session.finish(), Err(Error::NoValidReps)));
}

#[test]
fn test_reset_starts_a_fresh_session() {
    let frames = padded_session_frames();
    let mut session = Session::new(unfiltered_config()).unwrap();
    for (frame, t) in frames.iter().zip(timestamps(frames.len())) {
        session.ingest_frame(frame, t);
    }
    session.reset();

    assert!(session.buffer().is_empty());
    assert_eq!(session.tracker().rep_count(), 0);
    assert!(matches!(
        session.finish(),
        Err(Error::InsufficientData { frames: 0, .. })
    ));
}

#[test]
fn test_recording_replay_round_trip() {
    let frames = padded_session_frames();
    let recording = Recording {
        frames: frames
            .iter()
            .cloned()
            .zip(timestamps(frames.len()))
            .map(|(frame, timestamp)| RecordedFrame { timestamp, frame })
            .collect(),
    };

    let path = std::env::temp_dir().join(format!("squat_recording_{}.yaml", std::process::id()));
    recording.to_file(&path).unwrap();
    let loaded = Recording::from_file(&path).unwrap();
    std::fs::remove_file(&path).ok();
    assert_eq!(loaded.frames.len(), recording.frames.len());

    let mut session = Session::new(unfiltered_config()).unwrap();
    let live = session.replay(&loaded);
    assert_eq!(live.len(), frames.len());
    assert_eq!(live.last().unwrap().rep_count, 5);
    assert_eq!(session.finish().unwrap().reps.len(), 5);
}

#[test]
fn test_crop_pads_both_ends_equally() {
    let mut frames = idle_frames(60);
    frames.extend(squat_frames(150, 30.0, 80.0, 1.0));
    frames.extend(idle_frames(60));

    let mut session = Session::new(unfiltered_config()).unwrap();
    for (frame, t) in frames.iter().zip(timestamps(frames.len())) {
        session.ingest_frame(frame, t);
    }
    let outcome = session.finish().unwrap();
    let (first, last) = (&outcome.reps[0], &outcome.reps[4]);

    // Trailing idle outlasts the search budget, so the end is the fallback window
    assert_eq!(last.end_frame, 210);
    let last_kept = outcome.crop_offset + outcome.buffer.len() - 1;
    assert_eq!(first.start_frame - outcome.crop_offset, 3);
    assert_eq!(last_kept - last.end_frame, 3);
    assert_eq!(outcome.buffer.len(), 157);
}

#[test]
fn test_hip_chart_matches_segmentation_input() {
    let mut config = unfiltered_config();
    config.segmentation.confidence_threshold = 0.8;
    config.biomechanics.landmark_confidence = 0.3;

    // Confidence sits between the two thresholds for the middle third
    let mut frames = squat_frames(60, 30.0, 80.0, 1.0);
    frames.extend(squat_frames(60, 30.0, 80.0, 0.6));
    frames.extend(squat_frames(60, 30.0, 80.0, 1.0));

    let mut session = Session::new(config.clone()).unwrap();
    for (frame, t) in frames.iter().zip(timestamps(frames.len())) {
        session.ingest_frame(frame, t);
    }
    let buffer = session.buffer();

    assert_eq!(
        buffer.hip_height,
        RepSegmenter::from_config(&config).hip_series(&buffer.frames)
    );
    assert!(buffer.hip_height[60..120].iter().all(Option::is_none));
    assert!(buffer.hip_height[..60].iter().all(Option::is_some));
    // Angle-based series still use the biomechanics threshold
    assert!(buffer.symmetry_percent[60..120].iter().all(Option::is_some));
}

#[test]
fn test_recording_with_too_many_landmarks_is_rejected() {
    let landmark = "{x: 0.5, y: 0.5, z: 0.0, confidence: 0.9}";
    let row = |n: usize| format!("[{}]", vec![landmark; n].join(", "));
    let yaml = |screen: usize| {
        format!(
            "frames:\n  - timestamp: 0.0\n    screen: {}\n    world: {}\n",
            row(screen),
            row(33)
        )
    };

    let dir = std::env::temp_dir();
    let bad = dir.join(format!("squat_recording_bad_{}.yaml", std::process::id()));
    std::fs::write(&bad, yaml(40)).unwrap();
    let result = Recording::from_file(&bad);
    std::fs::remove_file(&bad).ok();
    assert!(matches!(result, Err(Error::InvalidInput(_))));

    // Short rows are padded to the full model layout
    let short = dir.join(format!("squat_recording_short_{}.yaml", std::process::id()));
    std::fs::write(&short, yaml(25)).unwrap();
    let loaded = Recording::from_file(&short).unwrap();
    std::fs::remove_file(&short).ok();
    let screen = &loaded.frames[0].frame.screen;
    assert_eq!(screen.iter().count(), 33);
    assert!(screen.get(24).is_some());
    assert!(screen.get(25).is_none());
}
