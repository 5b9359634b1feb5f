//! One recording session: frame ingestion, buffering and end-of-session
//! analysis.
//!
//! A [`Session`] owns all per-session mutable state (filter banks, live
//! tracker, buffer). Frames are pushed synchronously; [`Session::finish`]
//! runs segmentation and scoring once over the buffered frames.

use crate::biomechanics::{hip_height, knee_angle, symmetry_difference, symmetry_percent, valgus_pair};
use crate::config::Config;
use crate::filters::LandmarkFilter;
use crate::landmark::{Frame, Side};
use crate::live::{LiveOutput, LiveTracker};
use crate::scoring::{Report, ScoringEngine};
use crate::segmentation::{Rep, RepSegmenter};
use crate::{Error, Result};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Filtered frames plus per-frame derived series, all indexed identically
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionBuffer {
    pub frames: Vec<Frame>,
    pub timestamps: Vec<f64>,
    /// Mean screen-space hip `y`, gated like the segmentation input
    pub hip_height: Vec<Option<f64>>,
    /// Left/right knee angle agreement, 0..=100
    pub symmetry_percent: Vec<Option<f64>>,
    /// Larger of the two knee valgus deviations, as a percentage of hip width
    pub valgus_percent: Vec<Option<f64>>,
}

impl SessionBuffer {
    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    fn push(&mut self, frame: Frame, timestamp: f64, config: &Config) {
        let min_conf = config.biomechanics.landmark_confidence;
        let world = &frame.world;

        self.hip_height
            .push(hip_height(&frame.screen, config.segmentation.confidence_threshold));
        self.symmetry_percent.push(
            match (knee_angle(world, Side::Left, min_conf), knee_angle(world, Side::Right, min_conf)) {
                (Some(l), Some(r)) => Some(symmetry_percent(
                    symmetry_difference(l, r),
                    config.biomechanics.symmetry_decay,
                )),
                _ => None,
            },
        );
        self.valgus_percent
            .push(valgus_pair(world, min_conf).map(|(l, r)| l.max(r) * 100.0));
        self.timestamps.push(timestamp);
        self.frames.push(frame);
    }

    /// Sliced copy of frames `[start, end)`; bounds are clamped to the buffer
    #[must_use]
    pub fn cropped(&self, start: usize, end: usize) -> Self {
        let end = end.min(self.len());
        let start = start.min(end);
        Self {
            frames: self.frames[start..end].to_vec(),
            timestamps: self.timestamps[start..end].to_vec(),
            hip_height: self.hip_height[start..end].to_vec(),
            symmetry_percent: self.symmetry_percent[start..end].to_vec(),
            valgus_percent: self.valgus_percent[start..end].to_vec(),
        }
    }

    fn clear(&mut self) {
        self.frames.clear();
        self.timestamps.clear();
        self.hip_height.clear();
        self.symmetry_percent.clear();
        self.valgus_percent.clear();
    }
}

/// One frame of a stored recording
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedFrame {
    pub timestamp: f64,
    #[serde(flatten)]
    pub frame: Frame,
}

/// Raw landmark frames captured during one session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Recording {
    pub frames: Vec<RecordedFrame>,
}

impl Recording {
    /// Load a recording from a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        serde_yaml::from_str(&contents)
            .map_err(|e| Error::InvalidInput(format!("Failed to parse recording: {e}")))
    }

    /// Save the recording as YAML
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = serde_yaml::to_string(self)
            .map_err(|e| Error::IoError(format!("Failed to serialize recording: {e}")))?;
        std::fs::write(path, contents)?;
        Ok(())
    }
}

/// Result of a completed session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionOutcome {
    /// Reps with frame indices into the full, uncropped buffer
    pub reps: Vec<Rep>,
    pub report: Report,
    /// Buffer cropped around the detected reps
    pub buffer: SessionBuffer,
    /// Index of the first cropped frame in the full buffer
    pub crop_offset: usize,
}

/// A single recording session
pub struct Session {
    config: Config,
    screen_filter: LandmarkFilter,
    world_filter: LandmarkFilter,
    tracker: LiveTracker,
    buffer: SessionBuffer,
}

impl Session {
    /// Start a session with a validated configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            screen_filter: config.create_landmark_filter(),
            world_filter: config.create_landmark_filter(),
            tracker: LiveTracker::new(config.live.clone(), config.biomechanics.clone()),
            buffer: SessionBuffer::default(),
            config,
        })
    }

    /// Filter one raw frame, update live feedback and buffer it
    pub fn ingest_frame(&mut self, frame: &Frame, timestamp: f64) -> LiveOutput {
        let filtered = Frame::new(
            self.screen_filter.apply(&frame.screen, timestamp),
            self.world_filter.apply(&frame.world, timestamp),
        );
        let output = self.tracker.update(&filtered.world, timestamp);
        self.buffer.push(filtered, timestamp, &self.config);
        output
    }

    /// Feed every frame of a recording in order
    pub fn replay(&mut self, recording: &Recording) -> Vec<LiveOutput> {
        recording
            .frames
            .iter()
            .map(|recorded| self.ingest_frame(&recorded.frame, recorded.timestamp))
            .collect()
    }

    /// Segment and score the buffered frames.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InsufficientData`] if fewer than the configured
    /// minimum frames were recorded and [`Error::NoValidReps`] if no rep
    /// survives segmentation.
    pub fn finish(&self) -> Result<SessionOutcome> {
        let required = self.config.segmentation.min_frames;
        if self.buffer.len() < required {
            warn!("Session has {} frames, need {required}", self.buffer.len());
            return Err(Error::InsufficientData {
                frames: self.buffer.len(),
                required,
            });
        }

        let reps = RepSegmenter::from_config(&self.config).segment(&self.buffer.frames);
        let (Some(first), Some(last)) = (reps.first(), reps.last()) else {
            warn!("No valid reps in {} frames", self.buffer.len());
            return Err(Error::NoValidReps);
        };

        let report = ScoringEngine::from_config(&self.config).score(&reps)?;

        let pad = self.crop_padding();
        let crop_offset = first.start_frame.saturating_sub(pad);
        let crop_end = (last.end_frame + 1 + pad).min(self.buffer.len());
        debug!("Cropping buffer to [{crop_offset}, {crop_end})");

        info!(
            "Session finished: {} frames, {} reps, score {}",
            self.buffer.len(),
            reps.len(),
            report.total_score
        );

        Ok(SessionOutcome {
            buffer: self.buffer.cropped(crop_offset, crop_end),
            crop_offset,
            reps,
            report,
        })
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn crop_padding(&self) -> usize {
        let seg = &self.config.segmentation;
        (seg.crop_padding_secs * seg.nominal_fps).round().max(0.0) as usize
    }

    /// Discard all per-session state so the next frame starts fresh
    pub fn reset(&mut self) {
        self.screen_filter.reset();
        self.world_filter.reset();
        self.tracker.reset();
        self.buffer.clear();
    }

    #[must_use]
    pub const fn buffer(&self) -> &SessionBuffer {
        &self.buffer
    }

    #[must_use]
    pub const fn tracker(&self) -> &LiveTracker {
        &self.tracker
    }

    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }
}
