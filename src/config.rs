//! Configuration management for the squat analysis engine
//!
//! Every tuning constant of the pipeline lives here as a named, overridable
//! value. Defaults reflect the current product tuning.

use crate::constants::{
    DEFAULT_BETA, DEFAULT_DERIVATIVE_CUTOFF, DEFAULT_EXPONENTIAL_FACTOR, DEFAULT_FPS, DEFAULT_MIN_CUTOFF,
    DEFAULT_SEVERE_VALGUS, DEFAULT_SQUAT_THRESHOLD, DEFAULT_STANDING_THRESHOLD, DEFAULT_SYMMETRY_DECAY,
    DEFAULT_VALGUS_THRESHOLD,
};
use crate::filters::{
    exponential::ExponentialFilter, one_euro::OneEuroFilter, LandmarkFilter, NoFilter, SignalFilter,
};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Engine configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Landmark stabilization
    pub filter: FilterConfig,

    /// Geometry parameters
    pub biomechanics: BiomechanicsConfig,

    /// Live rep counter and cues
    pub live: LiveConfig,

    /// Offline repetition segmentation
    pub segmentation: SegmentationConfig,

    /// Session scoring
    pub scoring: ScoringConfig,
}

/// Stabilization strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterKind {
    None,
    Exponential,
    OneEuro,
}

/// Filter configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Filter applied to every landmark channel
    pub kind: FilterKind,

    /// Adaptive filter cutoff at rest (Hz)
    pub min_cutoff: f64,

    /// Adaptive filter speed coefficient
    pub beta: f64,

    /// Cutoff for the rate estimate (Hz)
    pub derivative_cutoff: f64,

    /// Weight of the newest sample for exponential smoothing
    pub exponential_factor: f64,
}

/// Geometry parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BiomechanicsConfig {
    /// Minimum landmark confidence for angles and valgus
    pub landmark_confidence: f64,

    /// Decay rate of the symmetry percentage per degree of difference
    pub symmetry_decay: f64,
}

/// Live feedback configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LiveConfig {
    /// Depth angle below which the squatter is considered DOWN
    pub squat_threshold: f64,

    /// Depth angle above which the squatter is considered UP again
    pub standing_threshold: f64,

    /// Minimum knee confidence for a live angle
    pub knee_confidence: f64,

    /// Normalized deviation above which the valgus cue fires
    pub valgus_threshold: f64,

    /// Left/right difference (degrees) that marks a live rep as bad
    pub symmetry_limit: f64,
}

/// Offline segmentation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentationConfig {
    /// Nominal capture rate assumed for window sizes
    pub nominal_fps: f64,

    /// Minimum recorded frames
    pub min_frames: usize,

    /// Minimum frames with a usable hip position
    pub min_tracked_frames: usize,

    /// Half width of the centered moving average
    pub smoothing_half_window: usize,

    /// Minimum frames between accepted troughs
    pub min_peak_distance: usize,

    /// Minimum rise of a trough over its local baseline (screen units)
    pub min_prominence: f64,

    /// Frames searched on each side for the prominence baseline
    pub prominence_window: usize,

    /// Minimum confidence of hip samples and of the six leg landmarks at a trough
    pub confidence_threshold: f64,

    /// Knee angle ceiling at a trough; shallower candidates are rejected
    pub max_depth_angle: f64,

    /// Longest time scanned outward from a trough for a standing boundary
    pub boundary_search_secs: f64,

    /// Half width of the window used when no boundary is found
    pub fallback_half_window: usize,

    /// Idle time kept around the first and last rep when cropping
    pub crop_padding_secs: f64,
}

impl SegmentationConfig {
    /// Boundary search budget in frames at the nominal rate
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn boundary_search_frames(&self) -> usize {
        (self.boundary_search_secs * self.nominal_fps).round().max(0.0) as usize
    }
}

/// Relative weight of each subscore
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub depth: f64,
    pub symmetry: f64,
    pub valgus: f64,
    pub consistency: f64,
}

/// Scoring configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub weights: ScoreWeights,

    /// Average depth angle that earns no depth credit
    pub standing_angle: f64,

    /// Average depth angle that earns full depth credit
    pub ideal_depth: f64,

    /// Depth at which the below-parallel bonus is maxed out
    pub atg_depth: f64,

    /// Largest bonus fraction for going below the ideal depth
    pub depth_bonus: f64,

    /// Normalized valgus deviation counted as a fault
    pub valgus_threshold: f64,

    /// Deviation counted as a severe fault (double penalty)
    pub severe_valgus: f64,

    /// Penalty multiplier past `moderate_factor * valgus_threshold`
    pub moderate_factor: f64,

    /// Lower bound on the rep count used to size each valgus penalty
    pub min_reps_for_averaging: usize,

    /// Depth spread (degrees) still scored as excellent
    pub excellent_std_dev: f64,

    /// Depth spread scored as good
    pub good_std_dev: f64,

    /// Depth spread still acceptable
    pub acceptable_std_dev: f64,

    /// Inflation applied to the measured depth spread
    pub spread_factor: f64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            kind: FilterKind::OneEuro,
            min_cutoff: DEFAULT_MIN_CUTOFF,
            beta: DEFAULT_BETA,
            derivative_cutoff: DEFAULT_DERIVATIVE_CUTOFF,
            exponential_factor: DEFAULT_EXPONENTIAL_FACTOR,
        }
    }
}

impl Default for BiomechanicsConfig {
    fn default() -> Self {
        Self {
            landmark_confidence: 0.5,
            symmetry_decay: DEFAULT_SYMMETRY_DECAY,
        }
    }
}

impl Default for LiveConfig {
    fn default() -> Self {
        Self {
            squat_threshold: DEFAULT_SQUAT_THRESHOLD,
            standing_threshold: DEFAULT_STANDING_THRESHOLD,
            knee_confidence: 0.65,
            valgus_threshold: DEFAULT_VALGUS_THRESHOLD,
            symmetry_limit: 20.0,
        }
    }
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            nominal_fps: DEFAULT_FPS,
            min_frames: 30,
            min_tracked_frames: 15,
            smoothing_half_window: 3,
            min_peak_distance: 15,
            min_prominence: 0.02,
            prominence_window: 45,
            confidence_threshold: 0.5,
            max_depth_angle: 140.0,
            boundary_search_secs: 2.0,
            fallback_half_window: 15,
            crop_padding_secs: 0.1,
        }
    }
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            depth: 30.0,
            symmetry: 25.0,
            valgus: 20.0,
            consistency: 25.0,
        }
    }
}

impl ScoreWeights {
    /// Highest attainable total
    #[must_use]
    pub fn total(&self) -> f64 {
        self.depth + self.symmetry + self.valgus + self.consistency
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            weights: ScoreWeights::default(),
            standing_angle: DEFAULT_STANDING_THRESHOLD,
            ideal_depth: 90.0,
            atg_depth: 75.0,
            depth_bonus: 0.1,
            valgus_threshold: DEFAULT_VALGUS_THRESHOLD,
            severe_valgus: DEFAULT_SEVERE_VALGUS,
            moderate_factor: 1.5,
            min_reps_for_averaging: 8,
            excellent_std_dev: 5.0,
            good_std_dev: 12.0,
            acceptable_std_dev: 20.0,
            spread_factor: 1.2,
        }
    }
}

fn check_unit(name: &str, value: f64) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(Error::ConfigError(format!("{name} must be between 0.0 and 1.0")))
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::IoError(e.to_string()))?;

        serde_yaml::from_str(&content).map_err(|e| Error::ConfigError(format!("Failed to parse config: {e}")))
    }

    /// Save configuration to a YAML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(self)
            .map_err(|e| Error::ConfigError(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, content).map_err(|e| Error::IoError(e.to_string()))?;

        Ok(())
    }

    /// Create one channel filter from configuration
    #[must_use]
    pub fn create_filter(&self) -> Box<dyn SignalFilter> {
        let f = &self.filter;
        match f.kind {
            FilterKind::None => Box::new(NoFilter),
            FilterKind::Exponential => Box::new(ExponentialFilter::new(f.exponential_factor)),
            FilterKind::OneEuro => Box::new(OneEuroFilter::with_derivative_cutoff(
                f.min_cutoff,
                f.beta,
                f.derivative_cutoff,
            )),
        }
    }

    /// Create a full per-landmark filter bank from configuration
    #[must_use]
    pub fn create_landmark_filter(&self) -> LandmarkFilter {
        LandmarkFilter::new(|| self.create_filter())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        // Filter parameters
        let f = &self.filter;
        if f.min_cutoff <= 0.0 || f.derivative_cutoff <= 0.0 {
            return Err(Error::ConfigError("Filter cutoffs must be positive".to_string()));
        }
        if f.beta < 0.0 {
            return Err(Error::ConfigError("Filter beta must be non-negative".to_string()));
        }
        if !(f.exponential_factor > 0.0 && f.exponential_factor <= 1.0) {
            return Err(Error::ConfigError(
                "Exponential factor must be in (0, 1]".to_string(),
            ));
        }

        // Confidence thresholds
        check_unit("Landmark confidence", self.biomechanics.landmark_confidence)?;
        check_unit("Knee confidence", self.live.knee_confidence)?;
        check_unit("Segmentation confidence threshold", self.segmentation.confidence_threshold)?;
        if self.biomechanics.symmetry_decay <= 0.0 {
            return Err(Error::ConfigError("Symmetry decay must be positive".to_string()));
        }

        // Live hysteresis
        if self.live.squat_threshold >= self.live.standing_threshold {
            return Err(Error::ConfigError(
                "Squat threshold must be below standing threshold".to_string(),
            ));
        }

        // Segmentation windows
        let s = &self.segmentation;
        if s.nominal_fps <= 0.0 {
            return Err(Error::ConfigError("Nominal FPS must be greater than 0".to_string()));
        }
        if s.min_peak_distance == 0 || s.boundary_search_frames() == 0 || s.fallback_half_window == 0 {
            return Err(Error::ConfigError(
                "Segmentation windows must be greater than 0".to_string(),
            ));
        }
        if s.min_prominence < 0.0 || s.crop_padding_secs < 0.0 {
            return Err(Error::ConfigError(
                "Prominence and crop padding must be non-negative".to_string(),
            ));
        }

        // Scoring
        let sc = &self.scoring;
        let w = &sc.weights;
        if [w.depth, w.symmetry, w.valgus, w.consistency].iter().any(|&x| x <= 0.0) {
            return Err(Error::ConfigError("Score weights must be positive".to_string()));
        }
        if !(sc.atg_depth < sc.ideal_depth && sc.ideal_depth < sc.standing_angle) {
            return Err(Error::ConfigError(
                "Depth angles must satisfy atg < ideal < standing".to_string(),
            ));
        }
        if sc.valgus_threshold >= sc.severe_valgus {
            return Err(Error::ConfigError(
                "Severe valgus must exceed the valgus threshold".to_string(),
            ));
        }
        if !(sc.excellent_std_dev < sc.good_std_dev && sc.good_std_dev < sc.acceptable_std_dev) {
            return Err(Error::ConfigError(
                "Consistency tiers must be strictly increasing".to_string(),
            ));
        }
        if sc.min_reps_for_averaging == 0 {
            return Err(Error::ConfigError(
                "Minimum reps for averaging must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Example configuration file content
pub const EXAMPLE_CONFIG: &str = r#"# Squat Analysis Configuration

# Landmark stabilization (none, exponential, one_euro)
filter:
  kind: one_euro
  min_cutoff: 1.0
  beta: 0.3
  derivative_cutoff: 1.0
  exponential_factor: 0.5

# Joint geometry
biomechanics:
  landmark_confidence: 0.5
  symmetry_decay: 0.05

# Live rep counting and cues
live:
  squat_threshold: 110.0
  standing_threshold: 160.0
  knee_confidence: 0.65
  valgus_threshold: 0.12
  symmetry_limit: 20.0

# Offline repetition segmentation
segmentation:
  nominal_fps: 30.0
  min_frames: 30
  min_tracked_frames: 15
  smoothing_half_window: 3
  min_peak_distance: 15
  min_prominence: 0.02
  prominence_window: 45
  confidence_threshold: 0.5
  max_depth_angle: 140.0
  boundary_search_secs: 2.0
  fallback_half_window: 15
  crop_padding_secs: 0.1

# Session scoring
scoring:
  weights:
    depth: 30.0
    symmetry: 25.0
    valgus: 20.0
    consistency: 25.0
  standing_angle: 160.0
  ideal_depth: 90.0
  atg_depth: 75.0
  depth_bonus: 0.1
  valgus_threshold: 0.12
  severe_valgus: 0.25
  moderate_factor: 1.5
  min_reps_for_averaging: 8
  excellent_std_dev: 5.0
  good_std_dev: 12.0
  acceptable_std_dev: 20.0
  spread_factor: 1.2
"#;
