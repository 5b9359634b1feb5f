//! Landmark data model shared by every stage of the pipeline.
//!
//! The pose model delivers up to 33 landmarks per frame in two coordinate
//! spaces. Screen space is normalized to the image (`y` grows downward),
//! world space is metric and hip-centered. A landmark the model did not
//! report is stored as `None`, so geometry code has a single notion of
//! "missing".

use crate::constants::{
    LEFT_ANKLE, LEFT_HIP, LEFT_KNEE, LEG_LANDMARKS, NUM_POSE_LANDMARKS, RIGHT_ANKLE, RIGHT_HIP, RIGHT_KNEE,
};
use crate::{Error, Result};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// One tracked body point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    /// Detection reliability in `[0, 1]`
    #[serde(alias = "visibility")]
    pub confidence: f64,
}

impl Landmark {
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64, confidence: f64) -> Self {
        Self { x, y, z, confidence }
    }

    /// Position as a 3D vector
    #[must_use]
    pub fn position(&self) -> Vector3<f64> {
        Vector3::new(self.x, self.y, self.z)
    }

    /// Whether the landmark is reliable enough to use
    #[must_use]
    pub fn is_confident(&self, threshold: f64) -> bool {
        self.confidence >= threshold
    }
}

/// Body side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    #[must_use]
    pub const fn hip(self) -> usize {
        match self {
            Self::Left => LEFT_HIP,
            Self::Right => RIGHT_HIP,
        }
    }

    #[must_use]
    pub const fn knee(self) -> usize {
        match self {
            Self::Left => LEFT_KNEE,
            Self::Right => RIGHT_KNEE,
        }
    }

    #[must_use]
    pub const fn ankle(self) -> usize {
        match self {
            Self::Left => LEFT_ANKLE,
            Self::Right => RIGHT_ANKLE,
        }
    }

    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }
}

/// All landmarks of one frame in one coordinate space
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Option<Landmark>>", into = "Vec<Option<Landmark>>")]
pub struct PoseLandmarks {
    landmarks: Vec<Option<Landmark>>,
}

impl PoseLandmarks {
    /// Create from a landmark list, padding absent trailing landmarks
    ///
    /// # Errors
    ///
    /// Returns an error if more than 33 landmarks are supplied
    pub fn new(mut landmarks: Vec<Option<Landmark>>) -> Result<Self> {
        if landmarks.len() > NUM_POSE_LANDMARKS {
            return Err(Error::InvalidInput(format!(
                "Expected at most {NUM_POSE_LANDMARKS} landmarks, got {}",
                landmarks.len()
            )));
        }
        landmarks.resize(NUM_POSE_LANDMARKS, None);
        Ok(Self { landmarks })
    }

    /// A frame in which the model reported nothing
    #[must_use]
    pub fn empty() -> Self {
        Self {
            landmarks: vec![None; NUM_POSE_LANDMARKS],
        }
    }

    /// Landmark at a fixed model index, if reported
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Landmark> {
        self.landmarks.get(index).and_then(Option::as_ref)
    }

    /// Landmark at `index` only if it meets the confidence threshold
    #[must_use]
    pub fn confident(&self, index: usize, threshold: f64) -> Option<&Landmark> {
        self.get(index).filter(|lm| lm.is_confident(threshold))
    }

    /// Replace the landmark at `index`; indices past the model's range are ignored
    pub fn set(&mut self, index: usize, landmark: Option<Landmark>) {
        if let Some(slot) = self.landmarks.get_mut(index) {
            *slot = landmark;
        }
    }

    /// Iterate over all slots in index order
    pub fn iter(&self) -> impl Iterator<Item = Option<&Landmark>> {
        self.landmarks.iter().map(Option::as_ref)
    }

    /// True if the model reported no landmark at all
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.landmarks.iter().all(Option::is_none)
    }

    /// True if all six hip/knee/ankle landmarks are present and confident
    #[must_use]
    pub fn legs_confident(&self, threshold: f64) -> bool {
        LEG_LANDMARKS.iter().all(|&i| self.confident(i, threshold).is_some())
    }

    /// Mean confidence of the six leg landmarks, absent ones counted as zero
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn leg_confidence(&self) -> f64 {
        let total: f64 = LEG_LANDMARKS
            .iter()
            .map(|&i| self.get(i).map_or(0.0, |lm| lm.confidence))
            .sum();
        total / LEG_LANDMARKS.len() as f64
    }
}

/// One captured frame: the same pose in screen and world space
impl Default for PoseLandmarks {
    fn default() -> Self {
        Self::empty()
    }
}

impl TryFrom<Vec<Option<Landmark>>> for PoseLandmarks {
    type Error = Error;

    fn try_from(landmarks: Vec<Option<Landmark>>) -> Result<Self> {
        Self::new(landmarks)
    }
}

impl From<PoseLandmarks> for Vec<Option<Landmark>> {
    fn from(pose: PoseLandmarks) -> Self {
        pose.landmarks
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Frame {
    pub screen: PoseLandmarks,
    pub world: PoseLandmarks,
}

impl Frame {
    #[must_use]
    pub const fn new(screen: PoseLandmarks, world: PoseLandmarks) -> Self {
        Self { screen, world }
    }
}
