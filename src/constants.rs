//! Constants used throughout the library

/// Number of body landmarks delivered per frame by the pose model
pub const NUM_POSE_LANDMARKS: usize = 33;

/// Fixed landmark indices of the external pose model
pub const LEFT_HIP: usize = 23;
pub const RIGHT_HIP: usize = 24;
pub const LEFT_KNEE: usize = 25;
pub const RIGHT_KNEE: usize = 26;
pub const LEFT_ANKLE: usize = 27;
pub const RIGHT_ANKLE: usize = 28;

/// The six landmarks every squat metric depends on
pub const LEG_LANDMARKS: [usize; 6] = [LEFT_HIP, RIGHT_HIP, LEFT_KNEE, RIGHT_KNEE, LEFT_ANKLE, RIGHT_ANKLE];

/// Default frames per second assumption
pub const DEFAULT_FPS: f64 = 30.0;

/// Default filter parameters
pub const DEFAULT_MIN_CUTOFF: f64 = 1.0;
pub const DEFAULT_BETA: f64 = 0.3;
pub const DEFAULT_DERIVATIVE_CUTOFF: f64 = 1.0;
pub const DEFAULT_EXPONENTIAL_FACTOR: f64 = 0.5;

/// Live rep counter hysteresis thresholds (degrees)
pub const DEFAULT_SQUAT_THRESHOLD: f64 = 110.0;
pub const DEFAULT_STANDING_THRESHOLD: f64 = 160.0;

/// Exponential decay rate mapping an angle difference to a symmetry percentage
pub const DEFAULT_SYMMETRY_DECAY: f64 = 0.05;

/// Knee valgus deviation thresholds, as a fraction of hip width
pub const DEFAULT_VALGUS_THRESHOLD: f64 = 0.12;
pub const DEFAULT_SEVERE_VALGUS: f64 = 0.25;

/// Live cue texts
pub const CUE_VALGUS: &str = "Push your knees out";
pub const CUE_DEPTH: &str = "Good depth!";
pub const CUE_IDLE: &str = "Ready";

/// Numeric precision epsilon
pub const EPSILON: f64 = 1e-10;
