//! Error types for the squat analysis library.

use thiserror::Error;

/// Main error type for the library
#[derive(Error, Debug)]
pub enum Error {
    /// File I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid input parameters or malformed landmark data
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Filter initialization or lookup error
    #[error("Filter error: {0}")]
    FilterError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Generic I/O error with description
    #[error("I/O error: {0}")]
    IoError(String),

    /// The session is too short to segment
    #[error("Insufficient data: {frames} frames recorded, at least {required} required")]
    InsufficientData {
        /// Frames available
        frames: usize,
        /// Frames needed
        required: usize,
    },

    /// Segmentation finished without a single valid repetition
    #[error("No valid repetitions were detected in the session")]
    NoValidReps,
}

/// Convenience type alias for Results with our Error type
pub type Result<T> = std::result::Result<T, Error>;
