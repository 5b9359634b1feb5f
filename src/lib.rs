//! Squat motion analysis from per-frame body landmarks.
//!
//! This library turns a stream of 33-point pose estimates (supplied by an
//! external pose model in screen and world space) into:
//! - Real-time metrics and coaching cues from an UP/DOWN rep counter
//! - A post-session quality report built from automatically segmented reps
//!
//! The pipeline consists of:
//! 1. Stabilization filtering of every landmark coordinate
//! 2. Joint geometry: knee angles, left/right symmetry and knee valgus
//! 3. Live feedback with hysteresis, frame by frame
//! 4. Offline rep segmentation on the smoothed hip-height series
//! 5. Weighted scoring with tiered feedback
//!
//! # Examples
//!
//! ## Recording a Session
//!
//! ```no_run
//! use squat_analysis::{config::Config, landmark::Frame, session::Session};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut session = Session::new(Config::default())?;
//!
//! // Frames come from the pose model, one call per captured image
//! # let captured: Vec<(Frame, f64)> = Vec::new();
//! for (frame, timestamp) in &captured {
//!     let live = session.ingest_frame(frame, *timestamp);
//!     println!("{} (reps: {})", live.cue_text, live.rep_count);
//! }
//!
//! let outcome = session.finish()?;
//! println!("Score: {} ({})", outcome.report.total_score, outcome.report.quality);
//! # Ok(())
//! # }
//! ```
//!
//! ## Using Filters
//!
//! ```
//! use squat_analysis::filters::{create_filter, SignalFilter};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut filter = create_filter("one_euro:1.0:0.3")?;
//! let first = filter.apply(0.5, 0.0);
//! assert_eq!(first, 0.5);
//! filter.reset();
//! # Ok(())
//! # }
//! ```

/// Landmark, pose and frame data types
pub mod landmark;

/// Signal filtering algorithms for stabilizing landmark streams
pub mod filters;

/// Stateless joint geometry
pub mod biomechanics;

/// Live rep counter and coaching cues
pub mod live;

/// Offline repetition segmentation
pub mod segmentation;

/// Session scoring and feedback
pub mod scoring;

/// Recording session: ingestion, buffering and analysis
pub mod session;

/// Numeric helpers
pub mod utils;

/// Error types and result handling
pub mod error;

/// Constants used throughout the library
pub mod constants;

/// Configuration management
pub mod config;

pub use error::{Error, Result};
