//! Driver Monitoring System (DMS)
//!
//! Drowsiness detection from facial landmarks:
//! - Eye aspect ratio (EAR) from six eye landmarks
//! - Consecutive closed-frame counting with a debounced alert
//! - Per-face state tracking across frames
//!
//! Camera acquisition, face detection and the landmark model live outside
//! this crate and feed it through [`LandmarkSource`].

pub mod analysis;
pub mod config;
pub mod detector;
pub mod ear;
pub mod geometry;
pub mod landmarks;
pub mod state;
pub mod tracker;

pub use analysis::{FaceAnalysis, FaceOutcome, FrameAnalysis, Overlay};
pub use config::{DmsConfig, EvaluatorConfig};
pub use detector::{DetectedFace, FaceId, LandmarkFrame, LandmarkSource, ReplaySource};
pub use ear::{compute_ear, compute_ear_from_slice, EyeLandmarks};
pub use geometry::Point2D;
pub use landmarks::{EyeLayout, EyePair};
pub use state::{evaluate_frame, DrowsinessState, EvaluatorState, FrameEvaluation};
pub use tracker::{FaceTracker, TrackingPolicy};

use thiserror::Error;

/// DMS error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DmsError {
    #[error("Eye landmarks must have exactly {expected} points, got {actual}")]
    InvalidLandmarkCount { expected: usize, actual: usize },

    #[error("Landmark index {index} missing (face has {available} points)")]
    MissingLandmark { index: usize, available: usize },

    #[error("Landmark {index} has a non-finite coordinate")]
    NonFiniteLandmark { index: usize },

    #[error("Degenerate eye geometry: horizontal corner distance {horizontal}")]
    DegenerateGeometry { horizontal: f64 },

    #[error("Face id {id} appears more than once in the frame")]
    DuplicateFace { id: u32 },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Landmark source failed: {0}")]
    Source(String),
}
