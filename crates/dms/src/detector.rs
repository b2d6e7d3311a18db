//! Landmark input from the face detection stage
//!
//! The camera, face detector and landmark model run outside this crate.
//! They hand over one [`LandmarkFrame`] per captured frame.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::geometry::Point2D;
use crate::DmsError;

/// Identifier of a tracked face, stable across frames
pub type FaceId = u32;

/// One face located in a frame, with its full landmark set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedFace {
    /// Track id; faces without one are keyed by their index in the frame
    #[serde(default)]
    pub id: Option<FaceId>,
    pub landmarks: Vec<Point2D>,
}

/// All faces found in one captured frame
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LandmarkFrame {
    /// Frame sequence number
    pub sequence: u64,
    /// Capture timestamp (milliseconds)
    #[serde(default)]
    pub timestamp_ms: Option<u64>,
    #[serde(default)]
    pub faces: Vec<DetectedFace>,
}

/// Producer of landmark frames.
///
/// `Ok(None)` means the stream ended (camera closed, replay exhausted).
#[allow(async_fn_in_trait)]
pub trait LandmarkSource {
    async fn next_frame(&mut self) -> Result<Option<LandmarkFrame>, DmsError>;
}

/// In-memory source replaying recorded frames
#[derive(Debug, Default)]
pub struct ReplaySource {
    frames: VecDeque<LandmarkFrame>,
}

impl ReplaySource {
    pub fn new(frames: impl IntoIterator<Item = LandmarkFrame>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
        }
    }
}

impl LandmarkSource for ReplaySource {
    async fn next_frame(&mut self) -> Result<Option<LandmarkFrame>, DmsError> {
        Ok(self.frames.pop_front())
    }
}
