//! DMS analysis results

use serde::{Deserialize, Serialize};

use crate::detector::FaceId;
use crate::DmsError;

/// Overlay banner shown while the drowsiness alert is raised
pub const ALERT_TEXT: &str = "DROWSINESS ALERT!";

/// Evaluation of one face in one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceAnalysis {
    pub face_id: FaceId,
    pub left_ear: f64,
    pub right_ear: f64,
    pub mean_ear: f64,
    /// Drowsiness alert raised for this face
    pub alert: bool,
    pub consecutive_low_frames: u32,
}

impl FaceAnalysis {
    pub fn overlay(&self) -> Overlay {
        Overlay::new(self.alert, self.mean_ear)
    }
}

/// Per-face outcome of a frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FaceOutcome {
    Evaluated(FaceAnalysis),
    /// Landmarks unusable this frame; tracked state left untouched
    Rejected { face_id: FaceId, reason: String },
}

impl FaceOutcome {
    pub fn rejected(face_id: FaceId, err: &DmsError) -> Self {
        Self::Rejected {
            face_id,
            reason: err.to_string(),
        }
    }

    pub fn face_id(&self) -> FaceId {
        match self {
            Self::Evaluated(analysis) => analysis.face_id,
            Self::Rejected { face_id, .. } => *face_id,
        }
    }

    pub fn analysis(&self) -> Option<&FaceAnalysis> {
        match self {
            Self::Evaluated(analysis) => Some(analysis),
            Self::Rejected { .. } => None,
        }
    }
}

/// Complete analysis of one frame
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameAnalysis {
    pub sequence: u64,

    /// Whether any face was detected
    pub face_detected: bool,

    pub faces: Vec<FaceOutcome>,
}

impl FrameAnalysis {
    /// Iterate over faces that were evaluated
    pub fn evaluated(&self) -> impl Iterator<Item = &FaceAnalysis> {
        self.faces.iter().filter_map(FaceOutcome::analysis)
    }

    /// Check if any face has the drowsiness alert raised
    pub fn any_alert(&self) -> bool {
        self.evaluated().any(|f| f.alert)
    }

    /// Lowest mean EAR across evaluated faces
    pub fn min_mean_ear(&self) -> Option<f64> {
        self.evaluated().map(|f| f.mean_ear).reduce(f64::min)
    }

    pub fn rejected_count(&self) -> usize {
        self.faces
            .iter()
            .filter(|f| matches!(f, FaceOutcome::Rejected { .. }))
            .count()
    }
}

/// Text for the render stage to draw over the frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Overlay {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alert_text: Option<String>,
    pub ear_text: String,
}

impl Overlay {
    pub fn new(alert: bool, mean_ear: f64) -> Self {
        Self {
            alert_text: alert.then(|| ALERT_TEXT.to_string()),
            ear_text: format!("EAR: {mean_ear:.2}"),
        }
    }
}
