//! Eye landmark extraction from full-face landmark sets

use serde::{Deserialize, Serialize};

use crate::ear::{compute_ear, EyeLandmarks, EYE_LANDMARK_COUNT};
use crate::geometry::Point2D;
use crate::DmsError;

/// 68-point model: left eye points 42..48
const DLIB68_LEFT_EYE: [usize; EYE_LANDMARK_COUNT] = [42, 43, 44, 45, 46, 47];
/// 68-point model: right eye points 36..42
const DLIB68_RIGHT_EYE: [usize; EYE_LANDMARK_COUNT] = [36, 37, 38, 39, 40, 41];

/// Face mesh (468/478 points) eye contour subset
const FACE_MESH_LEFT_EYE: [usize; EYE_LANDMARK_COUNT] = [33, 160, 158, 133, 153, 144];
const FACE_MESH_RIGHT_EYE: [usize; EYE_LANDMARK_COUNT] = [362, 385, 387, 263, 373, 380];

/// Landmark model layout the face points come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EyeLayout {
    /// iBUG 68-point layout (dlib shape predictor)
    #[default]
    Dlib68,
    /// 468-point face mesh layout
    FaceMesh,
}

impl EyeLayout {
    /// Indices of the (left, right) eye landmarks, each in EAR order
    pub fn eye_indices(&self) -> (&'static [usize; 6], &'static [usize; 6]) {
        match self {
            Self::Dlib68 => (&DLIB68_LEFT_EYE, &DLIB68_RIGHT_EYE),
            Self::FaceMesh => (&FACE_MESH_LEFT_EYE, &FACE_MESH_RIGHT_EYE),
        }
    }

    /// Minimum number of face points the layout indexes into
    pub fn min_points(&self) -> usize {
        let (left, right) = self.eye_indices();
        left.iter().chain(right.iter()).max().map_or(0, |&i| i + 1)
    }

    /// EAR threshold tuned for the layout's eye contour
    pub fn default_ear_threshold(&self) -> f64 {
        match self {
            Self::Dlib68 => 0.25,
            Self::FaceMesh => 0.22,
        }
    }

    /// Pull both eyes out of a full face landmark set
    pub fn extract(&self, face: &[Point2D]) -> Result<EyePair, DmsError> {
        let (left, right) = self.eye_indices();
        Ok(EyePair {
            left: pick(face, left)?,
            right: pick(face, right)?,
        })
    }
}

fn pick(face: &[Point2D], indices: &[usize; EYE_LANDMARK_COUNT]) -> Result<EyeLandmarks, DmsError> {
    let mut points = [Point2D::default(); EYE_LANDMARK_COUNT];
    for (slot, &index) in points.iter_mut().zip(indices) {
        *slot = *face.get(index).ok_or(DmsError::MissingLandmark {
            index,
            available: face.len(),
        })?;
    }
    Ok(EyeLandmarks::new(points))
}

/// Both eyes of one face for one frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EyePair {
    pub left: EyeLandmarks,
    pub right: EyeLandmarks,
}

impl EyePair {
    /// (left, right) eye aspect ratios
    pub fn ears(&self) -> Result<(f64, f64), DmsError> {
        Ok((compute_ear(&self.left)?, compute_ear(&self.right)?))
    }
}
