//! Eye aspect ratio (EAR)
//!
//! Six landmarks per eye, in anatomical order:
//!
//! ```text
//!        p1   p2
//!   p0            p3
//!        p5   p4
//! ```
//!
//! `EAR = (|p1 - p5| + |p2 - p4|) / (2 * |p0 - p3|)`. An open eye sits well
//! above 0.2; a closed eye drops towards zero.

use serde::{Deserialize, Serialize};

use crate::geometry::Point2D;
use crate::DmsError;

/// Number of landmarks describing one eye
pub const EYE_LANDMARK_COUNT: usize = 6;

/// Corner distances below this are treated as coincident corners
const MIN_HORIZONTAL_DISTANCE: f64 = f64::EPSILON;

/// One eye's six landmarks: outer corner, upper-outer, upper-inner,
/// inner corner, lower-inner, lower-outer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EyeLandmarks(pub [Point2D; EYE_LANDMARK_COUNT]);

impl EyeLandmarks {
    pub fn new(points: [Point2D; EYE_LANDMARK_COUNT]) -> Self {
        Self(points)
    }

    pub fn points(&self) -> &[Point2D; EYE_LANDMARK_COUNT] {
        &self.0
    }

    /// The two vertical measurements (A, B)
    pub fn vertical_distances(&self) -> (f64, f64) {
        let p = &self.0;
        (p[1].distance(&p[5]), p[2].distance(&p[4]))
    }

    /// The horizontal corner-to-corner measurement (C)
    pub fn horizontal_distance(&self) -> f64 {
        self.0[0].distance(&self.0[3])
    }
}

impl TryFrom<&[Point2D]> for EyeLandmarks {
    type Error = DmsError;

    fn try_from(points: &[Point2D]) -> Result<Self, Self::Error> {
        let points: [Point2D; EYE_LANDMARK_COUNT] =
            points.try_into().map_err(|_| DmsError::InvalidLandmarkCount {
                expected: EYE_LANDMARK_COUNT,
                actual: points.len(),
            })?;
        Ok(Self(points))
    }
}

/// Compute the eye aspect ratio of one eye.
///
/// Fails with [`DmsError::NonFiniteLandmark`] for NaN/infinite coordinates and
/// with [`DmsError::DegenerateGeometry`] when the two eye corners coincide,
/// so the result is always finite and non-negative.
pub fn compute_ear(eye: &EyeLandmarks) -> Result<f64, DmsError> {
    if let Some(index) = eye.0.iter().position(|p| !p.is_finite()) {
        return Err(DmsError::NonFiniteLandmark { index });
    }

    let (a, b) = eye.vertical_distances();
    let c = eye.horizontal_distance();

    if c <= MIN_HORIZONTAL_DISTANCE {
        return Err(DmsError::DegenerateGeometry { horizontal: c });
    }

    Ok((a + b) / (2.0 * c))
}

/// Validate the point count, then compute the eye aspect ratio
pub fn compute_ear_from_slice(points: &[Point2D]) -> Result<f64, DmsError> {
    compute_ear(&EyeLandmarks::try_from(points)?)
}
