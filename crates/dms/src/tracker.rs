//! Per-face drowsiness tracking across frames

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::analysis::{FaceAnalysis, FaceOutcome, FrameAnalysis};
use crate::config::DmsConfig;
use crate::detector::{DetectedFace, FaceId, LandmarkFrame};
use crate::state::{evaluate_frame, EvaluatorState};
use crate::DmsError;

/// Key used for the single state under [`TrackingPolicy::Shared`]
const SHARED_KEY: FaceId = 0;

/// How evaluator state is kept when several faces are in frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackingPolicy {
    /// Independent counter per face id
    #[default]
    PerFace,
    /// One counter for every face; the last face evaluated in a frame wins
    Shared,
}

#[derive(Debug, Clone, Default)]
struct TrackedFace {
    state: EvaluatorState,
    absent_frames: u32,
}

/// Drowsiness tracker fed once per frame
pub struct FaceTracker {
    config: DmsConfig,
    faces: HashMap<FaceId, TrackedFace>,
    frames_processed: u64,
}

impl FaceTracker {
    /// Create a tracker, rejecting invalid thresholds
    pub fn new(config: DmsConfig) -> Result<Self, DmsError> {
        config.validate()?;
        info!(
            "Creating face tracker: threshold {}, {} frames, {:?} layout, {:?} tracking",
            config.evaluator.ear_threshold,
            config.evaluator.required_consecutive_frames,
            config.layout,
            config.tracking
        );
        Ok(Self {
            config,
            faces: HashMap::new(),
            frames_processed: 0,
        })
    }

    pub fn config(&self) -> &DmsConfig {
        &self.config
    }

    /// Analyze all faces of a single frame
    pub fn process(&mut self, frame: &LandmarkFrame) -> FrameAnalysis {
        self.frames_processed += 1;

        let mut seen = HashSet::new();
        let faces = frame
            .faces
            .iter()
            .enumerate()
            .map(|(index, face)| {
                let id = face.id.unwrap_or(index as FaceId);
                let key = self.key_for(id);
                // One state update per key per frame, except the shared counter
                let result = if seen.insert(key) || self.config.tracking == TrackingPolicy::Shared {
                    self.evaluate_face(key, id, face)
                } else {
                    Err(DmsError::DuplicateFace { id })
                };
                match result {
                    Ok(analysis) => FaceOutcome::Evaluated(analysis),
                    Err(e) => {
                        warn!("Frame {}: face {} rejected: {}", frame.sequence, id, e);
                        FaceOutcome::rejected(id, &e)
                    }
                }
            })
            .collect();

        self.age_absent(&seen);

        FrameAnalysis {
            sequence: frame.sequence,
            face_detected: !frame.faces.is_empty(),
            faces,
        }
    }

    fn key_for(&self, id: FaceId) -> FaceId {
        match self.config.tracking {
            TrackingPolicy::PerFace => id,
            TrackingPolicy::Shared => SHARED_KEY,
        }
    }

    fn evaluate_face(
        &mut self,
        key: FaceId,
        id: FaceId,
        face: &DetectedFace,
    ) -> Result<FaceAnalysis, DmsError> {
        let eyes = self.config.layout.extract(&face.landmarks)?;
        let (left_ear, right_ear) = eyes.ears()?;

        let tracked = self.faces.entry(key).or_default();
        let eval = evaluate_frame(left_ear, right_ear, tracked.state, &self.config.evaluator);

        if eval.alert && !tracked.state.alert_active {
            info!(
                "Face {}: drowsiness alert after {} closed frames",
                id, eval.new_state.consecutive_low_frames
            );
        } else if !eval.alert && tracked.state.alert_active {
            info!("Face {}: eyes open again, alert cleared", id);
        }
        debug!(
            "Face {}: EAR left {:.3} right {:.3} mean {:.3}, low frames {}",
            id, left_ear, right_ear, eval.mean_ear, eval.new_state.consecutive_low_frames
        );

        tracked.state = eval.new_state;
        tracked.absent_frames = 0;

        Ok(FaceAnalysis {
            face_id: id,
            left_ear,
            right_ear,
            mean_ear: eval.mean_ear,
            alert: eval.alert,
            consecutive_low_frames: eval.new_state.consecutive_low_frames,
        })
    }

    /// Count missed frames for faces not in this frame, dropping stale ones
    fn age_absent(&mut self, seen: &HashSet<FaceId>) {
        let max_absent = self.config.max_absent_frames;
        self.faces.retain(|id, tracked| {
            if seen.contains(id) {
                tracked.absent_frames = 0;
                return true;
            }
            tracked.absent_frames += 1;
            if tracked.absent_frames > max_absent {
                debug!("Face {} absent for {} frames, dropping state", id, tracked.absent_frames);
                false
            } else {
                true
            }
        });
    }

    /// Current evaluator state for a face id
    pub fn state_of(&self, id: FaceId) -> Option<EvaluatorState> {
        self.faces.get(&self.key_for(id)).map(|t| t.state)
    }

    /// Whether any tracked face currently has the drowsiness alert raised.
    ///
    /// Unlike [`FrameAnalysis::any_alert`] this holds through frames where
    /// the face was missed or rejected.
    pub fn any_alert_active(&self) -> bool {
        self.faces.values().any(|t| t.state.alert_active)
    }

    pub fn tracked_faces(&self) -> usize {
        self.faces.len()
    }

    pub fn frames_processed(&self) -> u64 {
        self.frames_processed
    }

    /// Reset driver state (on driver change)
    pub fn reset(&mut self) {
        info!("Resetting tracker state for {} faces", self.faces.len());
        self.faces.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EvaluatorConfig;
    use crate::geometry::Point2D;

    /// 68-point face whose eyes both have the given EAR
    fn face_with_ear(id: FaceId, ear: f64) -> DetectedFace {
        let mut landmarks = vec![Point2D::new(0.0, 0.0); 68];
        for start in [36, 42] {
            // Corners 4 apart, lids 2*ear*2 apart -> EAR = ear
            let half = 2.0 * ear;
            let eye = [
                (0.0, 0.0),
                (1.0, -half),
                (3.0, -half),
                (4.0, 0.0),
                (3.0, half),
                (1.0, half),
            ];
            for (i, (x, y)) in eye.into_iter().enumerate() {
                landmarks[start + i] = Point2D::new(x + start as f64 * 10.0, y);
            }
        }
        DetectedFace {
            id: Some(id),
            landmarks,
        }
    }

    fn frame(sequence: u64, faces: Vec<DetectedFace>) -> LandmarkFrame {
        LandmarkFrame {
            sequence,
            timestamp_ms: None,
            faces,
        }
    }

    fn tracker(policy: TrackingPolicy, frames: u32) -> FaceTracker {
        FaceTracker::new(DmsConfig {
            evaluator: EvaluatorConfig {
                ear_threshold: 0.25,
                required_consecutive_frames: frames,
            },
            tracking: policy,
            max_absent_frames: 2,
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = DmsConfig {
            evaluator: EvaluatorConfig {
                required_consecutive_frames: 0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(matches!(FaceTracker::new(config), Err(DmsError::Config(_))));
    }

    #[test]
    fn test_ear_from_landmarks() {
        let mut t = tracker(TrackingPolicy::PerFace, 3);
        let analysis = t.process(&frame(1, vec![face_with_ear(0, 0.35)]));

        let face = analysis.evaluated().next().unwrap();
        assert!((face.left_ear - 0.35).abs() < 1e-9);
        assert!((face.mean_ear - 0.35).abs() < 1e-9);
        assert!(!face.alert);
        assert!(analysis.face_detected);
    }

    #[test]
    fn test_alert_after_consecutive_frames() {
        let mut t = tracker(TrackingPolicy::PerFace, 3);
        let alerts: Vec<bool> = (1..=3)
            .map(|seq| t.process(&frame(seq, vec![face_with_ear(0, 0.1)])).any_alert())
            .collect();

        assert_eq!(alerts, vec![false, false, true]);
        assert!(t.state_of(0).unwrap().alert_active);
    }

    #[test]
    fn test_faces_tracked_independently() {
        let mut t = tracker(TrackingPolicy::PerFace, 2);
        for seq in 1..=2 {
            t.process(&frame(seq, vec![face_with_ear(1, 0.1), face_with_ear(2, 0.3)]));
        }

        assert!(t.state_of(1).unwrap().alert_active);
        assert_eq!(t.state_of(2).unwrap().consecutive_low_frames, 0);
        assert_eq!(t.tracked_faces(), 2);
    }

    #[test]
    fn test_shared_policy_last_face_wins() {
        let mut t = tracker(TrackingPolicy::Shared, 2);
        // Closed-eye face first, open-eye face last: the open face resets the counter
        for seq in 1..=3 {
            let analysis = t.process(&frame(seq, vec![face_with_ear(1, 0.1), face_with_ear(2, 0.3)]));
            assert!(!analysis.any_alert());
        }
        assert_eq!(t.state_of(1), t.state_of(2));
        assert_eq!(t.tracked_faces(), 1);
    }

    #[test]
    fn test_rejected_face_keeps_state() {
        let mut t = tracker(TrackingPolicy::PerFace, 3);
        t.process(&frame(1, vec![face_with_ear(0, 0.1)]));

        let broken = DetectedFace {
            id: Some(0),
            landmarks: vec![Point2D::default(); 10],
        };
        let analysis = t.process(&frame(2, vec![broken, face_with_ear(5, 0.3)]));

        assert_eq!(analysis.rejected_count(), 1);
        assert!(matches!(
            &analysis.faces[0],
            FaceOutcome::Rejected { face_id: 0, reason } if reason.contains("missing")
        ));
        assert_eq!(t.state_of(0).unwrap().consecutive_low_frames, 1);
    }

    #[test]
    fn test_absent_face_state_dropped() {
        let mut t = tracker(TrackingPolicy::PerFace, 3);
        t.process(&frame(1, vec![face_with_ear(0, 0.1)]));

        // max_absent_frames = 2: survives two empty frames, gone on the third
        let empty = t.process(&frame(2, vec![]));
        assert!(!empty.face_detected);
        t.process(&frame(3, vec![]));
        assert!(t.state_of(0).is_some());
        t.process(&frame(4, vec![]));
        assert!(t.state_of(0).is_none());
        assert_eq!(t.frames_processed(), 4);
    }

    #[test]
    fn test_reset() {
        let mut t = tracker(TrackingPolicy::PerFace, 3);
        t.process(&frame(1, vec![face_with_ear(0, 0.1)]));
        t.reset();
        assert_eq!(t.tracked_faces(), 0);
    }

    #[test]
    fn test_faces_without_ids_use_detection_index() {
        let mut t = tracker(TrackingPolicy::PerFace, 2);
        let anonymous = |ear| DetectedFace {
            id: None,
            ..face_with_ear(0, ear)
        };

        let analysis = t.process(&frame(1, vec![anonymous(0.1), anonymous(0.1)]));
        let ids: Vec<FaceId> = analysis.faces.iter().map(FaceOutcome::face_id).collect();
        assert_eq!(ids, vec![0, 1]);
        // One closed frame each, so no alert yet
        assert!(!analysis.any_alert());
        assert_eq!(t.state_of(0).unwrap().consecutive_low_frames, 1);
        assert_eq!(t.state_of(1).unwrap().consecutive_low_frames, 1);

        assert!(t.process(&frame(2, vec![anonymous(0.1), anonymous(0.1)])).any_alert());
    }

    #[test]
    fn test_duplicate_id_counted_once_per_frame() {
        let mut t = tracker(TrackingPolicy::PerFace, 2);
        let analysis = t.process(&frame(1, vec![face_with_ear(4, 0.1), face_with_ear(4, 0.1)]));

        assert!(!analysis.any_alert());
        assert!(matches!(
            &analysis.faces[1],
            FaceOutcome::Rejected { face_id: 4, reason } if reason.contains("more than once")
        ));
        assert_eq!(t.state_of(4).unwrap().consecutive_low_frames, 1);
    }

    #[test]
    fn test_alert_held_through_missed_frames() {
        let mut t = tracker(TrackingPolicy::PerFace, 2);
        t.process(&frame(1, vec![face_with_ear(0, 0.1)]));
        t.process(&frame(2, vec![face_with_ear(0, 0.1)]));
        assert!(t.any_alert_active());

        let empty = t.process(&frame(3, vec![]));
        assert!(!empty.any_alert());
        assert!(t.any_alert_active());

        t.process(&frame(4, vec![face_with_ear(0, 0.3)]));
        assert!(!t.any_alert_active());
    }
}
