//! Drowsiness state tracking

use serde::{Deserialize, Serialize};

use crate::config::EvaluatorConfig;

/// Drowsiness phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DrowsinessState {
    #[default]
    Normal,
    Alert,
}

/// Evaluator state carried from one frame to the next for one face
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EvaluatorState {
    /// Consecutive frames with mean EAR below threshold
    pub consecutive_low_frames: u32,

    /// Whether the drowsiness alert is raised
    pub alert_active: bool,
}

impl EvaluatorState {
    pub fn phase(&self) -> DrowsinessState {
        if self.alert_active {
            DrowsinessState::Alert
        } else {
            DrowsinessState::Normal
        }
    }

    /// Reset state (on driver change)
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Result of evaluating one frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameEvaluation {
    pub alert: bool,
    pub mean_ear: f64,
    pub new_state: EvaluatorState,
}

/// Fold one frame's eye aspect ratios into the evaluator state.
///
/// A frame counts as closed only when the mean EAR is strictly below
/// `ear_threshold`; any open frame resets the counter. The alert holds while
/// the counter is at or above `required_consecutive_frames`.
pub fn evaluate_frame(
    left_ear: f64,
    right_ear: f64,
    state: EvaluatorState,
    config: &EvaluatorConfig,
) -> FrameEvaluation {
    let mean_ear = (left_ear + right_ear) / 2.0;

    let consecutive_low_frames = if mean_ear < config.ear_threshold {
        state.consecutive_low_frames.saturating_add(1)
    } else {
        0
    };
    let alert = consecutive_low_frames >= config.required_consecutive_frames;

    FrameEvaluation {
        alert,
        mean_ear,
        new_state: EvaluatorState {
            consecutive_low_frames,
            alert_active: alert,
        },
    }
}
