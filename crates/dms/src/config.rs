//! DMS configuration

use serde::{Deserialize, Serialize};

use crate::landmarks::EyeLayout;
use crate::tracker::TrackingPolicy;
use crate::DmsError;

/// Thresholds for the closed-eye evaluator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluatorConfig {
    /// Mean EAR strictly below this counts the frame as eyes closed
    pub ear_threshold: f64,

    /// Consecutive closed frames before the drowsiness alert fires
    pub required_consecutive_frames: u32,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            ear_threshold: 0.25,
            required_consecutive_frames: 20,
        }
    }
}

impl EvaluatorConfig {
    pub fn validate(&self) -> Result<(), DmsError> {
        if !self.ear_threshold.is_finite() || self.ear_threshold <= 0.0 {
            return Err(DmsError::Config(format!(
                "ear_threshold must be finite and positive, got {}",
                self.ear_threshold
            )));
        }
        if self.required_consecutive_frames == 0 {
            return Err(DmsError::Config(
                "required_consecutive_frames must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// DMS configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DmsConfig {
    /// Closed-eye thresholds
    pub evaluator: EvaluatorConfig,

    /// Landmark layout the face points come in
    pub layout: EyeLayout,

    /// How evaluator state is kept when several faces are in frame
    pub tracking: TrackingPolicy,

    /// Frames a face may go missing before its state is dropped
    pub max_absent_frames: u32,
}

impl Default for DmsConfig {
    fn default() -> Self {
        Self {
            evaluator: EvaluatorConfig::default(),
            layout: EyeLayout::default(),
            tracking: TrackingPolicy::default(),
            max_absent_frames: 30,
        }
    }
}

impl DmsConfig {
    /// Create strict config (alerts sooner)
    pub fn strict() -> Self {
        Self {
            evaluator: EvaluatorConfig {
                ear_threshold: 0.27,
                required_consecutive_frames: 10,
            },
            ..Default::default()
        }
    }

    /// Create lenient config (fewer false alarms)
    pub fn lenient() -> Self {
        Self {
            evaluator: EvaluatorConfig {
                ear_threshold: 0.20,
                required_consecutive_frames: 40,
            },
            ..Default::default()
        }
    }

    /// Default config with the threshold matched to a landmark layout
    pub fn for_layout(layout: EyeLayout) -> Self {
        Self {
            evaluator: EvaluatorConfig {
                ear_threshold: layout.default_ear_threshold(),
                ..Default::default()
            },
            layout,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), DmsError> {
        self.evaluator.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DmsConfig::default();
        assert_eq!(config.evaluator.ear_threshold, 0.25);
        assert_eq!(config.evaluator.required_consecutive_frames, 20);
        assert_eq!(config.layout, EyeLayout::Dlib68);
        assert_eq!(config.tracking, TrackingPolicy::PerFace);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_presets_validate() {
        assert!(DmsConfig::strict().validate().is_ok());
        assert!(DmsConfig::lenient().validate().is_ok());

        let mesh = DmsConfig::for_layout(EyeLayout::FaceMesh);
        assert_eq!(mesh.evaluator.ear_threshold, 0.22);
        assert_eq!(mesh.layout, EyeLayout::FaceMesh);
    }

    #[test]
    fn test_rejects_bad_values() {
        let zero_frames = EvaluatorConfig {
            required_consecutive_frames: 0,
            ..Default::default()
        };
        assert!(matches!(zero_frames.validate(), Err(DmsError::Config(_))));

        for threshold in [0.0, -0.1, f64::NAN, f64::INFINITY] {
            let config = EvaluatorConfig {
                ear_threshold: threshold,
                ..Default::default()
            };
            assert!(config.validate().is_err(), "accepted {threshold}");
        }
    }

    #[test]
    fn test_partial_deserialize() {
        let config: DmsConfig = serde_json::from_str(
            r#"{"evaluator": {"ear_threshold": 0.3}, "layout": "face_mesh"}"#,
        )
        .unwrap();

        assert_eq!(config.evaluator.ear_threshold, 0.3);
        assert_eq!(config.evaluator.required_consecutive_frames, 20);
        assert_eq!(config.layout, EyeLayout::FaceMesh);
        assert_eq!(config.max_absent_frames, 30);
    }
}
