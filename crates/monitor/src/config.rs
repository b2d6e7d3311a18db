//! Layered application configuration

use std::collections::HashMap;
use std::path::Path;

use alerting::AlarmConfig;
use config::{Config, Environment, File};
use dms::DmsConfig;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::MonitorError;

/// Environment variable prefix, e.g. `DROWSY__DMS__EVALUATOR__EAR_THRESHOLD`
pub const ENV_PREFIX: &str = "DROWSY";

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub dms: DmsConfig,
    pub alarm: AlarmConfig,
}

impl AppConfig {
    /// Load defaults, then the optional file, then `DROWSY__*` variables
    pub fn load(path: Option<&Path>) -> Result<Self, MonitorError> {
        Self::load_from(path, None)
    }

    /// Same as [`AppConfig::load`] with an explicit environment map
    pub fn load_from(
        path: Option<&Path>,
        env: Option<HashMap<String, String>>,
    ) -> Result<Self, MonitorError> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            info!("Loading configuration from {}", path.display());
            builder = builder.add_source(File::from(path).required(true));
        }
        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true)
                .source(env),
        );

        let config: AppConfig = builder.build()?.try_deserialize()?;
        config.dms.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dms::{EyeLayout, TrackingPolicy};
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> Option<HashMap<String, String>> {
        Some(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_defaults_without_sources() {
        let config = AppConfig::load_from(None, env(&[])).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_file_then_env() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[dms]
layout = "face_mesh"
tracking = "shared"

[dms.evaluator]
ear_threshold = 0.22
required_consecutive_frames = 15

[alarm]
enabled = false
"#
        )
        .unwrap();

        let config = AppConfig::load_from(
            Some(file.path()),
            env(&[("DROWSY__DMS__EVALUATOR__REQUIRED_CONSECUTIVE_FRAMES", "5")]),
        )
        .unwrap();

        assert_eq!(config.dms.layout, EyeLayout::FaceMesh);
        assert_eq!(config.dms.tracking, TrackingPolicy::Shared);
        assert_eq!(config.dms.evaluator.ear_threshold, 0.22);
        assert_eq!(config.dms.evaluator.required_consecutive_frames, 5);
        assert!(!config.alarm.enabled);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let result = AppConfig::load_from(
            None,
            env(&[("DROWSY__DMS__EVALUATOR__REQUIRED_CONSECUTIVE_FRAMES", "0")]),
        );
        assert!(matches!(result, Err(MonitorError::Dms(dms::DmsError::Config(_)))));
    }

    #[test]
    fn test_missing_file_is_error() {
        let result = AppConfig::load_from(Some(Path::new("/nonexistent/drowsy.toml")), env(&[]));
        assert!(matches!(result, Err(MonitorError::Config(_))));
    }
}
