//! Drowsiness Monitor
//!
//! Frame loop around the DMS core: reads landmark frames, tracks eye
//! closure per face, drives the alarm and writes one report per frame.

pub mod config;
pub mod fps;
pub mod pipeline;
pub mod source;

pub use config::AppConfig;
pub use fps::FpsMeter;
pub use pipeline::{run, FaceReport, FrameReport, RunSummary};
pub use source::JsonLinesSource;

use alerting::AlarmError;
use dms::DmsError;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Monitor error types
#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("Configuration error: {0}")]
    Config(#[from] ::config::ConfigError),

    #[error(transparent)]
    Dms(#[from] DmsError),

    #[error("Alarm error: {0}")]
    Alarm(#[from] AlarmError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Logging setup failed: {0}")]
    Logging(String),
}

/// Initialize logging to stderr; `RUST_LOG` overrides the `info` default
pub fn init_logging(json: bool) -> Result<(), MonitorError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);

    let result = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    result.map_err(|e| MonitorError::Logging(e.to_string()))
}
