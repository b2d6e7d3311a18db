//! Alerting System
//!
//! Turns the per-frame drowsiness flag into alarm start/stop commands and
//! drives the alarm output.

mod manager;
mod sink;

pub use manager::{AlarmCommand, AlarmConfig, AlarmManager};
pub use sink::{AlarmSink, LogAlarmSink, RecordingSink};

use thiserror::Error;

/// Alarm output errors
#[derive(Error, Debug)]
pub enum AlarmError {
    /// Reserved for device-backed sinks (speaker, buzzer) that can be missing
    /// or busy; the log and recording sinks never fail
    #[error("Alarm output unavailable: {0}")]
    Unavailable(String),
}
