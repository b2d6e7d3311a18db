//! Alarm Manager Implementation

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Alarm configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlarmConfig {
    /// Sound the alarm at all
    pub enabled: bool,
    /// Maximum alarm activations per hour before throttling
    pub max_activations_per_hour: usize,
}

impl Default for AlarmConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_activations_per_hour: 60,
        }
    }
}

/// Command for the alarm output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlarmCommand {
    Start,
    Stop,
}

/// Latches the drowsiness flag into start/stop edges
pub struct AlarmManager {
    /// Configuration
    config: AlarmConfig,
    /// Drowsiness flag seen on the previous frame
    alert_seen: bool,
    /// Whether the alarm output is currently sounding
    active: bool,
    /// Total activations since creation
    activation_count: usize,
    /// Activations in current hour
    hourly_count: usize,
    /// Hour start time
    hour_start: Instant,
}

impl AlarmManager {
    /// Create a new alarm manager
    pub fn new(config: AlarmConfig) -> Self {
        info!("Creating alarm manager with config: {:?}", config);
        Self {
            config,
            alert_seen: false,
            active: false,
            activation_count: 0,
            hourly_count: 0,
            hour_start: Instant::now(),
        }
    }

    /// Feed this frame's drowsiness flag.
    ///
    /// Returns `Start` on the rising edge, `Stop` on the falling edge of a
    /// sounded alarm, and `None` otherwise.
    pub fn update(&mut self, alert: bool) -> Option<AlarmCommand> {
        let rising = alert && !self.alert_seen;
        self.alert_seen = alert;

        if rising {
            return self.try_start();
        }
        if !alert && self.active {
            self.active = false;
            info!("Alarm stopped after driver reopened eyes");
            return Some(AlarmCommand::Stop);
        }
        None
    }

    fn try_start(&mut self) -> Option<AlarmCommand> {
        if !self.config.enabled {
            warn!("Alarm suppressed: disabled");
            return None;
        }

        // Reset hourly counter if needed
        if self.hour_start.elapsed() > Duration::from_secs(3600) {
            self.hourly_count = 0;
            self.hour_start = Instant::now();
        }

        if self.hourly_count >= self.config.max_activations_per_hour {
            warn!("Alarm throttled: max activations per hour reached");
            return None;
        }

        self.hourly_count += 1;
        self.activation_count += 1;
        self.active = true;
        info!("Alarm started (activation {})", self.activation_count);
        Some(AlarmCommand::Start)
    }

    /// Whether the alarm is currently sounding
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn activation_count(&self) -> usize {
        self.activation_count
    }

    /// Get hourly activation count
    pub fn hourly_count(&self) -> usize {
        self.hourly_count
    }

    /// Silence and forget the current episode
    pub fn clear(&mut self) -> Option<AlarmCommand> {
        self.alert_seen = false;
        if std::mem::take(&mut self.active) {
            Some(AlarmCommand::Stop)
        } else {
            None
        }
    }
}

impl Default for AlarmManager {
    fn default() -> Self {
        Self::new(AlarmConfig::default())
    }
}
