//! Alarm outputs

use tracing::{info, warn};

use crate::manager::AlarmCommand;
use crate::AlarmError;

/// Device that sounds the alarm
pub trait AlarmSink {
    fn start(&mut self) -> Result<(), AlarmError>;
    fn stop(&mut self) -> Result<(), AlarmError>;

    fn apply(&mut self, command: AlarmCommand) -> Result<(), AlarmError> {
        match command {
            AlarmCommand::Start => self.start(),
            AlarmCommand::Stop => self.stop(),
        }
    }
}

/// Alarm that only writes to the log
#[derive(Debug, Default)]
pub struct LogAlarmSink {
    sounding: bool,
}

impl AlarmSink for LogAlarmSink {
    fn start(&mut self) -> Result<(), AlarmError> {
        if self.sounding {
            return Ok(());
        }
        self.sounding = true;
        warn!("DROWSINESS ALARM ON");
        Ok(())
    }

    fn stop(&mut self) -> Result<(), AlarmError> {
        if self.sounding {
            self.sounding = false;
            info!("Drowsiness alarm off");
        }
        Ok(())
    }
}

/// Keeps every command it receives
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub commands: Vec<AlarmCommand>,
}

impl AlarmSink for RecordingSink {
    fn start(&mut self) -> Result<(), AlarmError> {
        self.commands.push(AlarmCommand::Start);
        Ok(())
    }

    fn stop(&mut self) -> Result<(), AlarmError> {
        self.commands.push(AlarmCommand::Stop);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_dispatches() {
        let mut sink = RecordingSink::default();
        sink.apply(AlarmCommand::Start).unwrap();
        sink.apply(AlarmCommand::Stop).unwrap();

        assert_eq!(sink.commands, vec![AlarmCommand::Start, AlarmCommand::Stop]);
    }

    #[test]
    fn test_log_sink_idempotent() {
        let mut sink = LogAlarmSink::default();
        sink.start().unwrap();
        sink.start().unwrap();
        assert!(sink.sounding);
        sink.stop().unwrap();
        sink.stop().unwrap();
        assert!(!sink.sounding);
    }
}
