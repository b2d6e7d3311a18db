//! Per-frame driving loop

use std::future::Future;
use std::time::Instant;

use alerting::{AlarmCommand, AlarmManager, AlarmSink};
use dms::{FaceOutcome, FaceTracker, LandmarkSource, Overlay};
use serde::Serialize;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{debug, info};

use crate::config::AppConfig;
use crate::fps::FpsMeter;
use crate::MonitorError;

/// One face in a frame report
#[derive(Debug, Clone, Serialize)]
pub struct FaceReport {
    #[serde(flatten)]
    pub outcome: FaceOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overlay: Option<Overlay>,
}

/// Output line written for every processed frame
#[derive(Debug, Clone, Serialize)]
pub struct FrameReport {
    pub sequence: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fps: Option<f64>,
    pub face_detected: bool,
    pub alert: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alarm: Option<AlarmCommand>,
    pub faces: Vec<FaceReport>,
}

/// Totals for a finished run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub frames: u64,
    pub alarm_starts: u64,
    pub rejected_faces: u64,
}

/// Process frames until the source ends or `shutdown` resolves.
///
/// Every frame goes through the tracker, the alarm latch and the sink, and
/// produces one JSON line on `output`. A sounding alarm is stopped on exit.
pub async fn run<S, W, A>(
    config: &AppConfig,
    source: &mut S,
    output: &mut W,
    sink: &mut A,
    shutdown: impl Future<Output = ()>,
) -> Result<RunSummary, MonitorError>
where
    S: LandmarkSource,
    W: AsyncWrite + Unpin,
    A: AlarmSink,
{
    let mut tracker = FaceTracker::new(config.dms.clone())?;
    let mut alarm = AlarmManager::new(config.alarm.clone());
    let mut fps = FpsMeter::new();
    let mut summary = RunSummary::default();
    let started = Instant::now();

    tokio::pin!(shutdown);
    info!("Starting drowsiness monitoring");

    loop {
        let frame = tokio::select! {
            biased;
            _ = &mut shutdown => {
                info!("Shutdown requested");
                break;
            }
            frame = source.next_frame() => match frame? {
                Some(frame) => frame,
                None => break,
            },
        };

        let now_ms = frame
            .timestamp_ms
            .map(|ms| ms as f64)
            .unwrap_or_else(|| started.elapsed().as_secs_f64() * 1000.0);

        let analysis = tracker.process(&frame);
        // Tracked state, so a missed or rejected face does not silence the alarm
        let alert = tracker.any_alert_active();
        let command = alarm.update(alert);
        if let Some(command) = command {
            sink.apply(command)?;
            if command == AlarmCommand::Start {
                summary.alarm_starts += 1;
                metrics::counter!("dms_alarm_starts_total").increment(1);
            }
        }

        summary.frames += 1;
        summary.rejected_faces += analysis.rejected_count() as u64;
        metrics::counter!("dms_frames_total").increment(1);
        metrics::counter!("dms_faces_rejected_total").increment(analysis.rejected_count() as u64);
        if let Some(ear) = analysis.min_mean_ear() {
            metrics::gauge!("dms_mean_ear").set(ear);
        }

        let report = FrameReport {
            sequence: analysis.sequence,
            fps: fps.tick(now_ms),
            face_detected: analysis.face_detected,
            alert,
            alarm: command,
            faces: analysis
                .faces
                .into_iter()
                .map(|outcome| FaceReport {
                    overlay: outcome.analysis().map(|a| a.overlay()),
                    outcome,
                })
                .collect(),
        };
        debug!("Frame {}: alert {}", report.sequence, report.alert);

        let mut line = serde_json::to_vec(&report)?;
        line.push(b'\n');
        output.write_all(&line).await?;
        output.flush().await?;
    }

    if let Some(command) = alarm.clear() {
        sink.apply(command)?;
    }

    info!(
        "Monitoring finished: {} frames, {} alarms, {} rejected faces",
        summary.frames, summary.alarm_starts, summary.rejected_faces
    );
    Ok(summary)
}
