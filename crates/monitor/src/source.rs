//! JSON-lines landmark stream

use dms::{DmsError, LandmarkFrame, LandmarkSource};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};
use tracing::{debug, warn};

/// Reads one JSON [`LandmarkFrame`] per line; malformed lines are skipped
pub struct JsonLinesSource<R> {
    lines: Lines<R>,
    line_no: u64,
    skipped: u64,
}

impl<R: AsyncBufRead + Unpin> JsonLinesSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_no: 0,
            skipped: 0,
        }
    }

    /// Malformed lines skipped so far
    pub fn skipped(&self) -> u64 {
        self.skipped
    }
}

impl<R: AsyncBufRead + Unpin> LandmarkSource for JsonLinesSource<R> {
    async fn next_frame(&mut self) -> Result<Option<LandmarkFrame>, DmsError> {
        loop {
            let Some(line) = self
                .lines
                .next_line()
                .await
                .map_err(|e| DmsError::Source(e.to_string()))?
            else {
                debug!("Landmark stream ended after {} lines", self.line_no);
                return Ok(None);
            };
            self.line_no += 1;

            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match serde_json::from_str(line) {
                Ok(frame) => return Ok(Some(frame)),
                Err(e) => {
                    self.skipped += 1;
                    metrics::counter!("dms_input_lines_skipped_total").increment(1);
                    warn!("Skipping malformed frame on line {}: {}", self.line_no, e);
                }
            }
        }
    }
}
