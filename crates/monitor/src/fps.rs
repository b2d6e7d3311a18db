//! Frame rate measurement

/// Instantaneous frame rate from consecutive frame times
#[derive(Debug, Default)]
pub struct FpsMeter {
    last_ms: Option<f64>,
}

impl FpsMeter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a frame time; `None` for the first frame or a non-increasing time
    pub fn tick(&mut self, now_ms: f64) -> Option<f64> {
        let fps = self
            .last_ms
            .map(|last| now_ms - last)
            .filter(|&dt| dt > 0.0)
            .map(|dt| (1000.0 / dt).round());
        self.last_ms = Some(now_ms);
        fps
    }
}
