use std::time::Instant;

/// Wall-clock timer for one pipeline step.
pub struct StepTimer {
    label: &'static str,
    start: Instant,
}

impl StepTimer {
    pub fn start(label: &'static str) -> Self {
        Self {
            label,
            start: Instant::now(),
        }
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }

    /// Logs and returns the elapsed time.
    pub fn finish(self) -> f64 {
        let ms = self.elapsed_ms();
        log::debug!("step {} took {ms:.2} ms", self.label);
        ms
    }
}
