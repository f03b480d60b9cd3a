//! Export progress reporting
//!
//! The exporter reports one job per pass over a mesh, armature or the written
//! scene, with a step per item. Jobs run one after another and never nest.
//! Sinks must not fail; every method has a no-op default.

/// Receives progress checkpoints
pub trait ProgressSink {
    /// A job with `total` steps is starting
    fn start_job(&mut self, _name: &str, _total: usize) {}

    /// `current` of the job's steps are done
    fn update(&mut self, _current: usize) {}

    fn end_job(&mut self) {}
}

/// Discards all progress
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {}

/// Logs progress through `tracing`
///
/// Updates are logged at most every `step` ticks so large meshes do not flood
/// the log.
#[derive(Debug, Clone)]
pub struct LogProgress {
    job: Option<(String, usize)>,
    step: usize,
    last: usize,
}

impl LogProgress {
    pub fn new(step: usize) -> Self {
        Self {
            job: None,
            step: step.max(1),
            last: 0,
        }
    }
}

impl Default for LogProgress {
    fn default() -> Self {
        Self::new(500)
    }
}

impl ProgressSink for LogProgress {
    fn start_job(&mut self, name: &str, total: usize) {
        tracing::info!("{} ({} steps)", name, total);
        self.job = Some((name.to_string(), total));
        self.last = 0;
    }

    fn update(&mut self, current: usize) {
        if let Some((name, total)) = &self.job {
            if current >= self.last + self.step || current == *total {
                tracing::debug!("{}: {}/{}", name, current, total);
                self.last = current;
            }
        }
    }

    fn end_job(&mut self) {
        if let Some((name, _)) = self.job.take() {
            tracing::debug!("Finished {}", name);
        }
    }
}

/// Counts steps of a job and forwards them to a sink
pub(crate) struct JobTicker<'a> {
    sink: &'a mut dyn ProgressSink,
    current: usize,
}

impl<'a> JobTicker<'a> {
    pub(crate) fn start(sink: &'a mut dyn ProgressSink, name: &str, total: usize) -> Self {
        sink.start_job(name, total);
        Self { sink, current: 0 }
    }

    pub(crate) fn tick(&mut self) {
        self.current += 1;
        self.sink.update(self.current);
    }
}

impl Drop for JobTicker<'_> {
    fn drop(&mut self) {
        self.sink.end_job();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
    }

    impl ProgressSink for Recorder {
        fn start_job(&mut self, name: &str, total: usize) {
            self.events.push(format!("start {} {}", name, total));
        }

        fn update(&mut self, current: usize) {
            self.events.push(format!("update {}", current));
        }

        fn end_job(&mut self) {
            self.events.push("end".to_string());
        }
    }

    #[test]
    fn test_ticker_reports_steps() {
        let mut recorder = Recorder::default();
        {
            let mut ticker = JobTicker::start(&mut recorder, "Building polygons", 2);
            ticker.tick();
            ticker.tick();
        }
        assert_eq!(recorder.events, vec!["start Building polygons 2", "update 1", "update 2", "end"]);
    }

    #[test]
    fn test_log_progress_without_job() {
        let mut progress = LogProgress::new(0);
        progress.update(3);
        progress.end_job();
        progress.start_job("Mesh", 1);
        progress.update(1);
        progress.end_job();
    }
}
