use std::collections::HashMap;

use crate::pipeline::frame_statistics::FrameStatistics;

/// Cross-cutting logger for processing-loop events.
///
/// Keeps the loop free of output formatting so tests can observe it with a
/// recording implementation.
pub trait PipelineLogger: Send {
    /// Periodic statistics line.
    fn stats(&mut self, stats: &FrameStatistics);

    /// Record how long a named stage took for one frame.
    fn timing(&mut self, stage: &str, duration_ms: f64);

    /// A recoverable per-iteration failure.
    fn error(&mut self, message: &str);

    /// Log a human-readable status message.
    fn info(&mut self, message: &str);

    /// Emit the end-of-run summary. Default: no-op.
    fn summary(&self, _stats: &FrameStatistics) {}
}

/// Logger backed by the `log` facade, with phase-tagged lines and a
/// per-stage timing breakdown in the summary.
#[derive(Default)]
pub struct LogPipelineLogger {
    timings: HashMap<String, Vec<f64>>,
}

impl LogPipelineLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats_line(stats: &FrameStatistics) -> String {
        format!(
            "[STATS] Frame: {:5} | Elapsed: {:6.1}s | FPS: {:5.1} | Faces: {}",
            stats.frames(),
            stats.elapsed().as_secs_f64(),
            stats.average_fps(),
            stats.last_face_count()
        )
    }

    pub fn summary_string(&self, stats: &FrameStatistics) -> String {
        let mut lines = vec![
            "[STATS] Final statistics:".to_string(),
            format!("   Total frames: {}", stats.frames()),
            format!("   Runtime: {:.1}s", stats.elapsed().as_secs_f64()),
            format!("   Average FPS: {:.1}", stats.average_fps()),
            format!("   Errors: {}", stats.errors()),
        ];

        let mut stages: Vec<_> = self.timings.keys().collect();
        stages.sort();
        for stage in stages {
            let durations = &self.timings[stage];
            if durations.is_empty() {
                continue;
            }
            let avg_ms = durations.iter().sum::<f64>() / durations.len() as f64;
            lines.push(format!("   {stage:8}: avg {avg_ms:6.1}ms"));
        }
        lines.join("\n")
    }

    #[cfg(test)]
    fn timings_for(&self, stage: &str) -> Option<&[f64]> {
        self.timings.get(stage).map(|v| v.as_slice())
    }
}

impl PipelineLogger for LogPipelineLogger {
    fn stats(&mut self, stats: &FrameStatistics) {
        log::info!("{}", Self::stats_line(stats));
    }

    fn timing(&mut self, stage: &str, duration_ms: f64) {
        self.timings
            .entry(stage.to_string())
            .or_default()
            .push(duration_ms);
    }

    fn error(&mut self, message: &str) {
        log::error!("[ERROR] {message}");
    }

    fn info(&mut self, message: &str) {
        log::info!("{message}");
    }

    fn summary(&self, stats: &FrameStatistics) {
        log::info!("{}", self.summary_string(stats));
    }
}
