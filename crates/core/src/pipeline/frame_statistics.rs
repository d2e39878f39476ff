use std::time::{Duration, Instant};

/// Running counters for the processing loop.
#[derive(Clone, Debug)]
pub struct FrameStatistics {
    frames: u64,
    errors: u64,
    last_face_count: usize,
    started: Instant,
}

impl FrameStatistics {
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    pub fn starting_at(started: Instant) -> Self {
        Self {
            frames: 0,
            errors: 0,
            last_face_count: 0,
            started,
        }
    }

    pub fn record_frame(&mut self, faces: usize) {
        self.frames += 1;
        self.last_face_count = faces;
    }

    pub fn record_error(&mut self) {
        self.errors += 1;
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn errors(&self) -> u64 {
        self.errors
    }

    pub fn last_face_count(&self) -> usize {
        self.last_face_count
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Frames per second since start, 0 when no time has passed.
    pub fn average_fps(&self) -> f64 {
        Self::fps(self.frames, self.elapsed())
    }

    fn fps(frames: u64, elapsed: Duration) -> f64 {
        let secs = elapsed.as_secs_f64();
        if secs > 0.0 {
            frames as f64 / secs
        } else {
            0.0
        }
    }
}

impl Default for FrameStatistics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_counters() {
        let mut stats = FrameStatistics::new();
        stats.record_frame(2);
        stats.record_frame(0);
        stats.record_error();
        assert_eq!(stats.frames(), 2);
        assert_eq!(stats.errors(), 1);
        assert_eq!(stats.last_face_count(), 0);
    }

    #[test]
    fn test_fps_from_frames_and_elapsed() {
        assert_relative_eq!(FrameStatistics::fps(60, Duration::from_secs(2)), 30.0);
        assert_relative_eq!(FrameStatistics::fps(10, Duration::ZERO), 0.0);
    }

    #[test]
    fn test_average_fps_uses_start_instant() {
        let start = Instant::now() - Duration::from_secs(10);
        let mut stats = FrameStatistics::starting_at(start);
        for _ in 0..50 {
            stats.record_frame(1);
        }
        let fps = stats.average_fps();
        assert!(fps > 4.0 && fps <= 5.0, "fps = {fps}");
    }
}
