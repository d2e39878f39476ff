use std::time::Duration;

use thiserror::Error;

use super::constants::*;

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("capture size must be non-zero, got {width}x{height}")]
    CaptureSize { width: u32, height: u32 },
    #[error("capture frame rate must be non-zero")]
    FrameRate,
    #[error("detection interval must be >= 1")]
    DetectionInterval,
    #[error("JPEG quality must be between 1 and 100, got {0}")]
    Quality(u8),
    #[error("working size must be non-zero, got {width}x{height}")]
    WorkingSize { width: u32, height: u32 },
    #[error("working size {working:?} must not exceed the capture size {capture:?}")]
    WorkingLargerThanCapture {
        working: (u32, u32),
        capture: (u32, u32),
    },
    #[error("scale factor must be greater than 1.0, got {0}")]
    ScaleFactor(f64),
    #[error("minimum face size must be non-zero")]
    MinFaceSize,
    #[error("statistics interval must be >= 1")]
    StatsInterval,
}

/// Settings the capture device is opened with.
#[derive(Clone, Debug, PartialEq)]
pub struct CaptureSettings {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub warmup_frames: usize,
}

/// Cascade tuning applied on recomputation frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DetectionParams {
    pub scale_factor: f64,
    pub min_neighbors: u32,
    pub min_size: (u32, u32),
}

impl Default for DetectionParams {
    fn default() -> Self {
        Self {
            scale_factor: DEFAULT_SCALE_FACTOR,
            min_neighbors: DEFAULT_MIN_NEIGHBORS,
            min_size: (DEFAULT_MIN_FACE_SIZE, DEFAULT_MIN_FACE_SIZE),
        }
    }
}

/// Process-wide pipeline configuration. Immutable once validated.
#[derive(Clone, Debug, PartialEq)]
pub struct PipelineConfig {
    pub capture: CaptureSettings,
    pub detection_interval: u64,
    pub working_size: (u32, u32),
    pub detection: DetectionParams,
    pub jpeg_quality: u8,
    pub stats_interval: u64,
    pub error_backoff: Duration,
    pub stream_poll_interval: Duration,
    pub bind_host: String,
    pub bind_port: u16,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            capture: CaptureSettings {
                width: DEFAULT_CAPTURE_WIDTH,
                height: DEFAULT_CAPTURE_HEIGHT,
                fps: DEFAULT_CAPTURE_FPS,
                warmup_frames: DEFAULT_WARMUP_FRAMES,
            },
            detection_interval: DEFAULT_DETECTION_INTERVAL,
            working_size: (DEFAULT_WORKING_WIDTH, DEFAULT_WORKING_HEIGHT),
            detection: DetectionParams::default(),
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            stats_interval: DEFAULT_STATS_INTERVAL,
            error_backoff: DEFAULT_ERROR_BACKOFF,
            stream_poll_interval: DEFAULT_STREAM_POLL_INTERVAL,
            bind_host: DEFAULT_BIND_HOST.to_string(),
            bind_port: DEFAULT_BIND_PORT,
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let c = &self.capture;
        if c.width == 0 || c.height == 0 {
            return Err(ConfigError::CaptureSize {
                width: c.width,
                height: c.height,
            });
        }
        if c.fps == 0 {
            return Err(ConfigError::FrameRate);
        }
        if self.detection_interval == 0 {
            return Err(ConfigError::DetectionInterval);
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(ConfigError::Quality(self.jpeg_quality));
        }
        let (ww, wh) = self.working_size;
        if ww == 0 || wh == 0 {
            return Err(ConfigError::WorkingSize {
                width: ww,
                height: wh,
            });
        }
        if ww > c.width || wh > c.height {
            return Err(ConfigError::WorkingLargerThanCapture {
                working: self.working_size,
                capture: (c.width, c.height),
            });
        }
        let scale = self.detection.scale_factor;
        if scale.is_nan() || scale <= 1.0 {
            return Err(ConfigError::ScaleFactor(scale));
        }
        if self.detection.min_size.0 == 0 || self.detection.min_size.1 == 0 {
            return Err(ConfigError::MinFaceSize);
        }
        if self.stats_interval == 0 {
            return Err(ConfigError::StatsInterval);
        }
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.bind_host, self.bind_port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_defaults_are_valid() {
        let config = PipelineConfig::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.capture.width, 1280);
        assert_eq!(config.capture.height, 720);
        assert_eq!(config.detection_interval, 5);
        assert_eq!(config.working_size, (320, 240));
        assert_eq!(config.jpeg_quality, 85);
        assert_eq!(config.bind_address(), "0.0.0.0:5000");
    }

    fn with(f: impl FnOnce(&mut PipelineConfig)) -> PipelineConfig {
        let mut config = PipelineConfig::default();
        f(&mut config);
        config
    }

    #[rstest]
    #[case::zero_width(
        with(|c| c.capture.width = 0),
        ConfigError::CaptureSize { width: 0, height: 720 }
    )]
    #[case::zero_fps(with(|c| c.capture.fps = 0), ConfigError::FrameRate)]
    #[case::zero_interval(with(|c| c.detection_interval = 0), ConfigError::DetectionInterval)]
    #[case::zero_quality(with(|c| c.jpeg_quality = 0), ConfigError::Quality(0))]
    #[case::high_quality(with(|c| c.jpeg_quality = 101), ConfigError::Quality(101))]
    #[case::zero_working(
        with(|c| c.working_size = (0, 240)),
        ConfigError::WorkingSize { width: 0, height: 240 }
    )]
    #[case::working_above_capture(
        with(|c| c.working_size = (1920, 240)),
        ConfigError::WorkingLargerThanCapture { working: (1920, 240), capture: (1280, 720) }
    )]
    #[case::unit_scale(with(|c| c.detection.scale_factor = 1.0), ConfigError::ScaleFactor(1.0))]
    #[case::zero_min_size(with(|c| c.detection.min_size = (0, 0)), ConfigError::MinFaceSize)]
    #[case::zero_stats(with(|c| c.stats_interval = 0), ConfigError::StatsInterval)]
    fn test_validate_rejects(#[case] config: PipelineConfig, #[case] expected: ConfigError) {
        assert_eq!(config.validate(), Err(expected));
    }

    #[test]
    fn test_nan_scale_factor_rejected() {
        let config = with(|c| c.detection.scale_factor = f64::NAN);
        assert!(matches!(config.validate(), Err(ConfigError::ScaleFactor(_))));
    }
}
