use std::thread;
use std::time::{Duration, Instant};

use crate::shared::frame::{Frame, PixelFormat};
use crate::shared::pipeline_config::CaptureSettings;
use crate::video::domain::frame_source::{CameraError, CaptureError, FrameSource};

/// Hardware-free source producing a deterministic moving gradient.
///
/// Used for demos and for running the stream on machines without a camera.
/// Captures are paced to the requested frame rate like a real device.
pub struct SyntheticFrameSource {
    size: Option<(u32, u32)>,
    frame_count: u64,
    frame_interval: Duration,
    next_due: Option<Instant>,
}

impl SyntheticFrameSource {
    pub fn new() -> Self {
        Self {
            size: None,
            frame_count: 0,
            frame_interval: Duration::ZERO,
            next_due: None,
        }
    }

    fn pace(&mut self) {
        let now = Instant::now();
        let due = self.next_due.unwrap_or(now);
        if due > now {
            thread::sleep(due - now);
        }
        self.next_due = Some(due.max(now) + self.frame_interval);
    }

    fn render(&self, width: u32, height: u32) -> Vec<u8> {
        let shift = self.frame_count as usize;
        let mut pixels = Vec::with_capacity(Frame::expected_len(width, height));
        for y in 0..height as usize {
            for x in 0..width as usize {
                pixels.push(((x + shift) % 256) as u8);
                pixels.push(((y + shift / 2) % 256) as u8);
                pixels.push(((x + y) % 256) as u8);
            }
        }
        pixels
    }
}

impl Default for SyntheticFrameSource {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameSource for SyntheticFrameSource {
    fn open(&mut self, settings: &CaptureSettings) -> Result<(), CameraError> {
        if settings.width == 0 || settings.height == 0 {
            return Err(CameraError::Resolution {
                width: settings.width,
                height: settings.height,
                actual_width: 0,
                actual_height: 0,
            });
        }
        self.size = Some((settings.width, settings.height));
        self.frame_count = 0;
        self.frame_interval = Duration::from_secs_f64(1.0 / settings.fps.max(1) as f64);
        self.next_due = None;
        log::info!(
            "SyntheticFrameSource: {}x{} test pattern",
            settings.width,
            settings.height
        );
        Ok(())
    }

    fn capture(&mut self) -> Result<Frame, CaptureError> {
        let (width, height) = self.size.ok_or(CaptureError::NotOpen)?;
        self.pace();
        let pixels = self.render(width, height);
        self.frame_count += 1;
        Ok(Frame::new(
            pixels,
            width,
            height,
            PixelFormat::Rgb24,
            self.frame_count,
        ))
    }

    fn release(&mut self) {
        self.size = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(width: u32, height: u32) -> CaptureSettings {
        CaptureSettings {
            width,
            height,
            fps: 30,
            warmup_frames: 0,
        }
    }

    #[test]
    fn test_capture_before_open_fails() {
        let mut source = SyntheticFrameSource::new();
        assert!(matches!(source.capture(), Err(CaptureError::NotOpen)));
    }

    #[test]
    fn test_frames_have_requested_size_and_increasing_index() {
        let mut source = SyntheticFrameSource::new();
        source.open(&settings(64, 48)).unwrap();
        let a = source.capture().unwrap();
        let b = source.capture().unwrap();
        assert_eq!((a.width(), a.height()), (64, 48));
        assert!(a.is_well_formed());
        assert_eq!(a.index() + 1, b.index());
        assert_ne!(a.data(), b.data());
    }

    #[test]
    fn test_captures_are_paced_to_frame_rate() {
        let mut source = SyntheticFrameSource::new();
        source
            .open(&CaptureSettings {
                fps: 100,
                ..settings(4, 4)
            })
            .unwrap();
        let start = Instant::now();
        for _ in 0..3 {
            source.capture().unwrap();
        }
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn test_zero_size_open_fails() {
        let mut source = SyntheticFrameSource::new();
        assert!(source.open(&settings(0, 48)).is_err());
    }

    #[test]
    fn test_release_is_idempotent() {
        let mut source = SyntheticFrameSource::new();
        source.open(&settings(8, 8)).unwrap();
        source.release();
        source.release();
        assert!(matches!(source.capture(), Err(CaptureError::NotOpen)));
    }
}
