use std::time::Duration;

use thiserror::Error;

use crate::shared::frame::Frame;
use crate::shared::pipeline_config::CaptureSettings;

/// The device could not be brought up; fatal at startup.
#[derive(Error, Debug)]
pub enum CameraError {
    #[error("no capture device matching {0}")]
    DeviceNotFound(String),
    #[error("camera delivered {actual_width}x{actual_height}, requested {width}x{height}")]
    Resolution {
        width: u32,
        height: u32,
        actual_width: u32,
        actual_height: u32,
    },
    #[error("camera warm-up failed after {captured} frames: {source}")]
    WarmUp {
        captured: usize,
        #[source]
        source: CaptureError,
    },
    #[error("failed to open camera: {0}")]
    Open(String),
}

/// A single capture failed; the device may recover on the next call.
#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("capture source is not open")]
    NotOpen,
    #[error("capture source reached end of stream")]
    EndOfStream,
    #[error("frame decode failed: {0}")]
    Decode(String),
}

/// Domain interface for a live frame producer.
///
/// `capture` blocks until a frame is available. `release` must tolerate
/// being called more than once.
pub trait FrameSource: Send {
    fn open(&mut self, settings: &CaptureSettings) -> Result<(), CameraError>;

    fn capture(&mut self) -> Result<Frame, CaptureError>;

    fn release(&mut self);

    /// Discards `frames` captures so exposure and white balance settle.
    fn warm_up(&mut self, frames: usize, pause: Duration) -> Result<(), CameraError> {
        for captured in 0..frames {
            self.capture()
                .map_err(|source| CameraError::WarmUp { captured, source })?;
            if !pause.is_zero() {
                std::thread::sleep(pause);
            }
        }
        Ok(())
    }
}
