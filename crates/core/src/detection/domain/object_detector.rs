use image::GrayImage;
use thiserror::Error;

use crate::shared::face_box::FaceBox;
use crate::shared::pipeline_config::DetectionParams;

#[derive(Error, Debug)]
pub enum DetectionError {
    #[error("detection interval must be >= 1")]
    InvalidInterval,
    #[error("working size must be non-zero, got {0}x{1}")]
    InvalidWorkingSize(u32, u32),
    #[error("frame {width}x{height} is malformed")]
    MalformedFrame { width: u32, height: u32 },
    #[error("detector failed: {0}")]
    Backend(String),
}

/// Domain interface for the raw detector run on recomputation frames.
///
/// Receives the downscaled grayscale working image and reports boxes in
/// working-image coordinates.
pub trait ObjectDetector: Send {
    fn detect(
        &mut self,
        image: &GrayImage,
        params: &DetectionParams,
    ) -> Result<Vec<FaceBox>, DetectionError>;
}
