use thiserror::Error;

use crate::shared::encoded_buffer::EncodedBuffer;
use crate::shared::frame::{Frame, PixelFormat};

#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("frame buffer holds {actual} bytes, {width}x{height} needs {expected}")]
    Malformed {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
    #[error("frame is in {actual:?}, encoder expects {expected:?}")]
    PixelFormat {
        expected: PixelFormat,
        actual: PixelFormat,
    },
    #[error("quality must be between 1 and 100, got {0}")]
    Quality(u8),
    #[error("encoder failed: {0}")]
    Codec(String),
}

/// Compresses a frame into a self-contained image.
///
/// Output must be deterministic for identical input and quality.
pub trait FrameEncoder: Send {
    /// Channel order the encoder consumes; callers convert beforehand.
    fn pixel_format(&self) -> PixelFormat;

    fn encode(&self, frame: &Frame, quality: u8) -> Result<EncodedBuffer, EncodeError>;
}
