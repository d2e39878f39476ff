use image::codecs::jpeg::JpegEncoder;
use image::ExtendedColorType;

use crate::shared::encoded_buffer::EncodedBuffer;
use crate::shared::frame::{Frame, PixelFormat};
use crate::video::domain::frame_encoder::{EncodeError, FrameEncoder};

/// Baseline JPEG encoder backed by the `image` crate.
pub struct JpegFrameEncoder;

impl JpegFrameEncoder {
    pub fn new() -> Self {
        Self
    }
}

impl Default for JpegFrameEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameEncoder for JpegFrameEncoder {
    fn pixel_format(&self) -> PixelFormat {
        PixelFormat::Rgb24
    }

    fn encode(&self, frame: &Frame, quality: u8) -> Result<EncodedBuffer, EncodeError> {
        if !(1..=100).contains(&quality) {
            return Err(EncodeError::Quality(quality));
        }
        if !frame.is_well_formed() {
            return Err(EncodeError::Malformed {
                width: frame.width(),
                height: frame.height(),
                expected: Frame::expected_len(frame.width(), frame.height()),
                actual: frame.data().len(),
            });
        }
        if frame.format() != PixelFormat::Rgb24 {
            return Err(EncodeError::PixelFormat {
                expected: PixelFormat::Rgb24,
                actual: frame.format(),
            });
        }

        let mut buffer = Vec::new();
        JpegEncoder::new_with_quality(&mut buffer, quality)
            .encode(
                frame.data(),
                frame.width(),
                frame.height(),
                ExtendedColorType::Rgb8,
            )
            .map_err(|e| EncodeError::Codec(e.to_string()))?;
        Ok(EncodedBuffer::new(buffer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_frame(width: u32, height: u32, r: u8, g: u8, b: u8) -> Frame {
        let mut data = Vec::with_capacity((width * height * 3) as usize);
        for _ in 0..(width * height) {
            data.extend_from_slice(&[r, g, b]);
        }
        Frame::new(data, width, height, PixelFormat::Rgb24, 0)
    }

    #[test]
    fn test_encode_produces_decodable_jpeg() {
        let frame = make_frame(64, 48, 50, 100, 200);
        let buffer = JpegFrameEncoder::new().encode(&frame, 85).unwrap();

        assert_eq!(&buffer.as_bytes()[..2], &[0xFF, 0xD8]);
        let img = image::load_from_memory(buffer.as_bytes()).unwrap().to_rgb8();
        assert_eq!(img.width(), 64);
        assert_eq!(img.height(), 48);
        let px = img.get_pixel(32, 24).0;
        assert!((px[2] as i32 - 200).abs() < 10);
    }

    #[test]
    fn test_encode_is_deterministic() {
        let frame = make_frame(32, 32, 10, 20, 30);
        let encoder = JpegFrameEncoder::new();
        let a = encoder.encode(&frame, 85).unwrap();
        let b = encoder.encode(&frame, 85).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_lower_quality_is_not_larger_on_noise() {
        let mut data = Vec::with_capacity(64 * 64 * 3);
        for i in 0..(64 * 64 * 3) {
            data.push(((i * 7919) % 251) as u8);
        }
        let frame = Frame::new(data, 64, 64, PixelFormat::Rgb24, 0);
        let encoder = JpegFrameEncoder::new();
        let high = encoder.encode(&frame, 95).unwrap();
        let low = encoder.encode(&frame, 10).unwrap();
        assert!(low.len() < high.len());
    }

    #[test]
    fn test_rejects_out_of_range_quality() {
        let frame = make_frame(8, 8, 0, 0, 0);
        let encoder = JpegFrameEncoder::new();
        assert!(matches!(encoder.encode(&frame, 0), Err(EncodeError::Quality(0))));
        assert!(matches!(
            encoder.encode(&frame, 101),
            Err(EncodeError::Quality(101))
        ));
    }

    #[test]
    fn test_rejects_bgr_frames() {
        let frame = make_frame(8, 8, 0, 0, 0).into_format(PixelFormat::Bgr24);
        let result = JpegFrameEncoder::new().encode(&frame, 85);
        assert!(matches!(result, Err(EncodeError::PixelFormat { .. })));
    }

    #[test]
    fn test_rejects_zero_sized_frame() {
        let frame = Frame::new(Vec::new(), 0, 0, PixelFormat::Rgb24, 0);
        let result = JpegFrameEncoder::new().encode(&frame, 85);
        assert!(matches!(result, Err(EncodeError::Malformed { .. })));
    }
}
