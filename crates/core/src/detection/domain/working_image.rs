use image::imageops::{self, FilterType};
use image::{GrayImage, ImageBuffer, Luma, Rgb};

use crate::detection::domain::object_detector::DetectionError;
use crate::shared::frame::{Frame, PixelFormat};

/// Resizes a frame to the fixed working size and converts it to grayscale.
///
/// The working size is absolute, never a fraction of the input, because
/// cascade parameters are tuned to pixel scale.
pub fn downscale_to_gray(frame: &Frame, size: (u32, u32)) -> Result<GrayImage, DetectionError> {
    if !frame.is_well_formed() {
        return Err(DetectionError::MalformedFrame {
            width: frame.width(),
            height: frame.height(),
        });
    }
    let view = ImageBuffer::<Rgb<u8>, &[u8]>::from_raw(frame.width(), frame.height(), frame.data())
        .ok_or(DetectionError::MalformedFrame {
            width: frame.width(),
            height: frame.height(),
        })?;
    let small = imageops::resize(&view, size.0, size.1, FilterType::Triangle);

    let (r, b) = match frame.format() {
        PixelFormat::Rgb24 => (0, 2),
        PixelFormat::Bgr24 => (2, 0),
    };
    Ok(GrayImage::from_fn(size.0, size.1, |x, y| {
        let px = small.get_pixel(x, y).0;
        Luma([luma(px[r], px[1], px[b])])
    }))
}

/// ITU-R BT.601 luma in 14-bit fixed point.
fn luma(r: u8, g: u8, b: u8) -> u8 {
    ((r as u32 * 4899 + g as u32 * 9617 + b as u32 * 1868 + 8192) >> 14) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(width: u32, height: u32, px: [u8; 3], format: PixelFormat) -> Frame {
        let data = px.repeat((width * height) as usize);
        Frame::new(data, width, height, format, 0)
    }

    #[test]
    fn test_output_has_working_size() {
        let frame = solid(1280, 720, [10, 20, 30], PixelFormat::Rgb24);
        let gray = downscale_to_gray(&frame, (320, 240)).unwrap();
        assert_eq!(gray.dimensions(), (320, 240));
    }

    #[test]
    fn test_luma_extremes() {
        assert_eq!(luma(0, 0, 0), 0);
        assert_eq!(luma(255, 255, 255), 255);
    }

    #[test]
    fn test_channel_order_is_respected() {
        let rgb = solid(8, 8, [255, 0, 0], PixelFormat::Rgb24);
        let bgr = solid(8, 8, [0, 0, 255], PixelFormat::Bgr24);
        let a = downscale_to_gray(&rgb, (4, 4)).unwrap();
        let b = downscale_to_gray(&bgr, (4, 4)).unwrap();
        assert_eq!(a.get_pixel(1, 1), b.get_pixel(1, 1));
        assert_eq!(a.get_pixel(1, 1).0[0], 76);
    }

    #[test]
    fn test_malformed_frame_is_rejected() {
        let frame = Frame::new(Vec::new(), 0, 0, PixelFormat::Rgb24, 0);
        assert!(matches!(
            downscale_to_gray(&frame, (4, 4)),
            Err(DetectionError::MalformedFrame { .. })
        ));
    }
}
