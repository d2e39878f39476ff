use ndarray::{s, ArrayViewMut3, Axis};

use crate::annotation::domain::frame_annotator::FrameAnnotator;
use crate::annotation::infrastructure::bitmap_font::{text_pixels, GLYPH_HEIGHT};
use crate::shared::face_box::FaceBox;
use crate::shared::frame::{Frame, PixelFormat};

const GREEN: [u8; 3] = [0, 255, 0];

/// Draws an outline around each box with a text label above it.
///
/// Colour is given in RGB and reordered for BGR frames. Everything is
/// clipped to the frame.
pub struct BoxAnnotator {
    color: [u8; 3],
    thickness: i32,
    label: String,
    label_scale: i32,
    label_gap: i32,
}

impl BoxAnnotator {
    pub fn new(color: [u8; 3], thickness: i32, label: impl Into<String>) -> Self {
        Self {
            color,
            thickness: thickness.max(1),
            label: label.into(),
            label_scale: 2,
            label_gap: 10,
        }
    }

    fn channel_color(&self, format: PixelFormat) -> [u8; 3] {
        let [r, g, b] = self.color;
        match format {
            PixelFormat::Rgb24 => [r, g, b],
            PixelFormat::Bgr24 => [b, g, r],
        }
    }

    fn draw_outline(&self, pixels: &mut ArrayViewMut3<u8>, b: &FaceBox, color: [u8; 3]) {
        let t = self.thickness;
        let half = t / 2;
        let (left, top) = (b.x - half, b.y - half);
        let (right, bottom) = (b.right() - half + t, b.bottom() - half + t);

        fill(pixels, left, top, right, top + t, color);
        fill(pixels, left, bottom - t, right, bottom, color);
        fill(pixels, left, top, left + t, bottom, color);
        fill(pixels, right - t, top, right, bottom, color);
    }

    /// Renders the label with its bottom edge `label_gap` pixels above
    /// the box.
    fn draw_label(&self, pixels: &mut ArrayViewMut3<u8>, b: &FaceBox, color: [u8; 3]) {
        let scale = self.label_scale;
        let top = b.y - self.label_gap - GLYPH_HEIGHT as i32 * scale;
        for (col, row) in text_pixels(&self.label) {
            let x = b.x + col as i32 * scale;
            let y = top + row as i32 * scale;
            fill(pixels, x, y, x + scale, y + scale, color);
        }
    }
}

impl Default for BoxAnnotator {
    fn default() -> Self {
        Self::new(GREEN, 2, "Face")
    }
}

impl FrameAnnotator for BoxAnnotator {
    fn annotate(&self, frame: &mut Frame, boxes: &[FaceBox]) {
        if boxes.is_empty() || !frame.is_well_formed() {
            return;
        }
        let color = self.channel_color(frame.format());
        let mut pixels = frame.as_ndarray_mut();
        for b in boxes {
            self.draw_outline(&mut pixels, b, color);
            self.draw_label(&mut pixels, b, color);
        }
    }
}

/// Fills `[left, right) x [top, bottom)` after clipping to the image.
fn fill(
    pixels: &mut ArrayViewMut3<u8>,
    left: i32,
    top: i32,
    right: i32,
    bottom: i32,
    color: [u8; 3],
) {
    let (h, w) = (pixels.shape()[0] as i32, pixels.shape()[1] as i32);
    let (l, r) = (left.clamp(0, w), right.clamp(0, w));
    let (t, b) = (top.clamp(0, h), bottom.clamp(0, h));
    if l >= r || t >= b {
        return;
    }
    let mut region = pixels.slice_mut(s![t as usize..b as usize, l as usize..r as usize, ..]);
    for (c, value) in color.iter().enumerate() {
        region.index_axis_mut(Axis(2), c).fill(*value);
    }
}
