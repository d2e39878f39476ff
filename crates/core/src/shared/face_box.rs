/// Axis-aligned face rectangle in pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FaceBox {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl FaceBox {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    /// Maps a box from working-image space into original-frame space.
    ///
    /// Each axis uses its own ratio; results truncate toward zero.
    pub fn rescale(&self, rx: f64, ry: f64) -> FaceBox {
        FaceBox {
            x: (self.x as f64 * rx) as i32,
            y: (self.y as f64 * ry) as i32,
            width: (self.width as f64 * rx) as i32,
            height: (self.height as f64 * ry) as i32,
        }
    }
}

/// Per-axis ratios `original / working`.
pub fn scale_ratios(original: (u32, u32), working: (u32, u32)) -> (f64, f64) {
    (
        original.0 as f64 / working.0 as f64,
        original.1 as f64 / working.1 as f64,
    )
}
