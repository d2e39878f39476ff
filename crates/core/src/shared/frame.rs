use ndarray::{ArrayView3, ArrayViewMut3};

/// Channel order of a 3-channel, 8-bit frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PixelFormat {
    Rgb24,
    Bgr24,
}

impl PixelFormat {
    pub const CHANNELS: usize = 3;
}

/// A single captured frame: contiguous interleaved bytes in row-major order.
///
/// Format conversion happens at stage boundaries only; the domain layer
/// treats pixel data as opaque apart from the format tag.
#[derive(Clone, Debug)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    format: PixelFormat,
    index: u64,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, format: PixelFormat, index: u64) -> Self {
        debug_assert_eq!(
            data.len(),
            Self::expected_len(width, height),
            "data length must equal width * height * channels"
        );
        Self {
            data,
            width,
            height,
            format,
            index,
        }
    }

    /// Byte length a frame of the given dimensions must have.
    pub fn expected_len(width: u32, height: u32) -> usize {
        (width as usize) * (height as usize) * PixelFormat::CHANNELS
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn index(&self) -> u64 {
        self.index
    }

    /// True when the buffer length agrees with the dimensions.
    pub fn is_well_formed(&self) -> bool {
        self.width > 0
            && self.height > 0
            && self.data.len() == Self::expected_len(self.width, self.height)
    }

    /// Re-tags the frame in `target` order, swapping red and blue if needed.
    pub fn into_format(mut self, target: PixelFormat) -> Frame {
        if self.format != target {
            for px in self.data.chunks_exact_mut(PixelFormat::CHANNELS) {
                px.swap(0, 2);
            }
            self.format = target;
        }
        self
    }

    pub fn as_ndarray(&self) -> ArrayView3<'_, u8> {
        ArrayView3::from_shape(self.shape(), &self.data)
            .expect("Frame data length must match dimensions")
    }

    pub fn as_ndarray_mut(&mut self) -> ArrayViewMut3<'_, u8> {
        ArrayViewMut3::from_shape(self.shape(), &mut self.data)
            .expect("Frame data length must match dimensions")
    }

    fn shape(&self) -> (usize, usize, usize) {
        (
            self.height as usize,
            self.width as usize,
            PixelFormat::CHANNELS,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_construction_and_accessors() {
        let data = vec![0u8; 12]; // 2x2x3
        let frame = Frame::new(data.clone(), 2, 2, PixelFormat::Rgb24, 5);
        assert_eq!(frame.width(), 2);
        assert_eq!(frame.height(), 2);
        assert_eq!(frame.format(), PixelFormat::Rgb24);
        assert_eq!(frame.index(), 5);
        assert_eq!(frame.data(), &data[..]);
        assert!(frame.is_well_formed());
    }

    #[test]
    fn test_clone_is_independent() {
        let frame = Frame::new(vec![100u8; 12], 2, 2, PixelFormat::Rgb24, 0);
        let mut cloned = frame.clone();
        cloned.data_mut()[0] = 0;
        assert_eq!(frame.data()[0], 100);
        assert_eq!(cloned.data()[0], 0);
    }

    #[test]
    #[should_panic(expected = "data length must equal width * height * channels")]
    fn test_mismatched_data_length_panics_in_debug() {
        Frame::new(vec![0u8; 10], 2, 2, PixelFormat::Rgb24, 0);
    }

    #[test]
    fn test_into_format_swaps_red_and_blue() {
        let frame = Frame::new(vec![1, 2, 3, 4, 5, 6], 2, 1, PixelFormat::Rgb24, 0);
        let bgr = frame.into_format(PixelFormat::Bgr24);
        assert_eq!(bgr.format(), PixelFormat::Bgr24);
        assert_eq!(bgr.data(), &[3, 2, 1, 6, 5, 4]);
    }

    #[test]
    fn test_into_same_format_is_untouched() {
        let frame = Frame::new(vec![1, 2, 3], 1, 1, PixelFormat::Bgr24, 0);
        let same = frame.into_format(PixelFormat::Bgr24);
        assert_eq!(same.data(), &[1, 2, 3]);
    }

    #[test]
    fn test_as_ndarray_pixel_access() {
        // 2x2: set pixel (row=1, col=0) red channel
        let mut data = vec![0u8; 12];
        data[6] = 255;
        let frame = Frame::new(data, 2, 2, PixelFormat::Rgb24, 0);
        let arr = frame.as_ndarray();
        assert_eq!(arr.shape(), &[2, 2, 3]);
        assert_eq!(arr[[1, 0, 0]], 255);
        assert_eq!(arr[[1, 0, 1]], 0);
    }

    #[test]
    fn test_as_ndarray_mut_modification() {
        let mut frame = Frame::new(vec![0u8; 12], 2, 2, PixelFormat::Rgb24, 0);
        {
            let mut arr = frame.as_ndarray_mut();
            arr[[0, 1, 2]] = 128;
        }
        assert_eq!(frame.as_ndarray()[[0, 1, 2]], 128);
    }
}
