use image::GrayImage;

/// Summed-area tables over a grayscale image.
///
/// Both tables have one extra leading row and column of zeros so a
/// rectangle sum is four lookups with no edge cases.
pub struct IntegralImage {
    width: usize,
    sum: Vec<u64>,
    sq_sum: Vec<u64>,
}

impl IntegralImage {
    pub fn new(image: &GrayImage) -> Self {
        let width = image.width() as usize;
        let height = image.height() as usize;
        let stride = width + 1;
        let mut sum = vec![0u64; stride * (height + 1)];
        let mut sq_sum = vec![0u64; stride * (height + 1)];

        for (y, row) in image.as_raw().chunks_exact(width.max(1)).take(height).enumerate() {
            let mut row_sum = 0u64;
            let mut row_sq = 0u64;
            for (x, &p) in row.iter().enumerate() {
                row_sum += p as u64;
                row_sq += (p as u64) * (p as u64);
                let i = (y + 1) * stride + x + 1;
                sum[i] = sum[i - stride] + row_sum;
                sq_sum[i] = sq_sum[i - stride] + row_sq;
            }
        }

        Self { width, sum, sq_sum }
    }

    /// Sum of pixels in `[x, x+w) x [y, y+h)`. The rectangle must lie
    /// inside the image.
    pub fn rect_sum(&self, x: usize, y: usize, w: usize, h: usize) -> u64 {
        let s = self.width + 1;
        let (a, b) = (y * s + x, y * s + x + w);
        let (c, d) = ((y + h) * s + x, (y + h) * s + x + w);
        (self.sum[d] - self.sum[b]) - (self.sum[c] - self.sum[a])
    }

    pub fn rect_sq_sum(&self, x: usize, y: usize, w: usize, h: usize) -> u64 {
        let s = self.width + 1;
        let (a, b) = (y * s + x, y * s + x + w);
        let (c, d) = ((y + h) * s + x, (y + h) * s + x + w);
        (self.sq_sum[d] - self.sq_sum[b]) - (self.sq_sum[c] - self.sq_sum[a])
    }
}
