/// 5x7 bitmap glyphs, one `u8` per row with the leftmost pixel in bit 4.
pub const GLYPH_WIDTH: usize = 5;
pub const GLYPH_HEIGHT: usize = 7;
/// Horizontal distance between glyph origins, one blank column included.
pub const GLYPH_ADVANCE: usize = 6;

/// Glyph for the letters of the box label, or space. Unknown characters
/// return `None` and render as blank space.
pub fn glyph(ch: char) -> Option<[u8; GLYPH_HEIGHT]> {
    match ch {
        'A' => Some([
            0b01110, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001,
        ]),
        'C' => Some([
            0b01110, 0b10001, 0b10000, 0b10000, 0b10000, 0b10001, 0b01110,
        ]),
        'E' => Some([
            0b11111, 0b10000, 0b11110, 0b10000, 0b10000, 0b10000, 0b11111,
        ]),
        'F' => Some([
            0b11111, 0b10000, 0b11110, 0b10000, 0b10000, 0b10000, 0b10000,
        ]),
        ' ' => Some([0; GLYPH_HEIGHT]),
        _ => None,
    }
}

/// Iterates the set pixels of `text` as `(column, row)` offsets from the
/// top-left of the first glyph, before scaling.
pub fn text_pixels(text: &str) -> impl Iterator<Item = (usize, usize)> + '_ {
    text.chars()
        .flat_map(char::to_uppercase)
        .enumerate()
        .filter_map(|(i, ch)| glyph(ch).map(|g| (i * GLYPH_ADVANCE, g)))
        .flat_map(|(origin, rows)| {
            rows.into_iter().enumerate().flat_map(move |(row, bits)| {
                (0..GLYPH_WIDTH)
                    .filter(move |col| (bits >> (GLYPH_WIDTH - 1 - col)) & 1 == 1)
                    .map(move |col| (origin + col, row))
            })
        })
}
