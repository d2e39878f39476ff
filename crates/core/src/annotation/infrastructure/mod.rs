pub mod bitmap_font;
pub mod box_annotator;
