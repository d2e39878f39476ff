pub mod cascade_resolver;
pub mod haar_cascade;
pub mod integral_image;
pub mod rectangle_grouping;
