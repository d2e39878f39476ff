#[cfg(feature = "camera-ffmpeg")]
pub mod ffmpeg_camera_source;
pub mod jpeg_frame_encoder;
pub mod synthetic_frame_source;
