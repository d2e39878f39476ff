pub mod multipart;
pub mod shared_frame_slot;
pub mod stream_publisher;
pub mod stream_server;
