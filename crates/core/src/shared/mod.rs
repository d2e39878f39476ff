pub mod constants;
pub mod encoded_buffer;
pub mod face_box;
pub mod frame;
pub mod pipeline_config;
