pub mod frame_statistics;
pub mod pipeline_logger;
pub mod processing_loop;
pub mod stop_signal;
