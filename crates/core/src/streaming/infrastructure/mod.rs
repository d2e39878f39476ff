pub mod actix_stream_server;
pub mod index_page;
pub mod mjpeg_stream;
