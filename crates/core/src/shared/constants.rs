use std::time::Duration;

pub const DEFAULT_CAPTURE_WIDTH: u32 = 1280;
pub const DEFAULT_CAPTURE_HEIGHT: u32 = 720;
pub const DEFAULT_CAPTURE_FPS: u32 = 30;

/// Frames discarded after open while auto-exposure settles.
pub const DEFAULT_WARMUP_FRAMES: usize = 30;
pub const WARMUP_FRAME_PAUSE: Duration = Duration::from_millis(20);

/// Run detection on every Nth frame.
pub const DEFAULT_DETECTION_INTERVAL: u64 = 5;

/// Fixed working resolution the cascade parameters are tuned for.
pub const DEFAULT_WORKING_WIDTH: u32 = 320;
pub const DEFAULT_WORKING_HEIGHT: u32 = 240;

pub const DEFAULT_SCALE_FACTOR: f64 = 1.3;
pub const DEFAULT_MIN_NEIGHBORS: u32 = 5;
pub const DEFAULT_MIN_FACE_SIZE: u32 = 20;

pub const DEFAULT_JPEG_QUALITY: u8 = 85;

/// Statistics line every N processed frames.
pub const DEFAULT_STATS_INTERVAL: u64 = 30;
pub const DEFAULT_ERROR_BACKOFF: Duration = Duration::from_millis(100);
pub const DEFAULT_STREAM_POLL_INTERVAL: Duration = Duration::from_millis(30);

pub const DEFAULT_BIND_HOST: &str = "0.0.0.0";
pub const DEFAULT_BIND_PORT: u16 = 5000;

pub const MJPEG_BOUNDARY: &str = "frame";

pub const CASCADE_FILE_NAME: &str = "haarcascade_frontalface_default.xml";
pub const CASCADE_URL: &str =
    "https://raw.githubusercontent.com/opencv/opencv/4.x/data/haarcascades/haarcascade_frontalface_default.xml";
