use std::path::PathBuf;
use std::process;

use clap::{Parser, ValueEnum};

use facestream_core::annotation::infrastructure::box_annotator::BoxAnnotator;
use facestream_core::detection::domain::face_detector::FaceDetector;
use facestream_core::detection::infrastructure::cascade_resolver::resolve_cascade;
use facestream_core::detection::infrastructure::haar_cascade::HaarCascadeDetector;
use facestream_core::pipeline::pipeline_logger::LogPipelineLogger;
use facestream_core::pipeline::processing_loop::ProcessingLoop;
use facestream_core::pipeline::stop_signal::StopSignal;
use facestream_core::shared::constants::*;
use facestream_core::shared::pipeline_config::{CaptureSettings, DetectionParams, PipelineConfig};
use facestream_core::streaming::domain::shared_frame_slot::SharedFrameSlot;
use facestream_core::streaming::infrastructure::actix_stream_server::ActixStreamServer;
use facestream_core::streaming::infrastructure::index_page::IndexPage;
use facestream_core::video::domain::frame_source::FrameSource;
use facestream_core::video::infrastructure::jpeg_frame_encoder::JpegFrameEncoder;
use facestream_core::video::infrastructure::synthetic_frame_source::SyntheticFrameSource;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum SourceKind {
    /// Capture device through ffmpeg.
    Camera,
    /// Moving test pattern, no hardware needed.
    Synthetic,
}

/// Live camera face detection served as an MJPEG stream over HTTP.
#[derive(Parser)]
#[command(name = "facestream")]
struct Cli {
    /// Frame source.
    #[arg(long, value_enum, default_value = "camera")]
    source: SourceKind,

    /// Capture device path or name.
    #[arg(long, default_value = "/dev/video0")]
    device: String,

    /// Input pixel or codec format requested from the device (e.g. mjpeg, yuyv422).
    #[arg(long)]
    input_format: Option<String>,

    /// Capture width in pixels.
    #[arg(long, default_value_t = DEFAULT_CAPTURE_WIDTH)]
    width: u32,

    /// Capture height in pixels.
    #[arg(long, default_value_t = DEFAULT_CAPTURE_HEIGHT)]
    height: u32,

    /// Capture frame rate.
    #[arg(long, default_value_t = DEFAULT_CAPTURE_FPS)]
    fps: u32,

    /// Run detection every Nth frame (1 = every frame).
    #[arg(long, default_value_t = DEFAULT_DETECTION_INTERVAL)]
    detect_every: u64,

    /// JPEG quality (1-100).
    #[arg(long, default_value_t = DEFAULT_JPEG_QUALITY)]
    quality: u8,

    /// Width of the downscaled detection image.
    #[arg(long, default_value_t = DEFAULT_WORKING_WIDTH)]
    working_width: u32,

    /// Height of the downscaled detection image.
    #[arg(long, default_value_t = DEFAULT_WORKING_HEIGHT)]
    working_height: u32,

    /// Cascade pyramid scale step (> 1.0).
    #[arg(long, default_value_t = DEFAULT_SCALE_FACTOR)]
    scale_factor: f64,

    /// Neighbouring hits required to keep a detection.
    #[arg(long, default_value_t = DEFAULT_MIN_NEIGHBORS)]
    min_neighbors: u32,

    /// Smallest face, in working-image pixels.
    #[arg(long, default_value_t = DEFAULT_MIN_FACE_SIZE)]
    min_face_size: u32,

    /// Haar cascade XML (default: cached or downloaded frontal-face cascade).
    #[arg(long)]
    cascade: Option<PathBuf>,

    /// Frames discarded after the camera opens.
    #[arg(long, default_value_t = DEFAULT_WARMUP_FRAMES)]
    warmup_frames: usize,

    /// Log a statistics line every N frames.
    #[arg(long, default_value_t = DEFAULT_STATS_INTERVAL)]
    stats_every: u64,

    /// Address to bind the HTTP server to.
    #[arg(long, default_value = DEFAULT_BIND_HOST)]
    host: String,

    /// Port for the HTTP server.
    #[arg(long, default_value_t = DEFAULT_BIND_PORT)]
    port: u16,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = to_config(&cli);
    config.validate()?;

    let stop = StopSignal::new();
    let handler = stop.clone();
    ctrlc::set_handler(move || {
        log::info!("[SHUTDOWN] Shutdown signal received");
        handler.trigger();
    })?;

    let detector = build_detector(&cli, &config)?;
    let source = build_source(&cli)?;
    let server = ActixStreamServer::new(
        config.bind_address(),
        config.stream_poll_interval,
        IndexPage {
            width: config.capture.width,
            height: config.capture.height,
            fps: config.capture.fps,
        },
    );

    log::info!("[CAMERA] FaceStream: camera MJPEG stream with face detection");
    log::info!(
        "[SERVER] Open http://{}:{}/ in a browser",
        display_host(&config.bind_host),
        config.bind_port
    );

    let mut pipeline = ProcessingLoop::new(
        source,
        detector,
        Box::new(JpegFrameEncoder::new()),
        Box::new(server),
        Box::new(LogPipelineLogger::new()),
        SharedFrameSlot::new(),
        config,
        stop,
    );
    pipeline.run()?;
    Ok(())
}

fn to_config(cli: &Cli) -> PipelineConfig {
    PipelineConfig {
        capture: CaptureSettings {
            width: cli.width,
            height: cli.height,
            fps: cli.fps,
            warmup_frames: cli.warmup_frames,
        },
        detection_interval: cli.detect_every,
        working_size: (cli.working_width, cli.working_height),
        detection: DetectionParams {
            scale_factor: cli.scale_factor,
            min_neighbors: cli.min_neighbors,
            min_size: (cli.min_face_size, cli.min_face_size),
        },
        jpeg_quality: cli.quality,
        stats_interval: cli.stats_every,
        bind_host: cli.host.clone(),
        bind_port: cli.port,
        ..PipelineConfig::default()
    }
}

fn build_detector(
    cli: &Cli,
    config: &PipelineConfig,
) -> Result<FaceDetector, Box<dyn std::error::Error>> {
    let cascade_path = resolve_cascade(cli.cascade.as_deref(), Some(Box::new(download_progress)))?;
    let cascade = HaarCascadeDetector::from_file(&cascade_path)?;
    Ok(FaceDetector::new(
        Box::new(cascade),
        Box::new(BoxAnnotator::default()),
        config.detection_interval,
        config.working_size,
        config.detection,
    )?)
}

fn build_source(cli: &Cli) -> Result<Box<dyn FrameSource>, Box<dyn std::error::Error>> {
    match cli.source {
        SourceKind::Synthetic => Ok(Box::new(SyntheticFrameSource::new())),
        SourceKind::Camera => build_camera(cli),
    }
}

#[cfg(feature = "camera-ffmpeg")]
fn build_camera(cli: &Cli) -> Result<Box<dyn FrameSource>, Box<dyn std::error::Error>> {
    use facestream_core::video::infrastructure::ffmpeg_camera_source::FfmpegCameraSource;

    let mut source = FfmpegCameraSource::new(cli.device.as_str());
    if let Some(format) = &cli.input_format {
        source = source.with_input_format(format.as_str());
    }
    Ok(Box::new(source))
}

#[cfg(not(feature = "camera-ffmpeg"))]
fn build_camera(_cli: &Cli) -> Result<Box<dyn FrameSource>, Box<dyn std::error::Error>> {
    Err("camera support is not compiled in; \
         rebuild with --features camera-ffmpeg or use --source synthetic"
        .into())
}

fn display_host(host: &str) -> &str {
    if host == "0.0.0.0" {
        "127.0.0.1"
    } else {
        host
    }
}

fn download_progress(downloaded: u64, total: u64) {
    if total > 0 {
        let pct = (downloaded as f64 / total as f64 * 100.0) as u32;
        eprint!("\rDownloading face cascade... {pct}%");
    } else {
        eprint!("\rDownloading face cascade... {downloaded} bytes");
    }
    if total > 0 && downloaded >= total {
        eprintln!();
    }
}
