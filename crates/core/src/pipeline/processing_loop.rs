use std::thread;
use std::time::Instant;

use thiserror::Error;

use crate::detection::domain::face_detector::FaceDetector;
use crate::detection::domain::object_detector::DetectionError;
use crate::pipeline::frame_statistics::FrameStatistics;
use crate::pipeline::pipeline_logger::PipelineLogger;
use crate::pipeline::stop_signal::StopSignal;
use crate::shared::constants::WARMUP_FRAME_PAUSE;
use crate::shared::pipeline_config::PipelineConfig;
use crate::streaming::domain::shared_frame_slot::SharedFrameSlot;
use crate::streaming::domain::stream_server::StreamServer;
use crate::video::domain::frame_encoder::{EncodeError, FrameEncoder};
use crate::video::domain::frame_source::{CameraError, CaptureError, FrameSource};

/// Any failure inside one loop iteration. None of these end the loop.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("capture failed: {0}")]
    Capture(#[from] CaptureError),
    #[error("detection failed: {0}")]
    Detection(#[from] DetectionError),
    #[error("encoding failed: {0}")]
    Encode(#[from] EncodeError),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Initializing,
    Running,
    ShuttingDown,
    Stopped,
}

/// Single producer: capture, detect and annotate, encode, publish.
///
/// Single-use: `run` drives the state machine from `Idle` to `Stopped`.
pub struct ProcessingLoop {
    source: Box<dyn FrameSource>,
    detector: FaceDetector,
    encoder: Box<dyn FrameEncoder>,
    server: Box<dyn StreamServer>,
    logger: Box<dyn PipelineLogger>,
    slot: SharedFrameSlot,
    config: PipelineConfig,
    stop: StopSignal,
    state: LoopState,
}

impl ProcessingLoop {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        source: Box<dyn FrameSource>,
        detector: FaceDetector,
        encoder: Box<dyn FrameEncoder>,
        server: Box<dyn StreamServer>,
        logger: Box<dyn PipelineLogger>,
        slot: SharedFrameSlot,
        config: PipelineConfig,
        stop: StopSignal,
    ) -> Self {
        Self {
            source,
            detector,
            encoder,
            server,
            logger,
            slot,
            config,
            stop,
            state: LoopState::Idle,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Runs until the stop signal is observed.
    ///
    /// Fails only when the camera cannot be brought up, in which case the
    /// server is never started.
    pub fn run(&mut self) -> Result<FrameStatistics, CameraError> {
        self.state = LoopState::Initializing;
        if let Err(e) = self.initialize() {
            self.source.release();
            self.state = LoopState::Stopped;
            return Err(e);
        }

        if let Err(e) = self.server.start(self.slot.clone()) {
            log::error!("[ERROR] Stream server failed to start: {e}");
        }

        self.state = LoopState::Running;
        self.logger.info("[CAMERA] Frame processing started");
        let mut stats = FrameStatistics::new();
        while !self.stop.is_triggered() {
            match self.step() {
                Ok(faces) => {
                    stats.record_frame(faces);
                    if stats.frames() % self.config.stats_interval == 0 {
                        self.logger.stats(&stats);
                    }
                }
                Err(e) => {
                    stats.record_error();
                    self.logger.error(&format!("Error in loop: {e}"));
                    thread::sleep(self.config.error_backoff);
                }
            }
        }

        self.state = LoopState::ShuttingDown;
        self.shutdown(&stats);
        self.state = LoopState::Stopped;
        Ok(stats)
    }

    fn initialize(&mut self) -> Result<(), CameraError> {
        let capture = &self.config.capture;
        log::info!(
            "[CAMERA] Opening camera at {}x{} @ {}fps",
            capture.width,
            capture.height,
            capture.fps
        );
        self.source.open(capture)?;
        self.source
            .warm_up(capture.warmup_frames, WARMUP_FRAME_PAUSE)?;
        log::info!(
            "[CAMERA] Camera ready after {} warm-up frames",
            capture.warmup_frames
        );
        Ok(())
    }

    /// One capture, detect, encode and publish pass. Returns the face count.
    fn step(&mut self) -> Result<usize, PipelineError> {
        let t = Instant::now();
        let frame = self.source.capture()?;
        self.logger.timing("capture", elapsed_ms(t));

        let t = Instant::now();
        let (annotated, faces) = self.detector.detect_and_annotate(frame)?;
        self.logger.timing("detect", elapsed_ms(t));

        let t = Instant::now();
        let frame = annotated.into_format(self.encoder.pixel_format());
        let buffer = self.encoder.encode(&frame, self.config.jpeg_quality)?;
        self.logger.timing("encode", elapsed_ms(t));

        self.slot.set(buffer);
        Ok(faces)
    }

    fn shutdown(&mut self, stats: &FrameStatistics) {
        log::info!("[SHUTDOWN] System shutdown...");
        self.source.release();
        self.slot.close();
        self.server.stop();
        self.logger.summary(stats);
        log::info!("[SHUTDOWN] System stopped");
    }
}

fn elapsed_ms(since: Instant) -> f64 {
    since.elapsed().as_secs_f64() * 1000.0
}
