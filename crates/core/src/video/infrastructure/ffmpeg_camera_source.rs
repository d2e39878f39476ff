use ffmpeg_next::format::context::{Context, Input};
use ffmpeg_next::software::scaling;

use crate::shared::frame::{Frame, PixelFormat};
use crate::shared::pipeline_config::CaptureSettings;
use crate::video::domain::frame_source::{CameraError, CaptureError, FrameSource};

#[cfg(target_os = "linux")]
pub const DEFAULT_DEMUXER: &str = "v4l2";
#[cfg(target_os = "macos")]
pub const DEFAULT_DEMUXER: &str = "avfoundation";
#[cfg(target_os = "windows")]
pub const DEFAULT_DEMUXER: &str = "dshow";
#[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
pub const DEFAULT_DEMUXER: &str = "v4l2";

/// Captures from a local camera through libavdevice.
///
/// Each decoded picture is converted to RGB24 with swscale and wrapped in a
/// [`Frame`].
pub struct FfmpegCameraSource {
    device: String,
    demuxer: String,
    input_format: Option<String>,
    camera: Option<OpenCamera>,
    frame_index: u64,
}

struct OpenCamera {
    ictx: Input,
    decoder: ffmpeg_next::decoder::Video,
    scaler: scaling::Context,
    stream_index: usize,
    width: u32,
    height: u32,
}

// Safety: FfmpegCameraSource is only driven from the processing thread.
// The raw pointers inside ffmpeg types are never shared across threads.
unsafe impl Send for FfmpegCameraSource {}

impl FfmpegCameraSource {
    pub fn new(device: impl Into<String>) -> Self {
        Self {
            device: device.into(),
            demuxer: DEFAULT_DEMUXER.to_string(),
            input_format: None,
            camera: None,
            frame_index: 0,
        }
    }

    /// Overrides the libavdevice demuxer (e.g. `v4l2`, `avfoundation`).
    pub fn with_demuxer(mut self, demuxer: impl Into<String>) -> Self {
        self.demuxer = demuxer.into();
        self
    }

    /// Requests a device-side format such as `mjpeg` or `yuyv422`.
    pub fn with_input_format(mut self, format: impl Into<String>) -> Self {
        self.input_format = Some(format.into());
        self
    }

    fn find_demuxer(&self) -> Result<ffmpeg_next::format::Format, CameraError> {
        ffmpeg_next::device::input::video()
            .find(|f| f.name().split(',').any(|n| n == self.demuxer))
            .ok_or_else(|| CameraError::DeviceNotFound(format!("demuxer '{}'", self.demuxer)))
    }
}

impl FrameSource for FfmpegCameraSource {
    fn open(&mut self, settings: &CaptureSettings) -> Result<(), CameraError> {
        ffmpeg_next::init().map_err(|e| CameraError::Open(e.to_string()))?;
        ffmpeg_next::device::register_all();

        let format = self.find_demuxer()?;
        let mut options = ffmpeg_next::Dictionary::new();
        options.set(
            "video_size",
            &format!("{}x{}", settings.width, settings.height),
        );
        options.set("framerate", &settings.fps.to_string());
        if let Some(input_format) = &self.input_format {
            options.set("input_format", input_format);
        }

        let ictx = match ffmpeg_next::format::open_with(&self.device, &format, options) {
            Ok(Context::Input(ictx)) => ictx,
            Ok(Context::Output(_)) => {
                return Err(CameraError::Open(format!(
                    "{} opened as an output",
                    self.device
                )))
            }
            Err(e) => return Err(CameraError::Open(format!("{}: {e}", self.device))),
        };

        let stream = ictx
            .streams()
            .best(ffmpeg_next::media::Type::Video)
            .ok_or_else(|| CameraError::DeviceNotFound(self.device.clone()))?;
        let stream_index = stream.index();
        let codec_ctx = ffmpeg_next::codec::context::Context::from_parameters(stream.parameters())
            .map_err(|e| CameraError::Open(e.to_string()))?;
        let decoder = codec_ctx
            .decoder()
            .video()
            .map_err(|e| CameraError::Open(e.to_string()))?;

        let width = decoder.width();
        let height = decoder.height();
        if width != settings.width || height != settings.height {
            return Err(CameraError::Resolution {
                width: settings.width,
                height: settings.height,
                actual_width: width,
                actual_height: height,
            });
        }

        let scaler = scaling::Context::get(
            decoder.format(),
            width,
            height,
            ffmpeg_next::format::Pixel::RGB24,
            width,
            height,
            scaling::Flags::BILINEAR,
        )
        .map_err(|e| CameraError::Open(e.to_string()))?;

        log::info!(
            "FfmpegCameraSource: opened {} via {} at {}x{} @ {}fps",
            self.device,
            self.demuxer,
            width,
            height,
            settings.fps
        );

        self.camera = Some(OpenCamera {
            ictx,
            decoder,
            scaler,
            stream_index,
            width,
            height,
        });
        self.frame_index = 0;
        Ok(())
    }

    fn capture(&mut self) -> Result<Frame, CaptureError> {
        let Some(camera) = self.camera.as_mut() else {
            return Err(CaptureError::NotOpen);
        };

        loop {
            if let Some(pixels) = camera.try_receive()? {
                self.frame_index += 1;
                return Ok(Frame::new(
                    pixels,
                    camera.width,
                    camera.height,
                    PixelFormat::Rgb24,
                    self.frame_index,
                ));
            }

            let Some((stream, packet)) = camera.ictx.packets().next() else {
                return Err(CaptureError::EndOfStream);
            };
            if stream.index() != camera.stream_index {
                continue;
            }
            camera
                .decoder
                .send_packet(&packet)
                .map_err(|e| CaptureError::Decode(e.to_string()))?;
        }
    }

    fn release(&mut self) {
        if self.camera.take().is_some() {
            log::info!("FfmpegCameraSource: released {}", self.device);
        }
    }
}

impl OpenCamera {
    fn try_receive(&mut self) -> Result<Option<Vec<u8>>, CaptureError> {
        let mut decoded = ffmpeg_next::util::frame::video::Video::empty();
        if self.decoder.receive_frame(&mut decoded).is_err() {
            return Ok(None);
        }
        let mut rgb_frame = ffmpeg_next::util::frame::video::Video::empty();
        self.scaler
            .run(&decoded, &mut rgb_frame)
            .map_err(|e| CaptureError::Decode(e.to_string()))?;
        Ok(Some(extract_rgb_pixels(&rgb_frame, self.width, self.height)))
    }
}

fn extract_rgb_pixels(
    rgb_frame: &ffmpeg_next::util::frame::video::Video,
    width: u32,
    height: u32,
) -> Vec<u8> {
    let stride = rgb_frame.stride(0);
    let data = rgb_frame.data(0);
    let w = width as usize;
    let h = height as usize;

    let mut pixels = Vec::with_capacity(w * h * 3);
    for row in 0..h {
        let row_start = row * stride;
        pixels.extend_from_slice(&data[row_start..row_start + w * 3]);
    }
    pixels
}
