use crate::annotation::domain::frame_annotator::FrameAnnotator;
use crate::detection::domain::object_detector::{DetectionError, ObjectDetector};
use crate::detection::domain::working_image::downscale_to_gray;
use crate::shared::face_box::{scale_ratios, FaceBox};
use crate::shared::frame::Frame;
use crate::shared::pipeline_config::DetectionParams;

/// Boxes from the most recent successful detection, in original-frame
/// coordinates.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DetectionCache {
    boxes: Vec<FaceBox>,
    computed_at: Option<u64>,
}

impl DetectionCache {
    pub fn boxes(&self) -> &[FaceBox] {
        &self.boxes
    }

    /// Frame count at which the boxes were computed, `None` before the
    /// first recomputation.
    pub fn computed_at(&self) -> Option<u64> {
        self.computed_at
    }

    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    fn replace(&mut self, boxes: Vec<FaceBox>, frame_count: u64) {
        self.boxes = boxes;
        self.computed_at = Some(frame_count);
    }
}

/// Runs the detector on every Nth frame and draws the cached boxes on all
/// frames in between.
///
/// The counter advances before the recompute check, so the first detection
/// happens on frame N and frames 1..N-1 render with an empty cache.
pub struct FaceDetector {
    detector: Box<dyn ObjectDetector>,
    annotator: Box<dyn FrameAnnotator>,
    interval: u64,
    working_size: (u32, u32),
    params: DetectionParams,
    frame_count: u64,
    cache: DetectionCache,
}

impl FaceDetector {
    pub fn new(
        detector: Box<dyn ObjectDetector>,
        annotator: Box<dyn FrameAnnotator>,
        interval: u64,
        working_size: (u32, u32),
        params: DetectionParams,
    ) -> Result<Self, DetectionError> {
        if interval < 1 {
            return Err(DetectionError::InvalidInterval);
        }
        if working_size.0 == 0 || working_size.1 == 0 {
            return Err(DetectionError::InvalidWorkingSize(
                working_size.0,
                working_size.1,
            ));
        }
        Ok(Self {
            detector,
            annotator,
            interval,
            working_size,
            params,
            frame_count: 0,
            cache: DetectionCache::default(),
        })
    }

    /// Annotates `frame` with the current cache, refreshing it first when
    /// this is a recomputation frame. Returns the frame and the number of
    /// boxes drawn.
    ///
    /// A failed recomputation leaves the counter advanced and the cache
    /// unchanged.
    pub fn detect_and_annotate(
        &mut self,
        mut frame: Frame,
    ) -> Result<(Frame, usize), DetectionError> {
        self.frame_count += 1;
        if self.frame_count % self.interval == 0 {
            let boxes = self.recompute(&frame)?;
            log::debug!(
                "frame {}: detected {} face(s)",
                self.frame_count,
                boxes.len()
            );
            self.cache.replace(boxes, self.frame_count);
        }

        self.annotator.annotate(&mut frame, self.cache.boxes());
        Ok((frame, self.cache.len()))
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn cache(&self) -> &DetectionCache {
        &self.cache
    }

    fn recompute(&mut self, frame: &Frame) -> Result<Vec<FaceBox>, DetectionError> {
        let gray = downscale_to_gray(frame, self.working_size)?;
        let found = self.detector.detect(&gray, &self.params)?;
        let (rx, ry) = scale_ratios((frame.width(), frame.height()), self.working_size);
        Ok(found.iter().map(|b| b.rescale(rx, ry)).collect())
    }
}
