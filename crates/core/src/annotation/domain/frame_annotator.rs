use crate::shared::face_box::FaceBox;
use crate::shared::frame::Frame;

/// Domain interface for drawing detections onto a frame in place.
///
/// Drawing is clipped to the frame bounds and never fails; an empty box
/// list leaves the frame untouched.
pub trait FrameAnnotator: Send {
    fn annotate(&self, frame: &mut Frame, boxes: &[FaceBox]);
}
