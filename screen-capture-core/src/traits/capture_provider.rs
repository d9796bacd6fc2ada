use crate::capture::acquisition::AcquisitionResponder;
use crate::models::source::Frame;

/// Host side of a live stream: yields frames on demand.
///
/// Implemented by:
/// - `SurfaceFrameProducer` (drawing surface snapshots)
/// - host display capture backends (e.g. the headless `ScriptedDisplay`)
pub trait FrameProducer: Send {
    /// Produce the current frame, or `None` if none is available yet.
    fn next_frame(&mut self) -> Option<Frame>;

    /// Release the underlying capture resources. Called once, when the
    /// stream's tracks are stopped.
    fn release(&mut self) {}
}

/// Host facility granting live captures of the full display.
pub trait DisplayCaptureProvider: Send + Sync {
    /// Whether display capture exists at all on this host.
    fn is_available(&self) -> bool;

    /// Ask for a display capture. The answer may arrive at any later time
    /// (e.g. after a permission prompt) through `responder`; dropping it
    /// unanswered counts as the user cancelling the request.
    fn request_display(&self, responder: AcquisitionResponder);
}
