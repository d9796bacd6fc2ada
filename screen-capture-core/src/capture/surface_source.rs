use crate::models::source::Frame;
use crate::surface::drawing::SharedSurface;
use crate::traits::capture_provider::FrameProducer;

/// Frame producer streaming snapshots of a drawing surface.
#[derive(Debug)]
pub struct SurfaceFrameProducer {
    surface: SharedSurface,
}

impl SurfaceFrameProducer {
    pub fn new(surface: SharedSurface) -> Self {
        Self { surface }
    }
}

impl FrameProducer for SurfaceFrameProducer {
    fn next_frame(&mut self) -> Option<Frame> {
        Some(self.surface.frame())
    }
}
