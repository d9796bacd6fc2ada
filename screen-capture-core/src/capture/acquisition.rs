use std::sync::Arc;

use uuid::Uuid;

use super::live_stream::{CaptureSource, LiveStream, StreamHandle};
use super::surface_source::SurfaceFrameProducer;
use crate::models::source::SourceKind;
use crate::session::events::{EventQueue, SessionEvent};
use crate::surface::drawing::SharedSurface;
use crate::traits::capture_provider::{DisplayCaptureProvider, FrameProducer};

/// One-shot answer channel for a pending source acquisition.
///
/// Exactly one of `grant` / `decline` delivers the outcome to the
/// controller. Dropping the responder unanswered reports a cancellation.
pub struct AcquisitionResponder {
    kind: SourceKind,
    session: Uuid,
    queue: Option<EventQueue>,
}

impl AcquisitionResponder {
    pub(crate) fn new(kind: SourceKind, session: Uuid, queue: EventQueue) -> Self {
        Self {
            kind,
            session,
            queue: Some(queue),
        }
    }

    pub fn kind(&self) -> SourceKind {
        self.kind
    }

    /// Grant the request with a live stream over `producer`. Returns the
    /// stream so the host can later signal `end()` on it.
    pub fn grant(mut self, producer: Box<dyn FrameProducer>, frame_rate: u32) -> StreamHandle {
        let stream = LiveStream::new(self.kind, frame_rate, producer);
        if let Some(queue) = self.queue.take() {
            let source = CaptureSource {
                kind: self.kind,
                stream: Arc::clone(&stream),
            };
            queue.push(self.session, SessionEvent::SourceAcquired(source));
        }
        stream
    }

    pub fn decline(mut self, reason: impl Into<String>) {
        if let Some(queue) = self.queue.take() {
            queue.push(self.session, SessionEvent::AcquisitionFailed(reason.into()));
        }
    }
}

impl Drop for AcquisitionResponder {
    fn drop(&mut self) {
        if let Some(queue) = self.queue.take() {
            queue.push(
                self.session,
                SessionEvent::AcquisitionFailed(format!("{} capture request was cancelled", self.kind)),
            );
        }
    }
}

/// The capture source abstraction: resolves a `SourceKind` into a live
/// stream from the display provider or the attached drawing surface.
pub struct CaptureSources {
    display: Option<Arc<dyn DisplayCaptureProvider>>,
    surface: Option<SharedSurface>,
    surface_frame_rate: u32,
}

impl CaptureSources {
    pub fn new(surface_frame_rate: u32) -> Self {
        Self {
            display: None,
            surface: None,
            surface_frame_rate,
        }
    }

    pub fn set_display_provider(&mut self, provider: Arc<dyn DisplayCaptureProvider>) {
        self.display = Some(provider);
    }

    pub fn attach_surface(&mut self, surface: SharedSurface) {
        self.surface = Some(surface);
    }

    pub fn detach_surface(&mut self) -> Option<SharedSurface> {
        self.surface.take()
    }

    pub fn surface(&self) -> Option<&SharedSurface> {
        self.surface.as_ref()
    }

    pub fn surface_frame_rate(&self) -> u32 {
        self.surface_frame_rate
    }

    /// Acquire a source of `kind`, answering through `responder`.
    ///
    /// Surface requests are answered immediately. Display requests are
    /// forwarded to the host provider and may be answered later.
    pub fn acquire(&self, responder: AcquisitionResponder) {
        match responder.kind() {
            SourceKind::Surface => match &self.surface {
                Some(surface) => {
                    let producer = SurfaceFrameProducer::new(surface.clone());
                    responder.grant(Box::new(producer), self.surface_frame_rate);
                }
                None => responder.decline("no drawing surface is attached"),
            },
            SourceKind::Display => match &self.display {
                Some(provider) if provider.is_available() => provider.request_display(responder),
                Some(_) => responder.decline("display capture is not available"),
                None => responder.decline("display capture is not supported on this host"),
            },
        }
    }
}
