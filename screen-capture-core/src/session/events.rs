use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use uuid::Uuid;

use crate::capture::live_stream::CaptureSource;
use crate::models::source::SourceKind;

/// Inputs to the recording state machine.
pub enum SessionEvent {
    /// UI: begin a session on `kind`.
    Start(SourceKind),
    /// Acquisition granted.
    SourceAcquired(CaptureSource),
    /// Acquisition declined, unavailable or cancelled.
    AcquisitionFailed(String),
    /// UI: pause capture.
    Pause,
    /// UI: resume capture.
    Resume,
    /// UI: stop capture.
    Stop,
    /// The live source ended on the host side (e.g. "stop sharing").
    SourceEnded,
    /// Encoder produced a data chunk.
    Chunk(Vec<u8>),
    /// Encoder finished flushing after a stop.
    EncoderStopped,
    /// Encoder failed and will produce no more events.
    EncoderFailed(String),
}

impl fmt::Debug for SessionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start(kind) => write!(f, "Start({})", kind),
            Self::SourceAcquired(source) => write!(f, "SourceAcquired({})", source.kind),
            Self::AcquisitionFailed(reason) => write!(f, "AcquisitionFailed({:?})", reason),
            Self::Pause => f.write_str("Pause"),
            Self::Resume => f.write_str("Resume"),
            Self::Stop => f.write_str("Stop"),
            Self::SourceEnded => f.write_str("SourceEnded"),
            Self::Chunk(payload) => write!(f, "Chunk({} bytes)", payload.len()),
            Self::EncoderStopped => f.write_str("EncoderStopped"),
            Self::EncoderFailed(reason) => write!(f, "EncoderFailed({:?})", reason),
        }
    }
}

/// An event tagged with the session that produced it.
#[derive(Debug)]
pub struct QueuedEvent {
    pub session: Uuid,
    pub event: SessionEvent,
}

/// FIFO queue feeding asynchronous events into the controller.
///
/// Producers on any thread push; the controller drains in arrival order,
/// so every event pushed before an `EncoderStopped` is applied before it.
#[derive(Debug, Clone, Default)]
pub struct EventQueue {
    inner: Arc<Mutex<VecDeque<QueuedEvent>>>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, session: Uuid, event: SessionEvent) {
        self.inner.lock().push_back(QueuedEvent { session, event });
    }

    pub fn pop(&self) -> Option<QueuedEvent> {
        self.inner.lock().pop_front()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}

/// Event sink handed to an encoder instance, bound to one session.
#[derive(Debug, Clone)]
pub struct EncoderEvents {
    queue: EventQueue,
    session: Uuid,
}

impl EncoderEvents {
    pub(crate) fn new(queue: EventQueue, session: Uuid) -> Self {
        Self { queue, session }
    }

    pub fn session(&self) -> Uuid {
        self.session
    }

    pub fn chunk(&self, payload: Vec<u8>) {
        self.queue.push(self.session, SessionEvent::Chunk(payload));
    }

    pub fn stopped(&self) {
        self.queue.push(self.session, SessionEvent::EncoderStopped);
    }

    pub fn failed(&self, reason: impl Into<String>) {
        self.queue
            .push(self.session, SessionEvent::EncoderFailed(reason.into()));
    }
}
