use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use uuid::Uuid;

use crate::models::source::{Frame, SourceKind};
use crate::traits::capture_provider::FrameProducer;

/// Shared handle to a live stream. The session owns the tracks; encoders
/// and hosts hold clones for reading frames or signalling an end.
pub type StreamHandle = Arc<LiveStream>;

type EndedListener = Box<dyn FnOnce() + Send + 'static>;

/// A live video stream backed by a `FrameProducer`.
///
/// Stopping the tracks releases the producer; afterwards no frames are
/// delivered. `end()` is the host-side variant (e.g. the user pressed
/// "stop sharing") and additionally notifies the ended listener, once.
pub struct LiveStream {
    id: Uuid,
    kind: SourceKind,
    frame_rate: u32,
    producer: Mutex<Option<Box<dyn FrameProducer>>>,
    ended_listener: Mutex<Option<EndedListener>>,
}

impl LiveStream {
    pub fn new(kind: SourceKind, frame_rate: u32, producer: Box<dyn FrameProducer>) -> StreamHandle {
        Arc::new(Self {
            id: Uuid::new_v4(),
            kind,
            frame_rate: frame_rate.max(1),
            producer: Mutex::new(Some(producer)),
            ended_listener: Mutex::new(None),
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn kind(&self) -> SourceKind {
        self.kind
    }

    pub fn frame_rate(&self) -> u32 {
        self.frame_rate
    }

    pub fn is_live(&self) -> bool {
        self.producer.lock().is_some()
    }

    /// Pull the next frame, or `None` once the tracks are stopped.
    pub fn read_frame(&self) -> Option<Frame> {
        self.producer.lock().as_mut()?.next_frame()
    }

    /// Register the listener fired by `end()`. Replaces any previous one.
    pub fn on_ended(&self, listener: impl FnOnce() + Send + 'static) {
        *self.ended_listener.lock() = Some(Box::new(listener));
    }

    /// Stop all tracks and release the producer. Idempotent; returns whether
    /// the stream was live. Never fires the ended listener.
    pub fn stop_tracks(&self) -> bool {
        self.ended_listener.lock().take();
        let producer = self.producer.lock().take();
        match producer {
            Some(mut producer) => {
                producer.release();
                log::debug!("Stopped {} stream {}", self.kind, self.id);
                true
            }
            None => false,
        }
    }

    /// The source ended on the host side: stop the tracks and notify the
    /// ended listener if the stream was still live.
    pub fn end(&self) {
        let listener = self.ended_listener.lock().take();
        if self.stop_tracks() {
            if let Some(listener) = listener {
                listener();
            }
        }
    }
}

impl fmt::Debug for LiveStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LiveStream")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("frame_rate", &self.frame_rate)
            .field("live", &self.is_live())
            .finish()
    }
}

/// A live stream acquired for one session, with its kind tag.
#[derive(Debug, Clone)]
pub struct CaptureSource {
    pub kind: SourceKind,
    pub stream: StreamHandle,
}

impl CaptureSource {
    pub fn release(&self) -> bool {
        self.stream.stop_tracks()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingProducer {
        frames: u64,
        released: Arc<AtomicUsize>,
    }

    impl FrameProducer for CountingProducer {
        fn next_frame(&mut self) -> Option<Frame> {
            self.frames += 1;
            Some(Frame {
                width: 1,
                height: 1,
                data: vec![0, 0, 0, 255],
                timestamp_ms: self.frames,
            })
        }

        fn release(&mut self) {
            self.released.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn stream(released: &Arc<AtomicUsize>) -> StreamHandle {
        LiveStream::new(
            SourceKind::Display,
            30,
            Box::new(CountingProducer {
                frames: 0,
                released: Arc::clone(released),
            }),
        )
    }

    #[test]
    fn frames_until_stopped() {
        let released = Arc::new(AtomicUsize::new(0));
        let s = stream(&released);
        assert!(s.is_live());
        assert_eq!(s.read_frame().map(|f| f.timestamp_ms), Some(1));

        assert!(s.stop_tracks());
        assert!(!s.is_live());
        assert!(s.read_frame().is_none());
        assert!(!s.stop_tracks());
        assert_eq!(released.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn end_fires_listener_once() {
        let released = Arc::new(AtomicUsize::new(0));
        let fired = Arc::new(AtomicUsize::new(0));
        let s = stream(&released);
        let counter = Arc::clone(&fired);
        s.on_ended(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        s.end();
        s.end();
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert_eq!(released.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn stop_tracks_does_not_fire_listener() {
        let released = Arc::new(AtomicUsize::new(0));
        let fired = Arc::new(AtomicUsize::new(0));
        let s = stream(&released);
        let counter = Arc::clone(&fired);
        s.on_ended(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        s.stop_tracks();
        s.end();
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }
}
