use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::capture::live_stream::CaptureSource;
use crate::models::artifact::ArtifactOrigin;
use crate::models::media::MediaFormat;

/// The active session: its exclusively owned source, the negotiated
/// format and timing. Chunks live in the controller's aggregator.
#[derive(Debug)]
pub struct RecordingSession {
    pub id: Uuid,
    pub source: CaptureSource,
    pub format: MediaFormat,
    pub started_at: DateTime<Utc>,
    started: Instant,
    paused_duration: Duration,
    last_pause_time: Option<Instant>,
}

impl RecordingSession {
    pub fn new(id: Uuid, source: CaptureSource, format: MediaFormat) -> Self {
        Self {
            id,
            source,
            format,
            started_at: Utc::now(),
            started: Instant::now(),
            paused_duration: Duration::ZERO,
            last_pause_time: None,
        }
    }

    pub(crate) fn mark_paused(&mut self) {
        if self.last_pause_time.is_none() {
            self.last_pause_time = Some(Instant::now());
        }
    }

    pub(crate) fn mark_resumed(&mut self) {
        if let Some(pause_start) = self.last_pause_time.take() {
            self.paused_duration += pause_start.elapsed();
        }
    }

    /// Wall time since start, excluding paused intervals.
    pub fn active_duration(&self) -> Duration {
        let paused = self.paused_duration
            + self
                .last_pause_time
                .map(|since| since.elapsed())
                .unwrap_or_default();
        self.started.elapsed().saturating_sub(paused)
    }

    pub fn origin(&self) -> ArtifactOrigin {
        ArtifactOrigin {
            session_id: self.id,
            source: self.source.kind,
            started_at: self.started_at,
            duration_secs: self.active_duration().as_secs_f64(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::live_stream::LiveStream;
    use crate::models::source::{Frame, SourceKind};
    use crate::traits::capture_provider::FrameProducer;
    use std::thread;

    struct Blank;

    impl FrameProducer for Blank {
        fn next_frame(&mut self) -> Option<Frame> {
            None
        }
    }

    fn session() -> RecordingSession {
        let source = CaptureSource {
            kind: SourceKind::Surface,
            stream: LiveStream::new(SourceKind::Surface, 30, Box::new(Blank)),
        };
        RecordingSession::new(Uuid::new_v4(), source, MediaFormat::webm())
    }

    #[test]
    fn paused_time_is_excluded() {
        let mut s = session();
        s.mark_paused();
        thread::sleep(Duration::from_millis(60));
        s.mark_resumed();

        let total = s.started.elapsed();
        assert!(s.active_duration() + Duration::from_millis(50) <= total);
    }

    #[test]
    fn origin_carries_session_identity() {
        let s = session();
        let origin = s.origin();
        assert_eq!(origin.session_id, s.id);
        assert_eq!(origin.source, SourceKind::Surface);
        assert!(origin.duration_secs >= 0.0);
    }
}
