use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use super::events::{EncoderEvents, EventQueue, SessionEvent};
use super::recording::RecordingSession;
use super::transition::{transition, Effect, Transition};
use crate::capture::acquisition::{AcquisitionResponder, CaptureSources};
use crate::capture::live_stream::CaptureSource;
use crate::models::artifact::Artifact;
use crate::models::config::RecorderConfiguration;
use crate::models::error::CaptureError;
use crate::models::media::MediaFormat;
use crate::models::source::SourceKind;
use crate::models::state::RecordingState;
use crate::processing::chunk_aggregator::ChunkAggregator;
use crate::storage::artifact_store::ArtifactStore;
use crate::storage::export::{export_artifact, ExportedArtifact};
use crate::surface::drawing::SharedSurface;
use crate::traits::capture_delegate::RecorderDelegate;
use crate::traits::capture_provider::DisplayCaptureProvider;
use crate::traits::encoder::{EncoderHandle, EncoderService};
use crate::traits::recorder_controls::RecorderControls;

/// Pick the format to request: `preferred` if the encoder supports it,
/// otherwise the encoder's default. The fallback is silent.
pub fn negotiate_format<E: EncoderService + ?Sized>(encoder: &E, preferred: &MediaFormat) -> MediaFormat {
    if encoder.is_format_supported(preferred) {
        preferred.clone()
    } else {
        let fallback = encoder.default_format();
        log::debug!("{} unsupported by encoder, using {}", preferred, fallback);
        fallback
    }
}

/// Recording session controller.
///
/// Single owner of session state. UI operations and queued asynchronous
/// events (acquisition answers, encoder chunks/stops, source end) all go
/// through the pure `transition` function; the controller applies the
/// resulting effects.
///
/// ```text
/// [CaptureSources] → live stream → [EncoderService] ─ chunk/stopped ─┐
///                                                                    ↓
///               UI ops → [RecordingController] ← [EventQueue] ←──────┘
///                               ↓
///                 [ChunkAggregator] → finalize → [ArtifactStore]
/// ```
///
/// Asynchronous events are applied only when the host calls
/// `process_events()`.
pub struct RecordingController<E: EncoderService> {
    config: RecorderConfiguration,
    sources: CaptureSources,
    encoder: E,
    state: RecordingState,
    queue: EventQueue,
    session_id: Option<Uuid>,
    session: Option<RecordingSession>,
    encoder_handle: Option<Box<dyn EncoderHandle>>,
    aggregator: ChunkAggregator,
    store: ArtifactStore,
    artifact: Option<Artifact>,
    superseded: Vec<Artifact>,
    delegate: Option<Arc<dyn RecorderDelegate>>,
    last_error: Option<CaptureError>,
}

impl<E: EncoderService> RecordingController<E> {
    pub fn new(config: RecorderConfiguration, encoder: E) -> Result<Self, CaptureError> {
        config.validate().map_err(CaptureError::ConfigurationFailed)?;
        Ok(Self {
            sources: CaptureSources::new(config.surface_frame_rate),
            config,
            encoder,
            state: RecordingState::Idle,
            queue: EventQueue::new(),
            session_id: None,
            session: None,
            encoder_handle: None,
            aggregator: ChunkAggregator::new(),
            store: ArtifactStore::new(),
            artifact: None,
            superseded: Vec::new(),
            delegate: None,
            last_error: None,
        })
    }

    pub fn set_delegate(&mut self, delegate: Arc<dyn RecorderDelegate>) {
        self.delegate = Some(delegate);
    }

    pub fn set_display_provider(&mut self, provider: Arc<dyn DisplayCaptureProvider>) {
        self.sources.set_display_provider(provider);
    }

    pub fn attach_surface(&mut self, surface: SharedSurface) {
        self.sources.attach_surface(surface);
    }

    pub fn detach_surface(&mut self) -> Option<SharedSurface> {
        self.sources.detach_surface()
    }

    pub fn config(&self) -> &RecorderConfiguration {
        &self.config
    }

    pub fn encoder(&self) -> &E {
        &self.encoder
    }

    /// Shared view of the artifact store, for resolving handles.
    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    pub fn session(&self) -> Option<&RecordingSession> {
        self.session.as_ref()
    }

    /// Chunks buffered for the current (or most recent) session.
    pub fn chunk_count(&self) -> usize {
        self.aggregator.len()
    }

    pub fn recorded_bytes(&self) -> usize {
        self.aggregator.total_bytes()
    }

    /// The most recent failure surfaced to the user, if any.
    pub fn last_error(&self) -> Option<&CaptureError> {
        self.last_error.as_ref()
    }

    /// Number of queued events not yet applied.
    pub fn pending_events(&self) -> usize {
        self.queue.len()
    }

    /// Bytes of the current artifact.
    pub fn resolve_artifact(&self) -> Result<Arc<[u8]>, CaptureError> {
        let artifact = self.artifact.as_ref().ok_or(CaptureError::ArtifactReleased)?;
        self.store.resolve(&artifact.handle)
    }

    /// Write the current artifact to the configured output directory.
    pub fn export_artifact(&self) -> Result<ExportedArtifact, CaptureError> {
        self.export_artifact_to(&self.config.output_directory)
    }

    /// Write the current artifact and its metadata sidecar under `dir`.
    pub fn export_artifact_to(&self, dir: &Path) -> Result<ExportedArtifact, CaptureError> {
        let artifact = self.artifact.as_ref().ok_or(CaptureError::ArtifactReleased)?;
        export_artifact(&self.store, artifact, dir, &self.config.file_prefix, Utc::now())
    }

    /// Apply every queued event in arrival order. Events from sessions
    /// other than the current one are dropped. Returns the number applied.
    pub fn process_events(&mut self) -> usize {
        let mut applied = 0;
        while let Some(queued) = self.queue.pop() {
            if Some(queued.session) != self.session_id {
                log::debug!("Dropping stale {:?} from session {}", queued.event, queued.session);
                if let SessionEvent::SourceAcquired(source) = queued.event {
                    source.release();
                }
                continue;
            }
            if let Err(e) = self.apply(queued.event) {
                log::warn!("Queued event rejected: {}", e);
            }
            applied += 1;
        }
        applied
    }

    // --- Internal helpers ---

    fn apply(&mut self, event: SessionEvent) -> Result<(), CaptureError> {
        let from = self.state;
        log::trace!("{} <- {:?}", from.name(), event);
        let step = transition(from, event)?;
        if step.is_noop(from) {
            log::debug!("Event ignored in {} state", from.name());
            return Ok(());
        }
        let Transition { next, effects } = step;

        let mut follow_up = None;
        for effect in effects {
            if let Some(event) = self.run_effect(effect) {
                follow_up = Some(event);
            }
        }
        self.set_state(next);

        match follow_up {
            Some(event) => self.apply(event),
            None => Ok(()),
        }
    }

    /// Run one effect. May return an event to apply once the transition
    /// that produced the effect has completed.
    fn run_effect(&mut self, effect: Effect) -> Option<SessionEvent> {
        match effect {
            Effect::AcquireSource(kind) => {
                let id = Uuid::new_v4();
                self.session_id = Some(id);
                self.last_error = None;
                log::info!("Session {} acquiring {} source", id, kind);
                self.sources
                    .acquire(AcquisitionResponder::new(kind, id, self.queue.clone()));
                None
            }
            Effect::BeginEncoding(source) => self.begin_encoding(source),
            Effect::ReleaseOrphan(source) => {
                log::debug!("Releasing unrequested {} source", source.kind);
                source.release();
                None
            }
            Effect::PauseEncoder => {
                if let Some(handle) = self.encoder_handle.as_mut() {
                    handle.pause();
                }
                if let Some(session) = self.session.as_mut() {
                    session.mark_paused();
                }
                None
            }
            Effect::ResumeEncoder => {
                if let Some(handle) = self.encoder_handle.as_mut() {
                    handle.resume();
                }
                if let Some(session) = self.session.as_mut() {
                    session.mark_resumed();
                }
                None
            }
            Effect::StopEncoder => match self.encoder_handle.as_mut() {
                Some(handle) => {
                    handle.stop();
                    None
                }
                None => Some(SessionEvent::EncoderStopped),
            },
            Effect::AppendChunk(payload) => {
                if self.aggregator.append(payload).is_none() {
                    log::trace!("Discarded empty chunk");
                }
                None
            }
            Effect::Finalize => {
                self.finalize();
                None
            }
            Effect::ReleaseCapture => {
                self.release_capture();
                None
            }
            Effect::Report(error) => {
                self.report(error);
                None
            }
        }
    }

    fn begin_encoding(&mut self, source: CaptureSource) -> Option<SessionEvent> {
        let Some(id) = self.session_id else {
            source.release();
            return None;
        };

        self.aggregator.reset();
        let events = EncoderEvents::new(self.queue.clone(), id);
        let preferred = negotiate_format(&self.encoder, &self.config.preferred_format);

        let started = match self
            .encoder
            .start(Arc::clone(&source.stream), &preferred, events.clone())
        {
            Err(CaptureError::EncoderUnsupported(reason)) => {
                let fallback = self.encoder.default_format();
                log::debug!("Encoder refused {} ({}), retrying with {}", preferred, reason, fallback);
                self.encoder
                    .start(Arc::clone(&source.stream), &fallback, events)
                    .map(|handle| (handle, fallback))
            }
            other => other.map(|handle| (handle, preferred)),
        };

        match started {
            Ok((handle, format)) => {
                let queue = self.queue.clone();
                source
                    .stream
                    .on_ended(move || queue.push(id, SessionEvent::SourceEnded));
                let ended_early = !source.stream.is_live();

                log::info!("Session {} recording {} as {}", id, source.kind, format);
                self.encoder_handle = Some(handle);
                self.session = Some(RecordingSession::new(id, source, format));
                ended_early.then_some(SessionEvent::SourceEnded)
            }
            Err(e) => {
                let format = self.encoder.default_format();
                self.session = Some(RecordingSession::new(id, source, format));
                Some(SessionEvent::EncoderFailed(e.to_string()))
            }
        }
    }

    fn finalize(&mut self) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        match self.aggregator.finalize(&session.format, &self.store) {
            Ok(mut artifact) => {
                artifact.origin = Some(session.origin());
                log::info!(
                    "Session {} produced {} ({} bytes, {} chunks)",
                    session.id,
                    artifact.handle,
                    artifact.size_bytes,
                    artifact.chunk_count
                );
                if let Some(previous) = self.artifact.replace(artifact.clone()) {
                    if self.store.is_live(&previous.handle) {
                        log::warn!("{} superseded without being released", previous.handle);
                        self.superseded.push(previous);
                    }
                }
                if let Some(ref delegate) = self.delegate {
                    delegate.on_artifact_ready(&artifact);
                }
            }
            Err(e) => self.report(e),
        }
    }

    /// Tear down the encoder and stop the session's tracks. Idempotent.
    fn release_capture(&mut self) {
        // dropping the handle tears the encoder instance down
        self.encoder_handle.take();
        if let Some(session) = self.session.take() {
            session.source.release();
        }
    }

    fn report(&mut self, error: CaptureError) {
        log::warn!("Recording error: {}", error);
        if let Some(ref delegate) = self.delegate {
            delegate.on_error(&error);
        }
        self.last_error = Some(error);
    }

    fn set_state(&mut self, new_state: RecordingState) {
        if new_state.is_idle() {
            self.release_capture();
            self.session_id = None;
        }
        if new_state == self.state {
            return;
        }
        log::debug!("{} -> {}", self.state.name(), new_state.name());
        self.state = new_state;
        if let Some(ref delegate) = self.delegate {
            delegate.on_state_changed(&new_state);
        }
    }
}

impl<E: EncoderService> RecorderControls for RecordingController<E> {
    fn state(&self) -> RecordingState {
        self.state
    }

    fn artifact(&self) -> Option<&Artifact> {
        self.artifact.as_ref()
    }

    fn start(&mut self, kind: SourceKind) -> Result<(), CaptureError> {
        self.apply(SessionEvent::Start(kind)).map_err(|e| {
            log::debug!("start({}) rejected in {} state", kind, self.state.name());
            e
        })
    }

    fn pause(&mut self) -> Result<(), CaptureError> {
        self.apply(SessionEvent::Pause)
    }

    fn resume(&mut self) -> Result<(), CaptureError> {
        self.apply(SessionEvent::Resume)
    }

    fn stop(&mut self) -> Result<(), CaptureError> {
        self.apply(SessionEvent::Stop)
    }

    fn clear_artifact(&mut self) {
        for artifact in self.superseded.drain(..).chain(self.artifact.take()) {
            if self.store.release(&artifact.handle) {
                log::debug!("Released {}", artifact.handle);
            }
        }
    }
}

impl<E: EncoderService> Drop for RecordingController<E> {
    fn drop(&mut self) {
        if !self.queue.is_empty() {
            log::debug!("Discarding {} unapplied events", self.queue.len());
        }
        self.release_capture();
    }
}
