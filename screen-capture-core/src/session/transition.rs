use crate::capture::live_stream::CaptureSource;
use crate::models::error::CaptureError;
use crate::models::source::SourceKind;
use crate::models::state::RecordingState;
use super::events::SessionEvent;

/// Side effects requested by a transition, applied by the controller in
/// order.
#[derive(Debug)]
pub enum Effect {
    AcquireSource(SourceKind),
    /// Reset the aggregator, negotiate the format, start the encoder on the
    /// source and watch it for a host-side end.
    BeginEncoding(CaptureSource),
    /// A source arrived for a session that no longer wants it.
    ReleaseOrphan(CaptureSource),
    PauseEncoder,
    ResumeEncoder,
    StopEncoder,
    AppendChunk(Vec<u8>),
    /// Build the artifact from the aggregated chunks.
    Finalize,
    /// Tear down the encoder and stop the session's tracks.
    ReleaseCapture,
    Report(CaptureError),
}

#[derive(Debug)]
pub struct Transition {
    pub next: RecordingState,
    pub effects: Vec<Effect>,
}

impl Transition {
    fn to(next: RecordingState, effects: Vec<Effect>) -> Self {
        Self { next, effects }
    }

    fn stay(state: RecordingState) -> Self {
        Self::to(state, Vec::new())
    }

    /// No state change and nothing to do.
    pub fn is_noop(&self, from: RecordingState) -> bool {
        self.next == from && self.effects.is_empty()
    }
}

/// The recording state machine as a pure function of `(state, event)`.
///
/// Only `Start` outside `Idle` is an error; every other out-of-place event
/// is ignored (or, for a stray source, releases it) so duplicate UI events
/// and late encoder callbacks cannot corrupt the session.
pub fn transition(state: RecordingState, event: SessionEvent) -> Result<Transition, CaptureError> {
    use RecordingState::*;

    let t = match (state, event) {
        (Idle, SessionEvent::Start(kind)) => {
            Transition::to(Acquiring { kind }, vec![Effect::AcquireSource(kind)])
        }
        (_, SessionEvent::Start(_)) => return Err(CaptureError::SessionAlreadyActive),

        (Acquiring { .. }, SessionEvent::SourceAcquired(source)) => {
            Transition::to(Active, vec![Effect::BeginEncoding(source)])
        }
        (_, SessionEvent::SourceAcquired(source)) => {
            Transition::to(state, vec![Effect::ReleaseOrphan(source)])
        }

        (Acquiring { .. }, SessionEvent::AcquisitionFailed(reason)) => Transition::to(
            Idle,
            vec![Effect::Report(CaptureError::SourceUnavailable(reason))],
        ),

        (Active, SessionEvent::Pause) => Transition::to(Paused, vec![Effect::PauseEncoder]),
        (Paused, SessionEvent::Resume) => Transition::to(Active, vec![Effect::ResumeEncoder]),

        (Active | Paused, SessionEvent::Stop | SessionEvent::SourceEnded) => {
            Transition::to(Stopping, vec![Effect::StopEncoder])
        }

        (Active | Paused | Stopping, SessionEvent::Chunk(payload)) => {
            Transition::to(state, vec![Effect::AppendChunk(payload)])
        }
        (Active | Paused | Stopping, SessionEvent::EncoderStopped) => {
            Transition::to(Idle, vec![Effect::Finalize, Effect::ReleaseCapture])
        }
        (Active | Paused | Stopping, SessionEvent::EncoderFailed(reason)) => Transition::to(
            Idle,
            vec![
                Effect::ReleaseCapture,
                Effect::Report(CaptureError::EncodingFailed(reason)),
            ],
        ),

        (state, _) => Transition::stay(state),
    };
    Ok(t)
}
