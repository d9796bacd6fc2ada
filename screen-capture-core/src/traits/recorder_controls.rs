use crate::models::artifact::Artifact;
use crate::models::error::CaptureError;
use crate::models::source::SourceKind;
use crate::models::state::RecordingState;

/// Operations and observables the UI layer uses to drive a recorder.
pub trait RecorderControls {
    /// Current session state.
    fn state(&self) -> RecordingState;

    fn is_recording(&self) -> bool {
        self.state().is_recording()
    }

    fn is_paused(&self) -> bool {
        self.state().is_paused()
    }

    /// The current artifact, if one exists and has not been cleared.
    fn artifact(&self) -> Option<&Artifact>;

    /// Begin acquiring `kind`. Transitions: idle → acquiring.
    /// Rejected with `SessionAlreadyActive` from any other state.
    fn start(&mut self, kind: SourceKind) -> Result<(), CaptureError>;

    /// Transitions: active → paused. No-op otherwise.
    fn pause(&mut self) -> Result<(), CaptureError>;

    /// Transitions: paused → active. No-op otherwise.
    fn resume(&mut self) -> Result<(), CaptureError>;

    /// Transitions: active/paused → stopping. No-op otherwise.
    fn stop(&mut self) -> Result<(), CaptureError>;

    /// Release the current artifact (and any superseded ones).
    fn clear_artifact(&mut self);
}
