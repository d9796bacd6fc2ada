use crate::models::artifact::Artifact;
use crate::models::error::CaptureError;
use crate::models::state::RecordingState;

/// Event delegate for recorder notifications.
///
/// Called on the thread that drives the controller. Implementations should
/// marshal to the UI thread if needed.
pub trait RecorderDelegate: Send + Sync {
    /// Called when the session state changes.
    fn on_state_changed(&self, state: &RecordingState);

    /// Called when an operation fails in a way the user should see.
    fn on_error(&self, error: &CaptureError);

    /// Called when a session finalizes into a new artifact.
    fn on_artifact_ready(&self, artifact: &Artifact);
}
