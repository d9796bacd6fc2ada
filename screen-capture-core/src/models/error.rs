use thiserror::Error;

/// Errors that can occur during screen recording operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CaptureError {
    /// Source acquisition failed, was declined, or was cancelled.
    #[error("capture source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("a recording session is already active")]
    SessionAlreadyActive,

    /// Stop completed with no buffered chunks; no artifact was produced.
    #[error("empty recording: no data was captured")]
    EmptyRecording,

    /// The encoder cannot produce the requested container/codec.
    /// Recovered by falling back to the encoder default, never surfaced.
    #[error("encoder does not support format: {0}")]
    EncoderUnsupported(String),

    #[error("encoding failed: {0}")]
    EncodingFailed(String),

    #[error("artifact handle has been released")]
    ArtifactReleased,

    #[error("configuration failed: {0}")]
    ConfigurationFailed(String),

    #[error("storage error: {0}")]
    StorageError(String),
}
