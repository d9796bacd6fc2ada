use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::source::SourceKind;

/// Revocable reference to an artifact's bytes in an `ArtifactStore`.
///
/// Once released, the handle never resolves again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArtifactHandle(Uuid);

impl ArtifactHandle {
    pub(crate) fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn id(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for ArtifactHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "artifact:{}", self.0)
    }
}

/// A finalized recording: the concatenation of all chunks of one session.
#[derive(Debug, Clone, PartialEq)]
pub struct Artifact {
    pub handle: ArtifactHandle,
    /// Container MIME type negotiated with the encoder (e.g. `video/webm`).
    pub media_type: String,
    /// File extension matching `media_type`.
    pub extension: String,
    pub size_bytes: u64,
    pub chunk_count: usize,
    /// SHA-256 hex digest of the artifact bytes.
    pub checksum: String,
    pub created_at: DateTime<Utc>,
    pub origin: Option<ArtifactOrigin>,
}

/// The session an artifact was produced by.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArtifactOrigin {
    pub session_id: Uuid,
    pub source: SourceKind,
    pub started_at: DateTime<Utc>,
    pub duration_secs: f64,
}

impl Artifact {
    /// Suggested download name: `<prefix>-<epoch-milliseconds>.<ext>`.
    pub fn suggested_file_name(&self, prefix: &str, at: DateTime<Utc>) -> String {
        format!("{}-{}.{}", prefix, at.timestamp_millis(), self.extension)
    }

    pub fn metadata(&self, file_name: &str) -> ArtifactMetadata {
        ArtifactMetadata {
            id: self.handle.id().to_string(),
            file_name: file_name.to_string(),
            media_type: self.media_type.clone(),
            size_bytes: self.size_bytes,
            chunk_count: self.chunk_count,
            checksum: self.checksum.clone(),
            created_at: self.created_at.to_rfc3339(),
            session_id: self.origin.map(|o| o.session_id.to_string()),
            source: self.origin.map(|o| o.source),
            duration_secs: self.origin.map(|o| o.duration_secs),
        }
    }
}

/// Metadata written alongside an exported artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactMetadata {
    pub id: String,
    pub file_name: String,
    pub media_type: String,
    pub size_bytes: u64,
    pub chunk_count: usize,
    pub checksum: String,
    pub created_at: String,
    pub session_id: Option<String>,
    pub source: Option<SourceKind>,
    pub duration_secs: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> Artifact {
        Artifact {
            handle: ArtifactHandle::new(),
            media_type: "video/webm".into(),
            extension: "webm".into(),
            size_bytes: 3,
            chunk_count: 1,
            checksum: "abc".into(),
            created_at: Utc::now(),
            origin: None,
        }
    }

    #[test]
    fn suggested_name_uses_epoch_millis() {
        let at = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        assert_eq!(
            sample().suggested_file_name("screen-recording", at),
            "screen-recording-1700000000123.webm"
        );
    }

    #[test]
    fn metadata_without_origin() {
        let artifact = sample();
        let meta = artifact.metadata("x.webm");
        assert_eq!(meta.id, artifact.handle.id().to_string());
        assert_eq!(meta.file_name, "x.webm");
        assert!(meta.session_id.is_none());
        assert!(meta.source.is_none());
    }
}
