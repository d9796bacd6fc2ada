use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use super::artifact_store::ArtifactStore;
use super::metadata;
use crate::models::artifact::{Artifact, ArtifactMetadata};
use crate::models::error::CaptureError;

/// Files produced by exporting an artifact.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportedArtifact {
    pub path: PathBuf,
    pub metadata_path: PathBuf,
    pub metadata: ArtifactMetadata,
}

/// Write an artifact's bytes to `directory` under its suggested name,
/// plus a JSON metadata sidecar.
///
/// Fails with `ArtifactReleased` if the handle no longer resolves.
pub fn export_artifact(
    store: &ArtifactStore,
    artifact: &Artifact,
    directory: &Path,
    file_prefix: &str,
    at: DateTime<Utc>,
) -> Result<ExportedArtifact, CaptureError> {
    let bytes = store.resolve(&artifact.handle)?;

    fs::create_dir_all(directory)
        .map_err(|e| CaptureError::StorageError(format!("failed to create directory: {}", e)))?;

    let file_name = artifact.suggested_file_name(file_prefix, at);
    let path = directory.join(&file_name);
    fs::write(&path, &bytes[..])
        .map_err(|e| CaptureError::StorageError(format!("failed to write artifact: {}", e)))?;

    let metadata = artifact.metadata(&file_name);
    let metadata_path = metadata::write_metadata(&metadata, &path)?;
    log::info!("Exported {} ({} bytes) to {}", artifact.handle, bytes.len(), path.display());

    Ok(ExportedArtifact {
        path,
        metadata_path,
        metadata,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::media::MediaFormat;
    use crate::processing::chunk_aggregator::ChunkAggregator;
    use chrono::TimeZone;

    fn temp_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("screen_capture_test_{}_{}", name, std::process::id()))
    }

    #[test]
    fn export_writes_bytes_and_sidecar() {
        let dir = temp_dir("export");
        let store = ArtifactStore::new();
        let mut agg = ChunkAggregator::new();
        agg.append(b"hello ".to_vec());
        agg.append(b"world".to_vec());
        let artifact = agg.finalize(&MediaFormat::webm_vp9(), &store).unwrap();

        let at = Utc.timestamp_millis_opt(1_234_567_890_000).unwrap();
        let exported = export_artifact(&store, &artifact, &dir, "screen-recording", at).unwrap();

        assert_eq!(exported.path, dir.join("screen-recording-1234567890000.webm"));
        assert_eq!(fs::read(&exported.path).unwrap(), b"hello world");
        assert_eq!(
            exported.metadata_path,
            dir.join("screen-recording-1234567890000.metadata.json")
        );

        let meta = metadata::read_metadata(&exported.path).unwrap();
        assert_eq!(meta, exported.metadata);
        assert_eq!(meta.size_bytes, 11);
        assert_eq!(meta.checksum, artifact.checksum);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn export_of_released_artifact_fails() {
        let dir = temp_dir("released");
        let store = ArtifactStore::new();
        let mut agg = ChunkAggregator::new();
        agg.append(vec![1]);
        let artifact = agg.finalize(&MediaFormat::webm(), &store).unwrap();
        store.release(&artifact.handle);

        let result = export_artifact(&store, &artifact, &dir, "screen-recording", Utc::now());
        assert_eq!(result, Err(CaptureError::ArtifactReleased));
        assert!(!dir.exists());
    }
}
