use std::fs;
use std::path::{Path, PathBuf};

use crate::models::artifact::ArtifactMetadata;
use crate::models::error::CaptureError;

/// Path of the JSON sidecar for an exported artifact:
/// `{artifact_path without extension}.metadata.json`.
pub fn metadata_path(artifact_path: &Path) -> PathBuf {
    artifact_path.with_extension("metadata.json")
}

/// Write artifact metadata as a JSON sidecar file.
pub fn write_metadata(metadata: &ArtifactMetadata, artifact_path: &Path) -> Result<PathBuf, CaptureError> {
    let path = metadata_path(artifact_path);
    let json = serde_json::to_string_pretty(metadata)
        .map_err(|e| CaptureError::StorageError(format!("failed to serialize metadata: {}", e)))?;
    fs::write(&path, json)
        .map_err(|e| CaptureError::StorageError(format!("failed to write metadata: {}", e)))?;
    Ok(path)
}

/// Read artifact metadata from a JSON sidecar file.
pub fn read_metadata(artifact_path: &Path) -> Result<ArtifactMetadata, CaptureError> {
    let json = fs::read_to_string(metadata_path(artifact_path))
        .map_err(|e| CaptureError::StorageError(format!("failed to read metadata: {}", e)))?;
    serde_json::from_str(&json)
        .map_err(|e| CaptureError::StorageError(format!("failed to parse metadata: {}", e)))
}
