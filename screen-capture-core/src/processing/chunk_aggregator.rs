use chrono::Utc;
use sha2::{Digest, Sha256};

use crate::models::artifact::Artifact;
use crate::models::error::CaptureError;
use crate::models::media::MediaFormat;
use crate::storage::artifact_store::ArtifactStore;

/// One unit of encoded data, tagged with its arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub sequence: u64,
    pub payload: Vec<u8>,
}

/// Ordered buffer of encoded chunks for one session.
///
/// Sequence indices are assigned on arrival, including for empty payloads
/// which are then discarded, so stored indices are strictly increasing but
/// may have gaps. Chunks are never reordered.
#[derive(Debug, Default)]
pub struct ChunkAggregator {
    chunks: Vec<Chunk>,
    next_sequence: u64,
    total_bytes: usize,
}

impl ChunkAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Discard all buffered chunks and restart sequence numbering.
    pub fn reset(&mut self) {
        self.chunks.clear();
        self.next_sequence = 0;
        self.total_bytes = 0;
    }

    /// Buffer a payload. Returns its sequence index, or `None` if the
    /// payload was empty and discarded.
    pub fn append(&mut self, payload: Vec<u8>) -> Option<u64> {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        if payload.is_empty() {
            return None;
        }
        self.total_bytes += payload.len();
        self.chunks.push(Chunk { sequence, payload });
        Some(sequence)
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn total_bytes(&self) -> usize {
        self.total_bytes
    }

    /// Concatenate all chunks in sequence order into an artifact stored
    /// in `store`, tagged with the container type of `format`.
    ///
    /// Fails with `EmptyRecording` when nothing was buffered.
    pub fn finalize(&self, format: &MediaFormat, store: &ArtifactStore) -> Result<Artifact, CaptureError> {
        if self.chunks.is_empty() {
            return Err(CaptureError::EmptyRecording);
        }

        let mut bytes = Vec::with_capacity(self.total_bytes);
        for chunk in &self.chunks {
            bytes.extend_from_slice(&chunk.payload);
        }
        let checksum = hex_encode(&Sha256::digest(&bytes));
        let size_bytes = bytes.len() as u64;
        let handle = store.insert(bytes);

        Ok(Artifact {
            handle,
            media_type: format.container().to_string(),
            extension: format.extension().to_string(),
            size_bytes,
            chunk_count: self.chunks.len(),
            checksum,
            created_at: Utc::now(),
            origin: None,
        })
    }
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
