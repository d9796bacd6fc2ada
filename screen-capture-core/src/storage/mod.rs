pub mod artifact_store;
pub mod export;
pub mod metadata;
