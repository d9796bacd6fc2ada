pub mod artifact;
pub mod config;
pub mod error;
pub mod media;
pub mod source;
pub mod state;
