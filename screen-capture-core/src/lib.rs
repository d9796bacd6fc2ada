//! # screen-capture-core
//!
//! Platform-agnostic screen recording core library.
//!
//! Provides the recording session controller, chunk aggregation into
//! artifacts, a freehand drawing surface, and the capture source
//! abstraction. Platform backends implement `DisplayCaptureProvider` and
//! `EncoderService` and plug into the generic `RecordingController`.
//!
//! ## Architecture
//!
//! ```text
//! screen-capture-core (this crate)
//! ├── traits/       ← DisplayCaptureProvider, FrameProducer, EncoderService, RecorderDelegate, RecorderControls
//! ├── models/       ← CaptureError, RecordingState, RecorderConfiguration, MediaFormat, Artifact, etc.
//! ├── capture/      ← LiveStream, CaptureSources, AcquisitionResponder, surface frame producer
//! ├── surface/      ← DrawingSurface, Raster, pointer/touch coordinate mapping
//! ├── processing/   ← ChunkAggregator
//! ├── session/      ← RecordingController, transition function, event queue
//! └── storage/      ← ArtifactStore, export, metadata sidecar
//! ```

pub mod capture;
pub mod models;
pub mod processing;
pub mod session;
pub mod storage;
pub mod surface;
pub mod traits;

// Re-export key types at crate root for convenience.
pub use capture::acquisition::{AcquisitionResponder, CaptureSources};
pub use capture::live_stream::{CaptureSource, LiveStream, StreamHandle};
pub use capture::surface_source::SurfaceFrameProducer;
pub use models::artifact::{Artifact, ArtifactHandle, ArtifactMetadata, ArtifactOrigin};
pub use models::config::{DrawingSurfaceConfig, RecorderConfiguration};
pub use models::error::CaptureError;
pub use models::media::{Color, MediaFormat};
pub use models::source::{Frame, Point, SourceKind};
pub use models::state::RecordingState;
pub use processing::chunk_aggregator::{Chunk, ChunkAggregator};
pub use session::controller::{negotiate_format, RecordingController};
pub use session::events::{EncoderEvents, EventQueue, SessionEvent};
pub use session::recording::RecordingSession;
pub use session::transition::{transition, Effect, Transition};
pub use storage::artifact_store::ArtifactStore;
pub use storage::export::{export_artifact, ExportedArtifact};
pub use surface::drawing::{DrawingSurface, SharedSurface};
pub use surface::input::DisplayRect;
pub use surface::raster::Raster;
pub use traits::capture_delegate::RecorderDelegate;
pub use traits::capture_provider::{DisplayCaptureProvider, FrameProducer};
pub use traits::encoder::{EncoderHandle, EncoderService};
pub use traits::recorder_controls::RecorderControls;
