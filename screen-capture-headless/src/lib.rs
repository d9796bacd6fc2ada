//! # screen-capture-headless
//!
//! In-process backend for screen-capture-core, usable without a host
//! windowing system.
//!
//! Provides:
//! - `ScriptedDisplay` — display capture provider answering requests by policy
//! - `FramePackEncoder` — worker-thread encoder packing raw frames into chunks
//! - `run_until_idle` — drive a controller's event queue until the session settles
//!
//! ## Usage
//! ```ignore
//! use screen_capture_core::{RecorderConfiguration, RecorderControls, RecordingController, SourceKind};
//! use screen_capture_headless::{FramePackEncoder, ScriptedDisplay};
//!
//! let mut controller = RecordingController::new(RecorderConfiguration::default(), FramePackEncoder::default())?;
//! controller.set_display_provider(Arc::new(ScriptedDisplay::default()));
//! controller.start(SourceKind::Display)?;
//! ```

pub mod frame_pack_encoder;
pub mod scripted_display;

use std::thread;
use std::time::{Duration, Instant};

use screen_capture_core::traits::encoder::EncoderService;
use screen_capture_core::traits::recorder_controls::RecorderControls;
use screen_capture_core::RecordingController;

pub use frame_pack_encoder::{unpack_frames, FramePackEncoder, FRAMEPACK_MAGIC, FRAMEPACK_MIME};
pub use scripted_display::{DisplayPolicy, ScriptedDisplay};

const POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Apply queued events until the controller is back in `Idle` or `timeout`
/// elapses. Returns whether it reached `Idle`.
pub fn run_until_idle<E: EncoderService>(controller: &mut RecordingController<E>, timeout: Duration) -> bool {
    let deadline = Instant::now() + timeout;
    loop {
        controller.process_events();
        if controller.state().is_idle() {
            return true;
        }
        if Instant::now() >= deadline {
            log::warn!("Session still {} after {:?}", controller.state().name(), timeout);
            return false;
        }
        thread::sleep(POLL_INTERVAL);
    }
}

/// Apply queued events for `duration`, e.g. while a recording runs.
pub fn pump_events<E: EncoderService>(controller: &mut RecordingController<E>, duration: Duration) {
    let deadline = Instant::now() + duration;
    while Instant::now() < deadline {
        controller.process_events();
        thread::sleep(POLL_INTERVAL);
    }
    controller.process_events();
}
