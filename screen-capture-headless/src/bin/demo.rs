//! Records a short scribble on a drawing surface and exports it.
//!
//! Usage: `screen-recorder-demo [OUTPUT_DIR]` (defaults to the current
//! directory). Set `RUST_LOG=debug` for state transitions.

use std::sync::Arc;
use std::time::Duration;

use screen_capture_core::{
    Artifact, CaptureError, Color, DrawingSurface, DrawingSurfaceConfig, Point, RecorderConfiguration,
    RecorderControls, RecorderDelegate, RecordingController, RecordingState, SharedSurface, SourceKind,
};
use screen_capture_headless::{pump_events, run_until_idle, FramePackEncoder, ScriptedDisplay};

const STROKE_STEPS: u32 = 40;
const STEP_INTERVAL: Duration = Duration::from_millis(25);
const STOP_TIMEOUT: Duration = Duration::from_secs(5);

/// Delegate that mirrors controller callbacks to the log.
struct LogDelegate;

impl RecorderDelegate for LogDelegate {
    fn on_state_changed(&self, state: &RecordingState) {
        log::info!("state: {}", state.name());
    }

    fn on_error(&self, error: &CaptureError) {
        log::error!("recording error: {}", error);
    }

    fn on_artifact_ready(&self, artifact: &Artifact) {
        log::info!(
            "artifact ready: {} bytes in {} chunks, sha256 {}",
            artifact.size_bytes,
            artifact.chunk_count,
            artifact.checksum
        );
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        log::error!("demo failed: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), CaptureError> {
    let mut config = RecorderConfiguration::default();
    if let Some(dir) = std::env::args_os().nth(1) {
        config.output_directory = dir.into();
    }

    let surface = SharedSurface::new(DrawingSurface::new(DrawingSurfaceConfig {
        width: 320,
        height: 240,
        ..Default::default()
    })?);

    let mut controller = RecordingController::new(config, FramePackEncoder::new(5))?;
    controller.set_delegate(Arc::new(LogDelegate));
    controller.set_display_provider(Arc::new(ScriptedDisplay::default()));
    controller.attach_surface(surface.clone());

    controller.start(SourceKind::Surface)?;
    pump_events(&mut controller, STEP_INTERVAL);
    if let Some(e) = controller.last_error() {
        return Err(e.clone());
    }

    surface.write().set_color(Color::rgb(200, 30, 30));
    surface.write().pointer_down(Point::new(20.0, 120.0));
    for step in 1..=STROKE_STEPS {
        let t = step as f32 / STROKE_STEPS as f32;
        let point = Point::new(20.0 + 280.0 * t, 120.0 + 80.0 * (t * std::f32::consts::TAU).sin());
        surface.write().pointer_move(point);
        pump_events(&mut controller, STEP_INTERVAL);
    }
    surface.write().pointer_up();

    controller.stop()?;
    if !run_until_idle(&mut controller, STOP_TIMEOUT) {
        return Err(CaptureError::EncodingFailed("encoder did not finish in time".into()));
    }
    if let Some(e) = controller.last_error() {
        return Err(e.clone());
    }

    let exported = controller.export_artifact()?;
    println!("{}", exported.path.display());
    controller.clear_artifact();
    Ok(())
}
