use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use screen_capture_core::storage::metadata::read_metadata;
use screen_capture_core::{
    CaptureError, DrawingSurface, DrawingSurfaceConfig, Point, RecorderConfiguration, RecorderControls,
    RecordingController, RecordingState, SharedSurface, SourceKind,
};
use screen_capture_headless::{
    pump_events, run_until_idle, unpack_frames, DisplayPolicy, FramePackEncoder, ScriptedDisplay, FRAMEPACK_MAGIC,
};

const SETTLE: Duration = Duration::from_secs(5);

fn small_surface() -> SharedSurface {
    SharedSurface::new(
        DrawingSurface::new(DrawingSurfaceConfig {
            width: 32,
            height: 24,
            ..Default::default()
        })
        .unwrap(),
    )
}

fn recorder(frames_per_chunk: usize) -> RecordingController<FramePackEncoder> {
    let config = RecorderConfiguration {
        surface_frame_rate: 60,
        ..Default::default()
    };
    RecordingController::new(config, FramePackEncoder::new(frames_per_chunk)).unwrap()
}

fn wait_for(controller: &mut RecordingController<FramePackEncoder>, state: RecordingState) {
    for _ in 0..1000 {
        controller.process_events();
        if controller.state() == state {
            return;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    panic!("never reached {:?}, stuck in {:?}", state, controller.state());
}

#[test]
fn records_drawing_surface_into_framepack() {
    let surface = small_surface();
    let mut controller = recorder(2);
    controller.attach_surface(surface.clone());

    controller.start(SourceKind::Surface).unwrap();
    wait_for(&mut controller, RecordingState::Active);

    surface.write().pointer_down(Point::new(2.0, 2.0));
    surface.write().pointer_move(Point::new(28.0, 2.0));
    surface.write().pointer_up();
    pump_events(&mut controller, Duration::from_millis(150));

    controller.stop().unwrap();
    assert!(run_until_idle(&mut controller, SETTLE));
    assert!(controller.last_error().is_none());

    let artifact = controller.artifact().unwrap().clone();
    // webm was requested; the encoder only speaks framepack
    assert_eq!(artifact.media_type, "video/x-framepack");
    assert_eq!(artifact.extension, "framepack");
    assert_eq!(artifact.origin.unwrap().source, SourceKind::Surface);

    let bytes = controller.resolve_artifact().unwrap();
    assert_eq!(&bytes[..4], FRAMEPACK_MAGIC);
    assert_eq!(bytes.len() as u64, artifact.size_bytes);

    let frames = unpack_frames(&bytes).unwrap();
    assert!(!frames.is_empty());
    assert!(frames.iter().all(|f| (f.width, f.height) == (32, 24)));
    // pixel (2, 2) lies on the stroke
    let last = frames.last().unwrap();
    let at = (2 * 32 + 2) * 4;
    assert_eq!(&last.data[at..at + 4], &[0, 0, 0, 255]);
}

#[test]
fn deferred_display_ended_by_host() {
    let display = Arc::new(ScriptedDisplay::new(16, 16, 60).with_policy(DisplayPolicy::Defer));
    let mut controller = recorder(3);
    controller.set_display_provider(display.clone());

    controller.start(SourceKind::Display).unwrap();
    pump_events(&mut controller, Duration::from_millis(20));
    assert_eq!(controller.state(), RecordingState::Acquiring { kind: SourceKind::Display });
    assert!(display.has_pending());

    let stream = display.approve_pending().unwrap();
    wait_for(&mut controller, RecordingState::Active);
    pump_events(&mut controller, Duration::from_millis(120));

    assert!(display.end_sharing());
    assert!(!stream.is_live());
    assert!(run_until_idle(&mut controller, SETTLE));

    let artifact = controller.artifact().unwrap();
    assert_eq!(artifact.origin.unwrap().source, SourceKind::Display);
    let frames = unpack_frames(&controller.resolve_artifact().unwrap()).unwrap();
    assert!(frames.iter().all(|f| f.data.len() == 16 * 16 * 4));
}

#[test]
fn refused_prompt_then_retry() {
    let display = Arc::new(ScriptedDisplay::new(8, 8, 30).with_policy(DisplayPolicy::Decline));
    let mut controller = recorder(1);
    controller.set_display_provider(display.clone());

    controller.start(SourceKind::Display).unwrap();
    assert!(run_until_idle(&mut controller, SETTLE));
    assert!(matches!(controller.last_error(), Some(CaptureError::SourceUnavailable(_))));

    display.set_policy(DisplayPolicy::Defer);
    controller.start(SourceKind::Display).unwrap();
    assert!(display.cancel_pending());
    assert!(run_until_idle(&mut controller, SETTLE));
    assert!(matches!(controller.last_error(), Some(CaptureError::SourceUnavailable(_))));

    display.set_policy(DisplayPolicy::Grant);
    controller.start(SourceKind::Display).unwrap();
    wait_for(&mut controller, RecordingState::Active);
    assert!(controller.last_error().is_none());
}

#[test]
fn paused_session_emits_nothing() {
    let mut controller = recorder(1);
    controller.attach_surface(small_surface());
    controller.start(SourceKind::Surface).unwrap();
    wait_for(&mut controller, RecordingState::Active);
    pump_events(&mut controller, Duration::from_millis(50));

    controller.pause().unwrap();
    pump_events(&mut controller, Duration::from_millis(30));
    let paused_at = controller.chunk_count();
    pump_events(&mut controller, Duration::from_millis(100));
    assert_eq!(controller.chunk_count(), paused_at);

    controller.resume().unwrap();
    controller.stop().unwrap();
    assert!(run_until_idle(&mut controller, SETTLE));
    assert!(controller.artifact().is_some());
}

#[test]
fn unavailable_display_is_reported() {
    let mut controller = recorder(1);
    controller.set_display_provider(Arc::new(ScriptedDisplay::unavailable()));
    controller.start(SourceKind::Display).unwrap();
    assert!(run_until_idle(&mut controller, SETTLE));
    assert!(matches!(controller.last_error(), Some(CaptureError::SourceUnavailable(_))));
    assert!(controller.artifact().is_none());
}

#[test]
fn export_writes_artifact_and_sidecar() {
    let dir = std::env::temp_dir().join(format!("screen_capture_e2e_{}", std::process::id()));
    let mut controller = recorder(1);
    controller.attach_surface(small_surface());
    controller.start(SourceKind::Surface).unwrap();
    wait_for(&mut controller, RecordingState::Active);
    pump_events(&mut controller, Duration::from_millis(60));
    controller.stop().unwrap();
    assert!(run_until_idle(&mut controller, SETTLE));

    let exported = controller.export_artifact_to(&dir).unwrap();
    assert_eq!(exported.path.extension().unwrap(), "framepack");
    let written = std::fs::read(&exported.path).unwrap();
    assert_eq!(&written[..], &controller.resolve_artifact().unwrap()[..]);

    let metadata = read_metadata(&exported.path).unwrap();
    assert_eq!(metadata.file_name, exported.metadata.file_name);
    assert_eq!(metadata.checksum, controller.artifact().unwrap().checksum);

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn pause_and_stop_while_ui_holds_the_surface() {
    let surface = small_surface();
    let mut controller = recorder(2);
    controller.attach_surface(surface.clone());
    controller.start(SourceKind::Surface).unwrap();
    wait_for(&mut controller, RecordingState::Active);

    let guard = surface.write();
    // let the worker block on its next frame read
    thread::sleep(Duration::from_millis(100));

    let (done_tx, done_rx) = mpsc::channel();
    let driver = thread::spawn(move || {
        controller.pause().unwrap();
        done_tx.send("pause").unwrap();
        controller.stop().unwrap();
        done_tx.send("stop").unwrap();
        controller
    });
    let pause = done_rx.recv_timeout(Duration::from_secs(2));
    let stop = done_rx.recv_timeout(Duration::from_secs(2));
    drop(guard);
    assert_eq!(pause, Ok("pause"));
    assert_eq!(stop, Ok("stop"));

    let mut controller = driver.join().unwrap();
    assert_eq!(controller.state(), RecordingState::Stopping);
    assert!(run_until_idle(&mut controller, SETTLE));
    assert!(controller.artifact().is_some());
}

#[test]
fn stop_does_not_wait_for_a_frame_interval() {
    let display = Arc::new(ScriptedDisplay::new(8, 8, 1));
    let mut controller = recorder(10);
    controller.set_display_provider(display);
    controller.start(SourceKind::Display).unwrap();
    wait_for(&mut controller, RecordingState::Active);
    // the worker is now parked until its next one-second sample
    thread::sleep(Duration::from_millis(50));

    let started = Instant::now();
    controller.stop().unwrap();
    assert!(started.elapsed() < Duration::from_millis(250));
    assert_eq!(controller.state(), RecordingState::Stopping);

    // stopped arrives through the queue once the worker wakes
    assert!(run_until_idle(&mut controller, Duration::from_millis(500)));
    let frames = unpack_frames(&controller.resolve_artifact().unwrap()).unwrap();
    assert_eq!(frames.len(), 1);
}
