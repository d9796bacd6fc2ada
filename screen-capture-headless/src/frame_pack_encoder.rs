//! Frame-packing encoder service.
//!
//! Samples a live stream on a dedicated worker thread and packs raw RGBA
//! frames into `video/x-framepack` chunks:
//!
//! ```text
//! "FPK1"                                  (first chunk only)
//! u32 width | u32 height | u64 timestamp_ms | u32 len | len bytes   (per frame, LE)
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use screen_capture_core::capture::live_stream::StreamHandle;
use screen_capture_core::models::error::CaptureError;
use screen_capture_core::models::media::MediaFormat;
use screen_capture_core::models::source::Frame;
use screen_capture_core::session::events::EncoderEvents;
use screen_capture_core::traits::encoder::{EncoderHandle, EncoderService};

pub const FRAMEPACK_MIME: &str = "video/x-framepack";
pub const FRAMEPACK_MAGIC: &[u8; 4] = b"FPK1";

const FRAME_HEADER_LEN: usize = 4 + 4 + 8 + 4;

/// Encoder producing frame-pack chunks. Supports a single format, so any
/// other preferred format falls back to it.
#[derive(Debug, Clone)]
pub struct FramePackEncoder {
    frames_per_chunk: usize,
}

impl FramePackEncoder {
    pub fn new(frames_per_chunk: usize) -> Self {
        Self { frames_per_chunk }
    }

    pub fn frames_per_chunk(&self) -> usize {
        self.frames_per_chunk
    }
}

impl Default for FramePackEncoder {
    fn default() -> Self {
        Self::new(10)
    }
}

impl EncoderService for FramePackEncoder {
    fn is_format_supported(&self, format: &MediaFormat) -> bool {
        format.container() == FRAMEPACK_MIME
    }

    fn default_format(&self) -> MediaFormat {
        MediaFormat::new(FRAMEPACK_MIME)
    }

    fn start(
        &mut self,
        stream: StreamHandle,
        format: &MediaFormat,
        events: EncoderEvents,
    ) -> Result<Box<dyn EncoderHandle>, CaptureError> {
        if !self.is_format_supported(format) {
            return Err(CaptureError::EncoderUnsupported(format.to_string()));
        }
        if self.frames_per_chunk == 0 {
            return Err(CaptureError::ConfigurationFailed(
                "frames_per_chunk must be at least 1".into(),
            ));
        }

        let control = Arc::new(WorkerControl::default());
        let worker_control = Arc::clone(&control);
        let frames_per_chunk = self.frames_per_chunk;

        let worker = thread::Builder::new()
            .name("framepack-encoder".into())
            .spawn(move || encode_loop(stream, worker_control, events, frames_per_chunk))
            .map_err(|e| CaptureError::EncodingFailed(format!("failed to spawn encoder thread: {}", e)))?;

        Ok(Box::new(FramePackHandle {
            control,
            worker: Some(worker),
        }))
    }
}

#[derive(Default)]
struct WorkerControl {
    /// Set by `stop`; the worker flushes and reports `stopped`.
    stopping: AtomicBool,
    /// Set on teardown; the worker exits without emitting anything.
    cancelled: AtomicBool,
    paused: AtomicBool,
}

impl WorkerControl {
    fn should_run(&self) -> bool {
        !self.stopping.load(Ordering::SeqCst) && !self.cancelled.load(Ordering::SeqCst)
    }
}

/// Control handle for one worker. Never waits on the worker: `stop` only
/// signals, and the outcome arrives through the session's event queue.
struct FramePackHandle {
    control: Arc<WorkerControl>,
    worker: Option<thread::JoinHandle<()>>,
}

impl FramePackHandle {
    fn wake(&self) {
        if let Some(worker) = &self.worker {
            worker.thread().unpark();
        }
    }
}

impl EncoderHandle for FramePackHandle {
    fn pause(&mut self) {
        self.control.paused.store(true, Ordering::SeqCst);
    }

    fn resume(&mut self) {
        self.control.paused.store(false, Ordering::SeqCst);
    }

    fn stop(&mut self) {
        self.control.stopping.store(true, Ordering::SeqCst);
        self.wake();
    }
}

impl Drop for FramePackHandle {
    fn drop(&mut self) {
        self.control.cancelled.store(true, Ordering::SeqCst);
        self.wake();
        let Some(worker) = self.worker.take() else {
            return;
        };
        // a worker blocked inside a frame read exits on its own once the
        // read returns
        if !worker.is_finished() {
            log::debug!("Detaching frame-pack encoder thread");
            return;
        }
        if worker.join().is_err() {
            log::error!("Frame-pack encoder thread panicked");
        }
    }
}

/// Worker loop: sample at the stream's frame rate, emit a chunk every
/// `frames_per_chunk` frames, flush and report `stopped` on stop.
fn encode_loop(
    stream: StreamHandle,
    control: Arc<WorkerControl>,
    events: EncoderEvents,
    frames_per_chunk: usize,
) {
    let interval = Duration::from_secs_f64(1.0 / f64::from(stream.frame_rate().max(1)));
    let mut packer = FramePacker::default();
    log::debug!("Encoder started on stream {} every {:?}", stream.id(), interval);

    while control.should_run() {
        let next_sample = Instant::now() + interval;
        if !control.paused.load(Ordering::SeqCst) {
            if let Some(frame) = stream.read_frame() {
                if let Err(e) = packer.push(&frame) {
                    log::error!("Frame-pack encoder error: {}", e);
                    events.failed(e.to_string());
                    return;
                }
                if packer.frames() >= frames_per_chunk {
                    events.chunk(packer.take());
                }
            }
        }
        // parked until the next sample; `stop` and teardown unpark early
        while control.should_run() {
            let now = Instant::now();
            if now >= next_sample {
                break;
            }
            thread::park_timeout(next_sample - now);
        }
    }

    if control.cancelled.load(Ordering::SeqCst) {
        log::debug!("Encoder on stream {} torn down", stream.id());
        return;
    }
    let tail = packer.take();
    if !tail.is_empty() {
        events.chunk(tail);
    }
    events.stopped();
    log::debug!("Encoder on stream {} stopped", stream.id());
}

/// Accumulates frame records for the next chunk.
#[derive(Debug, Default)]
struct FramePacker {
    buffer: Vec<u8>,
    frames: usize,
    wrote_magic: bool,
}

impl FramePacker {
    fn push(&mut self, frame: &Frame) -> Result<(), CaptureError> {
        let len = u32::try_from(frame.data.len())
            .map_err(|_| CaptureError::EncodingFailed("frame too large to pack".into()))?;
        if !self.wrote_magic {
            self.buffer.extend_from_slice(FRAMEPACK_MAGIC);
            self.wrote_magic = true;
        }
        self.buffer.reserve(FRAME_HEADER_LEN + frame.data.len());
        self.buffer.extend_from_slice(&frame.width.to_le_bytes());
        self.buffer.extend_from_slice(&frame.height.to_le_bytes());
        self.buffer.extend_from_slice(&frame.timestamp_ms.to_le_bytes());
        self.buffer.extend_from_slice(&len.to_le_bytes());
        self.buffer.extend_from_slice(&frame.data);
        self.frames += 1;
        Ok(())
    }

    fn frames(&self) -> usize {
        self.frames
    }

    fn take(&mut self) -> Vec<u8> {
        self.frames = 0;
        std::mem::take(&mut self.buffer)
    }
}

/// Decode a complete frame-pack artifact back into frames.
pub fn unpack_frames(bytes: &[u8]) -> Result<Vec<Frame>, CaptureError> {
    let body = bytes
        .strip_prefix(FRAMEPACK_MAGIC.as_slice())
        .ok_or_else(|| CaptureError::EncodingFailed("missing frame-pack magic".into()))?;

    let mut frames = Vec::new();
    let mut rest = body;
    while !rest.is_empty() {
        if rest.len() < FRAME_HEADER_LEN {
            return Err(CaptureError::EncodingFailed("truncated frame header".into()));
        }
        let (header, tail) = rest.split_at(FRAME_HEADER_LEN);
        let width = u32::from_le_bytes([header[0], header[1], header[2], header[3]]);
        let height = u32::from_le_bytes([header[4], header[5], header[6], header[7]]);
        let mut ts = [0u8; 8];
        ts.copy_from_slice(&header[8..16]);
        let len = u32::from_le_bytes([header[16], header[17], header[18], header[19]]) as usize;
        if tail.len() < len {
            return Err(CaptureError::EncodingFailed("truncated frame data".into()));
        }
        let (data, next) = tail.split_at(len);
        frames.push(Frame {
            width,
            height,
            data: data.to_vec(),
            timestamp_ms: u64::from_le_bytes(ts),
        });
        rest = next;
    }
    Ok(frames)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(ts: u64) -> Frame {
        Frame {
            width: 2,
            height: 1,
            data: vec![1, 2, 3, 4, 5, 6, 7, 8],
            timestamp_ms: ts,
        }
    }

    #[test]
    fn only_framepack_is_supported() {
        let encoder = FramePackEncoder::default();
        assert!(encoder.is_format_supported(&MediaFormat::new(FRAMEPACK_MIME)));
        assert!(!encoder.is_format_supported(&MediaFormat::webm_vp9()));
        assert_eq!(encoder.default_format().extension(), "framepack");
    }

    #[test]
    fn magic_only_on_first_chunk() {
        let mut packer = FramePacker::default();
        packer.push(&frame(1)).unwrap();
        let first = packer.take();
        packer.push(&frame(2)).unwrap();
        let second = packer.take();

        assert_eq!(&first[..4], FRAMEPACK_MAGIC);
        assert_eq!(first.len(), 4 + FRAME_HEADER_LEN + 8);
        assert_eq!(second.len(), FRAME_HEADER_LEN + 8);
        assert_eq!(&second[..4], &2u32.to_le_bytes());
        assert_eq!(packer.frames(), 0);
    }

    #[test]
    fn concatenated_chunks_unpack() {
        let mut packer = FramePacker::default();
        let mut artifact = Vec::new();
        for ts in 0..3 {
            packer.push(&frame(ts)).unwrap();
            artifact.extend(packer.take());
        }
        let frames = unpack_frames(&artifact).unwrap();
        assert_eq!(frames.len(), 3);
        assert_eq!(frames[2], frame(2));
    }

    #[test]
    fn rejects_malformed_packs() {
        assert!(unpack_frames(b"nope").is_err());
        let mut packer = FramePacker::default();
        packer.push(&frame(0)).unwrap();
        let bytes = packer.take();
        assert!(unpack_frames(&bytes[..bytes.len() - 1]).is_err());
        assert_eq!(unpack_frames(FRAMEPACK_MAGIC).unwrap(), Vec::new());
    }
}
