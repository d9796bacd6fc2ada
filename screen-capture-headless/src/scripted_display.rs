//! Scripted display capture provider.
//!
//! Stands in for a host screen-sharing prompt. A `DisplayPolicy` decides how
//! each request is answered; deferred requests wait until the caller plays
//! the user's part with `approve_pending`, `deny_pending` or
//! `cancel_pending`.

use std::time::Instant;

use parking_lot::Mutex;

use screen_capture_core::capture::acquisition::AcquisitionResponder;
use screen_capture_core::capture::live_stream::StreamHandle;
use screen_capture_core::models::source::Frame;
use screen_capture_core::traits::capture_provider::{DisplayCaptureProvider, FrameProducer};

/// How `ScriptedDisplay` answers a capture request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayPolicy {
    /// Grant immediately.
    #[default]
    Grant,
    /// Decline immediately, as if the user refused the prompt.
    Decline,
    /// Hold the request until it is resolved explicitly.
    Defer,
}

/// In-process display source producing a moving test pattern.
pub struct ScriptedDisplay {
    width: u32,
    height: u32,
    frame_rate: u32,
    available: bool,
    policy: Mutex<DisplayPolicy>,
    pending: Mutex<Option<AcquisitionResponder>>,
    active: Mutex<Option<StreamHandle>>,
}

impl ScriptedDisplay {
    pub fn new(width: u32, height: u32, frame_rate: u32) -> Self {
        Self {
            width,
            height,
            frame_rate,
            available: true,
            policy: Mutex::new(DisplayPolicy::Grant),
            pending: Mutex::new(None),
            active: Mutex::new(None),
        }
    }

    pub fn with_policy(self, policy: DisplayPolicy) -> Self {
        *self.policy.lock() = policy;
        self
    }

    /// A display that reports itself unavailable (no screen capture support).
    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::new(0, 0, 1)
        }
    }

    pub fn policy(&self) -> DisplayPolicy {
        *self.policy.lock()
    }

    pub fn set_policy(&self, policy: DisplayPolicy) {
        *self.policy.lock() = policy;
    }

    pub fn has_pending(&self) -> bool {
        self.pending.lock().is_some()
    }

    /// The most recently granted stream, if still held.
    pub fn active_stream(&self) -> Option<StreamHandle> {
        self.active.lock().clone()
    }

    /// Grant the deferred request. Returns the new stream, or `None` if
    /// nothing was pending.
    pub fn approve_pending(&self) -> Option<StreamHandle> {
        let responder = self.pending.lock().take()?;
        Some(self.grant(responder))
    }

    /// Decline the deferred request. Returns whether one was pending.
    pub fn deny_pending(&self, reason: &str) -> bool {
        match self.pending.lock().take() {
            Some(responder) => {
                responder.decline(reason);
                true
            }
            None => false,
        }
    }

    /// Dismiss the deferred request without an answer.
    pub fn cancel_pending(&self) -> bool {
        // dropping the responder reports the cancellation
        self.pending.lock().take().is_some()
    }

    /// Simulate the host's "stop sharing" control on the active stream.
    pub fn end_sharing(&self) -> bool {
        match self.active.lock().take() {
            Some(stream) => {
                let was_live = stream.is_live();
                stream.end();
                was_live
            }
            None => false,
        }
    }

    fn grant(&self, responder: AcquisitionResponder) -> StreamHandle {
        let pattern = TestPattern::new(self.width, self.height);
        let stream = responder.grant(Box::new(pattern), self.frame_rate);
        log::debug!("Display stream {} granted ({}x{})", stream.id(), self.width, self.height);
        *self.active.lock() = Some(stream.clone());
        stream
    }
}

impl Default for ScriptedDisplay {
    fn default() -> Self {
        Self::new(320, 240, 15)
    }
}

impl DisplayCaptureProvider for ScriptedDisplay {
    fn is_available(&self) -> bool {
        self.available
    }

    fn request_display(&self, responder: AcquisitionResponder) {
        match self.policy() {
            DisplayPolicy::Grant => {
                self.grant(responder);
            }
            DisplayPolicy::Decline => responder.decline("display capture permission denied"),
            DisplayPolicy::Defer => {
                if self.pending.lock().replace(responder).is_some() {
                    log::debug!("Replaced an unanswered display request");
                }
            }
        }
    }
}

/// Vertical bar sweeping across a dark background, one column per frame.
struct TestPattern {
    width: u32,
    height: u32,
    index: u32,
    started: Instant,
}

impl TestPattern {
    fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            index: 0,
            started: Instant::now(),
        }
    }
}

impl FrameProducer for TestPattern {
    fn next_frame(&mut self) -> Option<Frame> {
        let bar = if self.width == 0 { 0 } else { self.index % self.width };
        let mut data = Vec::with_capacity(self.width as usize * self.height as usize * 4);
        for _y in 0..self.height {
            for x in 0..self.width {
                let px = if x == bar { [255, 255, 255, 255] } else { [16, 16, 32, 255] };
                data.extend_from_slice(&px);
            }
        }
        self.index = self.index.wrapping_add(1);
        Some(Frame {
            width: self.width,
            height: self.height,
            data,
            timestamp_ms: self.started.elapsed().as_millis() as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pattern_moves_one_column_per_frame() {
        let mut pattern = TestPattern::new(4, 2);
        let first = pattern.next_frame().unwrap();
        let second = pattern.next_frame().unwrap();
        assert_eq!(first.data.len(), 4 * 2 * 4);
        assert_eq!(&first.data[0..4], &[255, 255, 255, 255]);
        assert_eq!(&second.data[0..4], &[16, 16, 32, 255]);
        assert_eq!(&second.data[4..8], &[255, 255, 255, 255]);
    }

    #[test]
    fn defaults() {
        let display = ScriptedDisplay::default();
        assert!(display.is_available());
        assert_eq!(display.policy(), DisplayPolicy::Grant);
        assert!(!display.has_pending());
        assert!(!display.cancel_pending());
        assert!(!display.deny_pending("nope"));
        assert!(display.approve_pending().is_none());
        assert!(!display.end_sharing());
        assert!(!ScriptedDisplay::unavailable().is_available());
    }
}
