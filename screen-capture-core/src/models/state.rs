use super::source::SourceKind;

/// Recording session state machine.
///
/// State transitions:
/// ```text
/// idle → acquiring → active ↔ paused
///   ↑        │         ↓        ↓
///   └────────┴────── stopping ←─┘
/// ```
///
/// A completed session ends in `Idle` with an artifact available on the
/// controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordingState {
    Idle,
    Acquiring { kind: SourceKind },
    Active,
    Paused,
    Stopping,
}

impl Default for RecordingState {
    fn default() -> Self {
        Self::Idle
    }
}

impl RecordingState {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_acquiring(&self) -> bool {
        matches!(self, Self::Acquiring { .. })
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }

    pub fn is_paused(&self) -> bool {
        matches!(self, Self::Paused)
    }

    /// Whether the encoder is running (active, paused, or draining).
    pub fn is_encoding(&self) -> bool {
        matches!(self, Self::Active | Self::Paused | Self::Stopping)
    }

    /// Whether a capture is in progress from the UI's point of view.
    pub fn is_recording(&self) -> bool {
        matches!(self, Self::Active | Self::Paused)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Acquiring { .. } => "acquiring",
            Self::Active => "active",
            Self::Paused => "paused",
            Self::Stopping => "stopping",
        }
    }
}
