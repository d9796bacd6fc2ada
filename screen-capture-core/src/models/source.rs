use serde::{Deserialize, Serialize};

/// Which live visual source a session captures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// The entire display, via the host capture provider.
    Display,
    /// The locally rendered drawing surface.
    Surface,
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Display => f.write_str("display"),
            Self::Surface => f.write_str("surface"),
        }
    }
}

/// A point in a 2D coordinate space (device or logical, depending on use).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl From<(f32, f32)> for Point {
    fn from((x, y): (f32, f32)) -> Self {
        Self { x, y }
    }
}

/// One captured video frame: tightly packed RGBA, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
    /// Capture time in milliseconds since the Unix epoch.
    pub timestamp_ms: u64,
}

impl Frame {
    pub fn byte_len(&self) -> usize {
        self.data.len()
    }
}
