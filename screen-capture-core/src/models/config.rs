use std::path::PathBuf;

use super::media::{Color, MediaFormat};

/// Largest accepted drawing surface edge, in logical pixels.
pub const MAX_SURFACE_DIMENSION: u32 = 8192;

/// Configuration for the recording controller.
#[derive(Debug, Clone)]
pub struct RecorderConfiguration {
    /// Frame rate requested from the drawing surface source (default: 30).
    pub surface_frame_rate: u32,

    /// Container/codec requested from the encoder. Falls back silently to
    /// the encoder's default when unsupported.
    pub preferred_format: MediaFormat,

    /// Directory where exported artifacts are written.
    pub output_directory: PathBuf,

    /// Prefix of the suggested artifact filename (default: `screen-recording`).
    pub file_prefix: String,
}

impl RecorderConfiguration {
    pub fn validate(&self) -> Result<(), String> {
        if self.surface_frame_rate == 0 || self.surface_frame_rate > 240 {
            return Err(format!("unsupported surface frame rate: {}", self.surface_frame_rate));
        }
        if !self.preferred_format.container().contains('/') {
            return Err(format!("invalid preferred format: {}", self.preferred_format));
        }
        if self.file_prefix.is_empty() || self.file_prefix.contains(['/', '\\']) {
            return Err(format!("invalid file prefix: {:?}", self.file_prefix));
        }
        Ok(())
    }
}

impl Default for RecorderConfiguration {
    fn default() -> Self {
        Self {
            surface_frame_rate: 30,
            preferred_format: MediaFormat::webm_vp9(),
            output_directory: PathBuf::from("."),
            file_prefix: "screen-recording".into(),
        }
    }
}

/// Configuration for a drawing surface.
///
/// `stroke_color` and `stroke_width` may also be changed on a live surface;
/// changes apply to subsequently drawn segments only.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawingSurfaceConfig {
    /// Logical raster width in pixels (default: 800).
    pub width: u32,

    /// Logical raster height in pixels (default: 600).
    pub height: u32,

    pub background: Color,

    pub stroke_color: Color,

    /// Stroke width in logical pixels (default: 3.0).
    pub stroke_width: f32,
}

impl DrawingSurfaceConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.width == 0 || self.height == 0 {
            return Err(format!("surface size must be non-zero: {}x{}", self.width, self.height));
        }
        if self.width > MAX_SURFACE_DIMENSION || self.height > MAX_SURFACE_DIMENSION {
            return Err(format!(
                "surface size {}x{} exceeds {} pixels per edge",
                self.width, self.height, MAX_SURFACE_DIMENSION
            ));
        }
        validate_stroke_width(self.stroke_width)
    }
}

impl Default for DrawingSurfaceConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            background: Color::WHITE,
            stroke_color: Color::BLACK,
            stroke_width: 3.0,
        }
    }
}

pub(crate) fn validate_stroke_width(width: f32) -> Result<(), String> {
    if !width.is_finite() || width <= 0.0 {
        return Err(format!("stroke width must be positive: {}", width));
    }
    Ok(())
}
