use std::sync::Arc;

use chrono::Utc;
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::input::{primary_touch, DisplayRect};
use super::raster::Raster;
use crate::models::config::{validate_stroke_width, DrawingSurfaceConfig};
use crate::models::error::CaptureError;
use crate::models::media::Color;
use crate::models::source::{Frame, Point};

/// Transient state of the stroke in progress.
#[derive(Debug, Clone, Copy, PartialEq)]
struct StrokeState {
    anchor: Point,
}

/// Freehand drawing surface rendering pointer/touch strokes onto a raster.
///
/// Input arrives in device coordinates through the `pointer_*` / `touch_*`
/// handlers and is normalized into logical raster coordinates; the
/// `*_stroke` operations take logical coordinates directly.
#[derive(Debug, Clone)]
pub struct DrawingSurface {
    raster: Raster,
    background: Color,
    stroke_color: Color,
    stroke_width: f32,
    display: DisplayRect,
    stroke: Option<StrokeState>,
}

impl DrawingSurface {
    pub fn new(config: DrawingSurfaceConfig) -> Result<Self, CaptureError> {
        config.validate().map_err(CaptureError::ConfigurationFailed)?;
        Ok(Self {
            raster: Raster::new(config.width, config.height, config.background),
            background: config.background,
            stroke_color: config.stroke_color,
            stroke_width: config.stroke_width,
            display: DisplayRect::unscaled(config.width, config.height),
            stroke: None,
        })
    }

    pub fn width(&self) -> u32 {
        self.raster.width()
    }

    pub fn height(&self) -> u32 {
        self.raster.height()
    }

    pub fn raster(&self) -> &Raster {
        &self.raster
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        self.raster.pixel(x, y)
    }

    pub fn background(&self) -> Color {
        self.background
    }

    pub fn stroke_color(&self) -> Color {
        self.stroke_color
    }

    pub fn stroke_width(&self) -> f32 {
        self.stroke_width
    }

    pub fn is_stroke_active(&self) -> bool {
        self.stroke.is_some()
    }

    /// Applies to segments drawn after the call.
    pub fn set_color(&mut self, color: Color) {
        self.stroke_color = color;
    }

    /// Applies to segments drawn after the call.
    pub fn set_width(&mut self, width: f32) -> Result<(), CaptureError> {
        validate_stroke_width(width).map_err(CaptureError::ConfigurationFailed)?;
        self.stroke_width = width;
        Ok(())
    }

    pub fn display_rect(&self) -> DisplayRect {
        self.display
    }

    pub fn set_display_rect(&mut self, rect: DisplayRect) {
        self.display = rect;
    }

    // --- Logical-coordinate stroke operations ---

    /// Record `point` as the stroke anchor. Draws nothing.
    pub fn begin_stroke(&mut self, point: Point) {
        self.stroke = Some(StrokeState { anchor: point });
    }

    /// Draw from the anchor to `point` and move the anchor there.
    /// No-op when no stroke is active.
    pub fn extend_stroke(&mut self, point: Point) {
        let Some(stroke) = self.stroke.as_mut() else {
            return;
        };
        self.raster
            .stroke_segment(stroke.anchor, point, self.stroke_width, self.stroke_color);
        stroke.anchor = point;
    }

    pub fn end_stroke(&mut self) {
        self.stroke = None;
    }

    /// Fill with the background color. A stroke in progress stays active.
    pub fn clear(&mut self) {
        self.raster.fill(self.background);
    }

    // --- Device-coordinate input handlers ---

    pub fn to_logical(&self, device: Point) -> Point {
        self.display
            .to_logical(device, self.raster.width(), self.raster.height())
    }

    pub fn pointer_down(&mut self, device: Point) {
        self.begin_stroke(self.to_logical(device));
    }

    pub fn pointer_move(&mut self, device: Point) {
        self.extend_stroke(self.to_logical(device));
    }

    pub fn pointer_up(&mut self) {
        self.end_stroke();
    }

    pub fn pointer_leave(&mut self) {
        self.end_stroke();
    }

    /// `touches` lists the active touch points; only the first is honored.
    pub fn touch_start(&mut self, touches: &[Point]) {
        if let Some(touch) = primary_touch(touches) {
            self.begin_stroke(self.to_logical(touch));
        }
    }

    pub fn touch_move(&mut self, touches: &[Point]) {
        if let Some(touch) = primary_touch(touches) {
            self.extend_stroke(self.to_logical(touch));
        }
    }

    pub fn touch_end(&mut self) {
        self.end_stroke();
    }

    /// Snapshot the current raster as a video frame.
    pub fn frame(&self) -> Frame {
        Frame {
            width: self.raster.width(),
            height: self.raster.height(),
            data: self.raster.as_bytes().to_vec(),
            timestamp_ms: Utc::now().timestamp_millis().max(0) as u64,
        }
    }
}

/// A drawing surface shared between the UI (drawing) and a surface capture
/// stream (reading frames).
#[derive(Debug, Clone)]
pub struct SharedSurface(Arc<RwLock<DrawingSurface>>);

impl SharedSurface {
    pub fn new(surface: DrawingSurface) -> Self {
        Self(Arc::new(RwLock::new(surface)))
    }

    pub fn read(&self) -> RwLockReadGuard<'_, DrawingSurface> {
        self.0.read()
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, DrawingSurface> {
        self.0.write()
    }

    pub fn frame(&self) -> Frame {
        self.0.read().frame()
    }
}
