use serde::{Deserialize, Serialize};

use crate::models::source::Point;

/// Where and how large the surface is shown on screen, in device
/// coordinates. The displayed size may differ from the logical raster size
/// when the surface is scaled for display.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplayRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl DisplayRect {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// A rect at the origin showing the surface at its logical size.
    pub fn unscaled(width: u32, height: u32) -> Self {
        Self::new(0.0, 0.0, width as f32, height as f32)
    }

    /// Map a device point into the surface's logical coordinate space:
    /// `logical = (device - origin) * (surface_size / displayed_size)`.
    ///
    /// A degenerate (zero or negative) displayed extent maps with scale 1.
    pub fn to_logical(&self, device: Point, surface_width: u32, surface_height: u32) -> Point {
        let scale = |logical: u32, displayed: f32| {
            if displayed > 0.0 && displayed.is_finite() {
                logical as f32 / displayed
            } else {
                1.0
            }
        };
        Point::new(
            (device.x - self.left) * scale(surface_width, self.width),
            (device.y - self.top) * scale(surface_height, self.height),
        )
    }
}

/// Pick the touch that drives the stroke: the first active one.
pub fn primary_touch(touches: &[Point]) -> Option<Point> {
    touches.first().copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn unscaled_maps_identity() {
        let rect = DisplayRect::unscaled(800, 600);
        let p = rect.to_logical(Point::new(10.0, 20.0), 800, 600);
        assert_relative_eq!(p.x, 10.0);
        assert_relative_eq!(p.y, 20.0);
    }

    #[test]
    fn half_size_display_doubles_travel() {
        let rect = DisplayRect::new(100.0, 50.0, 400.0, 300.0);
        let a = rect.to_logical(Point::new(105.0, 55.0), 800, 600);
        let b = rect.to_logical(Point::new(125.0, 55.0), 800, 600);
        assert_relative_eq!(a.x, 10.0);
        assert_relative_eq!(a.y, 10.0);
        assert_relative_eq!(b.x - a.x, 40.0);
    }

    #[test]
    fn anisotropic_scale() {
        let rect = DisplayRect::new(0.0, 0.0, 1600.0, 300.0);
        let p = rect.to_logical(Point::new(160.0, 30.0), 800, 600);
        assert_relative_eq!(p.x, 80.0);
        assert_relative_eq!(p.y, 60.0);
    }

    #[test]
    fn degenerate_rect_uses_unit_scale() {
        let rect = DisplayRect::new(10.0, 10.0, 0.0, 0.0);
        let p = rect.to_logical(Point::new(15.0, 12.0), 800, 600);
        assert_relative_eq!(p.x, 5.0);
        assert_relative_eq!(p.y, 2.0);
    }

    #[test]
    fn only_first_touch_is_used() {
        let touches = [Point::new(1.0, 1.0), Point::new(9.0, 9.0)];
        assert_eq!(primary_touch(&touches), Some(Point::new(1.0, 1.0)));
        assert_eq!(primary_touch(&[]), None);
    }
}
