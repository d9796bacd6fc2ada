use crate::models::media::Color;
use crate::models::source::Point;

/// Fixed-size RGBA raster.
///
/// Pixel `(x, y)` covers the square `[x, x+1) × [y, y+1)`; shapes are
/// rasterized by testing pixel centers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Raster {
    pub fn new(width: u32, height: u32, fill: Color) -> Self {
        let mut raster = Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize * 4],
        };
        raster.fill(fill);
        raster
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA bytes, row-major.
    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    pub fn fill(&mut self, color: Color) {
        let rgba = color.to_rgba();
        for px in self.pixels.chunks_exact_mut(4) {
            px.copy_from_slice(&rgba);
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        let offset = self.offset(x, y)?;
        let mut rgba = [0u8; 4];
        rgba.copy_from_slice(&self.pixels[offset..offset + 4]);
        Some(Color::from_rgba(rgba))
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, color: Color) {
        if let Some(offset) = self.offset(x, y) {
            self.pixels[offset..offset + 4].copy_from_slice(&color.to_rgba());
        }
    }

    /// Whether every pixel equals `color`.
    pub fn is_uniform(&self, color: Color) -> bool {
        let rgba = color.to_rgba();
        self.pixels.chunks_exact(4).all(|px| px == rgba)
    }

    /// Number of pixels not equal to `color`.
    pub fn count_not(&self, color: Color) -> usize {
        let rgba = color.to_rgba();
        self.pixels.chunks_exact(4).filter(|px| *px != rgba).count()
    }

    /// Paint a line segment of the given width with round caps.
    ///
    /// A pixel is painted when its center lies within `width / 2` of the
    /// segment. A zero-length segment paints a dot.
    pub fn stroke_segment(&mut self, from: Point, to: Point, width: f32, color: Color) {
        if self.width == 0 || self.height == 0 {
            return;
        }
        let radius = width / 2.0;

        let min_x = (from.x.min(to.x) - radius).floor().max(0.0);
        let min_y = (from.y.min(to.y) - radius).floor().max(0.0);
        let max_x = (from.x.max(to.x) + radius).ceil().min(self.width as f32 - 1.0);
        let max_y = (from.y.max(to.y) + radius).ceil().min(self.height as f32 - 1.0);
        if max_x < min_x || max_y < min_y {
            return;
        }

        for y in min_y as u32..=max_y as u32 {
            for x in min_x as u32..=max_x as u32 {
                let center = Point::new(x as f32 + 0.5, y as f32 + 0.5);
                if distance_to_segment(center, from, to) <= radius {
                    self.set_pixel(x, y, color);
                }
            }
        }
    }

    fn offset(&self, x: u32, y: u32) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some((y as usize * self.width as usize + x as usize) * 4)
    }
}

fn distance_to_segment(p: Point, a: Point, b: Point) -> f32 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let len_sq = dx * dx + dy * dy;
    let t = if len_sq == 0.0 {
        0.0
    } else {
        (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0)
    };
    let (cx, cy) = (a.x + t * dx, a.y + t * dy);
    ((p.x - cx).powi(2) + (p.y - cy).powi(2)).sqrt()
}
