//! Image-space ↔ canvas-space mapping for the fixed-size preview.
//!
//! The image is scaled uniformly to fit a `C × C` canvas and centered on the
//! axis with slack:
//!
//! ```text
//! scale   = min(C / w, C / h)
//! offsetX = (C - w * scale) / 2
//! offsetY = (C - h * scale) / 2
//! ```
//!
//! The mapper depends only on the canvas size and the image dimensions, never
//! on the crop window, and is cheap enough to rebuild on every frame.

use crate::geometry::{CropArea, ImageDimensions, Point};

/// Axis-aligned rectangle in canvas-space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// Inclusive on all four edges so a press on the border still grabs.
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.x + self.width && p.y >= self.y && p.y <= self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Square of side `side` centered on `p`.
    pub fn centered_square(p: Point, side: f64) -> Self {
        Self {
            x: p.x - side / 2.0,
            y: p.y - side / 2.0,
            width: side,
            height: side,
        }
    }

    /// The four corners, clockwise from top-left.
    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.x, self.y),
            Point::new(self.x + self.width, self.y),
            Point::new(self.x + self.width, self.y + self.height),
            Point::new(self.x, self.y + self.height),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayMapper {
    canvas_size: f64,
    scale: f64,
    offset: Point,
    dims: ImageDimensions,
}

impl DisplayMapper {
    pub fn new(canvas_size: u32, dims: ImageDimensions) -> Self {
        let c = canvas_size as f64;
        let (w, h) = (dims.width() as f64, dims.height() as f64);
        let scale = (c / w).min(c / h);
        Self {
            canvas_size: c,
            scale,
            offset: Point::new((c - w * scale) / 2.0, (c - h * scale) / 2.0),
            dims,
        }
    }

    /// Canvas pixels per image pixel.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn offset(&self) -> Point {
        self.offset
    }

    pub fn canvas_size(&self) -> f64 {
        self.canvas_size
    }

    pub fn to_canvas(&self, p: Point) -> Point {
        Point::new(
            self.offset.x + p.x * self.scale,
            self.offset.y + p.y * self.scale,
        )
    }

    pub fn to_image(&self, p: Point) -> Point {
        Point::new(
            (p.x - self.offset.x) / self.scale,
            (p.y - self.offset.y) / self.scale,
        )
    }

    /// Convert a canvas-space movement into image-space units.
    pub fn delta_to_image(&self, dx: f64, dy: f64) -> (f64, f64) {
        (dx / self.scale, dy / self.scale)
    }

    /// Where the crop window sits on the canvas.
    pub fn area_to_canvas(&self, area: &CropArea) -> Rect {
        let origin = self.to_canvas(area.origin());
        Rect {
            x: origin.x,
            y: origin.y,
            width: area.width * self.scale,
            height: area.height * self.scale,
        }
    }

    /// Where the whole image sits on the canvas.
    pub fn image_rect(&self) -> Rect {
        Rect {
            x: self.offset.x,
            y: self.offset.y,
            width: self.dims.width() as f64 * self.scale,
            height: self.dims.height() as f64 * self.scale,
        }
    }

    pub fn canvas_rect(&self) -> Rect {
        Rect {
            x: 0.0,
            y: 0.0,
            width: self.canvas_size,
            height: self.canvas_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{initialize, set_zoom};
    use proptest::prelude::*;

    fn dims(w: u32, h: u32) -> ImageDimensions {
        ImageDimensions::new(w, h).unwrap()
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn landscape_fits_width_and_letterboxes_vertically() {
        let m = DisplayMapper::new(400, dims(1600, 900));
        assert_eq!(m.scale(), 0.25);
        assert_eq!(m.offset(), Point::new(0.0, 87.5));
    }

    #[test]
    fn portrait_fits_height_and_pillarboxes() {
        let m = DisplayMapper::new(400, dims(500, 1000));
        assert_eq!(m.scale(), 0.4);
        assert_eq!(m.offset(), Point::new(100.0, 0.0));
    }

    #[test]
    fn small_image_is_scaled_up() {
        let m = DisplayMapper::new(400, dims(100, 100));
        assert_eq!(m.scale(), 4.0);
        assert_eq!(m.image_rect(), m.canvas_rect());
    }

    #[test]
    fn forward_then_inverse_is_identity() {
        for (w, h) in [(1, 1), (1600, 900), (333, 2000), (4000, 3)] {
            let m = DisplayMapper::new(400, dims(w, h));
            for p in [
                Point::new(0.0, 0.0),
                Point::new(w as f64, h as f64),
                Point::new(w as f64 / 3.0, h as f64 * 0.77),
            ] {
                let back = m.to_image(m.to_canvas(p));
                assert!(close(back.x, p.x) && close(back.y, p.y), "{p:?} -> {back:?}");
            }
        }
    }

    #[test]
    fn area_maps_into_image_rect() {
        let d = dims(1000, 1000);
        let m = DisplayMapper::new(400, d);
        let rect = m.area_to_canvas(&set_zoom(initialize(d), d, 2.0));
        assert_eq!(
            rect,
            Rect {
                x: 100.0,
                y: 100.0,
                width: 200.0,
                height: 200.0
            }
        );
    }

    #[test]
    fn delta_scales_by_inverse_of_display_scale() {
        let m = DisplayMapper::new(400, dims(1600, 900));
        assert_eq!(m.delta_to_image(10.0, -4.0), (40.0, -16.0));
    }

    #[test]
    fn rect_contains_is_inclusive() {
        let r = Rect {
            x: 10.0,
            y: 10.0,
            width: 5.0,
            height: 5.0,
        };
        assert!(r.contains(Point::new(10.0, 15.0)));
        assert!(!r.contains(Point::new(9.99, 12.0)));
    }

    proptest! {
        #[test]
        fn canvas_roundtrip_returns_the_image_point(
            canvas in 16u32..2048,
            w in 1u32..5000,
            h in 1u32..5000,
            fx in 0.0..=1.0f64,
            fy in 0.0..=1.0f64,
        ) {
            let m = DisplayMapper::new(canvas, dims(w, h));
            let p = Point::new(fx * w as f64, fy * h as f64);
            let back = m.to_image(m.to_canvas(p));
            let tolerance = 1e-9 * w.max(h) as f64;
            prop_assert!((back.x - p.x).abs() <= tolerance, "{:?} -> {:?}", p, back);
            prop_assert!((back.y - p.y).abs() <= tolerance, "{:?} -> {:?}", p, back);
        }
    }
}
