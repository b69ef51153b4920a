//! Pure calculation functions for pixel rectangles.
//!
//! All functions here are pure and testable without any I/O or images.

use crate::geometry::{CropArea, ImageDimensions};

/// Floating-point slack allowed when checking a crop window against the
/// image bounds before rounding it to whole pixels.
pub const BOUNDS_EPSILON: f64 = 1e-6;

/// A square region of whole source pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub side: u32,
}

/// Round a crop window to the whole-pixel square it covers.
///
/// Returns `None` when the window is not a valid crop for `dims`. The result
/// is always at least one pixel and never extends past the image, even when
/// rounding the origin and side independently would overshoot by one.
///
/// # Examples
/// ```
/// # use avatar_crop::geometry::{CropArea, ImageDimensions};
/// # use avatar_crop::imaging::calculations::{pixel_rect, PixelRect};
/// let dims = ImageDimensions::new(101, 100).unwrap();
/// let area = CropArea { x: 0.5, y: 0.0, width: 100.0, height: 100.0 };
/// // origin rounds up to 1, side stays 100 and still fits
/// assert_eq!(pixel_rect(&area, dims), Some(PixelRect { x: 1, y: 0, side: 100 }));
/// ```
pub fn pixel_rect(area: &CropArea, dims: ImageDimensions) -> Option<PixelRect> {
    if !area.fits(dims, BOUNDS_EPSILON) {
        return None;
    }

    let (w, h) = (dims.width(), dims.height());
    let x = (area.x.round().max(0.0) as u32).min(w - 1);
    let y = (area.y.round().max(0.0) as u32).min(h - 1);
    let side = (area.width.round() as u32).max(1).min(w - x).min(h - y);

    Some(PixelRect { x, y, side })
}
