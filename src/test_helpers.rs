//! Shared test utilities for the avatar-crop test suite.
//!
//! Synthetic source images and crop-window assertions.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = TempDir::new().unwrap();
//! let path = write_image(tmp.path(), "wide.png", 160, 90);
//!
//! let dims = ImageDimensions::new(160, 90).unwrap();
//! assert_valid_area(&initialize(dims), dims);
//! ```

use image::{Rgba, RgbaImage};
use std::path::{Path, PathBuf};

use crate::geometry::{CropArea, ImageDimensions};

// =========================================================================
// Synthetic images
// =========================================================================

/// An image whose pixels encode their own coordinates, so a crop can be
/// checked by sampling.
pub fn gradient(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        Rgba([
            (x * 255 / width.max(1)) as u8,
            (y * 255 / height.max(1)) as u8,
            ((x + y) % 256) as u8,
            255,
        ])
    })
}

/// Write a [`gradient`] to `dir/name`, encoded by the file extension.
pub fn write_image(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.join(name);
    let img = gradient(width, height);
    if name.ends_with(".jpg") || name.ends_with(".jpeg") {
        image::DynamicImage::ImageRgba8(img)
            .to_rgb8()
            .save(&path)
            .unwrap();
    } else {
        img.save(&path).unwrap();
    }
    path
}

// =========================================================================
// Crop-window assertions
// =========================================================================

/// Panics unless `area` is square, at least one pixel, and inside `dims`.
pub fn assert_valid_area(area: &CropArea, dims: ImageDimensions) {
    const EPS: f64 = 1e-9;
    assert!(
        (area.width - area.height).abs() < EPS,
        "not square: {area}"
    );
    assert!(area.width >= 1.0 - EPS, "below minimum side: {area}");
    assert!(
        area.width <= dims.short_side() + EPS,
        "larger than short side of {dims}: {area}"
    );
    assert!(
        area.x >= -EPS && area.y >= -EPS,
        "origin outside {dims}: {area}"
    );
    assert!(
        area.x + area.width <= dims.width() as f64 + EPS
            && area.y + area.height <= dims.height() as f64 + EPS,
        "extends past {dims}: {area}"
    );
}
