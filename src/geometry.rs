//! Square crop geometry.
//!
//! The crop window is a pure value ([`CropArea`]) in image-space units, and
//! every transition is a pure function `(CropArea, ImageDimensions, …) -> CropArea`.
//! Nothing here allocates, performs I/O, or fails.
//!
//! ## Invariants
//!
//! For any area returned by this module and the dimensions it was computed
//! against:
//!
//! ```text
//! width == height
//! width > 0
//! 0 <= x,   x + width  <= image width
//! 0 <= y,   y + height <= image height
//! ```
//!
//! Inputs are never rejected. Pointer deltas, slider values and key repeats
//! are unbounded, so out-of-range values are clamped and non-finite values
//! are treated as "no change".
//!
//! ## Zoom
//!
//! The zoom factor is inversely proportional to the side length:
//! `side = min(width, height) / zoom`. Zoom 1.0 is the largest square that
//! fits; anything below 1.0 saturates at that size.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Smallest side length a crop window may shrink to, in image pixels.
pub const MIN_SIDE: f64 = 1.0;

/// Intrinsic pixel size of a decoded source image.
///
/// Both sides are guaranteed non-zero; construction of a zero-sized value
/// is refused so the geometry functions can stay total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageDimensions {
    width: u32,
    height: u32,
}

impl ImageDimensions {
    /// Returns `None` if either side is zero.
    pub fn new(width: u32, height: u32) -> Option<Self> {
        (width > 0 && height > 0).then_some(Self { width, height })
    }

    pub fn width(self) -> u32 {
        self.width
    }

    pub fn height(self) -> u32 {
        self.height
    }

    /// Length of the shorter edge, the side of the largest square that fits.
    pub fn short_side(self) -> f64 {
        self.width.min(self.height) as f64
    }

    pub fn is_square(self) -> bool {
        self.width == self.height
    }

    fn w(self) -> f64 {
        self.width as f64
    }

    fn h(self) -> f64 {
        self.height as f64
    }
}

impl fmt::Display for ImageDimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// A point in either image-space or canvas-space; the caller knows which.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// The square crop window, in image-space units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropArea {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl CropArea {
    pub fn side(&self) -> f64 {
        self.width
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Same side length, different origin. Not clamped.
    pub fn with_origin(&self, origin: Point) -> Self {
        Self {
            x: origin.x,
            y: origin.y,
            ..*self
        }
    }

    /// Whether every invariant holds against `dims`, allowing `epsilon` of
    /// floating-point slack on the bounds.
    pub fn fits(&self, dims: ImageDimensions, epsilon: f64) -> bool {
        self.width == self.height
            && self.width > 0.0
            && self.x >= -epsilon
            && self.y >= -epsilon
            && self.x + self.width <= dims.w() + epsilon
            && self.y + self.height <= dims.h() + epsilon
    }
}

impl fmt::Display for CropArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}x{} at ({}, {})",
            trim(self.width),
            trim(self.height),
            trim(self.x),
            trim(self.y)
        )
    }
}

/// Print whole numbers without a trailing `.0`, fractions with two decimals.
fn trim(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{v:.0}")
    } else {
        format!("{v:.2}")
    }
}

/// Allowed zoom factors, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomRange {
    pub min: f64,
    pub max: f64,
}

impl ZoomRange {
    /// Clamp a raw slider value. Non-finite values fall back to 1.0.
    pub fn clamp(&self, zoom: f64) -> f64 {
        let zoom = if zoom.is_finite() { zoom } else { 1.0 };
        zoom.max(self.min).min(self.max)
    }
}

impl Default for ZoomRange {
    fn default() -> Self {
        Self { min: 0.5, max: 3.0 }
    }
}

/// Snap positions for the crop window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Preset {
    Left,
    Right,
    Top,
    Bottom,
    /// Center on the horizontal axis only.
    CenterX,
    /// Center on the vertical axis only.
    CenterY,
    /// Center on both axes.
    Center,
}

impl Preset {
    pub const ALL: [Preset; 7] = [
        Preset::Left,
        Preset::Right,
        Preset::Top,
        Preset::Bottom,
        Preset::CenterX,
        Preset::CenterY,
        Preset::Center,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Preset::Left => "left",
            Preset::Right => "right",
            Preset::Top => "top",
            Preset::Bottom => "bottom",
            Preset::CenterX => "center-x",
            Preset::CenterY => "center-y",
            Preset::Center => "center",
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Preset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Preset::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                let names: Vec<&str> = Preset::ALL.iter().map(|p| p.name()).collect();
                format!("unknown preset '{s}', expected one of: {}", names.join(", "))
            })
    }
}

// =============================================================================
// Transitions
// =============================================================================

/// The largest centered square that fits the image.
///
/// ```
/// # use avatar_crop::geometry::{ImageDimensions, initialize};
/// let dims = ImageDimensions::new(1600, 900).unwrap();
/// let area = initialize(dims);
/// assert_eq!((area.x, area.y, area.width), (350.0, 0.0, 900.0));
/// ```
pub fn initialize(dims: ImageDimensions) -> CropArea {
    let side = dims.short_side();
    CropArea {
        x: (dims.w() - side) / 2.0,
        y: (dims.h() - side) / 2.0,
        width: side,
        height: side,
    }
}

/// Resize the window for a zoom factor, keeping its center where possible.
///
/// `side = clamp(min(w, h) / zoom, MIN_SIDE, min(w, h))`. The window is
/// re-centered on the previous center and then pushed back inside the image.
/// A zoom that yields the current side leaves the area untouched, so applying
/// the same zoom twice is a no-op.
pub fn set_zoom(area: CropArea, dims: ImageDimensions, zoom: f64) -> CropArea {
    let side = side_for_zoom(dims, zoom);
    let area = clamp_area(area, dims);
    if side == area.width {
        return area;
    }

    let center = area.center();
    let resized = CropArea {
        x: center.x - side / 2.0,
        y: center.y - side / 2.0,
        width: side,
        height: side,
    };
    clamp_origin(resized, dims)
}

/// Side length that corresponds to `zoom` on an image of `dims`.
pub fn side_for_zoom(dims: ImageDimensions, zoom: f64) -> f64 {
    let short = dims.short_side();
    if !zoom.is_finite() || zoom <= 0.0 {
        return short;
    }
    (short / zoom).clamp(MIN_SIDE.min(short), short)
}

/// Move the window by `(dx, dy)`, clamping each axis independently.
///
/// A delta that would push the window past an edge stops it at that edge;
/// the other axis still moves freely.
pub fn translate(area: CropArea, dims: ImageDimensions, dx: f64, dy: f64) -> CropArea {
    let area = clamp_area(area, dims);
    let dx = if dx.is_finite() { dx } else { 0.0 };
    let dy = if dy.is_finite() { dy } else { 0.0 };
    clamp_origin(
        CropArea {
            x: area.x + dx,
            y: area.y + dy,
            ..area
        },
        dims,
    )
}

/// Snap the window to an edge or to the center.
pub fn apply_preset(area: CropArea, dims: ImageDimensions, preset: Preset) -> CropArea {
    let area = clamp_area(area, dims);
    let max_x = dims.w() - area.width;
    let max_y = dims.h() - area.height;

    let (x, y) = match preset {
        Preset::Left => (0.0, area.y),
        Preset::Right => (max_x, area.y),
        Preset::Top => (area.x, 0.0),
        Preset::Bottom => (area.x, max_y),
        Preset::CenterX => (max_x / 2.0, area.y),
        Preset::CenterY => (area.x, max_y / 2.0),
        Preset::Center => (max_x / 2.0, max_y / 2.0),
    };
    CropArea { x, y, ..area }
}

/// Force an arbitrary rectangle into a valid crop window for `dims`.
///
/// The side becomes the smaller of width and height, limited to
/// `[MIN_SIDE, min(w, h)]`; the origin is then clamped into bounds. Valid
/// areas pass through unchanged.
pub fn clamp_area(area: CropArea, dims: ImageDimensions) -> CropArea {
    let short = dims.short_side();
    let side = area.width.min(area.height);
    let side = if side.is_finite() {
        side.clamp(MIN_SIDE.min(short), short)
    } else {
        short
    };
    clamp_origin(
        CropArea {
            width: side,
            height: side,
            ..area
        },
        dims,
    )
}

fn clamp_origin(area: CropArea, dims: ImageDimensions) -> CropArea {
    CropArea {
        x: clamp_axis(area.x, dims.w() - area.width),
        y: clamp_axis(area.y, dims.h() - area.height),
        ..area
    }
}

fn clamp_axis(value: f64, max: f64) -> f64 {
    let max = max.max(0.0);
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, max)
}
