//! Preview rendering.
//!
//! A frame is drawn in two steps, mirroring the probe/crop split in
//! [`imaging`](crate::imaging):
//!
//! - **Plan** ([`plan_frame`]): pure canvas-space geometry, producing an
//!   ordered list of [`DrawOp`]s. Unit-testable without pixels.
//! - **Raster** ([`paint`]): executes the plan against the decoded source
//!   bitmap with `image` blending, plus `ab_glyph` for the hint text.
//!
//! Layer order, bottom to top:
//!
//! 1. whole image, scaled to fit and centered
//! 2. shade over the entire canvas
//! 3. the crop region of the image, re-drawn at full opacity
//! 4. crop border and four corner handles
//! 5. "drag to reposition" hint, only when the source is not square

pub mod label;
pub mod plan;
pub mod raster;

pub use label::{FontError, load_font};
pub use plan::{DrawOp, FramePlan, OverlayStyle, plan_frame};
pub use raster::{fit_backdrop, paint};

use crate::config::OverlayConfig;
use crate::geometry::{CropArea, ImageDimensions};
use ab_glyph::FontArc;
use image::RgbaImage;
use std::path::Path;

/// Overlay style plus the optional hint font, resolved once per session.
#[derive(Clone, Default)]
pub struct Renderer {
    pub style: OverlayStyle,
    pub font: Option<FontArc>,
}

impl Renderer {
    pub fn from_config(config: &OverlayConfig) -> Result<Self, FontError> {
        let font = if config.hint_font.is_empty() {
            None
        } else {
            Some(load_font(Path::new(&config.hint_font))?)
        };
        Ok(Self {
            style: OverlayStyle::from_config(config),
            font,
        })
    }

    /// Draw one preview frame of `bitmap` with `area` highlighted.
    pub fn render(
        &self,
        bitmap: &RgbaImage,
        dims: ImageDimensions,
        area: &CropArea,
        canvas_size: u32,
    ) -> RgbaImage {
        let plan = plan_frame(dims, area, canvas_size, &self.style);
        paint(&plan, bitmap, None, self.font.as_ref())
    }

    /// Same frame as [`render`](Self::render), with the whole-image layer
    /// taken from a precomputed [`fit_backdrop`].
    pub fn render_over(
        &self,
        bitmap: &RgbaImage,
        backdrop: &RgbaImage,
        dims: ImageDimensions,
        area: &CropArea,
        canvas_size: u32,
    ) -> RgbaImage {
        let plan = plan_frame(dims, area, canvas_size, &self.style);
        paint(&plan, bitmap, Some(backdrop), self.font.as_ref())
    }
}

impl std::fmt::Debug for Renderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Renderer")
            .field("style", &self.style)
            .field("font", &self.font.is_some())
            .finish()
    }
}
