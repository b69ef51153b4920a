//! Frame planning: what to draw, in canvas-space, for one preview frame.
//!
//! [`plan_frame`] is a pure function of the image size, the crop window and
//! the overlay style. It returns an ordered display list that the
//! [`raster`](super::raster) painter executes against the source bitmap.

use crate::config::OverlayConfig;
use crate::display::{DisplayMapper, Rect};
use crate::geometry::{CropArea, ImageDimensions, Point};

/// Colors and sizes of the spotlight overlay.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayStyle {
    pub shade: [u8; 4],
    pub border: [u8; 4],
    pub border_width: f64,
    pub handle_size: f64,
    pub hint: String,
    /// Hint text size, in canvas pixels.
    pub hint_px: f32,
    pub hint_color: [u8; 4],
    pub hint_plate: [u8; 4],
}

impl OverlayStyle {
    pub fn from_config(config: &OverlayConfig) -> Self {
        Self {
            shade: config.shade,
            border: config.border,
            border_width: config.border_width as f64,
            handle_size: config.handle_size as f64,
            hint: config.hint.clone(),
            ..Self::default()
        }
    }
}

impl Default for OverlayStyle {
    fn default() -> Self {
        let config = OverlayConfig::default();
        Self {
            shade: config.shade,
            border: config.border,
            border_width: config.border_width as f64,
            handle_size: config.handle_size as f64,
            hint: config.hint,
            hint_px: 14.0,
            hint_color: [255, 255, 255, 255],
            hint_plate: [0, 0, 0, 160],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    /// The whole source, scaled to `dest`.
    Image { dest: Rect },
    /// Blend `color` over everything in `rect`.
    Shade { rect: Rect, color: [u8; 4] },
    /// The source sub-rectangle `source` (image-space), at full opacity, in `dest`.
    ImageRegion { source: CropArea, dest: Rect },
    /// Border drawn inside `rect`.
    Stroke { rect: Rect, color: [u8; 4], width: f64 },
    Fill { rect: Rect, color: [u8; 4] },
    /// Centered text on a translucent plate, clipped to `clip`.
    Label {
        text: String,
        center: Point,
        px: f32,
        color: [u8; 4],
        plate: [u8; 4],
        clip: Rect,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct FramePlan {
    pub canvas_size: u32,
    pub ops: Vec<DrawOp>,
}

/// Build the display list for one frame.
pub fn plan_frame(
    dims: ImageDimensions,
    area: &CropArea,
    canvas_size: u32,
    style: &OverlayStyle,
) -> FramePlan {
    let mapper = DisplayMapper::new(canvas_size, dims);
    let crop = mapper.area_to_canvas(area);

    let mut ops = vec![
        DrawOp::Image {
            dest: mapper.image_rect(),
        },
        DrawOp::Shade {
            rect: mapper.canvas_rect(),
            color: style.shade,
        },
        DrawOp::ImageRegion {
            source: *area,
            dest: crop,
        },
        DrawOp::Stroke {
            rect: crop,
            color: style.border,
            width: style.border_width,
        },
    ];

    ops.extend(crop.corners().into_iter().map(|corner| DrawOp::Fill {
        rect: Rect::centered_square(corner, style.handle_size),
        color: style.border,
    }));

    if !dims.is_square() && !style.hint.is_empty() {
        ops.push(DrawOp::Label {
            text: style.hint.clone(),
            center: crop.center(),
            px: style.hint_px,
            color: style.hint_color,
            plate: style.hint_plate,
            clip: crop,
        });
    }

    FramePlan { canvas_size, ops }
}
