//! Executes a [`FramePlan`] onto an RGBA canvas.

use ab_glyph::FontArc;
use image::imageops::{self, FilterType};
use image::{Pixel, Rgba, RgbaImage};
use log::warn;

use super::label;
use super::plan::{DrawOp, FramePlan};
use crate::display::{DisplayMapper, Rect};
use crate::geometry::{ImageDimensions, Point};
use crate::imaging::calculations::pixel_rect;

/// Horizontal padding around the hint text, in canvas pixels.
const PLATE_PADDING: f64 = 8.0;
/// Text width estimate when no font is configured, as a fraction of `px`.
const FALLBACK_ADVANCE: f64 = 0.55;

/// Whole canvas pixels covered by `rect`, clipped to the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Span {
    x: u32,
    y: u32,
    width: u32,
    height: u32,
}

fn span(rect: &Rect, (width, height): (u32, u32)) -> Option<Span> {
    let x0 = rect.x.round().max(0.0);
    let y0 = rect.y.round().max(0.0);
    let x1 = (rect.x + rect.width).round().min(width as f64);
    let y1 = (rect.y + rect.height).round().min(height as f64);
    if x1 <= x0 || y1 <= y0 {
        return None;
    }
    Some(Span {
        x: x0 as u32,
        y: y0 as u32,
        width: (x1 - x0) as u32,
        height: (y1 - y0) as u32,
    })
}

fn blend_rect(canvas: &mut RgbaImage, rect: &Rect, color: [u8; 4]) {
    let Some(s) = span(rect, canvas.dimensions()) else {
        return;
    };
    let color = Rgba(color);
    for y in s.y..s.y + s.height {
        for x in s.x..s.x + s.width {
            canvas.get_pixel_mut(x, y).blend(&color);
        }
    }
}

/// Scale `source` into the pixels covered by `dest`. A source that already
/// has the covered size is copied as is.
fn place(canvas: &mut RgbaImage, source: &RgbaImage, dest: &Rect) {
    let Some(s) = span(dest, canvas.dimensions()) else {
        return;
    };
    if source.dimensions() == (s.width, s.height) {
        imageops::replace(canvas, source, s.x as i64, s.y as i64);
    } else {
        let scaled = imageops::resize(source, s.width, s.height, FilterType::Triangle);
        imageops::replace(canvas, &scaled, s.x as i64, s.y as i64);
    }
}

/// The whole source resampled to the size a frame's `Image` layer covers on
/// a `canvas_size` canvas.
///
/// The result only depends on the image and the canvas size, so one copy
/// serves every frame drawn while that image is edited.
pub fn fit_backdrop(bitmap: &RgbaImage, dims: ImageDimensions, canvas_size: u32) -> RgbaImage {
    let dest = DisplayMapper::new(canvas_size, dims).image_rect();
    match span(&dest, (canvas_size, canvas_size)) {
        Some(s) => imageops::resize(bitmap, s.width, s.height, FilterType::Triangle),
        None => RgbaImage::new(0, 0),
    }
}

fn stroke(canvas: &mut RgbaImage, rect: &Rect, color: [u8; 4], width: f64) {
    let w = width.min(rect.width / 2.0).min(rect.height / 2.0);
    if w <= 0.0 {
        return;
    }
    let edges = [
        Rect { height: w, ..*rect },
        Rect {
            y: rect.y + rect.height - w,
            height: w,
            ..*rect
        },
        Rect {
            y: rect.y + w,
            width: w,
            height: rect.height - 2.0 * w,
            ..*rect
        },
        Rect {
            x: rect.x + rect.width - w,
            y: rect.y + w,
            width: w,
            height: rect.height - 2.0 * w,
        },
    ];
    for edge in &edges {
        blend_rect(canvas, edge, color);
    }
}

#[allow(clippy::too_many_arguments)]
fn hint_label(
    canvas: &mut RgbaImage,
    font: Option<&FontArc>,
    text: &str,
    center: Point,
    px: f32,
    color: [u8; 4],
    plate: [u8; 4],
    clip: &Rect,
) {
    let text_width = match font {
        Some(font) => label::text_width(font, text, px) as f64,
        None => text.chars().count() as f64 * px as f64 * FALLBACK_ADVANCE,
    };
    let plate_width = (text_width + 2.0 * PLATE_PADDING).min(clip.width);
    let plate_height = (px as f64 * 1.6).min(clip.height);
    let plate_rect = Rect {
        x: center.x - plate_width / 2.0,
        y: center.y - plate_height / 2.0,
        width: plate_width,
        height: plate_height,
    };
    blend_rect(canvas, &plate_rect, plate);
    if let Some(font) = font {
        label::draw_text(canvas, font, text, px, center, color, plate_rect);
    }
}

/// Paint `plan` using `bitmap` as the source image.
///
/// `backdrop`, when given, is a [`fit_backdrop`] of `bitmap` and replaces
/// the per-frame resample of the whole image. The crop region is always
/// taken from `bitmap`. Without a font the hint label is reduced to its
/// backing plate.
pub fn paint(
    plan: &FramePlan,
    bitmap: &RgbaImage,
    backdrop: Option<&RgbaImage>,
    font: Option<&FontArc>,
) -> RgbaImage {
    let mut canvas = RgbaImage::new(plan.canvas_size, plan.canvas_size);

    for op in &plan.ops {
        match op {
            DrawOp::Image { dest } => place(&mut canvas, backdrop.unwrap_or(bitmap), dest),
            DrawOp::Shade { rect, color } => blend_rect(&mut canvas, rect, *color),
            DrawOp::ImageRegion { source, dest } => {
                let Some(dims) = ImageDimensions::new(bitmap.width(), bitmap.height()) else {
                    continue;
                };
                let Some(r) = pixel_rect(source, dims) else {
                    warn!("skipping spotlight: {source} is outside {dims}");
                    continue;
                };
                let region = imageops::crop_imm(bitmap, r.x, r.y, r.side, r.side).to_image();
                place(&mut canvas, &region, dest);
            }
            DrawOp::Stroke { rect, color, width } => stroke(&mut canvas, rect, *color, *width),
            DrawOp::Fill { rect, color } => blend_rect(&mut canvas, rect, *color),
            DrawOp::Label {
                text,
                center,
                px,
                color,
                plate,
                clip,
            } => hint_label(&mut canvas, font, text, *center, *px, *color, *plate, clip),
        }
    }

    canvas
}
