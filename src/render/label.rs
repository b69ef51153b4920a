//! Hint-label glyph rendering with `ab_glyph`.

use ab_glyph::{Font, FontArc, GlyphId, ScaleFont, point};
use image::{Pixel, Rgba, RgbaImage};
use std::path::Path;
use thiserror::Error;

use crate::display::Rect;
use crate::geometry::Point;

#[derive(Error, Debug)]
pub enum FontError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid font {path}: {message}")]
    Invalid { path: String, message: String },
}

pub fn load_font(path: &Path) -> Result<FontArc, FontError> {
    let bytes = std::fs::read(path)?;
    FontArc::try_from_vec(bytes).map_err(|e| FontError::Invalid {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

/// Advance width of a single line, kerning included.
pub fn text_width(font: &FontArc, text: &str, px: f32) -> f32 {
    let scaled = font.as_scaled(px);
    let mut width = 0.0;
    let mut prev: Option<GlyphId> = None;
    for ch in text.chars() {
        let id = font.glyph_id(ch);
        if let Some(prev) = prev {
            width += scaled.kern(prev, id);
        }
        width += scaled.h_advance(id);
        prev = Some(id);
    }
    width
}

/// Draw one line of text centered on `center`, blending coverage into
/// `canvas`. Pixels outside `clip` are left alone.
pub fn draw_text(
    canvas: &mut RgbaImage,
    font: &FontArc,
    text: &str,
    px: f32,
    center: Point,
    color: [u8; 4],
    clip: Rect,
) {
    let scaled = font.as_scaled(px);
    let width = text_width(font, text, px);
    let baseline = center.y as f32 + (scaled.ascent() + scaled.descent()) / 2.0;
    let mut x = center.x as f32 - width / 2.0;
    let mut prev: Option<GlyphId> = None;

    for ch in text.chars() {
        let id = font.glyph_id(ch);
        if let Some(prev) = prev {
            x += scaled.kern(prev, id);
        }
        let glyph = id.with_scale_and_position(px, point(x, baseline));
        x += scaled.h_advance(id);
        prev = Some(id);

        let Some(outlined) = font.outline_glyph(glyph) else {
            continue;
        };
        let bounds = outlined.px_bounds();
        outlined.draw(|gx, gy, coverage| {
            let cx = bounds.min.x as i64 + gx as i64;
            let cy = bounds.min.y as i64 + gy as i64;
            if cx < 0 || cy < 0 || cx >= canvas.width() as i64 || cy >= canvas.height() as i64 {
                return;
            }
            if !clip.contains(Point::new(cx as f64, cy as f64)) {
                return;
            }
            let alpha = (color[3] as f32 * coverage.clamp(0.0, 1.0)).round() as u8;
            canvas
                .get_pixel_mut(cx as u32, cy as u32)
                .blend(&Rgba([color[0], color[1], color[2], alpha]));
        });
    }
}
