//! CLI output formatting for every subcommand.
//!
//! # Information-First Display
//!
//! Every command leads with the file it worked on, then shows the crop
//! window and the result as indented context lines. Paths are shown the way
//! the user typed them.
//!
//! # Output Format
//!
//! ## Probe
//!
//! ```text
//! portrait.jpg
//!     Size: 1600x900
//!     Crop: 900x900 at (350, 0)
//!     Preview: 400px canvas, scale 0.25
//! ```
//!
//! ## Crop
//!
//! ```text
//! portrait.jpg → avatar.png
//!     Crop: 500x500 at (250, 250)
//!     Output: 300x300 PNG, 48213 bytes
//!     SHA-256: 9f86d081884c7d65…
//! ```
//!
//! ## Preview
//!
//! ```text
//! portrait.jpg → preview.png
//!     Crop: 900x900 at (0, 0)
//!     Canvas: 400x400
//! ```
//!
//! ## Replay
//!
//! ```text
//! 001 pointer-down (200, 200)
//! 002 pointer-move (180, 200) → 900x900 at (270, 0)
//! 003 pointer-up
//! 004 key arrow-left → 900x900 at (260, 0)
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::controller::Input;
use crate::display::DisplayMapper;
use crate::geometry::{CropArea, ImageDimensions};
use crate::imaging::CropOutput;
use std::path::Path;

// ============================================================================
// Shared helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Print a canvas coordinate without a trailing `.0` when it is whole.
fn coord(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{v:.0}")
    } else {
        format!("{v:.1}")
    }
}

fn crop_line(area: &CropArea) -> String {
    format!("    Crop: {}", area)
}

/// Short, stable description of one controller input.
fn describe_input(input: &Input) -> String {
    match input {
        Input::PointerDown { x, y } => format!("pointer-down ({}, {})", coord(*x), coord(*y)),
        Input::PointerMove { x, y } => format!("pointer-move ({}, {})", coord(*x), coord(*y)),
        Input::PointerUp => "pointer-up".to_string(),
        Input::PointerLeave => "pointer-leave".to_string(),
        Input::Key { key } => {
            let name = serde_json::to_value(key)
                .ok()
                .and_then(|v| v.as_str().map(str::to_string))
                .unwrap_or_else(|| format!("{key:?}"));
            format!("key {name}")
        }
        Input::Zoom { value } => format!("zoom {}", coord(*value)),
        Input::Preset { preset } => format!("preset {preset}"),
    }
}

// ============================================================================
// Probe
// ============================================================================

/// Format probe output: dimensions and the initial centered crop.
pub fn format_probe(
    source: &Path,
    dims: ImageDimensions,
    area: &CropArea,
    canvas: u32,
) -> Vec<String> {
    let mapper = DisplayMapper::new(canvas, dims);
    vec![
        source.display().to_string(),
        format!("    Size: {}", dims),
        crop_line(area),
        format!("    Preview: {}px canvas, scale {}", canvas, mapper.scale()),
    ]
}

pub fn print_probe(source: &Path, dims: ImageDimensions, area: &CropArea, canvas: u32) {
    for line in format_probe(source, dims, area, canvas) {
        println!("{}", line);
    }
}

// ============================================================================
// Crop
// ============================================================================

/// Format the summary of one extracted avatar.
pub fn format_crop(
    source: &Path,
    dest: &Path,
    area: &CropArea,
    output: &CropOutput,
) -> Vec<String> {
    vec![
        format!("{} → {}", source.display(), dest.display()),
        crop_line(area),
        format!(
            "    Output: {side}x{side} {}, {} bytes",
            output.format,
            output.bytes.len(),
            side = output.side
        ),
        format!("    SHA-256: {}", output.digest),
    ]
}

pub fn print_crop(source: &Path, dest: &Path, area: &CropArea, output: &CropOutput) {
    for line in format_crop(source, dest, area, output) {
        println!("{}", line);
    }
}

// ============================================================================
// Preview
// ============================================================================

pub fn format_preview(source: &Path, dest: &Path, area: &CropArea, canvas: u32) -> Vec<String> {
    vec![
        format!("{} → {}", source.display(), dest.display()),
        crop_line(area),
        format!("    Canvas: {canvas}x{canvas}"),
    ]
}

pub fn print_preview(source: &Path, dest: &Path, area: &CropArea, canvas: u32) {
    for line in format_preview(source, dest, area, canvas) {
        println!("{}", line);
    }
}

// ============================================================================
// Replay
// ============================================================================

/// Format one replayed input. The resulting crop window is shown only when
/// the input changed it.
pub fn format_replay_step(index: usize, input: &Input, changed: Option<&CropArea>) -> String {
    match changed {
        Some(area) => format!("{} {} → {}", format_index(index), describe_input(input), area),
        None => format!("{} {}", format_index(index), describe_input(input)),
    }
}

pub fn print_replay_step(index: usize, input: &Input, changed: Option<&CropArea>) {
    println!("{}", format_replay_step(index, input, changed));
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::Key;
    use crate::geometry::{Preset, initialize};
    use crate::imaging::OutputFormat;

    fn dims(w: u32, h: u32) -> ImageDimensions {
        ImageDimensions::new(w, h).unwrap()
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    #[test]
    fn format_index_pads_to_three() {
        assert_eq!(format_index(7), "007");
        assert_eq!(format_index(1234), "1234");
    }

    #[test]
    fn coord_trims_whole_numbers() {
        assert_eq!(coord(200.0), "200");
        assert_eq!(coord(12.34), "12.3");
    }

    #[test]
    fn describe_input_uses_kebab_names() {
        assert_eq!(
            describe_input(&Input::Key {
                key: Key::ArrowRight
            }),
            "key arrow-right"
        );
        assert_eq!(
            describe_input(&Input::Preset {
                preset: Preset::CenterX
            }),
            format!("preset {}", Preset::CenterX)
        );
        assert_eq!(describe_input(&Input::Zoom { value: 2.0 }), "zoom 2");
    }

    // =========================================================================
    // Commands
    // =========================================================================

    #[test]
    fn format_probe_landscape() {
        let d = dims(1600, 900);
        let lines = format_probe(Path::new("portrait.jpg"), d, &initialize(d), 400);
        assert_eq!(
            lines,
            vec![
                "portrait.jpg",
                "    Size: 1600x900",
                "    Crop: 900x900 at (350, 0)",
                "    Preview: 400px canvas, scale 0.25",
            ]
        );
    }

    #[test]
    fn format_crop_shows_output_and_digest() {
        let d = dims(1000, 1000);
        let output = CropOutput::new(vec![1, 2, 3], 300, OutputFormat::Png);
        let lines = format_crop(
            Path::new("in.jpg"),
            Path::new("out.png"),
            &initialize(d),
            &output,
        );
        assert_eq!(lines[0], "in.jpg → out.png");
        assert_eq!(lines[1], "    Crop: 1000x1000 at (0, 0)");
        assert_eq!(lines[2], "    Output: 300x300 PNG, 3 bytes");
        assert_eq!(lines[3], format!("    SHA-256: {}", output.digest));
    }

    #[test]
    fn format_preview_lines() {
        let d = dims(10, 10);
        let lines = format_preview(Path::new("a.png"), Path::new("p.png"), &initialize(d), 64);
        assert_eq!(lines[2], "    Canvas: 64x64");
    }

    #[test]
    fn format_replay_step_with_and_without_change() {
        let d = dims(1000, 1000);
        let area = initialize(d);
        assert_eq!(
            format_replay_step(1, &Input::PointerDown { x: 200.0, y: 200.0 }, None),
            "001 pointer-down (200, 200)"
        );
        assert_eq!(
            format_replay_step(
                4,
                &Input::Key {
                    key: Key::ArrowLeft
                },
                Some(&area)
            ),
            "004 key arrow-left → 1000x1000 at (0, 0)"
        );
    }
}
