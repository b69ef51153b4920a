//! Crop tool configuration.
//!
//! Handles loading, validating, and merging `avatar-crop.toml`. Stock defaults
//! are the base layer; a user file only needs the keys it wants to change.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [canvas]
//! size = 400                  # Preview canvas side, in pixels
//!
//! [zoom]
//! min = 0.5                   # Slider lower bound (below 1.0 saturates at full size)
//! max = 3.0                   # Slider upper bound
//! step = 0.1                  # Zoom change per +/- key press
//!
//! [keyboard]
//! step = 10.0                 # Image pixels per arrow-key press
//!
//! [output]
//! size = 300                  # Side of the extracted square, in pixels
//! format = "png"              # png | jpeg | webp
//! quality = 90                # JPEG quality (1-100)
//!
//! [overlay]
//! shade = [0, 0, 0, 128]      # RGBA dimming layer outside the crop window
//! border = [255, 255, 255, 255]
//! border_width = 2
//! handle_size = 10
//! hint = "Drag to reposition"
//! hint_font = ""              # Path to a TTF/OTF; empty = label plate only
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::OutputFormat;
use log::warn;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Everything the crop tool can be tuned with.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CropConfig {
    pub canvas: CanvasConfig,
    pub zoom: ZoomConfig,
    pub keyboard: KeyboardConfig,
    pub output: OutputConfig,
    pub overlay: OverlayConfig,
}

impl CropConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.canvas.size == 0 {
            return Err(ConfigError::Validation(
                "canvas.size must be positive".into(),
            ));
        }
        if !(self.zoom.min > 0.0 && self.zoom.min <= 1.0 && self.zoom.max >= 1.0) {
            return Err(ConfigError::Validation(
                "zoom range must satisfy 0 < zoom.min <= 1 <= zoom.max".into(),
            ));
        }
        if !self.zoom.max.is_finite() {
            return Err(ConfigError::Validation("zoom.max must be finite".into()));
        }
        if !(self.zoom.step > 0.0) {
            return Err(ConfigError::Validation("zoom.step must be positive".into()));
        }
        if !(self.keyboard.step > 0.0 && self.keyboard.step.is_finite()) {
            return Err(ConfigError::Validation(
                "keyboard.step must be positive".into(),
            ));
        }
        if self.output.size == 0 {
            return Err(ConfigError::Validation(
                "output.size must be positive".into(),
            ));
        }
        if !(1..=100).contains(&self.output.quality) {
            return Err(ConfigError::Validation(
                "output.quality must be 1-100".into(),
            ));
        }
        Ok(())
    }
}

/// Preview canvas settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CanvasConfig {
    /// Side of the square preview surface, in pixels.
    pub size: u32,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self { size: 400 }
    }
}

/// Zoom slider bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ZoomConfig {
    pub min: f64,
    pub max: f64,
    /// Change per zoom key press.
    pub step: f64,
}

impl Default for ZoomConfig {
    fn default() -> Self {
        Self {
            min: 0.5,
            max: 3.0,
            step: 0.1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct KeyboardConfig {
    /// Image-space units moved per arrow-key press.
    pub step: f64,
}

impl Default for KeyboardConfig {
    fn default() -> Self {
        Self { step: 10.0 }
    }
}

/// Extracted avatar settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Side of the square output, in pixels.
    pub size: u32,
    pub format: OutputFormat,
    /// JPEG encoding quality (1 = worst, 100 = best). Ignored for PNG/WebP.
    pub quality: u32,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            size: 300,
            format: OutputFormat::Png,
            quality: 90,
        }
    }
}

impl OutputConfig {
    /// Settings for writing to `dest`: a known image extension picks the
    /// format, anything else keeps the configured one.
    pub fn for_destination(&self, dest: &Path) -> Self {
        match OutputFormat::from_path(dest) {
            Some(format) => Self {
                format,
                ..self.clone()
            },
            None => {
                warn!(
                    "{} has no known image extension; writing {} (.{})",
                    dest.display(),
                    self.format,
                    self.format.extension()
                );
                self.clone()
            }
        }
    }
}

/// Spotlight overlay appearance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OverlayConfig {
    /// RGBA color blended over the canvas outside the crop window.
    pub shade: [u8; 4],
    /// RGBA color of the crop border and corner handles.
    pub border: [u8; 4],
    pub border_width: u32,
    /// Side of each corner handle square, in canvas pixels.
    pub handle_size: u32,
    /// Text shown inside the crop window for non-square images.
    pub hint: String,
    /// Font for the hint label. Empty means draw the label plate only.
    pub hint_font: String,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            shade: [0, 0, 0, 128],
            border: [255, 255, 255, 255],
            border_width: 2,
            handle_size: 10,
            hint: "Drag to reposition".to_string(),
            hint_font: String::new(),
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// Used as the base layer for merging user overrides on top.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(CropConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Merge an optional overlay onto the stock defaults, then deserialize and validate.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<CropConfig, ConfigError> {
    let base = stock_defaults_value();
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: CropConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from a TOML file, or stock defaults when `path` is `None`.
///
/// A path that is given but missing is an error; silently falling back would
/// hide a typo on the command line.
pub fn load_config(path: Option<&Path>) -> Result<CropConfig, ConfigError> {
    let overlay = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            Some(toml::from_str::<toml::Value>(&content)?)
        }
        None => None,
    };
    resolve_config(overlay)
}

/// Returns a fully-commented stock `avatar-crop.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# avatar-crop configuration
# =========================
# All settings are optional. Remove or comment out any you don't need.
# Values below are the defaults.

# ---------------------------------------------------------------------------
# Preview canvas
# ---------------------------------------------------------------------------
[canvas]
# Side of the square preview surface, in pixels. The image is scaled to fit
# and centered; the crop window is drawn on top.
size = 400

# ---------------------------------------------------------------------------
# Zoom slider
# ---------------------------------------------------------------------------
[zoom]
# Zoom is inversely proportional to the crop side: side = min(w, h) / zoom.
# Anything at or below 1.0 selects the largest square that fits.
min = 0.5
max = 3.0
# Change per +/- key press.
step = 0.1

# ---------------------------------------------------------------------------
# Keyboard nudging
# ---------------------------------------------------------------------------
[keyboard]
# Distance moved per arrow-key press, in source image pixels.
step = 10.0

# ---------------------------------------------------------------------------
# Extracted avatar
# ---------------------------------------------------------------------------
[output]
# Side of the square output image, in pixels.
size = 300
# Encoding: "png", "jpeg" or "webp" (lossless).
format = "png"
# JPEG quality (1-100). Ignored for PNG and WebP.
quality = 90

# ---------------------------------------------------------------------------
# Preview overlay
# ---------------------------------------------------------------------------
[overlay]
# RGBA color blended over everything outside the crop window.
shade = [0, 0, 0, 128]
# RGBA color of the crop border and corner handles.
border = [255, 255, 255, 255]
border_width = 2
# Side of each corner handle, in canvas pixels.
handle_size = 10
# Label shown inside the crop window when the source is not square.
hint = "Drag to reposition"
# Path to a TTF/OTF used for the label text. Empty draws the plate only.
hint_font = ""
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_values() {
        let config = CropConfig::default();
        assert_eq!(config.canvas.size, 400);
        assert_eq!(config.zoom.min, 0.5);
        assert_eq!(config.zoom.max, 3.0);
        assert_eq!(config.keyboard.step, 10.0);
        assert_eq!(config.output.size, 300);
        assert_eq!(config.output.format, OutputFormat::Png);
    }

    #[test]
    fn destination_extension_picks_format() {
        let output = OutputConfig {
            quality: 70,
            ..OutputConfig::default()
        };
        let jpeg = output.for_destination(Path::new("out/avatar.JPG"));
        assert_eq!(jpeg.format, OutputFormat::Jpeg);
        assert_eq!((jpeg.size, jpeg.quality), (300, 70));
        assert_eq!(
            output.for_destination(Path::new("a.webp")).format,
            OutputFormat::Webp
        );
    }

    #[test]
    fn unknown_destination_extension_keeps_configured_format() {
        let output = OutputConfig {
            format: OutputFormat::Webp,
            ..OutputConfig::default()
        };
        assert_eq!(output.for_destination(Path::new("avatar.bin")), output);
        assert_eq!(output.for_destination(Path::new("avatar")), output);
    }

    #[test]
    fn parse_partial_config() {
        let toml = r#"
            [output]
            size = 128
        "#;
        let config = resolve_config(Some(toml::from_str(toml).unwrap())).unwrap();
        assert_eq!(config.output.size, 128);
        // Unspecified values keep their defaults
        assert_eq!(config.output.quality, 90);
        assert_eq!(config.canvas.size, 400);
    }

    #[test]
    fn parse_output_format() {
        let toml = r#"
            [output]
            format = "jpeg"
            quality = 75
        "#;
        let config = resolve_config(Some(toml::from_str(toml).unwrap())).unwrap();
        assert_eq!(config.output.format, OutputFormat::Jpeg);
        assert_eq!(config.output.quality, 75);
    }

    #[test]
    fn load_config_without_path_is_default() {
        assert_eq!(load_config(None).unwrap(), CropConfig::default());
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("avatar-crop.toml");
        fs::write(
            &path,
            r#"
            [keyboard]
            step = 25.0

            [overlay]
            hint = "Move me"
            "#,
        )
        .unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.keyboard.step, 25.0);
        assert_eq!(config.overlay.hint, "Move me");
        assert_eq!(config.overlay.border_width, 2);
    }

    #[test]
    fn load_config_missing_file_is_error() {
        let tmp = TempDir::new().unwrap();
        let result = load_config(Some(&tmp.path().join("nope.toml")));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("avatar-crop.toml");
        fs::write(&path, "this is not valid toml [[[").unwrap();
        assert!(matches!(load_config(Some(&path)), Err(ConfigError::Toml(_))));
    }

    // =========================================================================
    // merge_toml
    // =========================================================================

    #[test]
    fn merge_toml_scalar_override() {
        let base: toml::Value = toml::from_str("a = 1\nb = 2").unwrap();
        let overlay: toml::Value = toml::from_str("b = 3").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged["a"].as_integer(), Some(1));
        assert_eq!(merged["b"].as_integer(), Some(3));
    }

    #[test]
    fn merge_toml_table_merge_preserves_siblings() {
        let base: toml::Value = toml::from_str("[zoom]\nmin = 0.5\nmax = 3.0").unwrap();
        let overlay: toml::Value = toml::from_str("[zoom]\nmax = 4.0").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged["zoom"]["min"].as_float(), Some(0.5));
        assert_eq!(merged["zoom"]["max"].as_float(), Some(4.0));
    }

    #[test]
    fn merge_toml_arrays_replace_wholesale() {
        let base: toml::Value = toml::from_str("shade = [0, 0, 0, 128]").unwrap();
        let overlay: toml::Value = toml::from_str("shade = [10, 20, 30, 40]").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged["shade"].as_array().unwrap().len(), 4);
        assert_eq!(merged["shade"][0].as_integer(), Some(10));
    }

    // =========================================================================
    // Unknown keys and validation
    // =========================================================================

    #[test]
    fn unknown_key_rejected() {
        let overlay = toml::from_str("[canvas]\nsize = 300\nwidth = 12").unwrap();
        assert!(matches!(
            resolve_config(Some(overlay)),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn unknown_section_rejected() {
        let overlay = toml::from_str("[rotation]\nenabled = true").unwrap();
        assert!(resolve_config(Some(overlay)).is_err());
    }

    #[test]
    fn unknown_format_rejected() {
        let overlay = toml::from_str("[output]\nformat = \"gif\"").unwrap();
        assert!(resolve_config(Some(overlay)).is_err());
    }

    #[test]
    fn validate_default_config_passes() {
        assert!(CropConfig::default().validate().is_ok());
    }

    #[test]
    fn validate_zero_canvas() {
        let mut config = CropConfig::default();
        config.canvas.size = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn validate_zoom_range_must_straddle_one() {
        let mut config = CropConfig::default();
        config.zoom.min = 1.5;
        assert!(config.validate().is_err());

        let mut config = CropConfig::default();
        config.zoom.max = 0.9;
        assert!(config.validate().is_err());

        let mut config = CropConfig::default();
        config.zoom.min = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_steps_must_be_positive() {
        let mut config = CropConfig::default();
        config.keyboard.step = 0.0;
        assert!(config.validate().is_err());

        let mut config = CropConfig::default();
        config.zoom.step = -0.1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_output_bounds() {
        let mut config = CropConfig::default();
        config.output.size = 0;
        assert!(config.validate().is_err());

        let mut config = CropConfig::default();
        config.output.quality = 0;
        assert!(config.validate().is_err());

        config.output.quality = 101;
        assert!(config.validate().is_err());

        config.output.quality = 100;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn resolve_config_rejects_invalid_values() {
        let overlay = toml::from_str("[output]\nsize = 0").unwrap();
        assert!(matches!(
            resolve_config(Some(overlay)),
            Err(ConfigError::Validation(_))
        ));
    }

    // =========================================================================
    // Stock config
    // =========================================================================

    #[test]
    fn stock_config_toml_roundtrips_to_defaults() {
        let value: toml::Value = toml::from_str(stock_config_toml()).unwrap();
        let config = resolve_config(Some(value)).unwrap();
        assert_eq!(config, CropConfig::default());
    }

    #[test]
    fn stock_defaults_value_has_all_sections() {
        let value = stock_defaults_value();
        let table = value.as_table().unwrap();
        for section in ["canvas", "zoom", "keyboard", "output", "overlay"] {
            assert!(table.contains_key(section), "missing [{section}]");
        }
    }
}
