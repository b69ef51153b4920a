//! Pointer, keyboard and slider handling for the crop window.
//!
//! The controller owns the mutable editing state for one loaded image: the
//! current [`CropArea`], the zoom slider value and the drag session. Input is
//! fed in as [`Input`] values and turned into geometry transitions.
//!
//! ```text
//!          pointer down inside crop rect
//!   Idle ─────────────────────────────────▶ Dragging { anchor, origin_at_start }
//!    ▲                                          │ pointer move → translate(origin_at_start, Δ / scale)
//!    └──────────── pointer up / leave ──────────┘
//! ```
//!
//! Arrow keys nudge the window by a fixed image-space step, but only while
//! idle and only while the tool is open. Once [`InteractionController::close`]
//! has been called every input is ignored.
//!
//! ## Zoom or preset while dragging
//!
//! A zoom or preset change during a drag invalidates the drag's reference
//! frame (the window has a new size or position). The controller re-bases
//! the drag: `origin_at_start` becomes the post-change origin and `anchor`
//! becomes the last pointer sample. Continuing to move the pointer then moves
//! the new window smoothly from where it now is.

use crate::config::CropConfig;
use crate::display::DisplayMapper;
use crate::geometry::{
    self, CropArea, ImageDimensions, Point, Preset, ZoomRange, apply_preset, initialize,
    translate,
};
use log::debug;
use serde::{Deserialize, Serialize};

/// Keys the crop tool responds to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Key {
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    /// `+`: one zoom step in.
    ZoomIn,
    /// `-`: one zoom step out.
    ZoomOut,
    /// `Home`: back to the initial centered window.
    Reset,
}

/// One input sample. Pointer coordinates are canvas-space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Input {
    PointerDown { x: f64, y: f64 },
    PointerMove { x: f64, y: f64 },
    PointerUp,
    PointerLeave,
    Key { key: Key },
    Zoom { value: f64 },
    Preset { preset: Preset },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragState {
    Idle,
    Dragging {
        /// Canvas-space position of the press.
        anchor: Point,
        /// Crop origin when the press happened (image-space).
        origin_at_start: Point,
        /// Most recent pointer sample, used to re-base the drag.
        last_pointer: Point,
    },
}

/// Tunables the controller needs from the configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControllerSettings {
    pub canvas_size: u32,
    /// Image-space units per arrow-key press.
    pub keyboard_step: f64,
    pub zoom_range: ZoomRange,
    pub zoom_step: f64,
}

impl ControllerSettings {
    pub fn from_config(config: &CropConfig) -> Self {
        Self {
            canvas_size: config.canvas.size,
            keyboard_step: config.keyboard.step,
            zoom_range: ZoomRange {
                min: config.zoom.min,
                max: config.zoom.max,
            },
            zoom_step: config.zoom.step,
        }
    }
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self::from_config(&CropConfig::default())
    }
}

#[derive(Debug, Clone)]
pub struct InteractionController {
    dims: ImageDimensions,
    area: CropArea,
    zoom: f64,
    drag: DragState,
    open: bool,
    settings: ControllerSettings,
}

impl InteractionController {
    /// Start editing `dims` with the initial centered, maximal window.
    pub fn new(dims: ImageDimensions, settings: ControllerSettings) -> Self {
        Self {
            dims,
            area: initialize(dims),
            zoom: 1.0,
            drag: DragState::Idle,
            open: true,
            settings,
        }
    }

    pub fn dims(&self) -> ImageDimensions {
        self.dims
    }

    pub fn area(&self) -> CropArea {
        self.area
    }

    /// Current slider value.
    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn drag_state(&self) -> DragState {
        self.drag
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.drag, DragState::Dragging { .. })
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn settings(&self) -> &ControllerSettings {
        &self.settings
    }

    /// A fresh mapper for the current image; the canvas size never changes.
    pub fn mapper(&self) -> DisplayMapper {
        DisplayMapper::new(self.settings.canvas_size, self.dims)
    }

    /// Stop responding to input and drop any drag in progress.
    pub fn close(&mut self) {
        self.open = false;
        self.drag = DragState::Idle;
    }

    /// Dispatch one input. Returns `true` when the crop window changed and
    /// the preview needs a redraw.
    pub fn handle(&mut self, input: Input) -> bool {
        if !self.open {
            debug!("input {input:?} ignored: tool closed");
            return false;
        }
        match input {
            Input::PointerDown { x, y } => {
                self.pointer_down(Point::new(x, y));
                false
            }
            Input::PointerMove { x, y } => self.pointer_move(Point::new(x, y)),
            Input::PointerUp | Input::PointerLeave => {
                self.end_drag();
                false
            }
            Input::Key { key } => self.key(key),
            Input::Zoom { value } => self.set_zoom(value),
            Input::Preset { preset } => self.preset(preset),
        }
    }

    /// Begin a drag if the press lands on the crop window.
    pub fn pointer_down(&mut self, p: Point) -> bool {
        if !self.open {
            return false;
        }
        let hit = self.mapper().area_to_canvas(&self.area).contains(p);
        if hit {
            debug!("drag start at ({:.1}, {:.1})", p.x, p.y);
            self.drag = DragState::Dragging {
                anchor: p,
                origin_at_start: self.area.origin(),
                last_pointer: p,
            };
        }
        hit
    }

    pub fn pointer_move(&mut self, p: Point) -> bool {
        let DragState::Dragging {
            anchor,
            origin_at_start,
            ..
        } = self.drag
        else {
            return false;
        };

        self.drag = DragState::Dragging {
            anchor,
            origin_at_start,
            last_pointer: p,
        };
        let (dx, dy) = self.mapper().delta_to_image(p.x - anchor.x, p.y - anchor.y);
        let start = self.area.with_origin(origin_at_start);
        self.replace_area(translate(start, self.dims, dx, dy))
    }

    /// Pointer up and pointer leave both land here.
    pub fn end_drag(&mut self) {
        if self.is_dragging() {
            debug!("drag end at {}", self.area);
        }
        self.drag = DragState::Idle;
    }

    pub fn key(&mut self, key: Key) -> bool {
        if !self.open {
            return false;
        }
        let step = self.settings.keyboard_step;
        let (dx, dy) = match key {
            Key::ArrowLeft => (-step, 0.0),
            Key::ArrowRight => (step, 0.0),
            Key::ArrowUp => (0.0, -step),
            Key::ArrowDown => (0.0, step),
            Key::ZoomIn => return self.set_zoom(self.zoom + self.settings.zoom_step),
            Key::ZoomOut => return self.set_zoom(self.zoom - self.settings.zoom_step),
            Key::Reset => return self.reset(),
        };

        if self.is_dragging() {
            debug!("{key:?} ignored while dragging");
            return false;
        }
        self.replace_area(translate(self.area, self.dims, dx, dy))
    }

    /// Slider change. The value is clamped to the configured zoom range.
    pub fn set_zoom(&mut self, value: f64) -> bool {
        if !self.open {
            return false;
        }
        self.zoom = self.settings.zoom_range.clamp(value);
        let changed = self.replace_area(geometry::set_zoom(self.area, self.dims, self.zoom));
        self.rebase_drag();
        changed
    }

    pub fn preset(&mut self, preset: Preset) -> bool {
        if !self.open {
            return false;
        }
        let changed = self.replace_area(apply_preset(self.area, self.dims, preset));
        self.rebase_drag();
        changed
    }

    /// Back to the initial window and zoom 1.0.
    pub fn reset(&mut self) -> bool {
        if !self.open {
            return false;
        }
        self.zoom = 1.0;
        let changed = self.replace_area(initialize(self.dims));
        self.rebase_drag();
        changed
    }

    fn replace_area(&mut self, area: CropArea) -> bool {
        let changed = area != self.area;
        self.area = area;
        changed
    }

    fn rebase_drag(&mut self) {
        if let DragState::Dragging { last_pointer, .. } = self.drag {
            self.drag = DragState::Dragging {
                anchor: last_pointer,
                origin_at_start: self.area.origin(),
                last_pointer,
            };
        }
    }
}
