//! # Avatar Crop
//!
//! An interactive square-crop tool for profile pictures. Pick an image of any
//! size, drag, zoom, and nudge a square window over it, then extract that
//! window as a fixed-size avatar.
//!
//! # Architecture: Pure Model, Thin Edges
//!
//! The crop window is a plain value. Everything that changes it is a pure
//! function, and everything that touches pixels or files sits at the edge:
//!
//! ```text
//! file ─▶ probe ─▶ initialize ─▶ render ◀──┐
//!                      │                   │
//!                      ▼                   │
//!            input ─▶ controller ─▶ crop window
//!                                          │ confirm
//!                                          ▼
//!                               extract ─▶ N×N output
//! ```
//!
//! - **Geometry** never fails: every transition clamps instead of rejecting,
//!   because pointer deltas, zoom values and key repeats are unbounded.
//! - **Rendering** is split into a pure display list and a painter, so
//!   overlay layout is tested without comparing pixels.
//! - **I/O** (probe, decode, extract) sits behind [`imaging::ImageBackend`] and
//!   runs on worker threads driven by [`session::CropSession`].
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`geometry`] | Crop window value type and its transitions: initialize, zoom, translate, presets |
//! | [`display`] | Image-space ↔ canvas-space mapping for the fixed-size preview |
//! | [`controller`] | Pointer/keyboard/slider state machine driving the geometry |
//! | [`render`] | Spotlight preview: frame planning, rasterizing, hint label |
//! | [`imaging`] | Probing, decoding and extracting via the `image` crate |
//! | [`session`] | File selection to output: background jobs, stale results, callbacks |
//! | [`config`] | `avatar-crop.toml` loading, merging and validation |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Extract From the Source, Never the Preview
//!
//! The preview canvas is a scaled copy. The final crop is always sampled from
//! the full-resolution decode so a 4000px photo still yields a sharp 300px
//! avatar.
//!
//! ## Zoom During a Drag
//!
//! A zoom or preset that arrives while the pointer is held re-bases the drag:
//! the new crop origin becomes the drag's starting origin and the latest
//! pointer sample becomes its anchor. The window never jumps back to a
//! pre-zoom position on the next pointer move. See
//! [`controller::InteractionController::set_zoom`].

pub mod config;
pub mod controller;
pub mod display;
pub mod geometry;
pub mod imaging;
pub mod output;
pub mod render;
pub mod session;

#[cfg(test)]
pub(crate) mod test_helpers;
