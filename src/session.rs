//! One editing session of the crop tool, from file selection to output.
//!
//! Probing and extraction run on worker threads and report back over an
//! `mpsc` channel; input handling and rendering never wait on them. Every
//! background job carries a [`RequestId`]. A result is applied only if its id
//! is still the one the session is waiting for, so selecting a new file (or
//! confirming again) makes any earlier job's result stale.
//!
//! ```text
//!            select_file             Loaded(ok)
//!   Empty ──────────────▶ Loading ──────────────▶ Editing ──confirm──▶ (extract)
//!                           │                       │  ▲                  │
//!                Loaded(err)│                       │  └── Extracted(err) ┘
//!                           ▼           cancel/close│                     │Extracted(ok)
//!                         Closed ◀──────────────────┴─────────────────────┘
//! ```
//!
//! The decoded bitmap backing the preview is owned by the `Editing` phase and
//! released whenever the session leaves it.

use crate::config::CropConfig;
use crate::controller::{ControllerSettings, Input, InteractionController};
use crate::geometry::CropArea;
use crate::imaging::{
    CropError, CropOutput, DecodeError, ImageBackend, LoadedImage, extract_crop, load_image,
};
use crate::render::{FontError, Renderer, fit_backdrop};
use image::RgbaImage;
use log::{debug, info, warn};
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("No image is loaded")]
    NoImage,
    #[error("Could not load image: {0}")]
    Decode(#[from] DecodeError),
    #[error("Could not produce avatar: {0}")]
    Crop(#[from] CropError),
    #[error("Could not load hint font: {0}")]
    Font(#[from] FontError),
}

/// Identifies one background job.
pub type RequestId = u64;

/// Result of a background job, as sent by its worker.
#[derive(Debug)]
pub enum SessionEvent {
    Loaded {
        request: RequestId,
        result: Result<LoadedImage, DecodeError>,
    },
    Extracted {
        request: RequestId,
        result: Result<CropOutput, CropError>,
    },
}

/// What applying an event did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionUpdate {
    /// The image is loaded and the crop window initialized.
    Ready,
    /// The output was handed to the completion callback; the tool is closed.
    Completed,
    /// The result belonged to a superseded request and was dropped.
    Stale,
}

/// Coarse phase, for callers that only need to know where the session is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Empty,
    Loading,
    Editing,
    Closed,
}

struct Editing {
    image: LoadedImage,
    /// `image` fitted to the canvas once, reused by every frame.
    backdrop: RgbaImage,
    controller: InteractionController,
    pending_extract: Option<RequestId>,
}

enum Phase {
    Empty,
    Loading { request: RequestId, path: PathBuf },
    Editing(Box<Editing>),
    Closed,
}

type CompleteFn = Box<dyn FnMut(CropOutput)>;
type CancelFn = Box<dyn FnMut()>;

pub struct CropSession<B: ImageBackend + 'static> {
    backend: Arc<B>,
    config: CropConfig,
    renderer: Renderer,
    phase: Phase,
    next_request: RequestId,
    in_flight: usize,
    tx: Sender<SessionEvent>,
    rx: Receiver<SessionEvent>,
    on_complete: Option<CompleteFn>,
    on_cancel: Option<CancelFn>,
}

impl<B: ImageBackend + 'static> CropSession<B> {
    /// Fails only if the configured hint font cannot be loaded.
    pub fn new(backend: Arc<B>, config: CropConfig) -> Result<Self, SessionError> {
        let renderer = Renderer::from_config(&config.overlay)?;
        let (tx, rx) = mpsc::channel();
        Ok(Self {
            backend,
            config,
            renderer,
            phase: Phase::Empty,
            next_request: 0,
            in_flight: 0,
            tx,
            rx,
            on_complete: None,
            on_cancel: None,
        })
    }

    /// Called with the extracted avatar after a successful confirm.
    pub fn on_complete(mut self, f: impl FnMut(CropOutput) + 'static) -> Self {
        self.on_complete = Some(Box::new(f));
        self
    }

    /// Called, with no output, when the user cancels.
    pub fn on_cancel(mut self, f: impl FnMut() + 'static) -> Self {
        self.on_cancel = Some(Box::new(f));
        self
    }

    pub fn state(&self) -> SessionState {
        match self.phase {
            Phase::Empty => SessionState::Empty,
            Phase::Loading { .. } => SessionState::Loading,
            Phase::Editing(_) => SessionState::Editing,
            Phase::Closed => SessionState::Closed,
        }
    }

    pub fn controller(&self) -> Option<&InteractionController> {
        match &self.phase {
            Phase::Editing(editing) => Some(&editing.controller),
            _ => None,
        }
    }

    pub fn area(&self) -> Option<CropArea> {
        self.controller().map(InteractionController::area)
    }

    pub fn image(&self) -> Option<&LoadedImage> {
        match &self.phase {
            Phase::Editing(editing) => Some(&editing.image),
            _ => None,
        }
    }

    /// Number of background jobs whose results have not been received yet,
    /// stale ones included.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Start loading `path`. Anything the session was doing for a previous
    /// file is abandoned.
    pub fn select_file(&mut self, path: &Path) -> RequestId {
        let request = self.issue_request();
        info!("loading {} (request {request})", path.display());
        self.set_phase(Phase::Loading {
            request,
            path: path.to_path_buf(),
        });

        let backend = Arc::clone(&self.backend);
        let tx = self.tx.clone();
        let path = path.to_path_buf();
        self.in_flight += 1;
        std::thread::spawn(move || {
            let result = guarded(
                || load_image(backend.as_ref(), &path),
                |message| DecodeError::Decode {
                    path: path.clone(),
                    message: format!("worker panicked: {message}"),
                },
            );
            if tx.send(SessionEvent::Loaded { request, result }).is_err() {
                debug!("session gone before load of {} finished", path.display());
            }
        });
        request
    }

    /// Feed one input to the controller. Returns `true` when the preview
    /// needs a redraw. Input is ignored unless an image is being edited.
    pub fn handle_input(&mut self, input: Input) -> bool {
        match &mut self.phase {
            Phase::Editing(editing) => editing.controller.handle(input),
            _ => {
                debug!("input {input:?} ignored: nothing to edit");
                false
            }
        }
    }

    /// Draw the current preview frame.
    pub fn render(&self) -> Option<RgbaImage> {
        let Phase::Editing(editing) = &self.phase else {
            return None;
        };
        let controller = &editing.controller;
        Some(self.renderer.render_over(
            &editing.image.bitmap,
            &editing.backdrop,
            controller.dims(),
            &controller.area(),
            controller.settings().canvas_size,
        ))
    }

    /// Extract the current crop window in the background.
    ///
    /// Confirming again before the first extraction finishes supersedes it.
    pub fn confirm(&mut self) -> Result<RequestId, SessionError> {
        let request = self.issue_request();
        let Phase::Editing(editing) = &mut self.phase else {
            return Err(SessionError::NoImage);
        };
        editing.pending_extract = Some(request);

        let area = editing.controller.area();
        let source = editing.image.path.clone();
        let output = self.config.output.clone();
        let backend = Arc::clone(&self.backend);
        let tx = self.tx.clone();
        info!("extracting {area} from {} (request {request})", source.display());

        self.in_flight += 1;
        std::thread::spawn(move || {
            let result = guarded(
                || extract_crop(backend.as_ref(), &source, area, &output),
                CropError::Panicked,
            );
            if tx.send(SessionEvent::Extracted { request, result }).is_err() {
                debug!("session gone before extraction of {} finished", source.display());
            }
        });
        Ok(request)
    }

    /// Close the tool and notify the cancel callback.
    pub fn cancel(&mut self) {
        self.close();
        if let Some(on_cancel) = self.on_cancel.as_mut() {
            on_cancel();
        }
    }

    /// Close the tool without notifying anyone. Pending results become stale.
    pub fn close(&mut self) {
        self.set_phase(Phase::Closed);
    }

    /// Apply the next finished job, if one is ready. Never blocks.
    pub fn poll(&mut self) -> Option<Result<SessionUpdate, SessionError>> {
        let event = self.rx.try_recv().ok()?;
        Some(self.handle_event(event))
    }

    /// Block until the next job finishes and apply it. Returns `None` when
    /// nothing is in flight.
    pub fn wait(&mut self) -> Option<Result<SessionUpdate, SessionError>> {
        if self.in_flight == 0 {
            return None;
        }
        let event = self.rx.recv().ok()?;
        Some(self.handle_event(event))
    }

    /// Apply a worker's result.
    ///
    /// A load failure closes the tool. An extraction failure leaves it open
    /// so the user can confirm again.
    pub fn handle_event(&mut self, event: SessionEvent) -> Result<SessionUpdate, SessionError> {
        self.in_flight = self.in_flight.saturating_sub(1);
        match event {
            SessionEvent::Loaded { request, result } => self.apply_loaded(request, result),
            SessionEvent::Extracted { request, result } => self.apply_extracted(request, result),
        }
    }

    fn apply_loaded(
        &mut self,
        request: RequestId,
        result: Result<LoadedImage, DecodeError>,
    ) -> Result<SessionUpdate, SessionError> {
        let current = matches!(self.phase, Phase::Loading { request: r, .. } if r == request);
        if !current {
            warn!("discarding stale load result (request {request})");
            return Ok(SessionUpdate::Stale);
        }

        match result {
            Ok(image) => {
                info!("loaded {}: {}", image.path.display(), image.dims);
                let settings = ControllerSettings::from_config(&self.config);
                let controller = InteractionController::new(image.dims, settings);
                let backdrop = fit_backdrop(&image.bitmap, image.dims, settings.canvas_size);
                self.set_phase(Phase::Editing(Box::new(Editing {
                    image,
                    backdrop,
                    controller,
                    pending_extract: None,
                })));
                Ok(SessionUpdate::Ready)
            }
            Err(e) => {
                warn!("load failed, closing: {e}");
                self.close();
                Err(e.into())
            }
        }
    }

    fn apply_extracted(
        &mut self,
        request: RequestId,
        result: Result<CropOutput, CropError>,
    ) -> Result<SessionUpdate, SessionError> {
        let Phase::Editing(editing) = &mut self.phase else {
            warn!("discarding extraction result (request {request}): tool not editing");
            return Ok(SessionUpdate::Stale);
        };
        if editing.pending_extract != Some(request) {
            warn!("discarding stale extraction result (request {request})");
            return Ok(SessionUpdate::Stale);
        }
        editing.pending_extract = None;

        let output = result?;
        info!(
            "avatar ready: {}px {} ({} bytes, sha256 {})",
            output.side,
            output.format,
            output.bytes.len(),
            output.digest
        );
        self.close();
        if let Some(on_complete) = self.on_complete.as_mut() {
            on_complete(output);
        }
        Ok(SessionUpdate::Completed)
    }

    fn issue_request(&mut self) -> RequestId {
        self.next_request += 1;
        self.next_request
    }

    fn set_phase(&mut self, next: Phase) {
        let previous = std::mem::replace(&mut self.phase, next);
        match previous {
            Phase::Editing(mut editing) => {
                editing.controller.close();
                debug!("released preview of {}", editing.image.path.display());
            }
            Phase::Loading { request, path } => {
                debug!("abandoned load of {} (request {request})", path.display());
            }
            Phase::Empty | Phase::Closed => {}
        }
    }
}

/// Run a worker job so that a panic still yields exactly one result.
fn guarded<T, E>(
    job: impl FnOnce() -> Result<T, E>,
    on_panic: impl FnOnce(String) -> E,
) -> Result<T, E> {
    panic::catch_unwind(AssertUnwindSafe(job)).unwrap_or_else(|payload| {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        Err(on_panic(message))
    })
}
