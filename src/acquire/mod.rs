//! Image acquisition: background decoding of uploaded files and camera
//! start-up.
//!
//! Work runs on short-lived worker threads and reports back through an
//! [`std::sync::mpsc`] channel that the UI drains once per frame. Every
//! request carries a [`RequestId`]; the session only accepts the completion
//! of the request it is currently waiting for, so a slow decode can never
//! overwrite an image the user picked later.

pub mod camera;
#[cfg(feature = "camera")]
mod gst_camera;
mod loader;

use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::time::Duration;

use image::RgbaImage;

use crate::error::{DeviceError, LoadError};

pub use camera::{default_backend, CameraBackend, CameraConfig, CameraStream, UnavailableCamera};
pub use loader::decode_file;

/// Identifies one asynchronous acquisition request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(u64);

/// Hands out request ids and remembers which one is current.
#[derive(Debug, Default)]
pub struct RequestTracker {
    next: u64,
    current: Option<RequestId>,
}

impl RequestTracker {
    /// Start a new request, superseding any outstanding one.
    pub fn begin(&mut self) -> RequestId {
        self.next += 1;
        let id = RequestId(self.next);
        self.current = Some(id);
        id
    }

    /// Forget the outstanding request; its completion will be ignored.
    pub fn invalidate(&mut self) {
        self.current = None;
    }

    pub fn is_current(&self, id: RequestId) -> bool {
        self.current == Some(id)
    }

    pub fn pending(&self) -> Option<RequestId> {
        self.current
    }

    /// Consume the completion of `id`. Returns `false` for stale ids.
    pub fn finish(&mut self, id: RequestId) -> bool {
        if self.is_current(id) {
            self.current = None;
            true
        } else {
            false
        }
    }
}

/// Where the displayed image came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageOrigin {
    Upload(PathBuf),
    Camera(String),
}

/// The currently displayed raster image. Never mutated; replaced wholesale.
#[derive(Debug, Clone)]
pub struct ImageSource {
    pixels: Arc<RgbaImage>,
    origin: ImageOrigin,
    revision: u64,
}

impl ImageSource {
    pub fn new(pixels: RgbaImage, origin: ImageOrigin, revision: u64) -> Self {
        Self {
            pixels: Arc::new(pixels),
            origin,
            revision,
        }
    }

    pub fn pixels(&self) -> &Arc<RgbaImage> {
        &self.pixels
    }

    pub fn size(&self) -> [u32; 2] {
        [self.pixels.width(), self.pixels.height()]
    }

    pub fn origin(&self) -> &ImageOrigin {
        &self.origin
    }

    /// Increases every time the session replaces its image; the UI uses it
    /// to know when to re-upload the texture.
    pub fn revision(&self) -> u64 {
        self.revision
    }
}

/// Completion messages sent by worker threads.
pub enum AcquisitionEvent {
    ImageDecoded {
        id: RequestId,
        path: PathBuf,
        result: Result<RgbaImage, LoadError>,
    },
    CameraOpened {
        id: RequestId,
        result: Result<Box<dyn CameraStream>, DeviceError>,
    },
}

impl std::fmt::Debug for AcquisitionEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AcquisitionEvent::ImageDecoded { id, path, result } => f
                .debug_struct("ImageDecoded")
                .field("id", id)
                .field("path", path)
                .field("ok", &result.is_ok())
                .finish(),
            AcquisitionEvent::CameraOpened { id, result } => f
                .debug_struct("CameraOpened")
                .field("id", id)
                .field("ok", &result.is_ok())
                .finish(),
        }
    }
}

/// Spawns acquisition work and collects its completions.
pub struct Acquirer {
    tx: Sender<AcquisitionEvent>,
    rx: Receiver<AcquisitionEvent>,
    camera: Arc<dyn CameraBackend>,
    repaint: Option<egui::Context>,
}

impl Acquirer {
    pub fn new(camera: Arc<dyn CameraBackend>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            tx,
            rx,
            camera,
            repaint: None,
        }
    }

    /// Wake the UI when a worker finishes.
    pub fn with_repaint(mut self, ctx: egui::Context) -> Self {
        self.repaint = Some(ctx);
        self
    }

    /// Decode `path` in the background.
    pub fn load_file(&self, id: RequestId, path: &Path) {
        let tx = self.tx.clone();
        let repaint = self.repaint.clone();
        let path = path.to_path_buf();
        std::thread::spawn(move || {
            let result = decode_file(&path);
            // The receiver is gone only when the app is shutting down.
            let _ = tx.send(AcquisitionEvent::ImageDecoded { id, path, result });
            if let Some(ctx) = repaint {
                ctx.request_repaint();
            }
        });
    }

    /// Open the camera in the background.
    pub fn open_camera(&self, id: RequestId, cfg: &CameraConfig) {
        let tx = self.tx.clone();
        let repaint = self.repaint.clone();
        let backend = Arc::clone(&self.camera);
        let cfg = cfg.clone();
        std::thread::spawn(move || {
            let result = backend.open(&cfg);
            let _ = tx.send(AcquisitionEvent::CameraOpened { id, result });
            if let Some(ctx) = repaint {
                ctx.request_repaint();
            }
        });
    }

    /// All completions that arrived since the last call.
    pub fn drain(&self) -> Vec<AcquisitionEvent> {
        self.rx.try_iter().collect()
    }

    /// Block until the next completion or `timeout`.
    pub fn wait(&self, timeout: Duration) -> Option<AcquisitionEvent> {
        self.rx.recv_timeout(timeout).ok()
    }
}
