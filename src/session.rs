//! The measurement session: everything the user can do to one image.
//!
//! [`MeasurementSession`] owns the displayed image, the point buffer, the
//! scale factor, the acquisition mode and the status message. Every user
//! action is a method; failed actions only change the status message.
//!
//! Asynchronous work (file decoding, camera start-up) is started by the app
//! through [`crate::acquire::Acquirer`] with an id obtained from
//! [`MeasurementSession::begin_upload`] or
//! [`MeasurementSession::use_camera_mode`]; completions are fed back with
//! [`MeasurementSession::apply`], which drops anything that was superseded.

use std::collections::VecDeque;
use std::fmt;
use std::path::{Path, PathBuf};

use egui::Pos2;
use image::RgbaImage;

use crate::acquire::{AcquisitionEvent, CameraStream, ImageOrigin, ImageSource, RequestId, RequestTracker};
use crate::data::calibration::{self, Measurement, ScaleFactor};
use crate::data::export::{self, OverlayStyle};
use crate::data::geometry::{Point, SurfaceTransform};
use crate::data::points::{ExtraPointPolicy, PointBuffer, PushOutcome};
use crate::error::{ErrorClass, SessionError};

/// Number of past measurements kept for the side panel.
pub const HISTORY_LEN: usize = 20;

/// Which capture path is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AcquisitionMode {
    #[default]
    Upload,
    Camera,
}

/// The single text output of the session.
#[derive(Debug, Clone, PartialEq)]
pub enum Status {
    WaitingForImage,
    LoadingImage,
    ImageReady,
    StartingCamera,
    CameraLive { name: String },
    Captured,
    FirstPointSelected,
    ReadyForAction,
    PointsCleared,
    Calibrated { scale: ScaleFactor, unit: String },
    Measured(Measurement),
    Saved { path: PathBuf },
    Failed { class: ErrorClass, message: String },
}

impl Status {
    pub fn is_error(&self) -> bool {
        matches!(self, Status::Failed { .. })
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::WaitingForImage => write!(f, "Waiting for your image"),
            Status::LoadingImage => write!(f, "Loading image..."),
            Status::ImageReady => write!(f, "Image loaded. Select two points."),
            Status::StartingCamera => write!(f, "Starting camera..."),
            Status::CameraLive { name } => {
                write!(f, "Camera '{name}' ready. Press Capture to take a photo.")
            }
            Status::Captured => write!(f, "Photo captured. Select two points."),
            Status::FirstPointSelected => write!(f, "First point selected. Select a second point."),
            Status::ReadyForAction => write!(f, "Ready for calibration or measurement."),
            Status::PointsCleared => write!(f, "Points cleared."),
            Status::Calibrated { scale, unit } => write!(
                f,
                "Calibration complete. Scale factor: {scale} {unit}/pixel. Ready to measure."
            ),
            Status::Measured(m) => write!(f, "Measured distance: {m}"),
            Status::Saved { path } => write!(f, "Saved annotated image to {}", path.display()),
            Status::Failed { message, .. } => f.write_str(message),
        }
    }
}

/// Session settings taken from the app configuration.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub unit_label: String,
    pub extra_point_policy: ExtraPointPolicy,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            unit_label: "units".to_string(),
            extra_point_policy: ExtraPointPolicy::default(),
        }
    }
}

pub struct MeasurementSession {
    image: Option<ImageSource>,
    revision: u64,
    points: PointBuffer,
    scale: ScaleFactor,
    mode: AcquisitionMode,
    camera: Option<Box<dyn CameraStream>>,
    preview: Option<RgbaImage>,
    preview_revision: u64,
    requests: RequestTracker,
    status: Status,
    unit: String,
    history: VecDeque<Measurement>,
}

impl Default for MeasurementSession {
    fn default() -> Self {
        Self::new(SessionOptions::default())
    }
}

impl MeasurementSession {
    pub fn new(opts: SessionOptions) -> Self {
        Self {
            image: None,
            revision: 0,
            points: PointBuffer::new(opts.extra_point_policy),
            scale: ScaleFactor::default(),
            mode: AcquisitionMode::Upload,
            camera: None,
            preview: None,
            preview_revision: 0,
            requests: RequestTracker::default(),
            status: Status::WaitingForImage,
            unit: opts.unit_label,
            history: VecDeque::new(),
        }
    }

    // ── Accessors ────────────────────────────────────────────────────────────

    pub fn image(&self) -> Option<&ImageSource> {
        self.image.as_ref()
    }

    pub fn points(&self) -> &[Point] {
        self.points.points()
    }

    pub fn scale_factor(&self) -> ScaleFactor {
        self.scale
    }

    pub fn mode(&self) -> AcquisitionMode {
        self.mode
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }

    pub fn history(&self) -> impl DoubleEndedIterator<Item = &Measurement> + ExactSizeIterator {
        self.history.iter()
    }

    pub fn camera_name(&self) -> Option<&str> {
        self.camera.as_deref().map(|c| c.name())
    }

    /// Latest live camera frame and a counter that changes with every frame.
    pub fn preview(&self) -> Option<(&RgbaImage, u64)> {
        self.preview.as_ref().map(|p| (p, self.preview_revision))
    }

    /// Whether an upload or camera start-up is still outstanding.
    pub fn is_busy(&self) -> bool {
        self.requests.pending().is_some()
    }

    // ── Image acquisition ────────────────────────────────────────────────────

    /// Replace the displayed image. Clears points and history.
    pub fn set_image(&mut self, pixels: RgbaImage, origin: ImageOrigin) {
        self.revision += 1;
        log::info!(
            "image {}x{} from {:?} (revision {})",
            pixels.width(),
            pixels.height(),
            origin,
            self.revision
        );
        self.image = Some(ImageSource::new(pixels, origin, self.revision));
        self.points.clear();
        self.history.clear();
    }

    /// Switch to the upload path. Stops the camera and abandons any
    /// outstanding request.
    pub fn use_upload_mode(&mut self) {
        self.requests.invalidate();
        self.camera = None;
        self.preview = None;
        self.mode = AcquisitionMode::Upload;
    }

    /// Start an upload; the returned id must accompany the decoded result.
    pub fn begin_upload(&mut self) -> RequestId {
        self.use_upload_mode();
        self.status = Status::LoadingImage;
        self.requests.begin()
    }

    /// Switch to the camera path; the returned id must accompany the opened
    /// stream.
    pub fn use_camera_mode(&mut self) -> RequestId {
        self.camera = None;
        self.preview = None;
        self.mode = AcquisitionMode::Camera;
        self.status = Status::StartingCamera;
        self.requests.begin()
    }

    /// Feed back the completion of an asynchronous request. Completions of
    /// superseded requests are discarded.
    pub fn apply(&mut self, event: AcquisitionEvent) -> Result<(), SessionError> {
        match event {
            AcquisitionEvent::ImageDecoded { id, path, result } => {
                if !self.accept(id) {
                    return Ok(());
                }
                match result {
                    Ok(pixels) => {
                        self.set_image(pixels, ImageOrigin::Upload(path));
                        self.status = Status::ImageReady;
                        Ok(())
                    }
                    Err(e) => {
                        log::warn!("{e}");
                        Err(self.fail(e.into()))
                    }
                }
            }
            AcquisitionEvent::CameraOpened { id, result } => {
                if !self.accept(id) {
                    return Ok(());
                }
                match result {
                    Ok(stream) => {
                        let name = stream.name().to_string();
                        log::info!("camera '{name}' streaming");
                        self.camera = Some(stream);
                        self.status = Status::CameraLive { name };
                        Ok(())
                    }
                    Err(e) => {
                        log::error!("Error accessing camera: {e}");
                        Err(self.fail(e.into()))
                    }
                }
            }
        }
    }

    fn accept(&mut self, id: RequestId) -> bool {
        let current = self.requests.finish(id);
        if !current {
            log::warn!("discarding completion of superseded request {:?}", id);
        }
        current
    }

    /// Pull the newest camera frame into the preview. Returns `true` when a
    /// new frame arrived.
    pub fn poll_camera(&mut self) -> bool {
        let Some(camera) = self.camera.as_mut() else {
            return false;
        };
        match camera.latest_frame() {
            Some(frame) => {
                self.preview = Some(frame);
                self.preview_revision += 1;
                true
            }
            None => false,
        }
    }

    /// Freeze the current camera frame as the displayed image.
    pub fn capture(&mut self) -> Result<(), SessionError> {
        if self.mode != AcquisitionMode::Camera {
            return Err(self.fail(SessionError::NotInCameraMode));
        }
        self.poll_camera();
        let name = self.camera_name().map(str::to_string);
        let (Some(frame), Some(name)) = (self.preview.clone(), name) else {
            return Err(self.fail(SessionError::NoFrame));
        };
        self.requests.invalidate();
        self.set_image(frame, ImageOrigin::Camera(name));
        self.status = Status::Captured;
        Ok(())
    }

    // ── Point selection ──────────────────────────────────────────────────────

    /// Handle a click on the drawing surface. `Ok(None)` means the click
    /// landed outside the image and was ignored.
    pub fn click_at(&mut self, pos: Pos2, surface: &SurfaceTransform) -> Result<Option<usize>, SessionError> {
        match surface.to_image(pos) {
            Some(p) => self.select_point(p).map(Some),
            None => Ok(None),
        }
    }

    /// Add a point in image pixel coordinates. Returns the buffer length.
    pub fn select_point(&mut self, p: Point) -> Result<usize, SessionError> {
        let Some([w, h]) = self.image.as_ref().map(ImageSource::size) else {
            return Err(self.fail(SessionError::NoImage));
        };
        if !(0.0..=w as f64).contains(&p.x) || !(0.0..=h as f64).contains(&p.y) {
            return Err(self.fail(SessionError::OutsideImage));
        }
        let had_pair = self.points.len() == PointBuffer::CAPACITY;
        match self.points.push(p) {
            PushOutcome::Added { len } => {
                log::debug!("point {len} at ({:.1}, {:.1})", p.x, p.y);
                if len == PointBuffer::CAPACITY {
                    self.status = Status::ReadyForAction;
                } else if had_pair {
                    // A new pair was started over a complete one.
                    self.status = Status::FirstPointSelected;
                }
                Ok(len)
            }
            PushOutcome::Rejected => Err(self.fail(SessionError::BufferFull)),
        }
    }

    pub fn clear_points(&mut self) {
        self.points.clear();
        self.status = Status::PointsCleared;
    }

    // ── Calibration & measurement ────────────────────────────────────────────

    /// Derive a new scale from the two selected points and the entered
    /// reference length.
    pub fn calibrate(&mut self, known_length: &str) -> Result<ScaleFactor, SessionError> {
        let scale = match calibration::calibrate(self.points.points(), known_length) {
            Ok(s) => s,
            Err(e) => return Err(self.fail(e)),
        };
        log::info!("calibrated: {} {}/pixel", scale.value(), self.unit);
        self.scale = scale;
        self.points.clear();
        self.status = Status::Calibrated {
            scale,
            unit: self.unit.clone(),
        };
        Ok(scale)
    }

    /// Measure the distance between the two selected points.
    pub fn measure(&mut self) -> Result<Measurement, SessionError> {
        let m = match calibration::measure(self.points.points(), self.scale, &self.unit) {
            Ok(m) => m,
            Err(e) => return Err(self.fail(e)),
        };
        log::info!("measured {:.3} px -> {}", m.pixels, m);
        self.points.clear();
        if self.history.len() == HISTORY_LEN {
            self.history.pop_front();
        }
        self.history.push_back(m.clone());
        self.status = Status::Measured(m.clone());
        Ok(m)
    }

    // ── Export ───────────────────────────────────────────────────────────────

    /// Write the displayed image with the current markers to a PNG.
    pub fn save_annotated(&mut self, path: &Path, style: &OverlayStyle) -> Result<(), SessionError> {
        let Some(image) = self.image.as_ref() else {
            return Err(self.fail(SessionError::NoImage));
        };
        if let Err(e) = export::save_annotated(path, image.pixels(), self.points.points(), style) {
            log::warn!("{e}");
            return Err(self.fail(e.into()));
        }
        self.status = Status::Saved {
            path: path.to_path_buf(),
        };
        Ok(())
    }

    /// Record `err` as the status message and hand it back.
    fn fail(&mut self, err: SessionError) -> SessionError {
        self.status = Status::Failed {
            class: err.class(),
            message: err.to_string(),
        };
        err
    }
}
