//! Error types shared by the session, the acquisition workers and the app.
//!
//! The `Display` text of [`SessionError`] is what the status line shows, so
//! the wording is written for the user rather than for a log file.

use std::path::PathBuf;

use thiserror::Error;

/// Coarse classification used by the UI to pick a status colour and by the
/// logger to decide how loudly to report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Wrong point count, bad calibration length, missing image, ...
    InputValidation,
    /// Camera permission or hardware failure.
    DeviceAccess,
    /// Image file could not be read or decoded.
    ImageLoad,
    /// Annotated image could not be written.
    Export,
}

/// Camera failures. None of these are retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeviceError {
    #[error("no camera found")]
    NoDevice,
    #[error("no rear-facing camera found")]
    NoRearCamera,
    #[error("camera access denied: {0}")]
    PermissionDenied(String),
    #[error("camera support was not compiled in")]
    Unsupported,
    #[error("camera backend error: {0}")]
    Backend(String),
}

/// Image file failures.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode {path:?}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Everything a session action can fail with.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Please select two points for calibration.")]
    CalibrationPointCount { found: usize },
    #[error("Please select two points to measure the distance.")]
    MeasurementPointCount { found: usize },
    #[error("Please enter a valid calibration distance.")]
    InvalidLength { input: String },
    #[error("The two calibration points must be distinct.")]
    DegeneratePair,
    #[error("Two points already selected. Calibrate, measure or clear first.")]
    BufferFull,
    #[error("Load an image first.")]
    NoImage,
    #[error("Click inside the image.")]
    OutsideImage,
    #[error("Switch to the camera before capturing.")]
    NotInCameraMode,
    #[error("The camera has not delivered a frame yet.")]
    NoFrame,
    #[error("Camera access failed!")]
    Device(#[from] DeviceError),
    #[error("Could not load image: {0}")]
    Load(#[from] LoadError),
    #[error("Could not save image: {0}")]
    Export(#[from] ExportError),
}

impl SessionError {
    pub fn class(&self) -> ErrorClass {
        match self {
            SessionError::Device(_) => ErrorClass::DeviceAccess,
            SessionError::Load(_) => ErrorClass::ImageLoad,
            SessionError::Export(_) => ErrorClass::Export,
            _ => ErrorClass::InputValidation,
        }
    }
}

/// Failures while reading or writing the configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("no configuration directory available on this platform")]
    NoConfigDir,
    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Failures while rendering or saving an annotated image.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Load an image first.")]
    NoImage,
    #[error("image is too large to render")]
    Canvas,
    #[error("failed to save {path:?}: {source}")]
    Save {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}
