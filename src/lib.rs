//! PixelRuler crate root: re-exports and module wiring.
//!
//! PixelRuler measures real-world distances on a photo. The user loads an
//! image (file or camera), clicks two points across a reference of known
//! length to calibrate the pixel scale, then clicks pairs of points to
//! measure.
//!
//! - `session`: the measurement session (image, points, scale, status)
//! - `data`: geometry, point buffer, calibration, hotkeys, PNG export
//! - `acquire`: background image decoding and camera start-up
//! - `config`: YAML configuration
//! - `app`: the egui/eframe window

pub mod acquire;
pub mod app;
pub mod config;
pub mod data;
pub mod error;
pub mod session;

// Public re-exports for a compact external API
pub use app::{run_pixelruler, PixelRulerApp};
pub use config::PixelRulerConfig;
pub use data::calibration::{Measurement, ScaleFactor};
pub use data::geometry::{pixel_distance, Point, SurfaceTransform};
pub use data::points::{ExtraPointPolicy, PointBuffer};
pub use error::{DeviceError, ErrorClass, LoadError, SessionError};
pub use session::{AcquisitionMode, MeasurementSession, SessionOptions, Status};
