//! Camera abstraction.
//!
//! A [`CameraBackend`] opens a [`CameraStream`]; the stream hands out the most
//! recent frame on demand. The GStreamer backend lives behind the `camera`
//! feature; without it [`UnavailableCamera`] reports a device error.

use std::sync::Arc;

use image::RgbaImage;
use serde::{Deserialize, Serialize};

use crate::error::DeviceError;

/// Which way a camera points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Facing {
    /// Rear camera ("environment").
    Environment,
    /// Front camera ("user").
    User,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Fail instead of falling back when no rear-facing camera exists.
    pub require_rear: bool,
    /// Only consider devices whose name contains this text (case-insensitive).
    pub device: Option<String>,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            require_rear: false,
            device: None,
        }
    }
}

/// A device reported by a backend before it is opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraCandidate {
    pub name: String,
    pub facing: Option<Facing>,
}

/// Choose the device to open: rear-facing first, then (unless
/// `require_rear`) the first device that passes the name filter.
pub fn pick_device(candidates: &[CameraCandidate], cfg: &CameraConfig) -> Result<usize, DeviceError> {
    let filter = cfg.device.as_ref().map(|d| d.to_lowercase());
    let eligible: Vec<usize> = candidates
        .iter()
        .enumerate()
        .filter(|(_, c)| {
            filter
                .as_ref()
                .map(|f| c.name.to_lowercase().contains(f.as_str()))
                .unwrap_or(true)
        })
        .map(|(i, _)| i)
        .collect();
    if eligible.is_empty() {
        return Err(DeviceError::NoDevice);
    }
    if let Some(&rear) = eligible
        .iter()
        .find(|&&i| candidates[i].facing == Some(Facing::Environment))
    {
        return Ok(rear);
    }
    if cfg.require_rear {
        return Err(DeviceError::NoRearCamera);
    }
    Ok(eligible[0])
}

/// Guess the facing of a device from its name. Platforms that expose a
/// location property should prefer it.
pub fn facing_from_name(name: &str) -> Option<Facing> {
    let n = name.to_lowercase();
    if n.contains("back") || n.contains("rear") || n.contains("environment") {
        Some(Facing::Environment)
    } else if n.contains("front") || n.contains("user") || n.contains("facetime") {
        Some(Facing::User)
    } else {
        None
    }
}

/// A running camera.
pub trait CameraStream: Send {
    fn name(&self) -> &str;
    /// The newest frame, or `None` if nothing new arrived since the last call.
    fn latest_frame(&mut self) -> Option<RgbaImage>;
}

pub trait CameraBackend: Send + Sync {
    fn open(&self, cfg: &CameraConfig) -> Result<Box<dyn CameraStream>, DeviceError>;
}

/// Backend used when camera support is compiled out.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableCamera;

impl CameraBackend for UnavailableCamera {
    fn open(&self, _cfg: &CameraConfig) -> Result<Box<dyn CameraStream>, DeviceError> {
        Err(DeviceError::Unsupported)
    }
}

/// The best backend available in this build.
pub fn default_backend() -> Arc<dyn CameraBackend> {
    #[cfg(feature = "camera")]
    {
        Arc::new(super::gst_camera::GstCamera)
    }
    #[cfg(not(feature = "camera"))]
    {
        Arc::new(UnavailableCamera)
    }
}
