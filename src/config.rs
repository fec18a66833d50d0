//! Application configuration.
//!
//! [`PixelRulerConfig`] is read from `config.yaml` in the platform config
//! directory (for example `~/.config/pixelruler/config.yaml` on Linux). Every
//! field has a default, so a partial file is fine and a missing one means
//! "all defaults".

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::acquire::CameraConfig;
use crate::data::export::OverlayStyle;
use crate::data::hotkeys::Hotkeys;
use crate::data::points::ExtraPointPolicy;
use crate::error::ConfigError;
use crate::session::SessionOptions;

const CONFIG_FILE: &str = "config.yaml";

/// Top-level configuration.
///
/// | Field                 | Purpose |
/// |-----------------------|---------|
/// | `title`               | Native window title |
/// | `unit_label`          | Unit shown after calibrated values |
/// | `extra_point_policy`  | What a click does when two points are selected |
/// | `fit_to_window`       | Scale large images down to the available space |
/// | `overlay`             | Marker and line appearance |
/// | `camera`              | Camera selection |
/// | `hotkeys`             | Keyboard shortcuts |
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PixelRulerConfig {
    pub title: String,
    pub unit_label: String,
    pub extra_point_policy: ExtraPointPolicy,
    pub fit_to_window: bool,
    pub overlay: OverlayStyle,
    pub camera: CameraConfig,
    pub hotkeys: Hotkeys,
    /// Optional eframe native-window options; only settable from code.
    #[serde(skip)]
    pub native_options: Option<eframe::NativeOptions>,
}

impl Default for PixelRulerConfig {
    fn default() -> Self {
        Self {
            title: "PixelRuler".to_string(),
            unit_label: "units".to_string(),
            extra_point_policy: ExtraPointPolicy::default(),
            fit_to_window: true,
            overlay: OverlayStyle::default(),
            camera: CameraConfig::default(),
            hotkeys: Hotkeys::default(),
            native_options: None,
        }
    }
}

impl PixelRulerConfig {
    /// Directory holding `config.yaml`.
    pub fn config_dir() -> Option<PathBuf> {
        directories::ProjectDirs::from("org", "pixelruler", "pixelruler")
            .map(|dirs| dirs.config_dir().to_path_buf())
    }

    pub fn default_path() -> Result<PathBuf, ConfigError> {
        Self::config_dir()
            .map(|dir| dir.join(CONFIG_FILE))
            .ok_or(ConfigError::NoConfigDir)
    }

    pub fn from_yaml(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(s)?)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Read `path`. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let s = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&s)
    }

    /// Load from the default location, falling back to defaults (with a
    /// warning) on any error.
    pub fn load_or_default() -> Self {
        let loaded = Self::default_path().and_then(|p| Self::load_from(&p));
        match loaded {
            Ok(cfg) => cfg,
            Err(e) => {
                log::warn!("using default configuration: {e}");
                Self::default()
            }
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let io_err = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(io_err)?;
        }
        fs::write(path, self.to_yaml()?).map_err(io_err)
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            unit_label: self.unit_label.clone(),
            extra_point_policy: self.extra_point_policy,
        }
    }
}
