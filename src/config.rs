use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::replay::DEFAULT_SPEED;
use crate::surface::{SurfaceStyle, MAX_LINE_WIDTH, MAX_PIXEL_DENSITY};
use crate::verification::{VerificationMode, DEFAULT_THRESHOLD};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub pixel_density: f64,
    pub line_width: f64,
    pub ink: (u8, u8, u8),
    pub speed: f64,
    pub threshold: u8,
    pub mode: VerificationMode,
    pub frame_interval_ms: u64,
    pub verification_delay_ms: u64,
    pub synthetic_pressure: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pixel_density: 2.0,
            line_width: 1.5,
            ink: (226, 232, 240),
            speed: DEFAULT_SPEED,
            threshold: DEFAULT_THRESHOLD,
            mode: VerificationMode::Dynamic,
            frame_interval_ms: 16,
            verification_delay_ms: 1000,
            synthetic_pressure: false,
        }
    }
}

impl Config {
    pub fn surface_style(&self) -> SurfaceStyle {
        SurfaceStyle {
            line_width: self.line_width,
            ink: self.ink,
        }
    }

    /// Reject values the engine cannot work with.
    pub fn validate(&self, path: &Path) -> Result<(), ConfigError> {
        let invalid = |field: &'static str, reason: &str| ConfigError::Invalid {
            path: path.to_path_buf(),
            field,
            reason: reason.to_string(),
        };

        if !in_range(self.pixel_density, MAX_PIXEL_DENSITY) {
            return Err(invalid(
                "pixel_density",
                &format!("must be a positive number up to {MAX_PIXEL_DENSITY}"),
            ));
        }
        if !in_range(self.line_width, MAX_LINE_WIDTH) {
            return Err(invalid(
                "line_width",
                &format!("must be a positive number up to {MAX_LINE_WIDTH}"),
            ));
        }
        if !(self.speed.is_finite() && self.speed > 0.0) {
            return Err(invalid("speed", "must be a positive number"));
        }
        if self.threshold > 100 {
            return Err(invalid("threshold", "must be between 0 and 100"));
        }
        if self.frame_interval_ms == 0 {
            return Err(invalid("frame_interval_ms", "must be at least 1"));
        }
        Ok(())
    }
}

/// Finite, positive and no larger than `max`.
pub fn in_range(value: f64, max: f64) -> bool {
    value.is_finite() && value > 0.0 && value <= max
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "inkreplay") {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from("inkreplay_config.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Like `load`, but says why the file was not used.
    pub fn try_load(&self) -> Result<Config, ConfigError> {
        let bytes = fs::read(&self.path).map_err(|source| ConfigError::Io {
            path: self.path.clone(),
            source,
        })?;
        let cfg = serde_json::from_slice::<Config>(&bytes).map_err(|source| ConfigError::Parse {
            path: self.path.clone(),
            source,
        })?;
        cfg.validate(&self.path)?;
        Ok(cfg)
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        match self.try_load() {
            Ok(cfg) => cfg,
            Err(ConfigError::Io { .. }) => Config::default(),
            Err(e) => {
                log::warn!("{e}; using defaults");
                Config::default()
            }
        }
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg).unwrap_or_default();
        fs::write(&self.path, data)
    }
}
