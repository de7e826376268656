//! Viewer configuration and persisted preferences.
//!
//! Configuration is read from TOML, either from an explicit `--config` path or from
//! `<config_dir>/slidewise/config.toml`. Missing files fall back to defaults. The theme
//! preference lives in a separate `preferences.toml` that the viewer rewrites on every toggle.

use crate::error::{Result, SlideError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const APP_DIR: &str = "slidewise";
const CONFIG_FILE: &str = "config.toml";
const PREFERENCES_FILE: &str = "preferences.toml";

/// Light or dark color scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    Light,
    #[default]
    Dark,
}

impl ThemeMode {
    pub fn toggled(self) -> Self {
        match self {
            ThemeMode::Light => ThemeMode::Dark,
            ThemeMode::Dark => ThemeMode::Light,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
        }
    }
}

/// Settings for one viewing session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Base URL of the summarization backend
    pub server_url: String,
    /// Document name, served as `/pdf/<document>.pdf`
    pub document: String,
    /// Fixed scale factor applied to a page's intrinsic size when rasterizing
    pub render_scale: f32,
    /// Timeout for ordinary JSON requests
    pub request_timeout_ms: u64,
    /// Timeout for the multipart upload
    pub upload_timeout_ms: u64,
    /// Delay between successful progress polls
    pub poll_interval_ms: u64,
    /// Upper bound for the failure backoff between polls
    pub poll_max_backoff_ms: u64,
    /// Consecutive poll failures tolerated before polling gives up
    pub poll_max_failures: u32,
    /// Theme used when no preference has been saved yet
    pub theme: ThemeMode,
    /// Explicit path to the PDFium shared library
    pub pdfium_library: Option<PathBuf>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:5000".to_string(),
            document: "03-storage1".to_string(),
            render_scale: 1.5,
            request_timeout_ms: 60_000,
            upload_timeout_ms: 300_000,
            poll_interval_ms: 1_000,
            poll_max_backoff_ms: 15_000,
            poll_max_failures: 8,
            theme: ThemeMode::Dark,
            pdfium_library: None,
        }
    }
}

impl ViewerConfig {
    /// Load configuration from `path`, or from the default location when `path` is None.
    ///
    /// An explicit path must exist; the default location is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                if !path.exists() {
                    return Err(SlideError::FileNotFound {
                        path: path.to_path_buf(),
                    });
                }
                Self::from_file(path)
            }
            None => match default_config_path() {
                Some(path) if path.is_file() => Self::from_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| SlideError::file_error(format!("reading {}", path.display()), e))?;
        let config: Self = toml::from_str(&raw)
            .map_err(|e| SlideError::config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.render_scale.is_finite() && self.render_scale > 0.0) {
            return Err(SlideError::config(format!(
                "render_scale must be positive, got {}",
                self.render_scale
            )));
        }
        if self.document.trim().is_empty() {
            return Err(SlideError::config("document name must not be empty"));
        }
        if self.poll_max_failures == 0 {
            return Err(SlideError::config("poll_max_failures must be at least 1"));
        }
        reqwest::Url::parse(&self.server_url)
            .map_err(|e| SlideError::config(format!("server_url {:?}: {}", self.server_url, e)))?;
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn upload_timeout(&self) -> Duration {
        Duration::from_millis(self.upload_timeout_ms)
    }

    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy {
            interval: Duration::from_millis(self.poll_interval_ms),
            max_backoff: Duration::from_millis(self.poll_max_backoff_ms.max(self.poll_interval_ms)),
            max_failures: self.poll_max_failures,
        }
    }
}

/// Scheduling rules for the progress poller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_backoff: Duration,
    pub max_failures: u32,
}

impl PollPolicy {
    /// Delay before the next poll after `failures` consecutive failures (0 = last poll succeeded).
    pub fn delay_after(&self, failures: u32) -> Duration {
        if failures == 0 {
            return self.interval;
        }
        let factor = 1u32.checked_shl(failures.min(16)).unwrap_or(u32::MAX);
        self.interval
            .checked_mul(factor)
            .map_or(self.max_backoff, |delay| delay.min(self.max_backoff))
    }
}

/// User preferences that survive restarts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Preferences {
    pub theme: Option<ThemeMode>,
}

/// Reads and writes [`Preferences`]; a store without a path keeps everything in memory.
#[derive(Debug, Clone)]
pub struct PreferencesStore {
    path: Option<PathBuf>,
}

impl PreferencesStore {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    /// Store rooted at `<config_dir>/slidewise/preferences.toml`
    pub fn default_location() -> Self {
        Self::new(dirs::config_dir().map(|dir| dir.join(APP_DIR).join(PREFERENCES_FILE)))
    }

    pub fn in_memory() -> Self {
        Self::new(None)
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Unreadable or corrupt preferences are treated as absent.
    pub fn load(&self) -> Preferences {
        let Some(path) = self.path.as_deref() else {
            return Preferences::default();
        };
        match std::fs::read_to_string(path) {
            Ok(raw) => toml::from_str(&raw).unwrap_or_else(|e| {
                log::warn!("ignoring corrupt preferences at {}: {}", path.display(), e);
                Preferences::default()
            }),
            Err(_) => Preferences::default(),
        }
    }

    pub fn save(&self, preferences: &Preferences) -> Result<()> {
        let Some(path) = self.path.as_deref() else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| SlideError::file_error(format!("creating {}", parent.display()), e))?;
        }
        let raw = toml::to_string(preferences)
            .map_err(|e| SlideError::config(format!("serializing preferences: {}", e)))?;
        std::fs::write(path, raw)
            .map_err(|e| SlideError::file_error(format!("writing {}", path.display()), e))
    }

    /// Saved theme if any, otherwise `fallback`.
    pub fn theme_or(&self, fallback: ThemeMode) -> ThemeMode {
        self.load().theme.unwrap_or(fallback)
    }
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
}
