//! TOML-based configuration for the device skin.
//!
//! The file lives at the platform config directory unless a path is given on
//! the command line:
//! - Linux:    `~/.config/deviceskin/config.toml`
//! - macOS:    `~/Library/Application Support/DeviceSkin/config.toml`
//! - Windows:  `%APPDATA%\DeviceSkin\config.toml`
//!
//! ```toml
//! [window]
//! name = "Pixel_6"
//! x = 120
//! y = 80
//! scale = 0.5
//!
//! [keyboard]
//! charmap = "/opt/skins/qwerty2.kcm"
//! raw_keys = false
//!
//! [loop]
//! poll_ms = 16
//! ```
//!
//! Every field has a serde default, so a missing file, section or key falls
//! back to the values below.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use skin_core::domain::window::{DEFAULT_LCD_BRIGHTNESS, MIN_SCALE};
use thiserror::Error;

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SkinConfig {
    #[serde(default)]
    pub window: WindowConfig,
    #[serde(default)]
    pub keyboard: KeyboardConfig,
    #[serde(default)]
    pub trackball: TrackballConfig,
    #[serde(default)]
    pub log: LogConfig,
    #[serde(default, rename = "loop")]
    pub event_loop: LoopConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WindowConfig {
    /// Window title and AVD name.
    #[serde(default = "default_window_name")]
    pub name: String,
    /// Last window position, written back on exit.
    #[serde(default)]
    pub x: i32,
    #[serde(default)]
    pub y: i32,
    /// Layout name to start in; the first layout when absent or unknown.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_orientation: Option<String>,
    #[serde(default = "default_scale")]
    pub scale: f64,
    #[serde(default = "default_min_scale")]
    pub min_scale: f64,
    #[serde(default = "default_lcd_brightness")]
    pub lcd_brightness: u8,
    /// Skin description file; the built-in layouts are used when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skin: Option<PathBuf>,
}

impl WindowConfig {
    /// `min_scale`, never below the hard floor of 0.2.
    pub fn effective_min_scale(&self) -> f64 {
        self.min_scale.max(MIN_SCALE)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct KeyboardConfig {
    /// `.kcm` charmap file; its basename selects the charmap.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub charmap: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyset: Option<PathBuf>,
    /// Start in raw mode (no unicode translation).
    #[serde(default)]
    pub raw_keys: bool,
    /// Host key codes that are already device codes go straight through.
    #[serde(default)]
    pub passthrough: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrackballConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LogConfig {
    /// `tracing` filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoopConfig {
    /// Interval between two drains of the event queue.
    #[serde(default = "default_poll_ms")]
    pub poll_ms: u64,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_window_name() -> String {
    "Device".to_string()
}
fn default_scale() -> f64 {
    1.0
}
fn default_min_scale() -> f64 {
    MIN_SCALE
}
fn default_lcd_brightness() -> u8 {
    DEFAULT_LCD_BRIGHTNESS
}
fn default_true() -> bool {
    true
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_poll_ms() -> u64 {
    16
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            name: default_window_name(),
            x: 0,
            y: 0,
            initial_orientation: None,
            scale: default_scale(),
            min_scale: default_min_scale(),
            lcd_brightness: default_lcd_brightness(),
            skin: None,
        }
    }
}

impl Default for TrackballConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            poll_ms: default_poll_ms(),
        }
    }
}

// ── Config repository ─────────────────────────────────────────────────────────

/// Resolves the default config file path for this platform.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] when the base directory cannot
/// be determined from the environment.
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    platform_config_dir()
        .map(|dir| dir.join("config.toml"))
        .ok_or(ConfigError::NoPlatformConfigDir)
}

/// Loads the config at `path`, returning [`SkinConfig::default`] if the file
/// does not exist yet.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config(path: &Path) -> Result<SkinConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(toml::from_str(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(SkinConfig::default()),
        Err(e) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Writes `config` to `path`, creating parent directories as needed.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system failures or
/// [`ConfigError::Serialize`] if serialization fails.
pub fn save_config(path: &Path, config: &SkinConfig) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("DeviceSkin"))
    }

    #[cfg(target_os = "linux")]
    {
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("deviceskin"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("DeviceSkin")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
