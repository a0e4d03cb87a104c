//! Configuration management (config.toml)
//!
//! Handles loading, saving, and providing defaults for host settings.
//! Settings are stored in TOML format in the platform-specific config directory.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::HostError;

/// Host configuration.
///
/// Every section is optional in the file; missing values take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub pacing: PacingConfig,
    #[serde(default)]
    pub log: LogConfig,
    /// Persisted emulation menu toggles
    #[serde(default)]
    pub menu: MenuSettings,
}

/// Session controller settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Name given to the thread running the engine loop (default: "NativeEmulation")
    #[serde(default = "default_thread_name")]
    pub execution_thread_name: String,
    /// Maximum number of queued diagnostics; oldest are dropped (default: 64)
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

/// Frame pacing settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PacingConfig {
    /// Whether the host drives `do_frame` at all (default: true)
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Display refresh rate in Hz (default: 60)
    #[serde(default = "default_refresh_rate")]
    pub refresh_rate: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    /// Fallback `EnvFilter` directive when RUST_LOG is unset (default: "info")
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

/// Emulation menu toggles.
///
/// Only stored here; the overlay and layout code that reads them lives in the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuSettings {
    #[serde(default = "default_true")]
    pub joystick_relative_center: bool,
    #[serde(default = "default_true")]
    pub dpad_slide: bool,
    #[serde(default)]
    pub landscape_layout: u32,
    #[serde(default)]
    pub swap_screens: bool,
    #[serde(default = "default_true")]
    pub show_overlay: bool,
}

fn default_thread_name() -> String {
    "NativeEmulation".to_string()
}
fn default_event_capacity() -> usize {
    64
}
fn default_refresh_rate() -> u32 {
    60
}
fn default_log_filter() -> String {
    "info".to_string()
}
fn default_true() -> bool {
    true
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            execution_thread_name: default_thread_name(),
            event_capacity: default_event_capacity(),
        }
    }
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            refresh_rate: default_refresh_rate(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

impl Default for MenuSettings {
    fn default() -> Self {
        Self {
            joystick_relative_center: default_true(),
            dpad_slide: default_true(),
            landscape_layout: 0,
            swap_screens: false,
            show_overlay: default_true(),
        }
    }
}

/// Returns the platform-specific configuration directory.
///
/// On Linux: `~/.config/Emuhost`
///
/// Returns `None` if the home directory cannot be determined.
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("io.emuhost", "", "Emuhost")
        .map(|dirs| dirs.config_dir().to_path_buf())
}

/// Loads the configuration from disk.
///
/// Returns default values if the file doesn't exist or cannot be parsed.
pub fn load() -> Config {
    match config_dir() {
        Some(dir) => load_from(&dir.join("config.toml")).unwrap_or_else(|e| {
            tracing::debug!("Using default config: {}", e);
            Config::default()
        }),
        None => Config::default(),
    }
}

/// Reads and parses a specific config file.
pub fn load_from(path: &Path) -> Result<Config, HostError> {
    let content = std::fs::read_to_string(path).map_err(|source| HostError::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| HostError::ConfigParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Saves the configuration to the platform config directory.
pub fn save(config: &Config) -> Result<(), HostError> {
    let dir = config_dir().ok_or(HostError::NoConfigDir)?;
    save_to(config, &dir.join("config.toml"))
}

/// Writes `config` to `path`, creating parent directories as needed.
pub fn save_to(config: &Config, path: &Path) -> Result<(), HostError> {
    let write_err = |source| HostError::ConfigWrite {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(write_err)?;
    }
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content).map_err(write_err)
}
