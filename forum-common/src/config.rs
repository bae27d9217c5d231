//! Configuration loading and resolution
//!
//! Every setting resolves in this priority order:
//! 1. Command-line argument / environment variable (both arrive through clap)
//! 2. TOML config file
//! 3. OS-dependent compiled default (fallback)
//!
//! A missing config file is not an error: the service logs a warning and
//! starts on defaults. A config file that exists but does not parse is.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Default listen address for the service
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:5740";

/// Default base URL of the discussions micro-frontend
pub const DEFAULT_DISCUSSIONS_MFE_URL: &str = "http://localhost:2002/discussions";

/// Default event bus capacity
pub const DEFAULT_EVENT_BUS_CAPACITY: usize = 1000;

/// Directory name used under the platform config/data folders
const APP_DIR: &str = "forum-svc";

/// Contents of the optional TOML config file
///
/// All fields are optional; anything absent falls through to compiled defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub bind_addr: Option<String>,
    pub database_path: Option<PathBuf>,
    pub discussions_mfe_url: Option<String>,
    pub event_bus_capacity: Option<usize>,
    pub log_level: Option<String>,
    pub labels: LabelConfig,
}

/// Localizable labels used when building notification context
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LabelConfig {
    pub your: Option<String>,
    pub their: Option<String>,
}

/// Values supplied on the command line (clap folds environment variables in)
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub config_file: Option<PathBuf>,
    pub bind_addr: Option<String>,
    pub database_path: Option<PathBuf>,
    pub discussions_mfe_url: Option<String>,
    pub log_level: Option<String>,
}

/// Fully resolved service configuration
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub bind_addr: String,
    pub database_path: PathBuf,
    pub discussions_mfe_url: String,
    pub event_bus_capacity: usize,
    pub log_level: String,
    pub your_label: String,
    pub their_label: String,
}

/// Settings handed to the notification dispatcher at construction
#[derive(Debug, Clone)]
pub struct NotificationConfig {
    /// Base URL of the discussions micro-frontend, no trailing slash
    pub discussions_mfe_url: String,
    /// Possessive used when the response author also wrote the thread
    pub your_label: String,
    /// Possessive used when the comment author also wrote the response
    pub their_label: String,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            discussions_mfe_url: DEFAULT_DISCUSSIONS_MFE_URL.to_string(),
            your_label: "your".to_string(),
            their_label: "their".to_string(),
        }
    }
}

impl ServiceConfig {
    /// Resolve configuration from overrides, the TOML file and defaults
    pub fn resolve(overrides: ConfigOverrides) -> Result<Self> {
        let toml_config = match overrides.config_file.clone().or_else(default_config_path) {
            Some(path) => load_toml_config(&path)?,
            None => TomlConfig::default(),
        };
        Ok(Self::merge(overrides, toml_config))
    }

    /// Merge already-loaded sources; overrides win over the TOML file
    pub fn merge(overrides: ConfigOverrides, file: TomlConfig) -> Self {
        Self {
            bind_addr: overrides
                .bind_addr
                .or(file.bind_addr)
                .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            database_path: overrides
                .database_path
                .or(file.database_path)
                .unwrap_or_else(default_database_path),
            discussions_mfe_url: overrides
                .discussions_mfe_url
                .or(file.discussions_mfe_url)
                .unwrap_or_else(|| DEFAULT_DISCUSSIONS_MFE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            event_bus_capacity: file
                .event_bus_capacity
                .filter(|c| *c > 0)
                .unwrap_or(DEFAULT_EVENT_BUS_CAPACITY),
            log_level: overrides
                .log_level
                .or(file.log_level)
                .unwrap_or_else(|| "info".to_string()),
            your_label: file.labels.your.unwrap_or_else(|| "your".to_string()),
            their_label: file.labels.their.unwrap_or_else(|| "their".to_string()),
        }
    }

    pub fn notification_config(&self) -> NotificationConfig {
        NotificationConfig {
            discussions_mfe_url: self.discussions_mfe_url.clone(),
            your_label: self.your_label.clone(),
            their_label: self.their_label.clone(),
        }
    }
}

/// Load the TOML config file
///
/// Missing file → warning and empty config. Unparseable file → `Error::Config`.
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    if !path.exists() {
        warn!("Config file not found at {}, using defaults", path.display());
        return Ok(TomlConfig::default());
    }

    let content = std::fs::read_to_string(path)?;
    let config = toml::from_str::<TomlConfig>(&content)
        .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
    info!("Loaded config file: {}", path.display());
    Ok(config)
}

/// Platform config file location (`<config dir>/forum-svc/config.toml`)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_DIR).join("config.toml"))
}

/// OS-dependent default database location
fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from("./forum_data"))
        .join("forum.db")
}
