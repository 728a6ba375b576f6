//! Runtime configuration.
//!
//! Read from `task_dashboard.toml` in the working directory when it exists,
//! otherwise defaults. `TASK_DASHBOARD_LOG_LEVEL` and `TASK_DASHBOARD_LOG_DIR`
//! override the logging section.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::app::models::{Criterion, FilterSpec};
use crate::error::ConfigError;

pub const DEFAULT_CONFIG_FILE: &str = "task_dashboard.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_tick_rate_ms")]
    pub tick_rate_ms: u64,

    #[serde(default = "default_seed_sample_tasks")]
    pub seed_sample_tasks: bool,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub filter: FilterConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_dir")]
    pub dir: String,
}

// Initial filter, as written in the file. Unknown values stay unknown and match nothing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterConfig {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub search: Option<String>,
}

fn default_tick_rate_ms() -> u64 {
    250
}

fn default_seed_sample_tasks() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_dir() -> String {
    "logs".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: default_tick_rate_ms(),
            seed_sample_tasks: default_seed_sample_tasks(),
            logging: LoggingConfig::default(),
            filter: FilterConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            dir: default_log_dir(),
        }
    }
}

impl AppConfig {
    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.tick_rate_ms)
    }

    fn validate(self) -> Result<Self, ConfigError> {
        if self.tick_rate_ms == 0 {
            return Err(ConfigError::Invalid("tick_rate_ms must be positive".to_string()));
        }
        if self.logging.dir.trim().is_empty() {
            return Err(ConfigError::Invalid("logging.dir cannot be empty".to_string()));
        }
        Ok(self)
    }
}

impl FilterConfig {
    pub fn to_spec(&self) -> FilterSpec {
        FilterSpec {
            category: self.category.as_deref().map(Criterion::parse),
            priority: self.priority.as_deref().map(Criterion::parse),
            status: self.status.as_deref().map(Criterion::parse),
            search: self.search.clone(),
        }
    }
}

pub fn parse(text: &str, path: &Path) -> Result<AppConfig, ConfigError> {
    let cfg = toml::from_str::<AppConfig>(text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    cfg.validate()
}

// Missing file means defaults; an unreadable or malformed one is an error
pub fn load_from(path: &Path) -> Result<AppConfig, ConfigError> {
    if !path.exists() {
        return AppConfig::default().validate();
    }
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&text, path)
}

pub fn load_default() -> Result<AppConfig, ConfigError> {
    let mut cfg = load_from(Path::new(DEFAULT_CONFIG_FILE))?;

    if let Ok(v) = std::env::var("TASK_DASHBOARD_LOG_LEVEL") {
        if !v.trim().is_empty() {
            cfg.logging.level = v;
        }
    }
    if let Ok(v) = std::env::var("TASK_DASHBOARD_LOG_DIR") {
        if !v.trim().is_empty() {
            cfg.logging.dir = v;
        }
    }

    cfg.validate()
}
