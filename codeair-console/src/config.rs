//! Configuration loading for the CodeAir console.
//!
//! All fields are required. No defaults.

use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const CONFIG_ENV: &str = "CODEAIR_CONSOLE_CONFIG";

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConsoleConfig {
    /// REST API root, e.g. `http://localhost:8000/api/v1`.
    pub api_base_url: String,
    /// Origin prefixed to console hrefs when opening them in a browser.
    pub web_base_url: String,
    pub request_timeout_ms: u64,
    pub tick_rate_ms: u64,
    /// Number of recent job logs shown on the agent page.
    pub job_log_limit: u32,
    pub session_path: PathBuf,
    pub log_path: PathBuf,
    pub export_dir: PathBuf,
    pub log_level: String,
    pub theme: ThemeConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ThemeConfig {
    pub name: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing configuration file path (use --config or CODEAIR_CONSOLE_CONFIG)")]
    MissingConfigPath,
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid config value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

impl ConsoleConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let path = config_path_from_args().or_else(config_path_from_env);
        let path = path.ok_or(ConfigError::MissingConfigPath)?;
        let config = Self::from_path(&path)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: ConsoleConfig = toml::from_str(contents)?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_http_url("api_base_url", &self.api_base_url)?;
        validate_http_url("web_base_url", &self.web_base_url)?;
        if self.request_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "request_timeout_ms",
                reason: "must be > 0".to_string(),
            });
        }
        if self.tick_rate_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "tick_rate_ms",
                reason: "must be > 0".to_string(),
            });
        }
        if !(1..=100).contains(&self.job_log_limit) {
            return Err(ConfigError::InvalidValue {
                field: "job_log_limit",
                reason: "must be between 1 and 100".to_string(),
            });
        }
        if self.session_path.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "session_path",
                reason: "must not be empty".to_string(),
            });
        }
        if self.log_path.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "log_path",
                reason: "must not be empty".to_string(),
            });
        }
        if self.export_dir.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "export_dir",
                reason: "must not be empty".to_string(),
            });
        }
        if self.log_level.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "log_level",
                reason: "must not be empty".to_string(),
            });
        }
        if tracing_subscriber::EnvFilter::try_new(&self.log_level).is_err() {
            return Err(ConfigError::InvalidValue {
                field: "log_level",
                reason: format!("'{}' is not a valid filter directive", self.log_level),
            });
        }
        if self.theme.name.to_ascii_lowercase() != "synthbrute" {
            return Err(ConfigError::InvalidValue {
                field: "theme.name",
                reason: "only 'synthbrute' is supported".to_string(),
            });
        }
        Ok(())
    }

    /// Absolute web URL for a console href.
    pub fn web_url(&self, href: &str) -> String {
        format!("{}{}", self.web_base_url.trim_end_matches('/'), href)
    }
}

fn validate_http_url(field: &'static str, value: &str) -> Result<(), ConfigError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ConfigError::InvalidValue {
            field,
            reason: "must not be empty".to_string(),
        });
    }
    if !(value.starts_with("http://") || value.starts_with("https://")) {
        return Err(ConfigError::InvalidValue {
            field,
            reason: "must start with http:// or https://".to_string(),
        });
    }
    Ok(())
}

fn config_path_from_env() -> Option<PathBuf> {
    std::env::var(CONFIG_ENV).ok().map(PathBuf::from)
}

fn config_path_from_args() -> Option<PathBuf> {
    flag_value(std::env::args().skip(1), "--config").map(PathBuf::from)
}

/// Href given with `--open`, overriding the restored location.
pub fn open_href_from_args() -> Option<String> {
    flag_value(std::env::args().skip(1), "--open")
}

/// Value following `flag` in an argument list.
pub fn flag_value<I>(args: I, flag: &str) -> Option<String>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        if arg == flag {
            return args.next();
        }
    }
    None
}
