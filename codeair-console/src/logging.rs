//! File-based tracing setup. The terminal belongs to the UI, so nothing is
//! ever written to stdout or stderr.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Overrides the configured `log_level` when set.
pub const LOG_ENV: &str = "CODEAIR_CONSOLE_LOG";

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("failed to open log file {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid log filter: {0}")]
    Filter(String),
    #[error("failed to install subscriber: {0}")]
    Install(String),
}

/// Build the filter from `CODEAIR_CONSOLE_LOG`, falling back to `default_level`.
pub fn env_filter(default_level: &str) -> Result<EnvFilter, LoggingError> {
    match std::env::var(LOG_ENV) {
        Ok(directives) if !directives.trim().is_empty() => {
            EnvFilter::try_new(directives).map_err(|err| LoggingError::Filter(err.to_string()))
        }
        _ => EnvFilter::try_new(default_level).map_err(|err| LoggingError::Filter(err.to_string())),
    }
}

/// Append logs to `path`, creating parent directories as needed.
pub fn init(path: &Path, default_level: &str) -> Result<(), LoggingError> {
    let open_error = |source| LoggingError::Open {
        path: path.display().to_string(),
        source,
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(open_error)?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(open_error)?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter(default_level)?)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .map_err(|err| LoggingError::Install(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_level_parses() {
        assert!(env_filter("info,codeair_console=debug").is_ok());
    }

    #[test]
    fn test_init_creates_log_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("console.log");
        // Another test may already own the global subscriber; the file is
        // opened either way.
        let _ = init(&path, "debug");
        assert!(path.exists());
    }
}
