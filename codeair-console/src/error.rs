//! Error types for the console binary.

use crate::api_client::ApiClientError;
use crate::config::ConfigError;
use crate::logging::LoggingError;
use crate::persistence::PersistenceError;

#[derive(Debug, thiserror::Error)]
pub enum ConsoleError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Api(#[from] ApiClientError),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
    #[error(transparent)]
    Logging(#[from] LoggingError),
}
