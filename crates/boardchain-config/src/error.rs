//! Configuration error types

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),

    #[error("XDG directory error: {0}")]
    Xdg(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
