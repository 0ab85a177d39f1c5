//! Error types for Kennel configuration and startup

use thiserror::Error;

/// Error thrown when a configuration value is out of range
#[derive(Debug, Error)]
#[error("Invalid value for '{field}': {reason}")]
pub struct InvalidConfigValueError {
    pub field: String,
    pub reason: String,
}

/// General Kennel error type
#[derive(Debug, Error)]
pub enum KennelError {
    #[error(transparent)]
    InvalidConfigValue(#[from] InvalidConfigValueError),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, KennelError>;
