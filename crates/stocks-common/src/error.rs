//! Error types shared across the workspace

use thiserror::Error;

/// Result type alias for shared operations
pub type Result<T> = std::result::Result<T, StocksError>;

/// Workspace-wide error type for configuration faults
#[derive(Error, Debug)]
pub enum StocksError {
    #[error("Configuration error: {0}")]
    Config(String),
}

impl StocksError {
    /// Build a configuration error for an environment variable that failed to parse
    pub fn invalid_env(name: &str, value: &str, reason: impl std::fmt::Display) -> Self {
        StocksError::Config(format!("{name}={value:?} is invalid: {reason}"))
    }
}
