//! Error types for autopost-cli

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors that can occur in CLI operations
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Error from autopost-core
    #[error(transparent)]
    Core(#[from] autopost_core::Error),

    /// Error from autopost-host
    #[error(transparent)]
    Host(#[from] autopost_host::Error),

    /// Error from autopost-meta
    #[error(transparent)]
    Policy(#[from] autopost_meta::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON output error
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// User-facing error with a message
    #[error("{message}")]
    User { message: String },
}

impl CliError {
    /// Create a new user error with the given message
    pub fn user(message: impl Into<String>) -> Self {
        Self::User {
            message: message.into(),
        }
    }
}
