//! Error types for autopost-core

/// Result type for autopost-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in autopost-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A command hook exited unsuccessfully
    #[error("Hook '{event}' command '{command}' failed: {message}")]
    HookFailed {
        event: String,
        command: String,
        message: String,
    },

    /// Error from the host platform
    #[error(transparent)]
    Host(#[from] autopost_host::Error),

    /// Error from policy configuration
    #[error(transparent)]
    Policy(#[from] autopost_meta::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
