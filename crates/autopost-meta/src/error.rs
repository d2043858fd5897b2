//! Error types for autopost-meta

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {format} policy at {path}: {message}")]
    ConfigParse {
        path: PathBuf,
        format: String,
        message: String,
    },

    #[error("Unsupported policy format: {extension}")]
    UnsupportedFormat { extension: String },

    #[error("Invalid field policy: {}", issues.join("; "))]
    InvalidPolicy { issues: Vec<String> },

    #[error("Unknown field category: {name}")]
    UnknownCategory { name: String },

    #[error(transparent)]
    Toml(#[from] toml::de::Error),
}
