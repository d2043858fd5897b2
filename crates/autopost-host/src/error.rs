//! Error types for autopost-host

use std::path::PathBuf;

use crate::ids::{DocId, SiteId};

/// Result type for autopost-host operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in autopost-host operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {format} snapshot at {path}: {message}")]
    SnapshotParse {
        path: PathBuf,
        format: String,
        message: String,
    },

    #[error("Failed to serialize {format} snapshot at {path}: {message}")]
    SnapshotSerialize {
        path: PathBuf,
        format: String,
        message: String,
    },

    #[error("Unsupported snapshot format: {extension}")]
    UnsupportedFormat { extension: String },

    #[error("Unknown site: {site}")]
    UnknownSite { site: SiteId },

    #[error("Document {id} not found on site {site}")]
    DocumentNotFound { site: SiteId, id: DocId },

    /// A write addressed a site other than the one currently switched to
    #[error("Write to site {requested} while site {current} is current")]
    WrongSite { requested: SiteId, current: SiteId },

    #[error("Site context restored with no matching switch")]
    UnbalancedRestore,

    #[error("Relation registry error: {message}")]
    Registry { message: String },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
