//! Network snapshots on disk
//!
//! A snapshot bundles a [`MemoryNetwork`] with its [`MemoryRegistry`] so a
//! whole network can be replayed from a file. Format follows the file
//! extension: `.json`, or `.yaml`/`.yml`.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::memory::{MemoryNetwork, MemoryRegistry};

/// A network together with its relation registry
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct NetworkSnapshot {
    pub network: MemoryNetwork,
    #[serde(default)]
    pub registry: MemoryRegistry,
}

impl NetworkSnapshot {
    /// Load a snapshot, detecting the format from the extension
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;

        match extension(path).as_str() {
            "json" => serde_json::from_str(&content).map_err(|e| Error::SnapshotParse {
                path: path.to_path_buf(),
                format: "JSON".into(),
                message: e.to_string(),
            }),
            "yaml" | "yml" => serde_yaml::from_str(&content).map_err(|e| Error::SnapshotParse {
                path: path.to_path_buf(),
                format: "YAML".into(),
                message: e.to_string(),
            }),
            other => Err(Error::UnsupportedFormat {
                extension: other.to_string(),
            }),
        }
    }

    /// Save a snapshot, choosing the format from the extension
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = match extension(path).as_str() {
            "json" => serde_json::to_string_pretty(self).map_err(|e| Error::SnapshotSerialize {
                path: path.to_path_buf(),
                format: "JSON".into(),
                message: e.to_string(),
            })?,
            "yaml" | "yml" => serde_yaml::to_string(self).map_err(|e| Error::SnapshotSerialize {
                path: path.to_path_buf(),
                format: "YAML".into(),
                message: e.to_string(),
            })?,
            other => {
                return Err(Error::UnsupportedFormat {
                    extension: other.to_string(),
                });
            }
        };

        fs::write(path, content).map_err(|e| Error::io(path, e))?;
        tracing::debug!("Wrote network snapshot to {}", path.display());
        Ok(())
    }
}

fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}
