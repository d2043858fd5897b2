//! Engine settings file
//!
//! A settings file is a policy table plus optional `[[hooks]]` entries:
//!
//! ```toml
//! [types.post]
//! post_thumbnail = true
//!
//! [[hooks]]
//! event = "document-created"
//! command = "notify-translators"
//! args = ["${TARGET_SITE}", "${TARGET_ID}"]
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use autopost_meta::PolicyTable;

use crate::Result;
use crate::hooks::HookConfig;

/// Policy table and command hooks loaded together
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(flatten)]
    pub policy: PolicyTable,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hooks: Vec<HookConfig>,
}

impl Settings {
    /// Parse settings from a TOML string
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| autopost_meta::Error::Toml(e).into())
    }

    /// Load settings, detecting the format from the file extension.
    ///
    /// The policy part is validated; every problem is reported at once.
    pub fn load(path: &Path) -> Result<Self> {
        let settings: Settings = autopost_meta::load_file(path)?;
        settings.policy.validate()?;
        tracing::debug!(
            "Loaded {} policy types and {} hooks from {}",
            settings.policy.types.len(),
            settings.hooks.len(),
            path.display()
        );
        Ok(settings)
    }
}
