//! The Field Policy Table
//!
//! Maps document types to their [`TypePolicy`]. Types absent from the table
//! are never replicated.
//!
//! ```toml
//! [types.post]
//! post_status = "publish"
//! post_thumbnail = true
//! taxonomies = true
//! meta = ["subtitle"]
//! relational_meta = ["related_posts"]
//!
//! [types.post.permanent]
//! post_title = true
//! meta = ["price"]
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::Result;
use crate::loader::load_file;
use crate::policy::TypePolicy;
use crate::validation::validate;

/// Field policies keyed by document type
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyTable {
    #[serde(default)]
    pub types: BTreeMap<String, TypePolicy>,
}

impl PolicyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the policy of one type
    pub fn with_type(mut self, doc_type: impl Into<String>, policy: TypePolicy) -> Self {
        self.types.insert(doc_type.into(), policy);
        self
    }

    /// Parse a table from TOML content
    ///
    /// # Example
    ///
    /// ```
    /// use autopost_meta::PolicyTable;
    ///
    /// let table = PolicyTable::parse(r#"
    /// [types.post]
    /// post_thumbnail = true
    /// "#).unwrap();
    ///
    /// assert!(table.get("post").unwrap().post_thumbnail);
    /// assert!(table.get("page").is_none());
    /// ```
    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load a table from a `.toml`, `.json` or `.yaml` file
    pub fn load(path: &Path) -> Result<Self> {
        let table: Self = load_file(path)?;
        tracing::debug!(
            "Loaded field policy for {} type(s) from {}",
            table.types.len(),
            path.display()
        );
        Ok(table)
    }

    pub fn get(&self, doc_type: &str) -> Option<&TypePolicy> {
        self.types.get(doc_type)
    }

    pub fn contains(&self, doc_type: &str) -> bool {
        self.types.contains_key(doc_type)
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Apply external per-type overrides.
    ///
    /// A type present in `overrides` replaces this table's entry for that
    /// type entirely; other types are kept.
    pub fn merge(&mut self, overrides: &PolicyTable) {
        for (doc_type, policy) in &overrides.types {
            if self.types.insert(doc_type.clone(), policy.clone()).is_some() {
                tracing::debug!("Field policy for '{}' overridden", doc_type);
            }
        }
    }

    /// Check the table for contradictions, reporting every problem found
    pub fn validate(&self) -> Result<()> {
        let issues = validate(self);
        if issues.is_empty() {
            Ok(())
        } else {
            Err(crate::Error::InvalidPolicy {
                issues: issues.iter().map(ToString::to_string).collect(),
            })
        }
    }
}
