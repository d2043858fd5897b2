//! Per-type field policy
//!
//! A [`TypePolicy`] says which field categories of a document type are
//! copied when a linked copy is created and which stay synchronized on
//! every later save.
//!
//! # Precedence
//!
//! Permanent declarations override the type's initial declarations, which
//! override absence:
//!
//! - a new target receives a category declared initially **or**
//!   permanently (permanent implies initial);
//! - an existing target receives a category only if it is permanent;
//! - key lists for a new target are the union of initial and permanent
//!   keys, for an existing target the permanent keys alone.
//!
//! Title is always copied to a new target. Attachments are always
//! re-resolved. Body is copied to a new target unless `post_content` is
//! switched off, and [`TypePolicy::fills_empty_content`] lets the body
//! copier fill an existing target whose body is still empty.

use std::fmt;
use std::str::FromStr;

use autopost_host::DocumentStatus;
use serde::{Deserialize, Serialize};

use crate::error::Error;

fn default_true() -> bool {
    true
}

/// Field categories in the order the engine applies them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldCategory {
    Title,
    Content,
    Thumbnail,
    Taxonomies,
    Attachments,
    Meta,
    RelationalMeta,
    ExtendedFields,
}

impl FieldCategory {
    /// All categories in application order
    pub const ALL: [FieldCategory; 8] = [
        Self::Title,
        Self::Content,
        Self::Thumbnail,
        Self::Taxonomies,
        Self::Attachments,
        Self::Meta,
        Self::RelationalMeta,
        Self::ExtendedFields,
    ];

    /// Categories driven by a list of keys rather than a flag
    pub fn is_keyed(self) -> bool {
        matches!(self, Self::Meta | Self::RelationalMeta | Self::ExtendedFields)
    }
}

impl fmt::Display for FieldCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Title => "title",
            Self::Content => "content",
            Self::Thumbnail => "thumbnail",
            Self::Taxonomies => "taxonomies",
            Self::Attachments => "attachments",
            Self::Meta => "meta",
            Self::RelationalMeta => "relational-meta",
            Self::ExtendedFields => "extended-fields",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for FieldCategory {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.to_string() == s)
            .ok_or_else(|| Error::UnknownCategory {
                name: s.to_string(),
            })
    }
}

/// Categories kept synchronized on every save
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermanentPolicy {
    #[serde(default)]
    pub post_title: bool,
    #[serde(default)]
    pub post_content: bool,
    #[serde(default)]
    pub post_thumbnail: bool,
    #[serde(default)]
    pub taxonomies: bool,
    #[serde(default)]
    pub meta: Vec<String>,
    #[serde(default)]
    pub relational_meta: Vec<String>,
    #[serde(default)]
    pub extended_fields: Vec<String>,
}

/// Replication policy for one document type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypePolicy {
    /// Status of newly created copies
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_status: Option<DocumentStatus>,
    #[serde(default = "default_true")]
    pub post_content: bool,
    #[serde(default)]
    pub post_thumbnail: bool,
    #[serde(default)]
    pub taxonomies: bool,
    /// Scalar meta keys copied verbatim
    #[serde(default)]
    pub meta: Vec<String>,
    /// Meta keys holding document ids (or lists of them)
    #[serde(default)]
    pub relational_meta: Vec<String>,
    /// Structured fields copied through the field extension
    #[serde(default)]
    pub extended_fields: Vec<String>,
    #[serde(default)]
    pub permanent: PermanentPolicy,
}

impl Default for TypePolicy {
    fn default() -> Self {
        Self {
            post_status: None,
            post_content: true,
            post_thumbnail: false,
            taxonomies: false,
            meta: Vec::new(),
            relational_meta: Vec::new(),
            extended_fields: Vec::new(),
            permanent: PermanentPolicy::default(),
        }
    }
}

impl TypePolicy {
    /// Status given to new copies, draft unless configured
    pub fn creation_status(&self) -> DocumentStatus {
        self.post_status.unwrap_or(DocumentStatus::Draft)
    }

    /// Whether `category` applies to a target that is new (`is_new`) or
    /// already linked.
    ///
    /// Keyed categories apply when they resolve to at least one key. The
    /// thumbnail is re-resolved on every save once the type enables it.
    pub fn applies(&self, category: FieldCategory, is_new: bool) -> bool {
        let p = &self.permanent;
        match category {
            FieldCategory::Title => is_new || p.post_title,
            FieldCategory::Content => p.post_content || (is_new && self.post_content),
            FieldCategory::Thumbnail => p.post_thumbnail || self.post_thumbnail,
            FieldCategory::Taxonomies => p.taxonomies || (is_new && self.taxonomies),
            FieldCategory::Attachments => true,
            FieldCategory::Meta | FieldCategory::RelationalMeta | FieldCategory::ExtendedFields => {
                !self.keys(category, is_new).is_empty()
            }
        }
    }

    /// Whether the body may fill an existing copy whose body is empty
    pub fn fills_empty_content(&self) -> bool {
        self.post_content || self.permanent.post_content
    }

    /// Keys of a keyed category for a new or existing target.
    ///
    /// Permanent keys come first; duplicates are dropped. Flag categories
    /// have no keys.
    pub fn keys(&self, category: FieldCategory, is_new: bool) -> Vec<&str> {
        let (initial, permanent) = match category {
            FieldCategory::Meta => (&self.meta, &self.permanent.meta),
            FieldCategory::RelationalMeta => {
                (&self.relational_meta, &self.permanent.relational_meta)
            }
            FieldCategory::ExtendedFields => {
                (&self.extended_fields, &self.permanent.extended_fields)
            }
            _ => return Vec::new(),
        };

        let mut keys: Vec<&str> = Vec::new();
        let initial: &[String] = if is_new { initial } else { &[] };
        for key in permanent.iter().chain(initial) {
            if !keys.contains(&key.as_str()) {
                keys.push(key);
            }
        }
        keys
    }
}
