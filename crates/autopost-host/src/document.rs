//! Document model
//!
//! A [`Document`] is a content item owned by exactly one site. Attachments
//! are documents too (type `attachment`) and point at their owner through
//! `parent`.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ids::{DocId, TermId};

/// Meta key holding a document's thumbnail attachment id
pub const THUMBNAIL_META_KEY: &str = "_thumbnail_id";

/// Publication status of a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DocumentStatus {
    Publish,
    Future,
    #[default]
    Draft,
    Pending,
    Private,
    Trash,
    AutoDraft,
    /// Attachments and revisions inherit their parent's status
    Inherit,
}

impl DocumentStatus {
    /// Every status name accepted by [`FromStr`]
    pub fn all_names() -> &'static [&'static str] {
        &[
            "publish",
            "future",
            "draft",
            "pending",
            "private",
            "trash",
            "auto-draft",
            "inherit",
        ]
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Publish => "publish",
            Self::Future => "future",
            Self::Draft => "draft",
            Self::Pending => "pending",
            Self::Private => "private",
            Self::Trash => "trash",
            Self::AutoDraft => "auto-draft",
            Self::Inherit => "inherit",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for DocumentStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "publish" => Ok(Self::Publish),
            "future" => Ok(Self::Future),
            "draft" => Ok(Self::Draft),
            "pending" => Ok(Self::Pending),
            "private" => Ok(Self::Private),
            "trash" => Ok(Self::Trash),
            "auto-draft" => Ok(Self::AutoDraft),
            "inherit" => Ok(Self::Inherit),
            other => Err(format!("unknown document status '{}'", other)),
        }
    }
}

/// A stored document
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Document {
    pub id: DocId,
    #[serde(rename = "type")]
    pub doc_type: String,
    #[serde(default)]
    pub status: DocumentStatus,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub excerpt: String,
    #[serde(default)]
    pub author: u64,
    /// Slug
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub date: NaiveDateTime,
    #[serde(default)]
    pub modified: NaiveDateTime,
    #[serde(default)]
    pub modified_gmt: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<DocId>,
    /// Historical revision snapshot rather than the live document
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_revision: bool,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub meta: BTreeMap<String, Value>,
    /// Assigned term ids keyed by taxonomy
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub terms: BTreeMap<String, Vec<TermId>>,
    /// Materialized values of extended structured fields
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: BTreeMap<String, Value>,
}

impl Document {
    /// Create a document with the given id and type and default fields
    pub fn new(id: DocId, doc_type: impl Into<String>) -> Self {
        Self {
            id,
            doc_type: doc_type.into(),
            ..Default::default()
        }
    }

    /// Thumbnail attachment id, if one is set
    pub fn thumbnail(&self) -> Option<DocId> {
        self.meta.get(THUMBNAIL_META_KEY).and_then(DocId::from_meta)
    }
}

/// Fields of a document to be created
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NewDocument {
    pub doc_type: String,
    pub status: DocumentStatus,
    pub title: String,
    pub content: String,
    pub excerpt: String,
    pub author: u64,
    pub name: String,
    pub date: NaiveDateTime,
    pub modified: NaiveDateTime,
    pub modified_gmt: DateTime<Utc>,
    /// Meta written together with the document
    pub meta: BTreeMap<String, Value>,
}

/// Partial update of a document's text fields
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DocumentPatch {
    pub title: Option<String>,
    pub content: Option<String>,
}

impl DocumentPatch {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }

    pub fn content(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Default::default()
        }
    }
}

/// Whether a stored value counts as empty.
///
/// Empty values are never copied; their absence propagates as deletion.
/// Missing, `null`, `""`, `"0"`, `0`, `false`, `[]` and `{}` are empty.
pub fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::Bool(b)) => !b,
        Some(Value::Number(n)) => n.as_f64() == Some(0.0),
        Some(Value::String(s)) => s.is_empty() || s == "0",
        Some(Value::Array(items)) => items.is_empty(),
        Some(Value::Object(map)) => map.is_empty(),
    }
}
