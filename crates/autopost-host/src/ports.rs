//! Contracts the replication engine consumes from the host platform
//!
//! Every store operation names the site it addresses. Hosts that keep an
//! ambient "current site" (as the in-memory network does) reject
//! operations addressed to any other site, so callers are expected to
//! [`SiteContext::switch_to`] first and [`SiteContext::restore`] after.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::document::{Document, DocumentPatch, NewDocument};
use crate::error::Result;
use crate::ids::{DocId, EntityKind, SiteId, TermId};

/// Execution context: which site operations currently run against
pub trait SiteContext {
    /// All sites of the network in stable enumeration order
    fn sites(&self) -> Vec<SiteId>;

    /// Site operations currently run against
    fn current_site(&self) -> SiteId;

    /// Make `site` current, remembering the previous one
    fn switch_to(&mut self, site: SiteId) -> Result<()>;

    /// Return to the site that was current before the matching switch
    fn restore(&mut self) -> Result<()>;
}

/// Document persistence
pub trait DocumentStore {
    fn read(&self, site: SiteId, id: DocId) -> Result<Option<Document>>;

    fn create(&mut self, site: SiteId, document: NewDocument) -> Result<DocId>;

    fn update(&mut self, site: SiteId, id: DocId, patch: DocumentPatch) -> Result<()>;

    /// Whether `id` is a historical revision snapshot
    fn is_revision(&self, site: SiteId, id: DocId) -> Result<bool>;
}

/// Raw key/value metadata of documents
pub trait MetaStore {
    fn get_meta(&self, site: SiteId, id: DocId, key: &str) -> Result<Option<Value>>;

    fn update_meta(&mut self, site: SiteId, id: DocId, key: &str, value: Value) -> Result<()>;

    fn delete_meta(&mut self, site: SiteId, id: DocId, key: &str) -> Result<()>;
}

/// Taxonomy term assignments
pub trait TaxonomyStore {
    /// Taxonomies registered for a document type
    fn taxonomies_for(&self, site: SiteId, doc_type: &str) -> Result<Vec<String>>;

    fn assigned_terms(&self, site: SiteId, id: DocId, taxonomy: &str) -> Result<Vec<TermId>>;

    /// Replace (not extend) the assignments of one taxonomy
    fn replace_terms(
        &mut self,
        site: SiteId,
        id: DocId,
        taxonomy: &str,
        terms: &[TermId],
    ) -> Result<()>;
}

/// Attached files
pub trait AttachmentStore {
    /// Attachments whose parent is `parent`
    fn attachments_of(&self, site: SiteId, parent: DocId) -> Result<Vec<DocId>>;

    fn parent_of(&self, site: SiteId, attachment: DocId) -> Result<Option<DocId>>;

    fn set_parent(&mut self, site: SiteId, attachment: DocId, parent: DocId) -> Result<()>;
}

/// Optional structured-field extension (repeaters and similar).
///
/// Values are materialized field values, distinct from raw metadata.
pub trait FieldStore {
    fn get_field(&self, site: SiteId, id: DocId, name: &str) -> Result<Option<Value>>;

    fn update_field(&mut self, site: SiteId, id: DocId, name: &str, value: Value) -> Result<()>;

    fn delete_field(&mut self, site: SiteId, id: DocId, name: &str) -> Result<()>;
}

/// Everything the engine needs from the host platform
pub trait Host: SiteContext + DocumentStore + MetaStore + TaxonomyStore + AttachmentStore {
    /// Structured-field extension, when installed
    fn field_store(&mut self) -> Option<&mut dyn FieldStore> {
        None
    }
}

/// Site → linked id for one entity, including the entity's own site
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LinkSet(BTreeMap<SiteId, DocId>);

impl LinkSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, site: SiteId) -> Option<DocId> {
        self.0.get(&site).copied()
    }

    pub fn contains(&self, site: SiteId) -> bool {
        self.0.contains_key(&site)
    }

    /// Insert a link, returning the id it replaced
    pub fn insert(&mut self, site: SiteId, id: DocId) -> Option<DocId> {
        self.0.insert(site, id)
    }

    pub fn remove(&mut self, site: SiteId) -> Option<DocId> {
        self.0.remove(&site)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SiteId, DocId)> + '_ {
        self.0.iter().map(|(site, id)| (*site, *id))
    }
}

impl FromIterator<(SiteId, DocId)> for LinkSet {
    fn from_iter<I: IntoIterator<Item = (SiteId, DocId)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Cross-site identity map
pub trait RelationRegistry {
    /// Link Set of `id` on `source_site`; empty when it has no links
    fn links(&self, source_site: SiteId, id: DocId, kind: EntityKind) -> Result<LinkSet>;

    /// Record that `source_id` on `source_site` and `target_id` on
    /// `target_site` are the same entity
    fn set_link(
        &mut self,
        source_site: SiteId,
        target_site: SiteId,
        source_id: DocId,
        target_id: DocId,
        kind: EntityKind,
    ) -> Result<()>;
}
