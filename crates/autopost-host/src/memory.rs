//! In-memory host platform and relation registry
//!
//! [`MemoryNetwork`] keeps every site's documents in memory and models the
//! host's ambient "current site" as a stack: [`SiteContext::switch_to`]
//! pushes, [`SiteContext::restore`] pops. Every store operation must
//! address the current site, which makes scope mistakes visible as
//! [`Error::WrongSite`] instead of silent cross-site writes.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::document::{Document, DocumentPatch, DocumentStatus, NewDocument};
use crate::error::{Error, Result};
use crate::ids::{DocId, EntityKind, SiteId, TermId};
use crate::ports::{
    AttachmentStore, DocumentStore, FieldStore, Host, LinkSet, MetaStore, RelationRegistry,
    SiteContext, TaxonomyStore,
};

const ATTACHMENT_TYPE: &str = "attachment";

/// Notification the host emits whenever a document is created or updated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveNotice {
    pub site: SiteId,
    pub id: DocId,
    pub created: bool,
}

/// Callback receiving [`SaveNotice`]s as they happen
pub type SaveObserver = Box<dyn FnMut(&SaveNotice)>;

/// One site of the in-memory network
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemorySite {
    #[serde(default)]
    pub name: String,
    /// Taxonomy name → document types it applies to
    #[serde(default)]
    pub taxonomies: BTreeMap<String, Vec<String>>,
    #[serde(default, with = "document_list")]
    documents: BTreeMap<DocId, Document>,
}

impl MemorySite {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn document(&self, id: DocId) -> Option<&Document> {
        self.documents.get(&id)
    }

    pub fn documents(&self) -> impl Iterator<Item = &Document> {
        self.documents.values()
    }

    fn next_id(&self) -> DocId {
        DocId(self.documents.keys().next_back().map_or(1, |id| id.0 + 1))
    }
}

/// In-memory multi-site host
#[derive(Default, Serialize, Deserialize)]
pub struct MemoryNetwork {
    sites: BTreeMap<SiteId, MemorySite>,
    /// Whether the structured-field extension is installed
    #[serde(default)]
    extended_fields: bool,
    #[serde(skip)]
    home: Option<SiteId>,
    #[serde(skip)]
    stack: Vec<SiteId>,
    #[serde(skip)]
    observer: Option<SaveObserver>,
}

impl fmt::Debug for MemoryNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryNetwork")
            .field("sites", &self.sites)
            .field("extended_fields", &self.extended_fields)
            .field("home", &self.home)
            .field("stack", &self.stack)
            .finish_non_exhaustive()
    }
}

impl MemoryNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or rename) a site
    pub fn add_site(&mut self, site: SiteId, name: impl Into<String>) -> &mut MemorySite {
        let entry = self.sites.entry(site).or_default();
        entry.name = name.into();
        entry
    }

    pub fn site(&self, site: SiteId) -> Option<&MemorySite> {
        self.sites.get(&site)
    }

    /// Register `taxonomy` for `doc_type` on every site
    pub fn register_taxonomy(&mut self, taxonomy: &str, doc_type: &str) {
        for site in self.sites.values_mut() {
            let types = site.taxonomies.entry(taxonomy.to_string()).or_default();
            if !types.iter().any(|t| t == doc_type) {
                types.push(doc_type.to_string());
            }
        }
    }

    /// Install or remove the structured-field extension
    pub fn set_extended_fields(&mut self, enabled: bool) {
        self.extended_fields = enabled;
    }

    /// Set the site requests run against when no switch is active
    pub fn set_current_site(&mut self, site: SiteId) {
        self.home = Some(site);
    }

    /// Number of switches not yet restored
    pub fn context_depth(&self) -> usize {
        self.stack.len()
    }

    /// Receive a [`SaveNotice`] for every document create and update
    pub fn on_save(&mut self, observer: SaveObserver) {
        self.observer = Some(observer);
    }

    /// Store a document as-is, bypassing site checks and notifications.
    ///
    /// A zero id is replaced with the site's next free id.
    pub fn insert_document(&mut self, site: SiteId, mut document: Document) -> Result<DocId> {
        let entry = self
            .sites
            .get_mut(&site)
            .ok_or(Error::UnknownSite { site })?;
        if document.id == DocId(0) {
            document.id = entry.next_id();
        }
        let id = document.id;
        entry.documents.insert(id, document);
        Ok(id)
    }

    /// Read a document regardless of the current site
    pub fn document(&self, site: SiteId, id: DocId) -> Option<&Document> {
        self.sites.get(&site).and_then(|s| s.document(id))
    }

    /// Mutable access regardless of the current site
    pub fn document_mut(&mut self, site: SiteId, id: DocId) -> Option<&mut Document> {
        self.sites
            .get_mut(&site)
            .and_then(|s| s.documents.get_mut(&id))
    }

    /// All documents of one site
    pub fn documents(&self, site: SiteId) -> Vec<&Document> {
        self.sites
            .get(&site)
            .map(|s| s.documents().collect())
            .unwrap_or_default()
    }

    /// Documents of `site` with the given status
    pub fn documents_with_status(&self, site: SiteId, status: DocumentStatus) -> Vec<&Document> {
        self.documents(site)
            .into_iter()
            .filter(|d| d.status == status)
            .collect()
    }

    fn ensure_current(&self, site: SiteId) -> Result<()> {
        let current = self.current_site();
        if site != current {
            return Err(Error::WrongSite {
                requested: site,
                current,
            });
        }
        Ok(())
    }

    fn site_ref(&self, site: SiteId) -> Result<&MemorySite> {
        self.ensure_current(site)?;
        self.sites.get(&site).ok_or(Error::UnknownSite { site })
    }

    fn doc_mut(&mut self, site: SiteId, id: DocId) -> Result<&mut Document> {
        self.ensure_current(site)?;
        self.sites
            .get_mut(&site)
            .ok_or(Error::UnknownSite { site })?
            .documents
            .get_mut(&id)
            .ok_or(Error::DocumentNotFound { site, id })
    }

    fn notify(&mut self, notice: SaveNotice) {
        if let Some(observer) = self.observer.as_mut() {
            observer(&notice);
        }
    }
}

impl SiteContext for MemoryNetwork {
    fn sites(&self) -> Vec<SiteId> {
        self.sites.keys().copied().collect()
    }

    fn current_site(&self) -> SiteId {
        self.stack
            .last()
            .copied()
            .or(self.home)
            .or_else(|| self.sites.keys().next().copied())
            .unwrap_or_default()
    }

    fn switch_to(&mut self, site: SiteId) -> Result<()> {
        if !self.sites.contains_key(&site) {
            return Err(Error::UnknownSite { site });
        }
        self.stack.push(site);
        Ok(())
    }

    fn restore(&mut self) -> Result<()> {
        self.stack.pop().map(|_| ()).ok_or(Error::UnbalancedRestore)
    }
}

impl DocumentStore for MemoryNetwork {
    fn read(&self, site: SiteId, id: DocId) -> Result<Option<Document>> {
        Ok(self.site_ref(site)?.document(id).cloned())
    }

    fn create(&mut self, site: SiteId, document: NewDocument) -> Result<DocId> {
        self.ensure_current(site)?;
        let entry = self
            .sites
            .get_mut(&site)
            .ok_or(Error::UnknownSite { site })?;
        let id = entry.next_id();
        entry.documents.insert(
            id,
            Document {
                id,
                doc_type: document.doc_type,
                status: document.status,
                title: document.title,
                content: document.content,
                excerpt: document.excerpt,
                author: document.author,
                name: document.name,
                date: document.date,
                modified: document.modified,
                modified_gmt: document.modified_gmt,
                meta: document.meta,
                ..Default::default()
            },
        );
        self.notify(SaveNotice {
            site,
            id,
            created: true,
        });
        Ok(id)
    }

    fn update(&mut self, site: SiteId, id: DocId, patch: DocumentPatch) -> Result<()> {
        let doc = self.doc_mut(site, id)?;
        if let Some(title) = patch.title {
            doc.title = title;
        }
        if let Some(content) = patch.content {
            doc.content = content;
        }
        self.notify(SaveNotice {
            site,
            id,
            created: false,
        });
        Ok(())
    }

    fn is_revision(&self, site: SiteId, id: DocId) -> Result<bool> {
        Ok(self
            .site_ref(site)?
            .document(id)
            .is_some_and(|d| d.is_revision))
    }
}

impl MetaStore for MemoryNetwork {
    fn get_meta(&self, site: SiteId, id: DocId, key: &str) -> Result<Option<Value>> {
        Ok(self
            .site_ref(site)?
            .document(id)
            .and_then(|d| d.meta.get(key).cloned()))
    }

    fn update_meta(&mut self, site: SiteId, id: DocId, key: &str, value: Value) -> Result<()> {
        self.doc_mut(site, id)?.meta.insert(key.to_string(), value);
        Ok(())
    }

    fn delete_meta(&mut self, site: SiteId, id: DocId, key: &str) -> Result<()> {
        self.doc_mut(site, id)?.meta.remove(key);
        Ok(())
    }
}

impl TaxonomyStore for MemoryNetwork {
    fn taxonomies_for(&self, site: SiteId, doc_type: &str) -> Result<Vec<String>> {
        Ok(self
            .site_ref(site)?
            .taxonomies
            .iter()
            .filter(|(_, types)| types.iter().any(|t| t == doc_type))
            .map(|(name, _)| name.clone())
            .collect())
    }

    fn assigned_terms(&self, site: SiteId, id: DocId, taxonomy: &str) -> Result<Vec<TermId>> {
        Ok(self
            .site_ref(site)?
            .document(id)
            .and_then(|d| d.terms.get(taxonomy).cloned())
            .unwrap_or_default())
    }

    fn replace_terms(
        &mut self,
        site: SiteId,
        id: DocId,
        taxonomy: &str,
        terms: &[TermId],
    ) -> Result<()> {
        let doc = self.doc_mut(site, id)?;
        if terms.is_empty() {
            doc.terms.remove(taxonomy);
        } else {
            doc.terms.insert(taxonomy.to_string(), terms.to_vec());
        }
        Ok(())
    }
}

impl AttachmentStore for MemoryNetwork {
    fn attachments_of(&self, site: SiteId, parent: DocId) -> Result<Vec<DocId>> {
        Ok(self
            .site_ref(site)?
            .documents()
            .filter(|d| d.doc_type == ATTACHMENT_TYPE && d.parent == Some(parent))
            .map(|d| d.id)
            .collect())
    }

    fn parent_of(&self, site: SiteId, attachment: DocId) -> Result<Option<DocId>> {
        Ok(self
            .site_ref(site)?
            .document(attachment)
            .and_then(|d| d.parent))
    }

    fn set_parent(&mut self, site: SiteId, attachment: DocId, parent: DocId) -> Result<()> {
        self.doc_mut(site, attachment)?.parent = Some(parent);
        Ok(())
    }
}

impl FieldStore for MemoryNetwork {
    fn get_field(&self, site: SiteId, id: DocId, name: &str) -> Result<Option<Value>> {
        Ok(self
            .site_ref(site)?
            .document(id)
            .and_then(|d| d.fields.get(name).cloned()))
    }

    fn update_field(&mut self, site: SiteId, id: DocId, name: &str, value: Value) -> Result<()> {
        self.doc_mut(site, id)?
            .fields
            .insert(name.to_string(), value);
        Ok(())
    }

    fn delete_field(&mut self, site: SiteId, id: DocId, name: &str) -> Result<()> {
        self.doc_mut(site, id)?.fields.remove(name);
        Ok(())
    }
}

impl Host for MemoryNetwork {
    fn field_store(&mut self) -> Option<&mut dyn FieldStore> {
        if self.extended_fields {
            Some(self)
        } else {
            None
        }
    }
}

/// In-memory relation registry.
///
/// Links are kept as groups of (site, id) pairs that are all the same
/// entity, so every lookup sees the whole group including its own site.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryRegistry {
    #[serde(default)]
    posts: Vec<LinkSet>,
    #[serde(default)]
    terms: Vec<LinkSet>,
    #[serde(skip)]
    writes: usize,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a group of linked entities
    pub fn link(&mut self, kind: EntityKind, entries: &[(SiteId, DocId)]) {
        for (site, id) in entries {
            self.detach(kind, *site, *id);
        }
        self.groups_mut(kind)
            .push(entries.iter().copied().collect());
    }

    /// Number of successful `set_link` calls
    pub fn writes(&self) -> usize {
        self.writes
    }

    fn groups(&self, kind: EntityKind) -> &Vec<LinkSet> {
        match kind {
            EntityKind::Post => &self.posts,
            EntityKind::Term => &self.terms,
        }
    }

    fn groups_mut(&mut self, kind: EntityKind) -> &mut Vec<LinkSet> {
        match kind {
            EntityKind::Post => &mut self.posts,
            EntityKind::Term => &mut self.terms,
        }
    }

    fn position(&self, kind: EntityKind, site: SiteId, id: DocId) -> Option<usize> {
        self.groups(kind)
            .iter()
            .position(|group| group.get(site) == Some(id))
    }

    fn detach(&mut self, kind: EntityKind, site: SiteId, id: DocId) {
        if let Some(index) = self.position(kind, site, id) {
            let groups = self.groups_mut(kind);
            groups[index].remove(site);
            if groups[index].len() < 2 {
                groups.remove(index);
            }
        }
    }
}

impl RelationRegistry for MemoryRegistry {
    fn links(&self, source_site: SiteId, id: DocId, kind: EntityKind) -> Result<LinkSet> {
        Ok(self
            .position(kind, source_site, id)
            .map(|index| self.groups(kind)[index].clone())
            .unwrap_or_default())
    }

    fn set_link(
        &mut self,
        source_site: SiteId,
        target_site: SiteId,
        source_id: DocId,
        target_id: DocId,
        kind: EntityKind,
    ) -> Result<()> {
        if source_site == target_site {
            return Err(Error::Registry {
                message: format!("cannot link {} to its own site {}", source_id, source_site),
            });
        }
        if self.position(kind, target_site, target_id) != self.position(kind, source_site, source_id)
        {
            self.detach(kind, target_site, target_id);
        }
        match self.position(kind, source_site, source_id) {
            Some(index) => {
                if let Some(previous) = self.groups_mut(kind)[index].insert(target_site, target_id)
                    && previous != target_id
                {
                    tracing::warn!(
                        "Replaced {} link on site {}: {} -> {}",
                        kind,
                        target_site,
                        previous,
                        target_id
                    );
                }
            }
            None => {
                self.groups_mut(kind).push(
                    [(source_site, source_id), (target_site, target_id)]
                        .into_iter()
                        .collect(),
                );
            }
        }
        self.writes += 1;
        Ok(())
    }
}

/// Serialize a site's documents as a list instead of an id-keyed map
mod document_list {
    use std::collections::BTreeMap;

    use serde::{Deserialize, Deserializer, Serializer};

    use crate::document::Document;
    use crate::ids::DocId;

    pub fn serialize<S>(documents: &BTreeMap<DocId, Document>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(documents.values())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<BTreeMap<DocId, Document>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let list = Vec::<Document>::deserialize(deserializer)?;
        Ok(list.into_iter().map(|d| (d.id, d)).collect())
    }
}
