//! [`TestNetwork`] builder for replication scenarios.

use std::path::PathBuf;

use autopost_host::{
    DocId, Document, EntityKind, MemoryNetwork, MemoryRegistry, NetworkSnapshot, SiteId,
};
use tempfile::TempDir;

/// An in-memory network plus relation registry under construction.
///
/// # Example
///
/// ```rust
/// use autopost_host::{EntityKind, SiteContext};
/// use autopost_test_utils::{DocBuilder, TestNetwork};
///
/// let (network, registry) = TestNetwork::with_sites(3)
///     .document(1, DocBuilder::post(10).title("Hello").build())
///     .link(EntityKind::Post, &[(1, 10), (2, 20)])
///     .build();
/// assert_eq!(network.sites().len(), 3);
/// assert_eq!(registry.writes(), 0);
/// ```
pub struct TestNetwork {
    network: MemoryNetwork,
    registry: MemoryRegistry,
}

impl Default for TestNetwork {
    fn default() -> Self {
        Self::new()
    }
}

impl TestNetwork {
    /// Network without sites
    pub fn new() -> Self {
        Self {
            network: MemoryNetwork::new(),
            registry: MemoryRegistry::new(),
        }
    }

    /// Sites `1..=count` named `site-N`, with site 1 current
    pub fn with_sites(count: u64) -> Self {
        let mut builder = Self::new();
        for id in 1..=count {
            builder = builder.site(id, &format!("site-{}", id));
        }
        builder.current(1)
    }

    pub fn site(mut self, id: u64, name: &str) -> Self {
        self.network.add_site(SiteId(id), name);
        self
    }

    /// Make `site` the site the host starts on
    pub fn current(mut self, site: u64) -> Self {
        self.network.set_current_site(SiteId(site));
        self
    }

    /// Register `taxonomy` for `doc_type` on every site
    pub fn taxonomy(mut self, taxonomy: &str, doc_type: &str) -> Self {
        self.network.register_taxonomy(taxonomy, doc_type);
        self
    }

    /// Enable the extended-fields extension
    pub fn extended_fields(mut self) -> Self {
        self.network.set_extended_fields(true);
        self
    }

    /// Store a document on `site` without notifications
    pub fn document(mut self, site: u64, document: Document) -> Self {
        self.network
            .insert_document(SiteId(site), document)
            .expect("TestNetwork::document: unknown site");
        self
    }

    /// Link `(site, id)` pairs as the same entity
    pub fn link(mut self, kind: EntityKind, entries: &[(u64, u64)]) -> Self {
        let entries: Vec<(SiteId, DocId)> = entries
            .iter()
            .map(|(site, id)| (SiteId(*site), DocId(*id)))
            .collect();
        self.registry.link(kind, &entries);
        self
    }

    pub fn build(self) -> (MemoryNetwork, MemoryRegistry) {
        (self.network, self.registry)
    }

    /// Write the network to `network.json` in a fresh temporary directory.
    ///
    /// Keep the returned [`TempDir`] alive for as long as the file is used.
    pub fn write_snapshot(self) -> (TempDir, PathBuf) {
        let temp = TempDir::new().expect("TestNetwork::write_snapshot: temp dir");
        let path = temp.path().join("network.json");
        NetworkSnapshot {
            network: self.network,
            registry: self.registry,
        }
        .save(&path)
        .expect("TestNetwork::write_snapshot: save failed");
        (temp, path)
    }
}
