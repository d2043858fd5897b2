//! Relation registry client
//!
//! Thin wrapper over the optional cross-site identity map. The registry is
//! an integration the network may not have installed; every operation
//! degrades to "nothing known" instead of failing.

use autopost_host::{DocId, EntityKind, LinkSet, RelationRegistry, SiteId};

/// Logging, never-raising access to a [`RelationRegistry`]
pub struct RegistryClient<'r> {
    registry: Option<&'r mut dyn RelationRegistry>,
}

impl<'r> RegistryClient<'r> {
    pub fn new<'o: 'r>(registry: Option<&'r mut (dyn RelationRegistry + 'o)>) -> Self {
        let registry: Option<&'r mut dyn RelationRegistry> = match registry {
            Some(registry) => Some(registry),
            None => None,
        };
        Self { registry }
    }

    /// Client for a network without a registry
    pub fn unavailable() -> Self {
        Self { registry: None }
    }

    pub fn is_available(&self) -> bool {
        self.registry.is_some()
    }

    /// Link Set of an entity, `None` when no registry is installed.
    ///
    /// Lookup failures are logged and read as an empty set. Callers that
    /// must not mistake a failure for "unlinked" use [`Self::lookup`].
    pub fn links(&self, source_site: SiteId, id: DocId, kind: EntityKind) -> Option<LinkSet> {
        match self.lookup(source_site, id, kind)? {
            Ok(links) => Some(links),
            Err(_) => Some(LinkSet::new()),
        }
    }

    /// Link Set of an entity with lookup failures passed through.
    ///
    /// `None` when no registry is installed.
    pub fn lookup(
        &self,
        source_site: SiteId,
        id: DocId,
        kind: EntityKind,
    ) -> Option<autopost_host::Result<LinkSet>> {
        let Some(registry) = self.registry.as_deref() else {
            tracing::warn!("Relation registry unavailable; cannot look up {} {}", kind, id);
            return None;
        };
        let result = registry.links(source_site, id, kind);
        if let Err(e) = &result {
            tracing::warn!(
                "Relation lookup for {} {} on site {} failed: {}",
                kind,
                id,
                source_site,
                e
            );
        }
        Some(result)
    }

    /// Counterpart of an entity on `target_site`, if one is linked
    pub fn counterpart(
        &self,
        source_site: SiteId,
        id: DocId,
        kind: EntityKind,
        target_site: SiteId,
    ) -> Option<DocId> {
        self.links(source_site, id, kind)?.get(target_site)
    }

    /// Record that `target_id` on `target_site` is the counterpart of
    /// `source_id`. Returns whether the link was written.
    pub fn register(
        &mut self,
        source_site: SiteId,
        target_site: SiteId,
        source_id: DocId,
        target_id: DocId,
        kind: EntityKind,
    ) -> bool {
        let Some(registry) = self.registry.as_deref_mut() else {
            tracing::warn!(
                "Relation registry unavailable; {} {} on site {} stays unlinked",
                kind,
                target_id,
                target_site
            );
            return false;
        };
        match registry.set_link(source_site, target_site, source_id, target_id, kind) {
            Ok(()) => {
                tracing::debug!(
                    "Linked {} {}@{} -> {}@{}",
                    kind,
                    source_id,
                    source_site,
                    target_id,
                    target_site
                );
                true
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to link {} {}@{} -> {}@{}: {}",
                    kind,
                    source_id,
                    source_site,
                    target_id,
                    target_site,
                    e
                );
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use autopost_host::MemoryRegistry;

    #[test]
    fn test_unavailable_registry_knows_nothing() {
        let mut client = RegistryClient::unavailable();
        assert!(!client.is_available());
        assert!(client.links(SiteId(1), DocId(5), EntityKind::Post).is_none());
        assert!(
            client
                .counterpart(SiteId(1), DocId(5), EntityKind::Post, SiteId(2))
                .is_none()
        );
        assert!(!client.register(SiteId(1), SiteId(2), DocId(5), DocId(9), EntityKind::Post));
    }

    #[test]
    fn test_counterpart_lookup() {
        let mut registry = MemoryRegistry::new();
        registry.link(
            EntityKind::Term,
            &[(SiteId(1), DocId(3)), (SiteId(2), DocId(30))],
        );
        let client = RegistryClient::new(Some(&mut registry));

        assert_eq!(
            client.counterpart(SiteId(1), DocId(3), EntityKind::Term, SiteId(2)),
            Some(DocId(30))
        );
        assert_eq!(
            client.counterpart(SiteId(1), DocId(3), EntityKind::Post, SiteId(2)),
            None
        );
        assert_eq!(
            client.counterpart(SiteId(1), DocId(4), EntityKind::Term, SiteId(2)),
            None
        );
    }

    #[test]
    fn test_register_then_lookup() {
        let mut registry = MemoryRegistry::new();
        {
            let mut client = RegistryClient::new(Some(&mut registry));
            assert!(client.register(SiteId(1), SiteId(2), DocId(5), DocId(9), EntityKind::Post));
            assert_eq!(
                client.counterpart(SiteId(2), DocId(9), EntityKind::Post, SiteId(1)),
                Some(DocId(5))
            );
        }
        assert_eq!(registry.writes(), 1);
    }

    struct Offline;

    impl RelationRegistry for Offline {
        fn links(&self, _: SiteId, _: DocId, _: EntityKind) -> autopost_host::Result<LinkSet> {
            Err(autopost_host::Error::Registry {
                message: "timeout".to_string(),
            })
        }

        fn set_link(
            &mut self,
            _: SiteId,
            _: SiteId,
            _: DocId,
            _: DocId,
            _: EntityKind,
        ) -> autopost_host::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_failed_lookup_is_empty_for_links_but_kept_by_lookup() {
        let mut registry = Offline;
        let client = RegistryClient::new(Some(&mut registry));

        assert_eq!(
            client.links(SiteId(1), DocId(5), EntityKind::Post),
            Some(LinkSet::new())
        );
        assert!(
            client
                .counterpart(SiteId(1), DocId(5), EntityKind::Post, SiteId(2))
                .is_none()
        );
        assert!(matches!(
            client.lookup(SiteId(1), DocId(5), EntityKind::Post),
            Some(Err(_))
        ));
    }

    #[test]
    fn test_rejected_link_is_not_raised() {
        let mut registry = MemoryRegistry::new();
        let mut client = RegistryClient::new(Some(&mut registry));
        assert!(!client.register(SiteId(1), SiteId(1), DocId(5), DocId(9), EntityKind::Post));
    }
}
