//! Replication orchestrator
//!
//! Entry points for the host's save notifications. A save of a document
//! whose type has a policy fans out to every other site of the network:
//! missing copies are created and linked, then each field category the
//! policy selects is applied in a fixed order.

use serde_json::Value;

use autopost_host::{
    Document, DocumentStatus, DocumentStore, EntityKind, Host, LinkSet, MetaStore,
    RelationRegistry, SiteContext, SiteId, is_blank,
};
use autopost_meta::{FieldCategory, IGNORE_MARKER, PolicyTable, SYNCED_MARKER, TypePolicy};

use crate::Result;
use crate::config::Settings;
use crate::copiers::{self, Change, CopyContext, CopyTarget};
use crate::creation;
use crate::guard::ReentrancyGuard;
use crate::hooks::{HookEvent, HookRegistry};
use crate::registry::RegistryClient;
use crate::report::{ReplicationReport, SiteReport, SkipReason};
use crate::scope::SiteScope;

/// A save notification: the document as it now stands on its site
#[derive(Debug, Clone)]
pub struct SaveEvent {
    pub site: SiteId,
    pub document: Document,
}

impl SaveEvent {
    pub fn new(site: SiteId, document: Document) -> Self {
        Self { site, document }
    }
}

/// Fan-out replication engine
///
/// # Example
///
/// ```
/// use autopost_core::{Replicator, SaveEvent};
/// use autopost_host::{Document, DocId, MemoryNetwork, MemoryRegistry, SiteId};
/// use autopost_meta::{PolicyTable, TypePolicy};
///
/// let mut network = MemoryNetwork::new();
/// network.add_site(SiteId(1), "en");
/// network.add_site(SiteId(2), "de");
/// let mut registry = MemoryRegistry::new();
///
/// let mut doc = Document::new(DocId(0), "post");
/// doc.status = "publish".parse().unwrap();
/// doc.title = "Hello".into();
/// let id = network.insert_document(SiteId(1), doc).unwrap();
///
/// let mut replicator = Replicator::new(PolicyTable::new().with_type("post", TypePolicy::default()));
/// let event = SaveEvent::new(SiteId(1), network.document(SiteId(1), id).unwrap().clone());
/// let report = replicator.on_document_saved(&mut network, Some(&mut registry), &event);
///
/// assert_eq!(report.created(), 1);
/// ```
#[derive(Debug, Default)]
pub struct Replicator {
    policy: PolicyTable,
    hooks: HookRegistry,
    guard: ReentrancyGuard,
}

impl Replicator {
    pub fn new(policy: PolicyTable) -> Self {
        Self {
            policy,
            ..Default::default()
        }
    }

    /// Engine using the policy and command hooks of a settings file
    pub fn from_settings(settings: Settings) -> Self {
        Self {
            policy: settings.policy,
            hooks: HookRegistry::with_commands(settings.hooks),
            guard: ReentrancyGuard::new(),
        }
    }

    pub fn policy(&self) -> &PolicyTable {
        &self.policy
    }

    /// Hook listeners, for registering in-process observers
    pub fn hooks_mut(&mut self) -> &mut HookRegistry {
        &mut self.hooks
    }

    /// Handle on the guard that marks the engine's own writes
    pub fn guard(&self) -> ReentrancyGuard {
        self.guard.clone()
    }

    /// Replicate a saved document to every other site.
    ///
    /// Never fails: skipped events, per-site problems and per-category
    /// failures are logged and recorded in the returned report.
    pub fn on_document_saved(
        &mut self,
        host: &mut dyn Host,
        registry: Option<&mut dyn RelationRegistry>,
        event: &SaveEvent,
    ) -> ReplicationReport {
        let Self {
            policy: table,
            hooks,
            guard,
        } = self;
        let source_site = event.site;
        let source = &event.document;

        if guard.is_engaged() {
            tracing::debug!("Ignoring save of {}@{} made by replication", source.id, source_site);
            return ReplicationReport::skipped(source_site, source.id, SkipReason::Reentrant);
        }

        let mut scope = match SiteScope::enter(host, source_site) {
            Ok(scope) => scope,
            Err(e) => {
                tracing::warn!("Cannot enter source site {}: {}", source_site, e);
                return ReplicationReport::skipped(
                    source_site,
                    source.id,
                    SkipReason::SiteUnavailable(e.to_string()),
                );
            }
        };
        let policy = match screen(table, &*scope, source_site, source) {
            Ok(policy) => policy,
            Err(reason) => {
                tracing::debug!("Not replicating {}@{}: {}", source.id, source_site, reason);
                return ReplicationReport::skipped(source_site, source.id, reason);
            }
        };

        let mut report = ReplicationReport::new(source_site, source.id);
        if let Err(e) = scope.update_meta(source_site, source.id, SYNCED_MARKER, Value::from(1)) {
            tracing::warn!("Failed to mark {}@{} as synced: {}", source.id, source_site, e);
            report.warnings.push(format!("failed to mark source as synced: {}", e));
        }

        let mut ctx = CopyContext::new(&mut *scope, RegistryClient::new(registry), guard);
        let links = match own_links(&ctx.registry, source_site, source) {
            Ok(links) => links,
            Err(reason) => {
                report.skipped = Some(reason);
                return report;
            }
        };

        for site in ctx.host.sites() {
            if site == source_site {
                continue;
            }
            let site_report = replicate_to(&mut ctx, hooks, policy, event, &links, site);
            tracing::info!(
                "Site {}: {} categories applied{}",
                site,
                site_report.categories.iter().filter(|c| c.error.is_none()).count(),
                if site_report.created { " to a new copy" } else { "" }
            );
            report.sites.push(site_report);
        }
        report
    }

    /// Re-copy extended fields after the field extension saved them.
    ///
    /// Only permanent extended fields are copied, and only to sites that
    /// already have a linked copy. Nothing is created.
    pub fn on_fields_saved(
        &mut self,
        host: &mut dyn Host,
        registry: Option<&mut dyn RelationRegistry>,
        event: &SaveEvent,
    ) -> ReplicationReport {
        let Self {
            policy: table,
            hooks,
            guard,
        } = self;
        let source_site = event.site;
        let source = &event.document;

        if guard.is_engaged() {
            tracing::debug!("Ignoring field save of {}@{} made by replication", source.id, source_site);
            return ReplicationReport::skipped(source_site, source.id, SkipReason::Reentrant);
        }

        let mut scope = match SiteScope::enter(host, source_site) {
            Ok(scope) => scope,
            Err(e) => {
                tracing::warn!("Cannot enter source site {}: {}", source_site, e);
                return ReplicationReport::skipped(
                    source_site,
                    source.id,
                    SkipReason::SiteUnavailable(e.to_string()),
                );
            }
        };
        let policy = match screen(table, &*scope, source_site, source) {
            Ok(policy) => policy,
            Err(reason) => {
                tracing::debug!("Not copying fields of {}@{}: {}", source.id, source_site, reason);
                return ReplicationReport::skipped(source_site, source.id, reason);
            }
        };
        let names = policy.keys(FieldCategory::ExtendedFields, false);
        if names.is_empty() || scope.field_store().is_none() {
            return ReplicationReport::skipped(source_site, source.id, SkipReason::NoExtendedFields);
        }

        let mut report = ReplicationReport::new(source_site, source.id);
        let mut ctx = CopyContext::new(&mut *scope, RegistryClient::new(registry), guard);
        let links = match own_links(&ctx.registry, source_site, source) {
            Ok(links) => links,
            Err(reason) => {
                report.skipped = Some(reason);
                return report;
            }
        };

        for site in ctx.host.sites() {
            if site == source_site {
                continue;
            }
            let mut site_report = SiteReport::new(site);
            let Some(target_id) = links.get(site) else {
                site_report.skipped = Some("no linked copy".to_string());
                report.sites.push(site_report);
                continue;
            };
            site_report.target_id = Some(target_id);
            let target = CopyTarget {
                source_site,
                source_id: source.id,
                target_site: site,
                target_id,
            };
            apply(
                &mut site_report,
                hooks,
                FieldCategory::ExtendedFields,
                &target,
                copiers::copy_extended_fields(&mut ctx, &names, &target),
            );
            report.sites.push(site_report);
        }
        report
    }
}

/// Run the guard sequence, yielding the type's policy when the save should
/// be replicated
fn screen<'t>(
    table: &'t PolicyTable,
    host: &dyn Host,
    site: SiteId,
    source: &Document,
) -> std::result::Result<&'t TypePolicy, SkipReason> {
    let is_revision = source.is_revision
        || host.is_revision(site, source.id).unwrap_or_else(|e| {
            tracing::warn!("Revision check for {}@{} failed: {}", source.id, site, e);
            false
        });
    if is_revision {
        return Err(SkipReason::Revision);
    }

    if matches!(
        source.status,
        DocumentStatus::Trash | DocumentStatus::Draft | DocumentStatus::AutoDraft
    ) {
        return Err(SkipReason::Status(source.status));
    }

    let Some(policy) = table.get(&source.doc_type) else {
        return Err(SkipReason::UnconfiguredType(source.doc_type.clone()));
    };

    let ignore = host
        .get_meta(site, source.id, IGNORE_MARKER)
        .unwrap_or_else(|e| {
            tracing::warn!("Ignore check for {}@{} failed: {}", source.id, site, e);
            source.meta.get(IGNORE_MARKER).cloned()
        });
    if !is_blank(ignore.as_ref()) {
        return Err(SkipReason::Ignored);
    }

    Ok(policy)
}

/// Link Set of the saved document itself.
///
/// A failed lookup must not read as "no links": every linked site would
/// then receive a second copy.
fn own_links(
    registry: &RegistryClient<'_>,
    site: SiteId,
    source: &Document,
) -> std::result::Result<LinkSet, SkipReason> {
    match registry.lookup(site, source.id, EntityKind::Post) {
        None => Err(SkipReason::RegistryUnavailable),
        Some(Ok(links)) => Ok(links),
        Some(Err(e)) => Err(SkipReason::LinkLookupFailed(e.to_string())),
    }
}

/// Bring one target site up to date
fn replicate_to(
    ctx: &mut CopyContext<'_>,
    hooks: &mut HookRegistry,
    policy: &TypePolicy,
    event: &SaveEvent,
    links: &LinkSet,
    site: SiteId,
) -> SiteReport {
    let source = &event.document;
    let mut report = SiteReport::new(site);

    let existing = links.get(site);
    let is_new = existing.is_none();
    let target_id = match existing {
        Some(id) => id,
        None => match creation::create_copy(ctx, hooks, event.site, source, policy, site) {
            Ok(Some(copy)) => {
                report.created = true;
                report.hook_errors.extend(copy.hook_errors);
                if !copy.linked {
                    report.error = Some("copy created but not linked".to_string());
                }
                copy.id
            }
            Ok(None) => {
                report.skipped = Some("copy could not be created".to_string());
                return report;
            }
            Err(e) => {
                tracing::warn!("Failed to create copy of {} on site {}: {}", source.id, site, e);
                report.error = Some(format!("creation failed: {}", e));
                return report;
            }
        },
    };
    report.target_id = Some(target_id);

    let target = CopyTarget {
        source_site: event.site,
        source_id: source.id,
        target_site: site,
        target_id,
    };

    for category in FieldCategory::ALL {
        let result = match category {
            // Creation already carried the title.
            FieldCategory::Title if is_new => Ok(Change::Written),
            FieldCategory::Title if policy.applies(category, false) => {
                copiers::copy_title(ctx, source, &target)
            }
            FieldCategory::Content if policy.applies(category, is_new) => {
                copiers::copy_content(ctx, source, &target, true)
            }
            FieldCategory::Content if !is_new && policy.fills_empty_content() => {
                copiers::copy_content(ctx, source, &target, false)
            }
            FieldCategory::Thumbnail if policy.applies(category, is_new) => {
                copiers::copy_thumbnail(ctx, &target)
            }
            FieldCategory::Taxonomies if policy.applies(category, is_new) => {
                copiers::copy_taxonomies(ctx, &source.doc_type, &target)
            }
            FieldCategory::Attachments => copiers::copy_attachments(ctx, &target),
            FieldCategory::Meta if policy.applies(category, is_new) => {
                copiers::copy_meta(ctx, &policy.keys(category, is_new), &target)
            }
            FieldCategory::RelationalMeta if policy.applies(category, is_new) => {
                copiers::copy_relational_meta(ctx, &policy.keys(category, is_new), &target)
            }
            FieldCategory::ExtendedFields if policy.applies(category, is_new) => {
                copiers::copy_extended_fields(ctx, &policy.keys(category, is_new), &target)
            }
            _ => continue,
        };
        apply(&mut report, hooks, category, &target, result);
    }
    report
}

/// Record a copier's result and notify listeners when it was applied
fn apply(
    report: &mut SiteReport,
    hooks: &mut HookRegistry,
    category: FieldCategory,
    target: &CopyTarget,
    result: Result<Change>,
) {
    match result {
        Ok(change) => {
            report.record(category, change);
            if change != Change::Unavailable {
                let failures = hooks.fire(HookEvent::for_category(category), target);
                report.hook_errors.extend(failures);
            }
        }
        Err(e) => {
            tracing::warn!(
                "Copying {} of {} to site {} failed: {}",
                category,
                target.source_id,
                target.target_site,
                e
            );
            report.record_error(category, e.to_string());
        }
    }
}
