//! Creating the first copy of a document on a target site

use std::collections::BTreeMap;

use serde_json::Value;

use autopost_host::{DocId, Document, DocumentStore, EntityKind, NewDocument, SiteId};
use autopost_meta::{SYNCED_MARKER, TypePolicy};

use crate::Result;
use crate::copiers::{CopyContext, CopyTarget};
use crate::hooks::{HookEvent, HookRegistry};

/// Fields a new copy starts with.
///
/// The body is left out; it is applied afterwards with the other
/// categories. The copy carries the synced marker from the start.
pub fn new_copy(source: &Document, policy: &TypePolicy) -> NewDocument {
    let mut meta = BTreeMap::new();
    meta.insert(SYNCED_MARKER.to_string(), Value::from(1));
    NewDocument {
        doc_type: source.doc_type.clone(),
        status: policy.creation_status(),
        title: source.title.clone(),
        content: String::new(),
        excerpt: source.excerpt.clone(),
        author: source.author,
        name: source.name.clone(),
        date: source.date,
        modified: source.modified,
        modified_gmt: source.modified_gmt,
        meta,
    }
}

/// A copy made by [`create_copy`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedCopy {
    pub id: DocId,
    /// Whether the registry recorded the link to the source. An unlinked
    /// copy is created again on the next save.
    pub linked: bool,
    pub hook_errors: Vec<String>,
}

/// Create the copy of `source` on `target_site` and link it to the source.
///
/// Returns `None` without creating anything when no relation registry is
/// installed, since an unlinked copy would be duplicated on every save.
pub fn create_copy(
    ctx: &mut CopyContext<'_>,
    hooks: &mut HookRegistry,
    source_site: SiteId,
    source: &Document,
    policy: &TypePolicy,
    target_site: SiteId,
) -> Result<Option<CreatedCopy>> {
    if !ctx.registry.is_available() {
        tracing::warn!(
            "Relation registry unavailable; not creating a copy of {} on site {}",
            source.id,
            target_site
        );
        return Ok(None);
    }

    let target_id = {
        let mut scope = ctx.write_scope(target_site)?;
        scope.create(target_site, new_copy(source, policy))?
    };
    tracing::info!(
        "Created {} {} on site {} from {}@{}",
        source.doc_type,
        target_id,
        target_site,
        source.id,
        source_site
    );

    let linked = ctx
        .registry
        .register(source_site, target_site, source.id, target_id, EntityKind::Post);
    if !linked {
        tracing::warn!(
            "Copy {} on site {} is not linked to {}@{}",
            target_id,
            target_site,
            source.id,
            source_site
        );
    }

    let target = CopyTarget {
        source_site,
        source_id: source.id,
        target_site,
        target_id,
    };
    let hook_errors = hooks.fire(HookEvent::DocumentCreated, &target);
    Ok(Some(CreatedCopy {
        id: target_id,
        linked,
        hook_errors,
    }))
}
