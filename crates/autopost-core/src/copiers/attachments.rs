//! Attachment parents

use autopost_host::{AttachmentStore, DocId, EntityKind};

use super::{Change, CopyContext, CopyTarget};
use crate::Result;

/// Parent the counterparts of the source's attachments to the target.
///
/// First assignment wins: a target-side file that already has a parent
/// keeps it.
pub fn copy_attachments(ctx: &mut CopyContext<'_>, target: &CopyTarget) -> Result<Change> {
    if !ctx.registry.is_available() {
        tracing::warn!(
            "Relation registry unavailable; attachments of {} not copied to site {}",
            target.source_id,
            target.target_site
        );
        return Ok(Change::Unavailable);
    }

    let counterparts: Vec<DocId> = ctx
        .host
        .attachments_of(target.source_site, target.source_id)?
        .into_iter()
        .filter_map(|attachment| {
            ctx.registry.counterpart(
                target.source_site,
                attachment,
                EntityKind::Post,
                target.target_site,
            )
        })
        .collect();
    if counterparts.is_empty() {
        return Ok(Change::Unchanged);
    }

    let mut scope = ctx.write_scope(target.target_site)?;
    let mut change = Change::Unchanged;
    for attachment in counterparts {
        if let Some(parent) = scope.parent_of(target.target_site, attachment)? {
            tracing::debug!(
                "Attachment {} on site {} already belongs to {}",
                attachment,
                target.target_site,
                parent
            );
            continue;
        }
        match scope.set_parent(target.target_site, attachment, target.target_id) {
            Ok(()) => change = Change::Written,
            Err(e) => tracing::warn!(
                "Cannot parent attachment {} on site {}: {}",
                attachment,
                target.target_site,
                e
            ),
        }
    }
    Ok(change)
}
