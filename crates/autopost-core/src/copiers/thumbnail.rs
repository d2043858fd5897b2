//! Featured image

use autopost_host::{DocId, EntityKind, MetaStore, THUMBNAIL_META_KEY};

use super::{Change, CopyContext, CopyTarget};
use crate::Result;

/// Point the target's thumbnail at the counterpart of the source's
/// thumbnail.
///
/// A source without a thumbnail, or whose thumbnail has no counterpart on
/// the target site, clears the target's thumbnail.
pub fn copy_thumbnail(ctx: &mut CopyContext<'_>, target: &CopyTarget) -> Result<Change> {
    if !ctx.registry.is_available() {
        tracing::warn!(
            "Relation registry unavailable; thumbnail of {} not copied to site {}",
            target.source_id,
            target.target_site
        );
        return Ok(Change::Unavailable);
    }

    let source_thumbnail = ctx
        .host
        .get_meta(target.source_site, target.source_id, THUMBNAIL_META_KEY)?
        .as_ref()
        .and_then(DocId::from_meta);
    let counterpart = source_thumbnail.and_then(|thumbnail| {
        ctx.registry.counterpart(
            target.source_site,
            thumbnail,
            EntityKind::Post,
            target.target_site,
        )
    });

    let mut scope = ctx.write_scope(target.target_site)?;
    match counterpart {
        Some(attachment) => {
            scope.update_meta(
                target.target_site,
                target.target_id,
                THUMBNAIL_META_KEY,
                attachment.to_meta(),
            )?;
            Ok(Change::Written)
        }
        None => {
            if let Some(thumbnail) = source_thumbnail {
                tracing::debug!(
                    "Thumbnail {} has no counterpart on site {}",
                    thumbnail,
                    target.target_site
                );
            }
            scope.delete_meta(target.target_site, target.target_id, THUMBNAIL_META_KEY)?;
            Ok(Change::Cleared)
        }
    }
}
