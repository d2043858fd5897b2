//! Title and body

use autopost_host::{Document, DocumentPatch, DocumentStore};

use super::{Change, CopyContext, CopyTarget};
use crate::Result;

/// Overwrite the target title with the source title
pub fn copy_title(ctx: &mut CopyContext<'_>, source: &Document, target: &CopyTarget) -> Result<Change> {
    let mut scope = ctx.write_scope(target.target_site)?;
    scope.update(
        target.target_site,
        target.target_id,
        DocumentPatch::title(source.title.as_str()),
    )?;
    Ok(Change::Written)
}

/// Copy the body.
///
/// With `overwrite` the target body is replaced unconditionally. Without
/// it the body only fills a target whose body is empty.
pub fn copy_content(
    ctx: &mut CopyContext<'_>,
    source: &Document,
    target: &CopyTarget,
    overwrite: bool,
) -> Result<Change> {
    let mut scope = ctx.write_scope(target.target_site)?;
    if !overwrite {
        let current = scope
            .read(target.target_site, target.target_id)?
            .map(|doc| doc.content)
            .unwrap_or_default();
        if !current.trim().is_empty() || source.content.is_empty() {
            return Ok(Change::Unchanged);
        }
    }
    scope.update(
        target.target_site,
        target.target_id,
        DocumentPatch::content(source.content.as_str()),
    )?;
    Ok(Change::Written)
}
