//! Taxonomy term assignments

use autopost_host::{EntityKind, TaxonomyStore, TermId};

use super::{Change, CopyContext, CopyTarget};
use crate::Result;

/// Assign the target the counterparts of the source's terms.
///
/// Works per taxonomy registered for `doc_type`. A taxonomy where at least
/// one term resolves replaces the target's assignments in full; one where
/// nothing resolves is left alone.
pub fn copy_taxonomies(
    ctx: &mut CopyContext<'_>,
    doc_type: &str,
    target: &CopyTarget,
) -> Result<Change> {
    if !ctx.registry.is_available() {
        tracing::warn!(
            "Relation registry unavailable; terms of {} not copied to site {}",
            target.source_id,
            target.target_site
        );
        return Ok(Change::Unavailable);
    }

    let mut resolved: Vec<(String, Vec<TermId>)> = Vec::new();
    for taxonomy in ctx.host.taxonomies_for(target.source_site, doc_type)? {
        let terms = ctx
            .host
            .assigned_terms(target.source_site, target.source_id, &taxonomy)?;
        let counterparts: Vec<TermId> = terms
            .iter()
            .filter_map(|term| {
                ctx.registry.counterpart(
                    target.source_site,
                    *term,
                    EntityKind::Term,
                    target.target_site,
                )
            })
            .collect();
        if counterparts.is_empty() {
            tracing::debug!(
                "No {} terms of {} resolve on site {}",
                taxonomy,
                target.source_id,
                target.target_site
            );
            continue;
        }
        resolved.push((taxonomy, counterparts));
    }

    if resolved.is_empty() {
        return Ok(Change::Unchanged);
    }

    let mut scope = ctx.write_scope(target.target_site)?;
    for (taxonomy, terms) in &resolved {
        scope.replace_terms(target.target_site, target.target_id, taxonomy, terms)?;
    }
    Ok(Change::Written)
}
