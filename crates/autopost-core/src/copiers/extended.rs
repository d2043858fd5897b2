//! Extended structured fields

use serde_json::Value;

use autopost_host::{FieldStore, Host, is_blank};

use super::{Change, CopyContext, CopyTarget};
use crate::Result;

/// Copy extended fields with scalar meta semantics.
///
/// Does nothing when the host has no extended field store.
pub fn copy_extended_fields(
    ctx: &mut CopyContext<'_>,
    names: &[&str],
    target: &CopyTarget,
) -> Result<Change> {
    let Some(fields) = ctx.host.field_store() else {
        tracing::debug!("Extended fields unavailable; skipping {}", target.source_id);
        return Ok(Change::Unavailable);
    };
    let mut values: Vec<(&str, Option<Value>)> = Vec::with_capacity(names.len());
    for &name in names {
        values.push((name, fields.get_field(target.source_site, target.source_id, name)?));
    }

    let mut scope = ctx.write_scope(target.target_site)?;
    let Some(fields) = scope.field_store() else {
        return Ok(Change::Unavailable);
    };
    let mut change = Change::Unchanged;
    for (name, value) in values {
        match value {
            Some(value) if !is_blank(Some(&value)) => {
                fields.update_field(target.target_site, target.target_id, name, value)?;
                change = change.merge(Change::Written);
            }
            _ => {
                fields.delete_field(target.target_site, target.target_id, name)?;
                change = change.merge(Change::Cleared);
            }
        }
    }
    Ok(change)
}
