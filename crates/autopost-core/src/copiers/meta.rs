//! Scalar meta

use serde_json::Value;

use autopost_host::{MetaStore, is_blank};

use super::{Change, CopyContext, CopyTarget};
use crate::Result;

/// Copy each key's value verbatim.
///
/// A key that is missing or empty on the source is deleted on the target,
/// so clearing a value propagates.
pub fn copy_meta(ctx: &mut CopyContext<'_>, keys: &[&str], target: &CopyTarget) -> Result<Change> {
    let mut values: Vec<(&str, Option<Value>)> = Vec::with_capacity(keys.len());
    for &key in keys {
        let value = ctx.host.get_meta(target.source_site, target.source_id, key)?;
        values.push((key, value));
    }

    let mut scope = ctx.write_scope(target.target_site)?;
    let mut change = Change::Unchanged;
    for (key, value) in values {
        match value {
            Some(value) if !is_blank(Some(&value)) => {
                scope.update_meta(target.target_site, target.target_id, key, value)?;
                change = change.merge(Change::Written);
            }
            _ => {
                scope.delete_meta(target.target_site, target.target_id, key)?;
                change = change.merge(Change::Cleared);
            }
        }
    }
    Ok(change)
}
