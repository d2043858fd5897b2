//! Relational meta
//!
//! Values that hold document ids. The ids are site-local, so they are
//! translated to the target site's counterparts before being written.

use serde_json::Value;

use autopost_host::{DocId, EntityKind, MetaStore, is_blank};

use super::{Change, CopyContext, CopyTarget};
use crate::Result;

/// A relational meta value: one referenced document or a list of them
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelationalValue {
    Scalar(DocId),
    List(Vec<DocId>),
}

impl RelationalValue {
    /// Read a stored value.
    ///
    /// Arrays become lists; list elements that are not ids are dropped. A
    /// scalar that is not an id yields `None`.
    pub fn from_meta(value: &Value) -> Option<Self> {
        match value {
            Value::Array(items) => Some(Self::List(
                items.iter().filter_map(DocId::from_meta).collect(),
            )),
            other => DocId::from_meta(other).map(Self::Scalar),
        }
    }

    /// Map every id through `resolve`.
    ///
    /// Lists keep only the ids that resolve, in order. A scalar that does
    /// not resolve yields `None`.
    pub fn translate(&self, mut resolve: impl FnMut(DocId) -> Option<DocId>) -> Option<Self> {
        match self {
            Self::Scalar(id) => resolve(*id).map(Self::Scalar),
            Self::List(ids) => Some(Self::List(ids.iter().filter_map(|id| resolve(*id)).collect())),
        }
    }

    pub fn to_meta(&self) -> Value {
        match self {
            Self::Scalar(id) => id.to_meta(),
            Self::List(ids) => Value::Array(ids.iter().map(|id| id.to_meta()).collect()),
        }
    }
}

/// Copy each key with its ids translated to the target site.
///
/// Empty source values, scalars without a counterpart, and values that
/// hold no ids delete the key on the target.
pub fn copy_relational_meta(
    ctx: &mut CopyContext<'_>,
    keys: &[&str],
    target: &CopyTarget,
) -> Result<Change> {
    if !ctx.registry.is_available() {
        tracing::warn!(
            "Relation registry unavailable; relational meta of {} not copied to site {}",
            target.source_id,
            target.target_site
        );
        return Ok(Change::Unavailable);
    }

    let mut values: Vec<(&str, Option<Value>)> = Vec::with_capacity(keys.len());
    for &key in keys {
        let raw = ctx.host.get_meta(target.source_site, target.source_id, key)?;
        let translated = if is_blank(raw.as_ref()) {
            None
        } else {
            raw.as_ref()
                .and_then(RelationalValue::from_meta)
                .and_then(|value| {
                    value.translate(|id| {
                        ctx.registry.counterpart(
                            target.source_site,
                            id,
                            EntityKind::Post,
                            target.target_site,
                        )
                    })
                })
                .map(|value| value.to_meta())
        };
        values.push((key, translated));
    }

    let mut scope = ctx.write_scope(target.target_site)?;
    let mut change = Change::Unchanged;
    for (key, value) in values {
        match value {
            Some(value) => {
                scope.update_meta(target.target_site, target.target_id, key, value)?;
                change = change.merge(Change::Written);
            }
            None => {
                scope.delete_meta(target.target_site, target.target_id, key)?;
                change = change.merge(Change::Cleared);
            }
        }
    }
    Ok(change)
}
