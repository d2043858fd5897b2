//! Field copiers
//!
//! One copier per field category. Each resolves what it needs while the
//! host is on the source site, then performs its writes inside a single
//! [`SiteScope`] on the target site.

mod attachments;
mod content;
mod extended;
mod meta;
mod relational;
mod taxonomy;
mod thumbnail;

pub use attachments::copy_attachments;
pub use content::{copy_content, copy_title};
pub use extended::copy_extended_fields;
pub use meta::copy_meta;
pub use relational::{RelationalValue, copy_relational_meta};
pub use taxonomy::copy_taxonomies;
pub use thumbnail::copy_thumbnail;

use serde::Serialize;

use autopost_host::{DocId, Host, SiteId};

use crate::Result;
use crate::guard::ReentrancyGuard;
use crate::registry::RegistryClient;
use crate::scope::SiteScope;

/// A source document and its counterpart on one target site
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct CopyTarget {
    pub source_site: SiteId,
    pub source_id: DocId,
    pub target_site: SiteId,
    pub target_id: DocId,
}

/// What a copier did to the target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Change {
    /// At least one value was written
    Written,
    /// Values were removed and nothing was written
    Cleared,
    /// The target already had what it needed
    Unchanged,
    /// A required integration is missing, nothing was attempted
    Unavailable,
}

impl Change {
    /// Combine the outcomes of two writes on the same target
    pub fn merge(self, other: Change) -> Change {
        use Change::*;
        match (self, other) {
            (Written, _) | (_, Written) => Written,
            (Cleared, _) | (_, Cleared) => Cleared,
            (Unchanged, _) | (_, Unchanged) => Unchanged,
            (Unavailable, Unavailable) => Unavailable,
        }
    }
}

/// Everything a copier needs to reach both sites
pub struct CopyContext<'a> {
    pub host: &'a mut dyn Host,
    pub registry: RegistryClient<'a>,
    pub guard: &'a ReentrancyGuard,
}

impl<'a> CopyContext<'a> {
    pub fn new(
        host: &'a mut dyn Host,
        registry: RegistryClient<'a>,
        guard: &'a ReentrancyGuard,
    ) -> Self {
        Self {
            host,
            registry,
            guard,
        }
    }

    /// Switch to `site` for writing until the scope is dropped
    pub fn write_scope(&mut self, site: SiteId) -> Result<SiteScope<'_>> {
        SiteScope::for_writes(&mut *self.host, site, self.guard)
    }
}
