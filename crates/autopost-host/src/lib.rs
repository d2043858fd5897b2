//! Host platform contracts for Network Auto-Post
//!
//! The replication engine never talks to a concrete content platform. It
//! consumes the narrow contracts in [`ports`]:
//!
//! - **SiteContext**: enumerate sites, switch to one and back
//! - **DocumentStore / MetaStore**: documents and their raw metadata
//! - **TaxonomyStore / AttachmentStore**: term assignments, file parents
//! - **FieldStore**: optional structured-field extension
//! - **RelationRegistry**: the cross-site identity map
//!
//! [`memory`] implements all of them in memory; [`snapshot`] persists that
//! implementation so whole networks can be replayed from a file.

pub mod document;
pub mod error;
pub mod ids;
pub mod memory;
pub mod ports;
pub mod snapshot;

pub use document::{
    Document, DocumentPatch, DocumentStatus, NewDocument, THUMBNAIL_META_KEY, is_blank,
};
pub use error::{Error, Result};
pub use ids::{DocId, EntityKind, SiteId, TermId};
pub use memory::{MemoryNetwork, MemoryRegistry, MemorySite, SaveNotice, SaveObserver};
pub use ports::{
    AttachmentStore, DocumentStore, FieldStore, Host, LinkSet, MetaStore, RelationRegistry,
    SiteContext, TaxonomyStore,
};
pub use snapshot::NetworkSnapshot;
