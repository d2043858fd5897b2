//! Field policy configuration for Network Auto-Post.
//!
//! This crate provides the Field Policy Table: which document types are
//! replicated, which field categories a new copy receives and which are
//! kept synchronized afterwards.

pub mod error;
pub mod loader;
pub mod policy;
pub mod table;
pub mod validation;

pub use error::{Error, Result};
pub use loader::load_file;
pub use policy::{FieldCategory, PermanentPolicy, TypePolicy};
pub use table::PolicyTable;
pub use validation::{PolicyIssue, validate};

/// Meta flag set on a source document after its first replication pass
pub const SYNCED_MARKER: &str = "_network-auto-post--synced";

/// Meta flag that excludes a document from replication
pub const IGNORE_MARKER: &str = "_network-auto-post--ignore";
