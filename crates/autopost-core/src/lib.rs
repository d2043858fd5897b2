//! Replication engine for Network Auto-Post
//!
//! When a document is saved on one site of a network, the engine makes
//! sure every other site has a linked copy and keeps the fields the
//! [`PolicyTable`](autopost_meta::PolicyTable) selects in step:
//!
//! - [`Replicator`]: entry points for save events, guard sequence, site loop
//! - [`creation`]: first copy of a document on a target site
//! - [`copiers`]: one copier per field category
//! - [`registry`]: never-failing access to the cross-site identity map
//! - [`scope`] / [`guard`]: site switching and re-entrancy suppression
//! - [`hooks`]: in-process observers and command hooks fired per category

pub mod config;
pub mod copiers;
pub mod creation;
pub mod error;
pub mod guard;
pub mod hooks;
pub mod registry;
pub mod replicator;
pub mod report;
pub mod scope;

pub use config::Settings;
pub use copiers::{Change, CopyContext, CopyTarget, RelationalValue};
pub use creation::CreatedCopy;
pub use error::{Error, Result};
pub use guard::{ReentrancyGuard, Suppression};
pub use hooks::{HookArgs, HookConfig, HookEvent, HookRegistry};
pub use registry::RegistryClient;
pub use replicator::{Replicator, SaveEvent};
pub use report::{CategoryOutcome, ReplicationReport, SiteReport, SkipReason};
pub use scope::SiteScope;
