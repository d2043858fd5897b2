//! Command implementations for autopost-cli

pub mod check_policy;
pub mod links;
pub mod replay;

pub use check_policy::run_check_policy;
pub use links::run_links;
pub use replay::{ReplayOptions, run_replay};
