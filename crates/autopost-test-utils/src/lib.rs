//! Shared test utilities for the Network Auto-Post workspace.
//!
//! This crate provides standardised fixtures so crate test suites do not
//! each hand-assemble networks. It is a dev-dependency only and never
//! published.
//!
//! # Modules
//!
//! - [`doc`]: [`DocBuilder`] for documents with meta, terms and fields
//! - [`network`]: [`TestNetwork`] builder for sites, documents and links

pub mod doc;
pub mod network;

pub use doc::DocBuilder;
pub use network::TestNetwork;
