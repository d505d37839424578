//! Data-driven content definitions and loaders.
//!
//! This crate houses the standard catalog and the loaders for RON/TOML data files:
//! - Tag catalog (RON), validated into a [`tactics_core::TagRegistry`]
//! - Action definitions (RON), validated against the registry
//! - Rules constants and the physical defense tier table (TOML)
//!
//! Content is consumed by the runtime executor and never appears in action records
//! except through the resolved tag ids it produced.

#[cfg(feature = "loaders")]
pub mod loaders;

#[cfg(feature = "loaders")]
pub use loaders::{
    ActionCatalog, Content, ContentFactory, LoadResult, RulesDocument, RulesLoader, TagLoader,
};
