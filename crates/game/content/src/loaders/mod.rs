//! Content loaders for reading game data from files.
//!
//! Every loader accepts either a path or the raw text, so the embedded
//! standard catalog and on-disk overrides go through the same parser.

pub mod actions;
pub mod factory;
pub mod rules;
pub mod tags;

pub use actions::ActionCatalog;
pub use factory::{Content, ContentFactory};
pub use rules::{RulesDocument, RulesLoader};
pub use tags::TagLoader;

use std::path::Path;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}
