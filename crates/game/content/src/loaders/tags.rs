//! Tag catalog loader.

use std::path::Path;

use tactics_core::{RulesConfig, TagDescriptor, TagRegistry};

use crate::loaders::{LoadResult, read_file};

/// Loader for the tag catalog from RON files.
///
/// The file is a list of [`TagDescriptor`]s in registration order. Catalog
/// integrity (duplicates, unknown propagation targets, cycles, a second
/// always-last tag) is checked here, so a bad catalog never reaches the executor.
pub struct TagLoader;

impl TagLoader {
    pub fn load(path: &Path, rules: &RulesConfig) -> LoadResult<TagRegistry> {
        let content = read_file(path)?;
        Self::parse(&content, rules)
    }

    pub fn parse(content: &str, rules: &RulesConfig) -> LoadResult<TagRegistry> {
        let descriptors: Vec<TagDescriptor> = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse tag catalog RON: {}", e))?;
        let registry = TagRegistry::with_depth(descriptors, rules.max_propagation_depth)
            .map_err(|e| anyhow::anyhow!("Invalid tag catalog: {}", e))?;
        Ok(registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_propagation_cycles() {
        let ron = r#"[
            (id: "a", propagate: ["b"]),
            (id: "b", propagate: ["a"]),
        ]"#;
        let err = TagLoader::parse(ron, &RulesConfig::default()).unwrap_err();
        assert!(err.to_string().contains("cycle"), "{err}");
    }

    #[test]
    fn rejects_two_always_last_tags() {
        let ron = r#"[
            (id: "strike", priority: 2147483647),
            (id: "volley", priority: 2147483647),
        ]"#;
        assert!(TagLoader::parse(ron, &RulesConfig::default()).is_err());
    }

    #[test]
    fn parses_defaults() {
        let registry = TagLoader::parse(r#"[(id: "melee")]"#, &RulesConfig::default()).unwrap();
        let melee = registry.get("melee").unwrap();
        assert!(!melee.internal);
        assert!(melee.propagate.is_empty());
    }
}
