//! Action definition loader.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use tactics_core::{ActionDefinition, ActionId, RegistryError, TagRegistry};

use crate::loaders::{LoadResult, read_file};

/// Validated action definitions keyed by id.
///
/// Definitions are shared behind [`Arc`] so many instances can be built from
/// one definition concurrently.
#[derive(Debug, Clone, Default)]
pub struct ActionCatalog {
    actions: BTreeMap<ActionId, Arc<ActionDefinition>>,
}

impl ActionCatalog {
    /// Builds a catalog, rejecting duplicate ids and tags the registry does not allow.
    pub fn new(
        definitions: impl IntoIterator<Item = ActionDefinition>,
        registry: &TagRegistry,
    ) -> Result<Self, RegistryError> {
        let mut actions = BTreeMap::new();
        for definition in definitions {
            definition.validate(registry)?;
            let id = definition.id.clone();
            if actions.insert(id.clone(), Arc::new(definition)).is_some() {
                return Err(RegistryError::DuplicateAction(id.to_string()));
            }
        }
        Ok(Self { actions })
    }

    pub fn load(path: &Path, registry: &TagRegistry) -> LoadResult<Self> {
        let content = read_file(path)?;
        Self::parse(&content, registry)
    }

    pub fn parse(content: &str, registry: &TagRegistry) -> LoadResult<Self> {
        let definitions: Vec<ActionDefinition> = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse actions RON: {}", e))?;
        Self::new(definitions, registry).map_err(|e| anyhow::anyhow!("Invalid actions: {}", e))
    }

    pub fn get(&self, id: &str) -> Option<&Arc<ActionDefinition>> {
        self.actions.get(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &ActionId> {
        self.actions.keys()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tactics_core::{Priority, RangeSpec, TagDescriptor};

    fn registry() -> TagRegistry {
        TagRegistry::new([
            TagDescriptor::new("melee"),
            TagDescriptor::new("ammunition").internal(),
            TagDescriptor::new("strike").with_priority(Priority::LAST),
        ])
        .unwrap()
    }

    #[test]
    fn parses_definitions() {
        let catalog = ActionCatalog::parse(
            r#"[(
                id: "strike",
                name: "Strike",
                tags: ["melee", "strike"],
                cost: (weapon: true),
                range: weapon,
            )]"#,
            &registry(),
        )
        .unwrap();

        let strike = catalog.get("strike").unwrap();
        assert!(strike.cost.weapon);
        assert_eq!(strike.range, RangeSpec::Weapon);
    }

    #[test]
    fn rejects_declared_internal_tags() {
        let err = ActionCatalog::parse(
            r#"[(id: "reload", name: "Reload", tags: ["ammunition"])]"#,
            &registry(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("internal"), "{err}");
    }

    #[test]
    fn rejects_duplicate_ids() {
        let definitions = [
            ActionDefinition::new("strike", "Strike").with_tags(["melee"]),
            ActionDefinition::new("strike", "Strike again").with_tags(["melee"]),
        ];
        assert_eq!(
            ActionCatalog::new(definitions, &registry()).unwrap_err(),
            RegistryError::DuplicateAction("strike".into())
        );
    }
}
