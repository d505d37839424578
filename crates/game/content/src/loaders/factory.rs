//! Content factory for building the engine's static inputs from data files.

use std::path::{Path, PathBuf};

use tactics_core::{DefenseTable, RulesConfig, TagRegistry};

use crate::loaders::{ActionCatalog, LoadResult, RulesDocument, RulesLoader, TagLoader};

const STANDARD_RULES: &str = include_str!("../../data/rules.toml");
const STANDARD_TAGS: &str = include_str!("../../data/tags.ron");
const STANDARD_ACTIONS: &str = include_str!("../../data/actions.ron");

/// Everything the executor needs from content, loaded and cross-validated.
#[derive(Debug, Clone)]
pub struct Content {
    pub rules: RulesConfig,
    pub defenses: DefenseTable,
    pub tags: TagRegistry,
    pub actions: ActionCatalog,
}

impl Content {
    fn assemble(rules: RulesDocument, tags: &str, actions: &str) -> LoadResult<Self> {
        let RulesDocument { rules, defense } = rules;
        let tags = TagLoader::parse(tags, &rules)?;
        let actions = ActionCatalog::parse(actions, &tags)?;
        Ok(Self {
            rules,
            defenses: defense,
            tags,
            actions,
        })
    }
}

/// Content factory that loads all content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── rules.toml
/// ├── tags.ron
/// └── actions.ron
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    /// Creates a new content factory pointing to a data directory.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// The catalog compiled into this crate.
    pub fn standard() -> LoadResult<Content> {
        let rules = RulesLoader::parse(STANDARD_RULES)?;
        Content::assemble(rules, STANDARD_TAGS, STANDARD_ACTIONS)
    }

    /// Load rules and defense tiers from `rules.toml`.
    pub fn load_rules(&self) -> LoadResult<RulesDocument> {
        RulesLoader::load(&self.data_dir.join("rules.toml"))
    }

    /// Load every content file in the directory.
    pub fn load(&self) -> LoadResult<Content> {
        let rules = self.load_rules()?;
        let tags = crate::loaders::read_file(&self.data_dir.join("tags.ron"))?;
        let actions = crate::loaders::read_file(&self.data_dir.join("actions.ron"))?;
        Content::assemble(rules, &tags, &actions)
    }

    /// Returns the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tactics_core::ActorId;

    #[test]
    fn test_factory_paths() {
        let factory = ContentFactory::new("/tmp/data");
        assert_eq!(factory.data_dir(), Path::new("/tmp/data"));
    }

    #[test]
    fn standard_catalog_loads() {
        let content = ContentFactory::standard().unwrap();
        assert_eq!(content.rules, RulesConfig::default());
        assert_eq!(content.defenses.tiers().len(), 3);
        assert!(content.actions.get("strike").is_some());
        assert!(content.tags.get("ammunition").unwrap().internal);
    }

    #[test]
    fn strike_runs_last_and_ranged_brings_ammunition() {
        let content = ContentFactory::standard().unwrap();
        let shoot = content.actions.get("shoot").unwrap();
        let instance = tactics_core::ActionInstance::new(shoot.clone(), &content.tags, ActorId(1), 0)
            .unwrap();
        let order: Vec<_> = instance.tags().iter().map(|t| t.as_str()).collect();
        assert_eq!(order, ["ranged", "ammunition", "strike"]);
    }

    #[test]
    fn loads_from_a_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("rules.toml"), STANDARD_RULES).unwrap();
        std::fs::write(dir.path().join("tags.ron"), r#"[(id: "melee")]"#).unwrap();
        std::fs::write(
            dir.path().join("actions.ron"),
            r#"[(id: "shove", name: "Shove", tags: ["melee"])]"#,
        )
        .unwrap();

        let content = ContentFactory::new(dir.path()).load().unwrap();
        assert_eq!(content.actions.len(), 1);
        assert_eq!(content.tags.len(), 1);
    }
}
