//! Rules and defense tier loader.

use std::path::Path;

use serde::Deserialize;
use tactics_core::{DefenseTable, RulesConfig};

use crate::loaders::{LoadResult, read_file};

/// Contents of `rules.toml`.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct RulesDocument {
    pub rules: RulesConfig,
    pub defense: DefenseTable,
}

/// Loader for rules constants and the physical defense tier table from TOML files.
pub struct RulesLoader;

impl RulesLoader {
    pub fn load(path: &Path) -> LoadResult<RulesDocument> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<RulesDocument> {
        let document: RulesDocument = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse rules TOML: {}", e))?;
        Self::validate(&document.rules)?;
        Ok(document)
    }

    fn validate(rules: &RulesConfig) -> LoadResult<()> {
        if rules.face_step == 0 {
            anyhow::bail!("face_step must be positive");
        }
        if !(rules.min_faces <= rules.starting_faces && rules.starting_faces <= rules.max_faces) {
            anyhow::bail!(
                "starting_faces {} must lie within {}..={}",
                rules.starting_faces,
                rules.min_faces,
                rules.max_faces
            );
        }
        if rules.critical_margin <= 0 {
            anyhow::bail!("critical_margin must be positive");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tactics_core::TierEffect;

    #[test]
    fn missing_sections_use_defaults() {
        let document = RulesLoader::parse("").unwrap();
        assert_eq!(document.rules, RulesConfig::default());
        assert!(document.defense.is_empty());
    }

    #[test]
    fn parses_tiers_in_order() {
        let document = RulesLoader::parse(
            r#"
            [[defense]]
            id = "deflect"
            label = "Deflect"
            component = "armor"
            effect = { type = "partial", damage_percent = 25 }

            [[defense]]
            id = "parry"
            label = "Parry"
            component = "parry"
            effect = { type = "avoid" }
            "#,
        )
        .unwrap();

        let tiers = document.defense.tiers();
        assert_eq!(tiers.len(), 2);
        assert_eq!(tiers[0].effect, TierEffect::Partial { damage_percent: 25 });
        assert_eq!(tiers[1].component, "parry");
    }

    #[test]
    fn rejects_inverted_face_bounds() {
        let err = RulesLoader::parse(
            r#"
            [rules]
            min_faces = 10
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("starting_faces"));
    }
}
