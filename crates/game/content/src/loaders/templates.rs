//! Living template loader.

use std::path::Path;

use crate::loaders::{LoadResult, read_file};
use crate::templates::{LivingTemplate, TemplateCatalog};

/// Loader for living templates from RON files.
pub struct TemplateLoader;

impl TemplateLoader {
    /// Load a template catalog from a RON file.
    ///
    /// RON format: `Vec<(String, LivingTemplate)>`. Keys must be unique.
    pub fn load(path: &Path) -> LoadResult<TemplateCatalog> {
        let content = read_file(path)?;
        Self::load_str(&content)
    }

    pub fn load_str(content: &str) -> LoadResult<TemplateCatalog> {
        let raw: Vec<(String, LivingTemplate)> = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse template catalog RON: {}", e))?;

        let mut catalog = TemplateCatalog::new();
        for (key, template) in raw {
            if template.level == 0 || template.max_health == 0 {
                anyhow::bail!("Template '{}' needs a non-zero level and max_health", key);
            }
            if catalog.insert(key.clone(), template).is_some() {
                anyhow::bail!("Duplicate template '{}'", key);
            }
        }
        tracing::debug!(target: "content::templates", count = catalog.len(), "templates loaded");
        Ok(catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use combat_core::state::{DamageType, WeaponHand};
    use combat_core::{EntityId, Position, Property};

    use crate::templates::TemplateKind;

    const CATALOG: &str = r#"[
        ("guard", (
            name: "Town Guard",
            kind: Npc,
            realm: Albion,
            level: 20,
            max_health: 800,
            properties: [(Strength, 90), (Quickness, 60)],
            abilities: [(Parry, 5)],
            equipment: (
                main_hand: Some((
                    name: "halberd",
                    damage_type: Slash,
                    speed: 42,
                    hand: TwoHanded,
                )),
            ),
            active_slot: TwoHanded,
        )),
        ("wolf", (
            name: "wolf",
            kind: Pet(owner_is_player: true),
            level: 12,
            max_health: 300,
        )),
    ]"#;

    #[test]
    fn test_load_catalog() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(CATALOG.as_bytes()).unwrap();

        let catalog = TemplateLoader::load(file.path()).unwrap();
        assert_eq!(catalog.keys().collect::<Vec<_>>(), vec!["guard", "wolf"]);

        let guard = catalog.get("guard").unwrap();
        assert_eq!(guard.kind, TemplateKind::Npc);
        assert_eq!(guard.max_endurance, 100);
        let halberd = guard.equipment.main_hand.as_ref().unwrap();
        assert_eq!(halberd.damage_type, DamageType::Slash);
        assert_eq!(halberd.hand, WeaponHand::TwoHanded);
        assert_eq!(halberd.spec_level, 0);

        let living = guard.instantiate(EntityId(1), Position::default()).unwrap();
        assert_eq!(living.base_property(Property::Strength), 90);
    }

    #[test]
    fn test_duplicate_and_invalid_entries_fail() {
        let duplicate = r#"[
            ("a", (name: "a", kind: Npc, level: 1, max_health: 10)),
            ("a", (name: "b", kind: Npc, level: 1, max_health: 10)),
        ]"#;
        assert!(TemplateLoader::load_str(duplicate).is_err());

        let dead = r#"[("a", (name: "a", kind: Npc, level: 1, max_health: 0))]"#;
        assert!(TemplateLoader::load_str(dead).is_err());
    }
}
