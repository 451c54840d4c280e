//! Combat configuration loader.
//!
//! One TOML file carries every tunable, split into top-level tables:
//!
//! ```toml
//! [combat]
//! melee_range = 200
//!
//! [runtime]
//! seed = 7
//! ```
//!
//! Missing tables and missing keys fall back to defaults.

use std::path::Path;

use combat_core::CombatConfig;
use serde::de::DeserializeOwned;

use crate::loaders::{LoadResult, read_file};

/// Loader for combat configuration from TOML files.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Table holding [`CombatConfig`].
    pub const COMBAT_SECTION: &'static str = "combat";

    /// Load and validate the `[combat]` table of a TOML file.
    pub fn load(path: &Path) -> LoadResult<CombatConfig> {
        let content = read_file(path)?;
        Self::load_str(&content)
            .map_err(|e| anyhow::anyhow!("Invalid config {}: {}", path.display(), e))
    }

    /// Same as [`ConfigLoader::load`] for in-memory TOML.
    pub fn load_str(content: &str) -> LoadResult<CombatConfig> {
        let config: CombatConfig = Self::section_str(content, Self::COMBAT_SECTION)?;
        config
            .validate()
            .map_err(|e| anyhow::anyhow!("Invalid combat config: {}", e))?;
        Ok(config)
    }

    /// Load any other table of the same file, such as the runtime settings.
    pub fn load_as<T>(path: &Path, section: &str) -> LoadResult<T>
    where
        T: DeserializeOwned + Default,
    {
        let content = read_file(path)?;
        Self::section_str(&content, section)
    }

    fn section_str<T>(content: &str, section: &str) -> LoadResult<T>
    where
        T: DeserializeOwned + Default,
    {
        let table: toml::Table = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config TOML: {}", e))?;

        match table.get(section) {
            Some(value) => value
                .clone()
                .try_into()
                .map_err(|e| anyhow::anyhow!("Failed to parse [{}] table: {}", section, e)),
            None => {
                tracing::debug!(target: "content::config", section, "table missing, using defaults");
                Ok(T::default())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[derive(Debug, Default, PartialEq, serde::Deserialize)]
    struct Extra {
        seed: Option<u64>,
    }

    #[test]
    fn test_load_overrides_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[combat]\nmelee_range = 250\nhealth_regen_period_ms = 4000\n\n[runtime]\nseed = 7"
        )
        .unwrap();

        let config = ConfigLoader::load(file.path()).unwrap();
        assert_eq!(config.melee_range, 250);
        assert_eq!(config.health_regen_period_ms, 4000);
        assert_eq!(config.mana_regen_period_ms, CombatConfig::default().mana_regen_period_ms);

        let extra: Extra = ConfigLoader::load_as(file.path(), "runtime").unwrap();
        assert_eq!(extra.seed, Some(7));
    }

    #[test]
    fn test_missing_table_uses_defaults() {
        let config = ConfigLoader::load_str("").unwrap();
        assert_eq!(config, CombatConfig::default());
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let err = ConfigLoader::load_str("[combat]\nblade_barrier_chance = 1.5").unwrap_err();
        assert!(err.to_string().contains("blade_barrier_chance"));

        assert!(ConfigLoader::load_str("[combat]\nmelee_range = \"far\"").is_err());
        assert!(ConfigLoader::load(Path::new("/definitely/not/here.toml")).is_err());
    }
}
