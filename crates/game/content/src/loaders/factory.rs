//! Content factory for loading combat data from a directory.

use std::path::{Path, PathBuf};

use combat_core::CombatConfig;

use crate::loaders::{ConfigLoader, LoadResult, TemplateLoader};
use crate::templates::TemplateCatalog;

/// Content factory that loads all combat content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── combat.toml
/// └── livings.ron
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    pub const CONFIG_FILE: &'static str = "combat.toml";
    pub const TEMPLATES_FILE: &'static str = "livings.ron";

    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Load combat tuning from `combat.toml`. A missing file yields the
    /// defaults.
    pub fn load_config(&self) -> LoadResult<CombatConfig> {
        let path = self.config_path();
        if !path.exists() {
            return Ok(CombatConfig::default());
        }
        ConfigLoader::load(&path)
    }

    /// Load the living templates from `livings.ron`.
    pub fn load_templates(&self) -> LoadResult<TemplateCatalog> {
        TemplateLoader::load(&self.data_dir.join(Self::TEMPLATES_FILE))
    }

    pub fn config_path(&self) -> PathBuf {
        self.data_dir.join(Self::CONFIG_FILE)
    }

    /// Returns the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_paths() {
        let factory = ContentFactory::new("/tmp/data");
        assert_eq!(factory.data_dir(), Path::new("/tmp/data"));
        assert_eq!(factory.config_path(), Path::new("/tmp/data/combat.toml"));
    }

    #[test]
    fn test_loads_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("livings.ron"),
            r#"[("rat", (name: "rat", kind: Npc, level: 2, max_health: 40))]"#,
        )
        .unwrap();

        let factory = ContentFactory::new(dir.path());
        assert_eq!(factory.load_config().unwrap(), CombatConfig::default());
        assert_eq!(factory.load_templates().unwrap().len(), 1);

        std::fs::write(factory.config_path(), "[combat]\nmelee_range = 300\n").unwrap();
        assert_eq!(factory.load_config().unwrap().melee_range, 300);
    }
}
