//! Arena configuration from environment variables and an optional TOML file.
use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use combat_content::ConfigLoader;
use combat_runtime::RuntimeConfig;

/// Settings for one skirmish.
#[derive(Clone, Debug)]
pub struct ArenaConfig {
    pub runtime: RuntimeConfig,
    /// Simulated time to run before printing the summary.
    pub duration_ms: u64,
    /// Directory holding `livings.ron`; built-in templates when unset.
    pub data_dir: Option<PathBuf>,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            runtime: RuntimeConfig::default(),
            duration_ms: 30_000,
            data_dir: None,
        }
    }
}

impl ArenaConfig {
    /// Construct arena configuration from environment variables.
    ///
    /// Environment variables:
    /// - `COMBAT_CONFIG` - TOML file with `[combat]` and `[runtime]` tables
    /// - `COMBAT_SEED` - RNG seed, overrides the file (default: entropy)
    /// - `COMBAT_DURATION_MS` - How long the skirmish runs (default: 30000)
    /// - `COMBAT_DATA_DIR` - Directory with a `livings.ron` template catalog
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(path) = env::var("COMBAT_CONFIG") {
            let path = PathBuf::from(path);
            let mut runtime: RuntimeConfig = ConfigLoader::load_as(&path, "runtime")
                .with_context(|| format!("runtime settings in {}", path.display()))?;
            runtime.combat = ConfigLoader::load(&path)
                .with_context(|| format!("combat settings in {}", path.display()))?;
            config.runtime = runtime;
        }

        if let Some(seed) = read_env::<u64>("COMBAT_SEED") {
            config.runtime.seed = Some(seed);
        }
        if let Some(duration) = read_env::<u64>("COMBAT_DURATION_MS") {
            config.duration_ms = duration.max(1);
        }
        if let Ok(dir) = env::var("COMBAT_DATA_DIR") {
            config.data_dir = Some(PathBuf::from(dir));
        }

        Ok(config)
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}
