//! High-level runtime orchestrator.
//!
//! The runtime owns the shared world and its timer tasks, and exposes a
//! builder-based API for wiring in the collaborators the combat rules
//! consult.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use combat_core::env::{
    FlatStyles, NoSpells, RngOracle, RuleOracle, SpellOracle, StandardRules, StdRngOracle,
    StyleOracle,
};
use combat_core::{CombatConfig, PropertyRegistry};

use crate::api::{CombatHandle, Result};
use crate::events::EventBus;
use crate::hooks::HookRegistry;
use crate::world::{Collaborators, World};

/// Runtime configuration shared across the orchestrator and workers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub combat: CombatConfig,
    /// Per-topic broadcast buffer.
    pub event_buffer_size: usize,
    /// Fixed RNG seed; entropy when unset.
    pub seed: Option<u64>,
    /// Run the health, mana and endurance regeneration timers.
    pub regeneration: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            combat: CombatConfig::default(),
            event_buffer_size: 256,
            seed: None,
            regeneration: true,
        }
    }
}

/// Main runtime that drives the combat simulation.
///
/// Timers run on the ambient tokio runtime until [`Runtime::shutdown`].
/// [`CombatHandle`] provides a cloneable façade for clients.
pub struct Runtime {
    handle: CombatHandle,
    world: Arc<World>,
}

impl Runtime {
    /// Create a new runtime builder
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Get a cloneable handle to this runtime
    ///
    /// The handle can be shared across clients and async tasks.
    pub fn handle(&self) -> CombatHandle {
        self.handle.clone()
    }

    /// Aborts every timer and waits for them to finish.
    ///
    /// Handles still alive afterwards report [`RuntimeError::ShuttingDown`]
    /// for anything that would schedule work.
    ///
    /// [`RuntimeError::ShuttingDown`]: crate::api::RuntimeError::ShuttingDown
    pub async fn shutdown(self) -> Result<()> {
        info!(target: "runtime::timers", livings = self.world.registry.len(), "runtime shutting down");
        self.world.close().await
    }
}

/// Builder for [`Runtime`] with flexible configuration.
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    properties: Option<PropertyRegistry>,
    rng: Option<Box<dyn RngOracle>>,
    rules: Option<Box<dyn RuleOracle>>,
    styles: Option<Box<dyn StyleOracle>>,
    spells: Option<Box<dyn SpellOracle>>,
    hooks: Option<HookRegistry>,
}

impl RuntimeBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            properties: None,
            rng: None,
            rules: None,
            styles: None,
            spells: None,
            hooks: None,
        }
    }

    /// Override runtime configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Property calculators. Defaults to [`PropertyRegistry::standard`].
    pub fn properties(mut self, properties: PropertyRegistry) -> Self {
        self.properties = Some(properties);
        self
    }

    /// Random source. Overrides `RuntimeConfig::seed`.
    pub fn rng(mut self, rng: impl RngOracle + 'static) -> Self {
        self.rng = Some(Box::new(rng));
        self
    }

    pub fn rules(mut self, rules: impl RuleOracle + 'static) -> Self {
        self.rules = Some(Box::new(rules));
        self
    }

    pub fn styles(mut self, styles: impl StyleOracle + 'static) -> Self {
        self.styles = Some(Box::new(styles));
        self
    }

    pub fn spells(mut self, spells: impl SpellOracle + 'static) -> Self {
        self.spells = Some(Box::new(spells));
        self
    }

    /// Set custom post-swing hooks.
    ///
    /// If not provided, the default hooks (death check, aggro) are used.
    ///
    /// # Example
    ///
    /// ```ignore
    /// use std::sync::Arc;
    ///
    /// let runtime = Runtime::builder()
    ///     .with_hooks(HookRegistry::new(vec![
    ///         Arc::new(DeathCheckHook) as Arc<dyn PostSwingHook>,
    ///     ]))
    ///     .build()?;
    /// ```
    pub fn with_hooks(mut self, hooks: HookRegistry) -> Self {
        self.hooks = Some(hooks);
        self
    }

    /// Validates the configuration and assembles the runtime.
    pub fn build(self) -> Result<Runtime> {
        self.config.combat.validate()?;

        let rng = self.rng.unwrap_or_else(|| match self.config.seed {
            Some(seed) => Box::new(StdRngOracle::seeded(seed)),
            None => Box::new(StdRngOracle::from_entropy()),
        });
        let parts = Collaborators {
            properties: self.properties.unwrap_or_else(PropertyRegistry::standard),
            rng,
            rules: self.rules.unwrap_or_else(|| Box::new(StandardRules)),
            styles: self.styles.unwrap_or_else(|| Box::new(FlatStyles)),
            spells: self.spells.unwrap_or_else(|| Box::new(NoSpells)),
            hooks: self.hooks.unwrap_or_default(),
        };
        let bus = EventBus::with_capacity(self.config.event_buffer_size);
        let world = Arc::new(World::new(
            self.config.combat,
            self.config.regeneration,
            bus,
            parts,
        ));

        info!(
            target: "runtime::timers",
            seeded = self.config.seed.is_some(),
            regeneration = self.config.regeneration,
            hooks = world.hooks.len(),
            "runtime built"
        );
        Ok(Runtime {
            handle: CombatHandle::new(Arc::clone(&world)),
            world,
        })
    }
}
