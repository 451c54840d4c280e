//! Shared world state: the entity registry plus every collaborator the
//! combat rules consult.

mod clock;
mod groups;
mod registry;
mod sinks;
mod spatial;

pub use clock::GameClock;
pub use groups::GroupTable;
pub use registry::{EntityCell, EntityRegistry, TimerSlot};
pub use sinks::BusPresentation;
pub use spatial::SpatialIndex;

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use tokio::task::JoinSet;
use tracing::error;

use combat_core::env::{RngOracle, RuleOracle, SpellOracle, StyleOracle};
use combat_core::{CombatConfig, CombatEnv, PropertyRegistry};

use crate::api::{Result, RuntimeError};
use crate::events::EventBus;
use crate::hooks::HookRegistry;

/// Everything the workers share. Lives behind one `Arc`.
pub(crate) struct World {
    pub combat: CombatConfig,
    pub regeneration: bool,
    pub registry: EntityRegistry,
    pub properties: PropertyRegistry,
    pub rng: Box<dyn RngOracle>,
    pub rules: Box<dyn RuleOracle>,
    pub styles: Box<dyn StyleOracle>,
    pub spells: Box<dyn SpellOracle>,
    pub spatial: SpatialIndex,
    pub groups: GroupTable,
    pub presentation: BusPresentation,
    pub bus: EventBus,
    pub hooks: HookRegistry,
    pub clock: GameClock,
    tasks: Mutex<JoinSet<()>>,
    closed: AtomicBool,
}

pub(crate) struct Collaborators {
    pub properties: PropertyRegistry,
    pub rng: Box<dyn RngOracle>,
    pub rules: Box<dyn RuleOracle>,
    pub styles: Box<dyn StyleOracle>,
    pub spells: Box<dyn SpellOracle>,
    pub hooks: HookRegistry,
}

impl World {
    pub fn new(combat: CombatConfig, regeneration: bool, bus: EventBus, parts: Collaborators) -> Self {
        Self {
            combat,
            regeneration,
            registry: EntityRegistry::new(),
            properties: parts.properties,
            rng: parts.rng,
            rules: parts.rules,
            styles: parts.styles,
            spells: parts.spells,
            spatial: SpatialIndex::new(),
            groups: GroupTable::new(),
            presentation: BusPresentation::new(bus.clone()),
            bus,
            hooks: parts.hooks,
            clock: GameClock::start(),
            tasks: Mutex::new(JoinSet::new()),
            closed: AtomicBool::new(false),
        }
    }

    pub fn env(&self) -> CombatEnv<'_> {
        CombatEnv::new(&self.combat, &self.properties, self.rng.as_ref())
            .with_rules(self.rules.as_ref())
            .with_styles(self.styles.as_ref())
            .with_spatial(&self.spatial)
            .with_presentation(&self.presentation)
            .with_spells(self.spells.as_ref())
            .with_groups(&self.groups)
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    pub fn ensure_open(&self) -> Result<()> {
        if self.is_closed() {
            Err(RuntimeError::ShuttingDown)
        } else {
            Ok(())
        }
    }

    /// Spawns a timer task on the shared pool. Ignored once closed.
    pub fn spawn_task<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if self.is_closed() {
            return;
        }
        let mut tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        while let Some(finished) = tasks.try_join_next() {
            if let Err(e) = finished
                && e.is_panic()
            {
                error!(target: "runtime::timers", error = %e, "timer task panicked");
            }
        }
        tasks.spawn(task);
    }

    /// Stops accepting work, aborts every timer and waits for them.
    pub async fn close(&self) -> Result<()> {
        self.closed.store(true, Ordering::Release);
        let mut tasks = {
            let mut guard = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
            std::mem::take(&mut *guard)
        };
        tasks.abort_all();
        while let Some(finished) = tasks.join_next().await {
            if let Err(e) = finished
                && !e.is_cancelled()
            {
                return Err(RuntimeError::WorkerJoin(e));
            }
        }
        Ok(())
    }
}
