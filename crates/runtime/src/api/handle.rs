//! Cloneable façade over the running simulation.
//!
//! [`CombatHandle`] exposes every combat operation as an async method. Each
//! call locks at most one living at a time and publishes what it changed on
//! the event bus.
use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::info;

use combat_core::combat::{AppliedAttack, DeathReport, InterruptOutcome};
use combat_core::env::{RuleOracle, SpellOracle};
use combat_core::{
    AttackRecord, AttackType, ChangeReason, EntityId, GameTime, Living, LivingError, Position,
    ResourceKind, StyleInfo, SwingRequest, attack_speed, start_interrupt,
};

use super::errors::{Result, RuntimeError};
use crate::events::{CombatEvent, Event, EventBus, LifecycleEvent, Topic};
use crate::workers::{self, SwingOutcome};
use crate::world::World;

/// Client-facing handle to the combat runtime.
#[derive(Clone)]
pub struct CombatHandle {
    world: Arc<World>,
}

impl CombatHandle {
    pub(crate) fn new(world: Arc<World>) -> Self {
        Self { world }
    }

    /// Current simulation time.
    pub fn now(&self) -> GameTime {
        self.world.clock.now()
    }

    // ===== entities =====

    /// Registers a new living built by `build` from a fresh id.
    ///
    /// Regeneration starts right away for any pool below its maximum.
    pub async fn spawn<F>(&self, build: F) -> Result<EntityId>
    where
        F: FnOnce(EntityId) -> std::result::Result<Living, LivingError>,
    {
        self.world.ensure_open()?;
        let id = self.world.registry.allocate_id();
        let living = build(id)?;
        living.validate()?;
        let name = living.name.clone();
        let id = living.id;

        let cell = self.world.registry.insert(living)?;
        {
            let living = cell.lock().await;
            self.world.spatial.update(&living);
            workers::ensure_all_regen(&self.world, &cell, &living);
        }

        info!(target: "runtime::events", living = %id, %name, "living spawned");
        self.world.bus.publish(LifecycleEvent::Spawned { living: id, name });
        Ok(id)
    }

    /// Takes a living out of the simulation and stops all of its timers.
    pub async fn remove(&self, id: EntityId) -> Result<()> {
        workers::remove(&self.world, id).await
    }

    /// Copy of a living's current state.
    pub async fn snapshot(&self, id: EntityId) -> Result<Living> {
        self.world
            .registry
            .snapshot(id)
            .await
            .ok_or(RuntimeError::UnknownEntity(id))
    }

    pub async fn set_position(&self, id: EntityId, position: Position) -> Result<()> {
        let cell = self.world.registry.require(id)?;
        let mut living = cell.lock().await;
        living.position = position;
        self.world.spatial.update(&living);
        Ok(())
    }

    /// Registered ids in ascending order.
    pub fn ids(&self) -> Vec<EntityId> {
        self.world.registry.ids()
    }

    // ===== groups =====

    pub fn form_group(&self, leader: EntityId, members: &[EntityId]) {
        self.world.groups.form(leader, members);
    }

    pub fn leave_group(&self, member: EntityId) {
        self.world.groups.leave(member);
    }

    // ===== attack scheduling =====

    /// Starts `attacker` attacking `target`. Returns `false` when the
    /// attacker cannot attack right now (dead, inactive, stunned).
    pub async fn start_attack(&self, attacker: EntityId, target: EntityId) -> Result<bool> {
        workers::start_attack(&self.world, attacker, target).await
    }

    /// Stops the attack timer. Calling it again is a no-op.
    pub async fn stop_attack(&self, attacker: EntityId) -> Result<bool> {
        workers::stop_attack(&self.world, attacker).await
    }

    // ===== swings =====

    fn request(&self, attacker: &Living, style: Option<StyleInfo>) -> SwingRequest {
        let speed = attack_speed(&self.world.env(), attacker);
        let request = SwingRequest::primary(attacker, speed, self.now());
        match style {
            Some(style) => request.with_style(style),
            None => request,
        }
    }

    /// Resolves one swing without applying it.
    ///
    /// Single-use wards on the defender are consumed either way. Apply the
    /// record with [`Self::on_attacked_by_enemy`].
    pub async fn resolve_swing(
        &self,
        attacker: EntityId,
        defender: EntityId,
        style: Option<StyleInfo>,
    ) -> Result<AttackRecord> {
        let attacker = self.snapshot(attacker).await?;
        let request = self.request(&attacker, style);
        workers::resolve_only(&self.world, &attacker, defender, &request).await
    }

    /// Applies a resolved record to the living it targets.
    pub async fn on_attacked_by_enemy(&self, record: &AttackRecord) -> Result<AppliedAttack> {
        let Some(target) = record.target else {
            return Ok(AppliedAttack::default());
        };
        let attacker = self.snapshot(record.attacker).await?;
        let cell = self.world.registry.require(target)?;
        let participants = workers::gather_participants(&self.world, &attacker, Some(&cell)).await;
        let (applied, _) = workers::apply_record(&self.world, &attacker, &participants, record, target).await?;
        Ok(applied)
    }

    /// Runs a full swing: resolution, damage, procs, notifications and
    /// post-swing hooks.
    pub async fn swing(
        &self,
        attacker: EntityId,
        defender: EntityId,
        style: Option<StyleInfo>,
    ) -> Result<SwingOutcome> {
        let attacker = self.snapshot(attacker).await?;
        let request = self.request(&attacker, style);
        workers::execute_swing(&self.world, &attacker, defender, request).await
    }

    // ===== death =====

    /// Kills a living. `None` when it was already dead.
    pub async fn die(&self, id: EntityId, killer: Option<EntityId>) -> Result<Option<DeathReport>> {
        workers::kill(&self.world, id, killer).await
    }

    pub fn experience_for_level(&self, level: u8) -> u64 {
        self.world.rules.experience_for_level(level)
    }

    // ===== resources =====

    /// Applies `delta` to health and returns the amount actually applied.
    pub async fn change_health(
        &self,
        id: EntityId,
        source: Option<EntityId>,
        reason: ChangeReason,
        delta: i64,
    ) -> Result<i64> {
        workers::change_resource(&self.world, id, ResourceKind::Health, source, reason, delta).await
    }

    pub async fn change_mana(
        &self,
        id: EntityId,
        source: Option<EntityId>,
        reason: ChangeReason,
        delta: i64,
    ) -> Result<i64> {
        workers::change_resource(&self.world, id, ResourceKind::Mana, source, reason, delta).await
    }

    pub async fn change_endurance(
        &self,
        id: EntityId,
        source: Option<EntityId>,
        reason: ChangeReason,
        delta: i64,
    ) -> Result<i64> {
        workers::change_resource(&self.world, id, ResourceKind::Endurance, source, reason, delta).await
    }

    // ===== engagement =====

    pub async fn add_attacker(&self, id: EntityId, attacker: EntityId) -> Result<bool> {
        workers::set_attacker(&self.world, id, attacker, true).await
    }

    pub async fn remove_attacker(&self, id: EntityId, attacker: EntityId) -> Result<bool> {
        workers::set_attacker(&self.world, id, attacker, false).await
    }

    /// Extends `id`'s interrupt window to `now + duration`.
    ///
    /// The window never shrinks. Interruptible casts are broken and a drawn
    /// shot may be spoiled.
    pub async fn start_interrupt(
        &self,
        id: EntityId,
        duration: u32,
        attack_type: AttackType,
        source: Option<EntityId>,
    ) -> Result<InterruptOutcome> {
        let source_level = match source {
            Some(source) => Some(self.snapshot(source).await?.level),
            None => None,
        };
        let cell = self.world.registry.require(id)?;
        let now = self.now();
        let (outcome, until, position) = {
            let mut living = cell.lock().await;
            let env = self.world.env();
            let level = source_level.unwrap_or(living.level);
            let outcome = start_interrupt(&env, &mut living, level, duration, attack_type, now);
            (outcome, living.temp.interrupted_until, living.position)
        };

        if outcome.cast_interrupted {
            self.world.spells.interrupt_cast(id, source.unwrap_or(id));
        }
        if outcome.extended || outcome.cast_interrupted || outcome.shot_spoiled {
            self.world.bus.publish(CombatEvent::Interrupted {
                living: id,
                source,
                until,
                cast_interrupted: outcome.cast_interrupted,
                shot_spoiled: outcome.shot_spoiled,
            });
        }
        if outcome.shot_spoiled {
            workers::shot_spoiled(&self.world, id, outcome.stopped_target, &position).await;
        }
        Ok(outcome)
    }

    // ===== events =====

    /// Subscribe to events from one topic.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use combat_runtime::Topic;
    ///
    /// let mut deaths = handle.subscribe(Topic::Lifecycle);
    /// while let Ok(event) = deaths.recv().await {
    ///     // ...
    /// }
    /// ```
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.world.bus.subscribe(topic)
    }

    pub fn subscribe_multiple(&self, topics: &[Topic]) -> HashMap<Topic, broadcast::Receiver<Event>> {
        self.world.bus.subscribe_multiple(topics)
    }

    /// Get a reference to the event bus for advanced usage
    pub fn event_bus(&self) -> &EventBus {
        &self.world.bus
    }
}
