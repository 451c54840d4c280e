//! Death, removal and direct resource changes.

use std::sync::Arc;

use tracing::{debug, info};

use combat_core::combat::DeathReport;
use combat_core::schedule::StopReason;
use combat_core::{ChangeReason, EntityId, LivingFlags, ResourceKind, die};

use crate::api::{Result, RuntimeError};
use crate::events::{LifecycleEvent, ResourceEvent};
use crate::world::World;

use super::timers;

/// Kills `victim`. Returns `None` when it was already dead.
///
/// Cancels its timers, drops it from every attacker's registry and
/// publishes the death with the credit snapshot.
pub(crate) async fn kill(world: &Arc<World>, victim: EntityId, killer: Option<EntityId>) -> Result<Option<DeathReport>> {
    let cell = world.registry.require(victim)?;
    let (report, target) = {
        let mut living = cell.lock().await;
        let target = living.attack.target();
        let env = world.env();
        let report = die(&env, &mut living, killer);
        if report.is_some() {
            cell.cancel_regen();
        }
        (report, target)
    };
    let Some(report) = report else {
        return Ok(None);
    };

    if target.is_some() {
        timers::attack_ended(world, victim, target, StopReason::Stopped).await;
    }
    for attacker in &report.attackers {
        if let Some(cell) = world.registry.get(*attacker) {
            cell.lock().await.remove_attacker(victim);
        }
    }
    world.bus.publish(LifecycleEvent::Died(Box::new(report.clone())));
    Ok(Some(report))
}

/// Takes `id` out of the simulation.
///
/// The living is marked inactive, its timers are cancelled and every
/// registry that referenced it forgets it.
pub(crate) async fn remove(world: &Arc<World>, id: EntityId) -> Result<()> {
    let cell = world.registry.remove(id).ok_or(RuntimeError::UnknownEntity(id))?;
    let (target, attackers) = {
        let mut living = cell.lock().await;
        living.flags.remove(LivingFlags::ACTIVE);
        cell.cancel_regen();
        let target = living.attack.stop();
        let attackers = living.attackers.snapshot();
        living.attackers.clear();
        (target, attackers)
    };

    if target.is_some() {
        timers::attack_ended(world, id, target, StopReason::Stopped).await;
    }
    for attacker in attackers {
        if let Some(cell) = world.registry.get(attacker) {
            cell.lock().await.remove_attacker(id);
        }
    }
    world.spatial.remove(id);
    world.groups.leave(id);

    info!(target: "runtime::events", living = %id, "living removed");
    world.bus.publish(LifecycleEvent::Removed { living: id });
    Ok(())
}

/// Applies a clamped resource change and returns the amount applied.
///
/// A pool left below its maximum restarts its regeneration timer.
pub(crate) async fn change_resource(
    world: &Arc<World>,
    id: EntityId,
    kind: ResourceKind,
    source: Option<EntityId>,
    reason: ChangeReason,
    delta: i64,
) -> Result<i64> {
    world.ensure_open()?;
    let cell = world.registry.require(id)?;
    let (applied, current, maximum) = {
        let mut living = cell.lock().await;
        let applied = living.change_resource(kind, delta);
        timers::ensure_regen(world, &cell, &living, kind);
        let meter = living.meter(kind);
        (applied, meter.current, meter.maximum)
    };

    debug!(target: "runtime::events", living = %id, %kind, %reason, delta, applied, "resource changed");
    if applied != 0 {
        world.bus.publish(ResourceEvent::Changed {
            living: id,
            kind,
            reason,
            source,
            delta: applied,
            current,
            maximum,
        });
    }
    Ok(applied)
}

/// Adds or removes `attacker` in `id`'s attacker registry. Returns whether
/// the registry changed.
pub(crate) async fn set_attacker(world: &World, id: EntityId, attacker: EntityId, engaged: bool) -> Result<bool> {
    let cell = world.registry.require(id)?;
    let mut living = cell.lock().await;
    Ok(if engaged {
        living.add_attacker(attacker)
    } else {
        living.remove_attacker(attacker)
    })
}
