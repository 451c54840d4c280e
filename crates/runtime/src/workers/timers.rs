//! Attack and regeneration timers.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use strum::IntoEnumIterator;
use tokio::time::sleep;
use tracing::{debug, trace};

use combat_core::env::{PresentationSink, SpatialKind, SpatialOracle};
use combat_core::regen::regen_period;
use combat_core::schedule::StopReason;
use combat_core::{
    ChangeReason, EntityId, Living, ResourceKind, TickDecision, attack_tick, needs_regen,
    regen_tick,
};

use crate::api::{Result, RuntimeError};
use crate::events::{LifecycleEvent, ResourceEvent};
use crate::world::{EntityCell, World};

use super::swing;

type TimerTask = Pin<Box<dyn Future<Output = ()> + Send>>;

/// Starts `attacker` swinging at `target`.
///
/// Returns whether the attacker is now attacking `target`. A living that
/// cannot attack is left untouched; one already attacking switches target
/// and keeps its cadence.
pub(crate) async fn start_attack(world: &Arc<World>, attacker: EntityId, target: EntityId) -> Result<bool> {
    world.ensure_open()?;
    let cell = world.registry.require(attacker)?;
    let target_snapshot = world
        .registry
        .snapshot(target)
        .await
        .ok_or(RuntimeError::UnknownEntity(target))?;

    let now = world.clock.now();
    let (first, generation, previous, running, position) = {
        let mut living = cell.lock().await;
        let previous = living.attack.target();
        let env = world.env();
        let first = combat_core::start_attack(&env, &mut living, &target_snapshot, now);
        (
            first,
            living.attack.generation(),
            previous,
            living.attack.is_running(),
            living.position,
        )
    };

    if let Some(delay) = first {
        debug!(target: "runtime::timers", %attacker, %target, delay, generation, "attack timer armed");
        world.spawn_task(attack_loop(Arc::clone(world), cell, generation, delay));
    } else if !running {
        debug!(target: "runtime::timers", %attacker, %target, "attacker cannot start attacking");
        return Ok(false);
    }

    if previous != Some(target) {
        broadcast_target(world, &position, attacker, Some(target));
        world.bus.publish(LifecycleEvent::AttackStarted { attacker, target });
    }
    Ok(true)
}

/// Stops `attacker`'s attack. Returns whether it was running; stopping an
/// idle living changes nothing.
pub(crate) async fn stop_attack(world: &Arc<World>, attacker: EntityId) -> Result<bool> {
    let cell = world.registry.require(attacker)?;
    let (target, position) = {
        let mut living = cell.lock().await;
        let target = living.attack.stop();
        if target.is_some() {
            living.temp.clear_last_attack();
        }
        (target, living.position)
    };
    let Some(target) = target else {
        return Ok(false);
    };
    attack_ended(world, attacker, Some(target), StopReason::Stopped).await;
    broadcast_target(world, &position, attacker, None);
    Ok(true)
}

/// Cleanup after an attack ends: the prior target drops the attacker from
/// its registry and the stop is published.
pub(super) async fn attack_ended(
    world: &Arc<World>,
    attacker: EntityId,
    target: Option<EntityId>,
    reason: StopReason,
) {
    if let Some(target) = target
        && let Some(cell) = world.registry.get(target)
    {
        cell.lock().await.remove_attacker(attacker);
    }
    debug!(target: "runtime::timers", %attacker, ?target, %reason, "attack stopped");
    world.bus.publish(LifecycleEvent::AttackStopped { attacker, reason });
}

/// Finishes the stop of an attack an interrupt ended by spoiling a drawn
/// shot.
pub(crate) async fn shot_spoiled(
    world: &Arc<World>,
    archer: EntityId,
    target: Option<EntityId>,
    position: &combat_core::Position,
) {
    attack_ended(world, archer, target, StopReason::Stopped).await;
    broadcast_target(world, position, archer, None);
}

fn broadcast_target(
    world: &World,
    position: &combat_core::Position,
    living: EntityId,
    target: Option<EntityId>,
) {
    let observers = world.spatial.entities_within_radius(
        position,
        world.combat.visibility_distance,
        SpatialKind::Players,
    );
    for observer in observers {
        world.presentation.send_change_target(observer, living, target);
    }
}

// Boxed so the swing pipeline, which may start new attacks, can name the
// task type without a cycle.
fn attack_loop(world: Arc<World>, cell: Arc<EntityCell>, generation: u64, delay: u64) -> TimerTask {
    Box::pin(async move {
        let mut delay = delay;
        loop {
            sleep(Duration::from_millis(delay)).await;
            if world.is_closed() {
                return;
            }

            let target_id = {
                let living = cell.lock().await;
                if living.attack.generation() != generation {
                    trace!(target: "runtime::timers", living = %cell.id(), generation, "stale attack timer");
                    return;
                }
                living.attack.target()
            };
            let target = match target_id {
                Some(id) => world.registry.snapshot(id).await,
                None => None,
            };

            let now = world.clock.now();
            let decision = {
                let mut living = cell.lock().await;
                if living.attack.generation() != generation {
                    return;
                }
                if living.attack.target() != target_id {
                    // retargeted while the snapshot was taken
                    delay = 0;
                    continue;
                }
                let env = world.env();
                attack_tick(&env, &mut living, target.as_ref(), now)
            };
            trace!(target: "runtime::timers", living = %cell.id(), ?decision, "attack tick");

            match decision {
                TickDecision::Wait { delay: next } => delay = next,
                TickDecision::Skip { next } => {
                    rearm(&cell, generation).await;
                    delay = next;
                }
                TickDecision::Stop { reason } => {
                    attack_ended(&world, cell.id(), target_id, reason).await;
                    return;
                }
                TickDecision::Dispatch {
                    target,
                    connect_delay,
                    next,
                } => {
                    if connect_delay == 0 {
                        swing::connect(&world, cell.id(), target).await;
                        rearm(&cell, generation).await;
                    } else {
                        world.spawn_task(delayed_connect(
                            Arc::clone(&world),
                            Arc::clone(&cell),
                            generation,
                            target,
                            connect_delay,
                        ));
                    }
                    delay = next;
                }
            }
        }
    })
}

async fn rearm(cell: &EntityCell, generation: u64) {
    let mut living = cell.lock().await;
    if living.attack.generation() == generation {
        living.attack.on_rearm();
    }
}

fn delayed_connect(
    world: Arc<World>,
    cell: Arc<EntityCell>,
    generation: u64,
    target: EntityId,
    delay: u64,
) -> TimerTask {
    Box::pin(async move {
        sleep(Duration::from_millis(delay)).await;
        if world.is_closed() {
            return;
        }
        {
            let living = cell.lock().await;
            if living.attack.generation() != generation {
                debug!(target: "runtime::timers", living = %cell.id(), "shot cancelled in flight");
                return;
            }
        }
        swing::connect(&world, cell.id(), target).await;
        let mut living = cell.lock().await;
        if living.attack.generation() == generation {
            living.attack.on_connect();
        }
    })
}

/// Arms the `kind` regeneration timer if the pool needs it and the timer is
/// stopped. Call with `living`'s lock held.
pub(crate) fn ensure_regen(world: &Arc<World>, cell: &Arc<EntityCell>, living: &Living, kind: ResourceKind) {
    if !world.regeneration || world.is_closed() || !needs_regen(living, kind) {
        return;
    }
    let Some(generation) = cell.regen_slot(kind).arm() else {
        return;
    };
    let delay = regen_period(&world.env(), living, kind, world.clock.now());
    trace!(target: "runtime::timers", living = %living.id, %kind, delay, generation, "regen timer armed");
    world.spawn_task(regen_loop(
        Arc::clone(world),
        Arc::clone(cell),
        kind,
        generation,
        delay,
    ));
}

pub(crate) fn ensure_all_regen(world: &Arc<World>, cell: &Arc<EntityCell>, living: &Living) {
    for kind in ResourceKind::iter() {
        ensure_regen(world, cell, living, kind);
    }
}

async fn regen_loop(world: Arc<World>, cell: Arc<EntityCell>, kind: ResourceKind, generation: u64, delay: u64) {
    let mut delay = delay;
    loop {
        sleep(Duration::from_millis(delay)).await;
        if world.is_closed() {
            return;
        }

        let now = world.clock.now();
        let (next, delta, current, maximum) = {
            let mut living = cell.lock().await;
            let slot = cell.regen_slot(kind);
            if !slot.is_current(generation) {
                trace!(target: "runtime::timers", living = %cell.id(), %kind, "stale regen timer");
                return;
            }
            let before = living.meter(kind).current;
            let env = world.env();
            let next = regen_tick(&env, &mut living, kind, now);
            if next.is_none() {
                slot.finish(generation);
            }
            let meter = living.meter(kind);
            (
                next,
                i64::from(meter.current) - i64::from(before),
                meter.current,
                meter.maximum,
            )
        };

        if delta != 0 {
            world.bus.publish(ResourceEvent::Changed {
                living: cell.id(),
                kind,
                reason: ChangeReason::Regeneration,
                source: None,
                delta,
                current,
                maximum,
            });
        }
        match next {
            Some(next) => delay = next,
            None => {
                world.bus.publish(ResourceEvent::RegenStopped {
                    living: cell.id(),
                    kind,
                });
                return;
            }
        }
    }
}
