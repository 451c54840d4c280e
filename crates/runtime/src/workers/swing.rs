//! The swing pipeline.
//!
//! ```text
//! snapshot attacker + third parties
//!   -> lock defender: resolve, apply (unless redirected)
//!   -> lock redirected defender: apply
//!   -> lock attacker: after-swing bookkeeping
//!   -> lock owner: propagate combat timestamp (pets)
//!   -> procs, interrupts, notifications, events
//!   -> post-swing hooks
//! ```
//!
//! Each arrow releases the previous lock before taking the next one.

use std::sync::Arc;

use tracing::{debug, warn};

use combat_core::combat::{AppliedAttack, propagate_to_owner, wants_off_hand_swing};
use combat_core::env::{GroupOracle, SpellOracle};
use combat_core::state::HasControllingOwner;
use combat_core::{
    AttackRecord, ChangeReason, EntityId, Living, Participants, ResourceKind, SwingRequest,
    after_swing, attack_speed, notify_swing, on_attacked_by_enemy, resolve_swing,
};

use crate::api::Result;
use crate::events::{CombatEvent, ResourceEvent};
use crate::hooks::{HookCommand, HookContext, HookRegistry};
use crate::world::{EntityCell, World};

use super::{lifecycle, timers};

/// A swing that went through the whole pipeline.
#[derive(Clone, Debug, PartialEq)]
pub struct SwingOutcome {
    pub record: AttackRecord,
    pub applied: AppliedAttack,
}

/// The weapon connects: main hand, then possibly the off hand.
pub(super) async fn connect(world: &Arc<World>, attacker: EntityId, target: EntityId) {
    let Some(snapshot) = world.registry.snapshot(attacker).await else {
        return;
    };
    if !snapshot.is_alive() {
        return;
    }

    let now = world.clock.now();
    let (primary, off_hand) = {
        let env = world.env();
        // interrupts last as long as the attacker's swing interval
        let speed = attack_speed(&env, &snapshot);
        let primary = SwingRequest::primary(&snapshot, speed, now);
        let off_hand = (!snapshot.is_ranged_active() && wants_off_hand_swing(&env, &snapshot))
            .then(|| SwingRequest::off_hand(&snapshot, world.combat.offhand_effectiveness, speed, now));
        (primary, off_hand)
    };

    if let Err(e) = execute_swing(world, &snapshot, target, primary).await {
        warn!(target: "runtime::swing", %attacker, %target, error = %e, "swing failed");
        return;
    }
    if let Some(request) = off_hand {
        // the main hand may have spent poison charges
        let Some(snapshot) = world.registry.snapshot(attacker).await else {
            return;
        };
        debug!(target: "runtime::swing", %attacker, %target, "off-hand swing");
        if let Err(e) = execute_swing(world, &snapshot, target, request).await {
            warn!(target: "runtime::swing", %attacker, %target, error = %e, "off-hand swing failed");
        }
    }
}

/// Snapshots every living the defender's effects reference, plus the
/// attacker's credit source and its group, leaving out both combatants.
pub(crate) async fn gather_participants(
    world: &World,
    attacker: &Living,
    defender: Option<&EntityCell>,
) -> Participants {
    let mut ids = match defender {
        Some(cell) => cell.lock().await.effects.related_entities(),
        None => Vec::new(),
    };
    let source = attacker.credit_source();
    ids.push(source);
    if let Some(group) = world.groups.group_of(source) {
        ids.push(group.leader);
        ids.extend(group.members);
    }
    ids.sort();
    ids.dedup();

    let defender_id = defender.map(EntityCell::id);
    let mut participants = Participants::new();
    for id in ids {
        if id == attacker.id || Some(id) == defender_id {
            continue;
        }
        if let Some(living) = world.registry.snapshot(id).await {
            participants.insert(living);
        }
    }
    participants
}

/// Resolves a swing without applying it. Wards on the defender are still
/// consumed.
pub(crate) async fn resolve_only(
    world: &Arc<World>,
    attacker: &Living,
    target: EntityId,
    request: &SwingRequest,
) -> Result<AttackRecord> {
    let cell = world.registry.require(target)?;
    let participants = gather_participants(world, attacker, Some(&cell)).await;
    let mut defender = cell.lock().await;
    let env = world.env();
    Ok(resolve_swing(&env, attacker, Some(&mut *defender), &participants, request))
}

/// Applies `record` to `target`, normally the living the record names.
///
/// Returns the outcome and a snapshot of that living after the hit.
pub(crate) async fn apply_record(
    world: &Arc<World>,
    attacker: &Living,
    participants: &Participants,
    record: &AttackRecord,
    target: EntityId,
) -> Result<(AppliedAttack, Living)> {
    let cell = world.registry.require(target)?;
    let (applied, struck) = {
        let mut defender = cell.lock().await;
        let env = world.env();
        let applied = on_attacked_by_enemy(&env, &mut defender, attacker, participants, record);
        timers::ensure_all_regen(world, &cell, &defender);
        (applied, defender.clone())
    };
    publish_damage(world, record, &applied, &struck);
    Ok((applied, struck))
}

fn publish_damage(world: &World, record: &AttackRecord, applied: &AppliedAttack, struck: &Living) {
    if applied.health_lost == 0 {
        return;
    }
    world.bus.publish(ResourceEvent::Changed {
        living: struck.id,
        kind: ResourceKind::Health,
        reason: ChangeReason::Damage,
        source: Some(record.attacker),
        delta: -applied.health_lost,
        current: struck.health.current,
        maximum: struck.health.maximum,
    });
}

/// Runs one swing of `attacker` at `target` end to end.
pub(crate) async fn execute_swing(
    world: &Arc<World>,
    attacker: &Living,
    target: EntityId,
    request: SwingRequest,
) -> Result<SwingOutcome> {
    world.ensure_open()?;
    let defender_cell = world.registry.get(target);
    let participants = gather_participants(world, attacker, defender_cell.as_deref()).await;

    let (record, direct) = match &defender_cell {
        Some(cell) => {
            let mut defender = cell.lock().await;
            let env = world.env();
            let record = resolve_swing(&env, attacker, Some(&mut *defender), &participants, &request);
            let direct = if record.is_redirected_from(target) {
                None
            } else {
                let applied = on_attacked_by_enemy(&env, &mut defender, attacker, &participants, &record);
                timers::ensure_all_regen(world, cell, &defender);
                Some((applied, defender.clone()))
            };
            (record, direct)
        }
        None => {
            let env = world.env();
            let record = resolve_swing(&env, attacker, None, &participants, &request);
            (record, None)
        }
    };

    let (applied, struck) = match direct {
        Some((applied, struck)) => {
            publish_damage(world, &record, &applied, &struck);
            (applied, Some(struck))
        }
        None if defender_cell.is_some() => {
            debug!(target: "runtime::swing", attacker = %attacker.id, from = %target, to = ?record.target, "swing redirected");
            let redirected = record.target.unwrap_or(target);
            match apply_record(world, attacker, &participants, &record, redirected).await {
                Ok((applied, struck)) => (applied, Some(struck)),
                // redirected to someone who left the world
                Err(_) => (
                    AppliedAttack::default(),
                    record.target.and_then(|id| participants.get(id).cloned()),
                ),
            }
        }
        None => (AppliedAttack::default(), None),
    };

    let (procs, attacker_after) = match world.registry.get(attacker.id) {
        Some(cell) => {
            let mut living = cell.lock().await;
            let env = world.env();
            let procs = after_swing(&env, &mut living, &record, &applied);
            (procs, living.clone())
        }
        None => (Vec::new(), attacker.clone()),
    };
    if let Some(owner) = attacker_after.controlling_owner()
        && let Some(cell) = world.registry.get(owner)
    {
        propagate_to_owner(&mut *cell.lock().await, &record);
    }

    for trigger in procs {
        world.spells.cast_proc(&trigger);
        world.bus.publish(CombatEvent::ProcTriggered(trigger));
    }

    if let Some(struck) = &struck {
        let interrupt = applied.interrupt;
        if interrupt.cast_interrupted {
            world.spells.interrupt_cast(struck.id, attacker.id);
        }
        if interrupt.extended || interrupt.cast_interrupted || interrupt.shot_spoiled {
            world.bus.publish(CombatEvent::Interrupted {
                living: struck.id,
                source: Some(attacker.id),
                until: struck.temp.interrupted_until,
                cast_interrupted: interrupt.cast_interrupted,
                shot_spoiled: interrupt.shot_spoiled,
            });
        }
        if interrupt.shot_spoiled {
            timers::shot_spoiled(world, struck.id, interrupt.stopped_target, &struck.position).await;
        }
    }

    {
        let env = world.env();
        notify_swing(&env, &attacker_after, struck.as_ref(), &record, &applied);
    }
    world.bus.publish(CombatEvent::SwingResolved {
        record: Box::new(record.clone()),
        health_lost: applied.health_lost,
        killed: applied.killed,
    });

    let plan = {
        let ctx = HookContext {
            record: &record,
            applied: &applied,
            attacker: &attacker_after,
            defender: struck.as_ref(),
        };
        world.hooks.plan(&ctx)
    };
    'hooks: for (hook, commands) in plan {
        for command in commands {
            if let Err(e) = execute_command(world, command).await
                && HookRegistry::handle_hook_error(hook.as_ref(), &e).is_break()
            {
                break 'hooks;
            }
        }
    }

    Ok(SwingOutcome { record, applied })
}

/// Runs one hook command with no lock held.
async fn execute_command(world: &Arc<World>, command: HookCommand) -> Result<()> {
    debug!(target: "runtime::hooks", ?command, "executing hook command");
    match command {
        HookCommand::Kill { victim, killer } => lifecycle::kill(world, victim, killer).await.map(|_| ()),
        HookCommand::StartAttack { attacker, target } => {
            timers::start_attack(world, attacker, target).await.map(|_| ())
        }
    }
}
