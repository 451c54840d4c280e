//! Attack scheduling.
//!
//! [`AttackScheduler`] is the pure per-living state machine. The helpers here
//! sample a living's current state into a [`TickInput`] so the runtime never
//! has to know which flags and effects matter.

mod attack;

pub use attack::{AttackPhase, AttackScheduler, StopReason, TickDecision, TickInput};

use crate::combat::attack_speed;
use crate::env::CombatEnv;
use crate::state::{EffectKind, GameTime, Living, RangedAttackType};

/// Starts attacking `target`. Returns the delay of the first tick, or `None`
/// when the living cannot attack or its timer is already running.
///
/// Non-player livings turn to face their target unless turning is disabled.
pub fn start_attack(
    env: &CombatEnv<'_>,
    living: &mut Living,
    target: &Living,
    now: GameTime,
) -> Option<u64> {
    if !living.is_alive() || !living.is_active() || living.flags.is_incapacitated() {
        return None;
    }
    if !living.is_player() {
        living.turn_to(&target.position);
    }
    let speed = attack_speed(env, living);
    let ranged = living.is_ranged_active();
    living
        .attack
        .start(target.id, now, speed, ranged, env.config.first_swing_min_delay_ms)
}

/// Samples `living` and its current target for one scheduler tick.
pub fn tick_input(
    env: &CombatEnv<'_>,
    living: &Living,
    target: Option<&Living>,
    now: GameTime,
) -> TickInput {
    let target_valid = target.is_some_and(|t| {
        t.is_alive() && t.is_active() && t.position.region == living.position.region
    });
    TickInput {
        now,
        busy: living.is_busy(),
        engaging: living.effects.has(EffectKind::Engage),
        ranged: living.is_ranged_active(),
        rapid_fire: living.ranged_type == RangedAttackType::RapidFire,
        policy: living.ranged_policy,
        target_valid,
        target_distance: target.and_then(|t| living.distance_to(t)),
        attack_speed: attack_speed(env, living),
        retry_delay: env.config.retry_delay_ms,
    }
}

/// Runs one scheduler tick for `living`.
pub fn attack_tick(
    env: &CombatEnv<'_>,
    living: &mut Living,
    target: Option<&Living>,
    now: GameTime,
) -> TickDecision {
    let input = tick_input(env, living, target, now);
    let decision = living.attack.tick(&input);
    if let TickDecision::Stop { .. } = decision {
        living.temp.clear_last_attack();
    }
    decision
}
