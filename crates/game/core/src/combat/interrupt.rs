//! Interrupt tracker.
//!
//! A hit pushes the defender's "interrupted until" mark forward. It never
//! moves back while the living is alive. Interruptible casts are broken, and
//! a drawn shot may be spoiled with a probability that grows with the
//! interrupter's relative level.

use tracing::trace;

use crate::combat::{AttackType, con_level};
use crate::env::CombatEnv;
use crate::state::{EntityId, GameTime, Living, RangedAttackType};

/// What an interrupt actually did. The caller reports cast interruptions
/// to the spell system once the living's lock is released, and finishes a
/// spoiled shot's stop against `stopped_target`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InterruptOutcome {
    pub extended: bool,
    pub cast_interrupted: bool,
    pub shot_spoiled: bool,
    /// Target of the attack a spoiled shot ended.
    pub stopped_target: Option<EntityId>,
}

/// Probability in percent that an interrupt spoils a drawn shot.
pub fn ranged_interrupt_chance(env: &CombatEnv<'_>, target: &Living, source_level: u8) -> i32 {
    let con = con_level(target.level, source_level);
    let chance = f64::from(env.config.ranged_interrupt_base_percent)
        + f64::from(env.config.ranged_interrupt_per_con_percent) * con;
    (chance as i32).clamp(1, 99)
}

pub fn start_interrupt(
    env: &CombatEnv<'_>,
    target: &mut Living,
    source_level: u8,
    duration: u32,
    attack_type: AttackType,
    now: GameTime,
) -> InterruptOutcome {
    let mut outcome = InterruptOutcome::default();
    if !target.is_alive() || !target.is_active() {
        target.temp.interrupted_until = GameTime::ZERO;
        return outcome;
    }

    let until = now + u64::from(duration);
    if until > target.temp.interrupted_until {
        target.temp.interrupted_until = until;
        outcome.extended = true;
    }

    if target.casting.is_some_and(|cast| cast.interruptible) {
        target.casting = None;
        outcome.cast_interrupted = true;
    }

    if target.is_ranged_active() && target.attack.is_aiming() {
        let sure_shot = target.ranged_type == RangedAttackType::SureShot && !attack_type.is_melee();
        if !sure_shot {
            let chance = ranged_interrupt_chance(env, target, source_level);
            if env.rng.chance_percent(f64::from(chance)) {
                outcome.stopped_target = target.attack.stop();
                target.temp.clear_last_attack();
                outcome.shot_spoiled = true;
            }
            trace!(
                target: "combat::interrupt",
                living = %target.id,
                chance,
                spoiled = outcome.shot_spoiled,
                "ranged interrupt roll"
            );
        }
    }

    outcome
}
