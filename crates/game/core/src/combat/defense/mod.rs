//! Defense chain.
//!
//! Every countermeasure a defender (or its protectors) can raise against one
//! swing, evaluated in a fixed precedence. The first step that produces a
//! result ends the chain; a swing that survives all of them is an unstyled
//! hit.
//!
//! | # | Step | Result |
//! |---|------|--------|
//! | 1 | untargetable form | `NoValidTarget` |
//! | 2 | stealth opener | disables evade / parry / block |
//! | 3 | bodyguard | `Bodyguarded` (redirect) |
//! | 4 | phaseshift ward | `Missed` |
//! | 5 | grapple ward | `Grappled` |
//! | 6 | brittle guard | `Missed` |
//! | 7 | intercept | `HitUnstyled` (redirect) |
//! | 8 | evade | `Evaded` |
//! | 9 | parry | `Parried` |
//! | 10 | block | `Blocked` |
//! | 11 | guard / dashing defense | `Blocked` / `Parried` (redirect) |
//! | 12 | miss roll | `Missed` |
//! | 13 | fumble | `Fumbled` |
//! | 14 | defensive miss buff | `Missed` |
//! | 15 | bladeturn | `Missed` |
//! | 16 | default | `HitUnstyled` |
//!
//! Wards (phaseshift, grapple, brittle guard, intercept, bladeturn) are
//! consumed when their step is reached, whatever the roll.

mod avoidance;
mod miss;
mod protection;
mod wards;

pub use avoidance::{block_chance, evade_chance, parry_chance};
pub use miss::{base_miss_chance, fumble_chance, miss_chance};

use tracing::trace;

use crate::combat::{AttackRecord, AttackResult, AttackType, con_level};
use crate::env::CombatEnv;
use crate::state::{Living, LivingFlags, Participants};
use crate::stats::Property;

/// Per-swing facts shared by every step.
#[derive(Clone, Copy, Debug)]
pub struct SwingFacts {
    pub attack_type: AttackType,
    pub stealth_style: bool,
    pub style_to_hit: i32,
    /// Attackers engaged with the defender, this one included.
    pub attacker_count: usize,
    pub pvp: bool,
    /// Con level of the defender as seen by the attacker.
    pub con: f64,
}

impl SwingFacts {
    pub fn new(attacker: &Living, defender: &Living, record: &AttackRecord) -> Self {
        let registered = defender.attackers.len();
        let attacker_count = if defender.attackers.contains(attacker.id) {
            registered
        } else {
            registered + 1
        };
        Self {
            attack_type: record.attack_type,
            stealth_style: record.style.as_ref().is_some_and(|s| s.stealth_opener),
            style_to_hit: record.style.as_ref().map_or(0, |s| s.to_hit_bonus),
            attacker_count: attacker_count.max(1),
            pvp: record.pvp,
            con: con_level(attacker.level, defender.level),
        }
    }

    pub fn is_ranged(&self) -> bool {
        self.attack_type == AttackType::Ranged
    }
}

/// Applies `[floor, ceiling]` and, in PvP, the given cap.
pub fn clamp_chance(env: &CombatEnv<'_>, chance: f64, pvp_cap: Option<f64>) -> f64 {
    let clamped = chance.clamp(env.config.chance_floor, env.config.chance_ceiling);
    match pvp_cap {
        Some(cap) => clamped.min(cap),
        None => clamped,
    }
}

/// Runs the chain for one swing and returns its result.
///
/// May redirect `record.target` (bodyguard, intercept, guard), consume wards
/// and engage endurance on `defender`, and append shield procs to
/// `record.defender_procs`.
pub fn run_defense_chain(
    env: &CombatEnv<'_>,
    attacker: &Living,
    defender: &mut Living,
    participants: &Participants,
    record: &mut AttackRecord,
) -> AttackResult {
    let facts = SwingFacts::new(attacker, defender, record);

    // 1. untargetable form
    if defender.flags.contains(LivingFlags::UNTARGETABLE) {
        return AttackResult::NoValidTarget;
    }

    // 3. bodyguard
    if let Some(guard) = protection::bodyguard(env, defender, participants, &facts) {
        record.target = Some(guard);
        return AttackResult::Bodyguarded;
    }

    // 4-6. one-shot wards that end the swing outright
    if let Some(result) = wards::consume_blocking_ward(defender) {
        return result;
    }

    // 7. intercept
    if let Some(interceptor) = protection::intercept(env, defender, participants, &facts) {
        record.target = Some(interceptor);
        return AttackResult::HitUnstyled;
    }

    // 8-10. active defenses, suppressed by a stealth opener (2)
    if !facts.stealth_style {
        if let Some(chance) = evade_chance(env, defender, &facts)
            && roll(env, "evade", chance)
        {
            return AttackResult::Evaded;
        }
        if let Some(chance) = parry_chance(env, attacker, defender, &facts)
            && roll(env, "parry", chance)
        {
            return AttackResult::Parried;
        }
        if let Some(chance) = block_chance(env, attacker, defender, &facts)
            && roll(env, "block", chance)
        {
            record.defender_procs = avoidance::shield_procs(env, defender);
            return AttackResult::Blocked;
        }
    }

    // 11. guard and dashing defense
    if let Some((protector, result)) =
        protection::guard(env, attacker, defender, participants, &facts)
    {
        record.target = Some(protector);
        return result;
    }

    // 12. miss
    let miss = miss_chance(env, attacker, defender, participants, &facts, record);
    if roll(env, "miss", miss / 100.0) {
        return AttackResult::Missed;
    }

    if facts.attack_type.is_melee() {
        // 13. fumble
        let fumble = fumble_chance(env, attacker);
        if fumble > 0.0 && roll(env, "fumble", fumble) {
            return AttackResult::Fumbled;
        }

        // 14. flat defensive miss buff
        let defensive = f64::from(env.prop(defender, Property::DefensiveMissChance));
        if defensive > 0.0 && roll(env, "defensive_miss", defensive / 100.0) {
            return AttackResult::Missed;
        }
    }

    // 15. bladeturn
    if wards::bladeturn_stops(env, attacker, defender, &facts) {
        return AttackResult::Missed;
    }

    AttackResult::HitUnstyled
}

fn roll(env: &CombatEnv<'_>, step: &'static str, chance: f64) -> bool {
    let success = env.rng.chance(chance);
    trace!(target: "combat::defense", step, chance, success, "defense roll");
    success
}
