//! Evade, parry and block.
//!
//! Each function returns `None` when the defender cannot use the defense at
//! all, otherwise the final probability to roll against.
//!
//! # Formulas
//!
//! ```text
//! evade = EvadeChance/1000 + 0.01*con + priorStyleDefense/100
//!         - 0.03 * (attackers - 1)
//!         / 5 for ranged
//! parry = ParryChance/1000 + 0.05*con
//!         / (attackers / 2) when attackers > 1
//! block = BlockChance/1000 * quality/100 + 0.05*con
//!         * size/attackers when attackers > size
//!         max(engage floor) while engaging this attacker
//! ```
//!
//! All three clamp to `[chance_floor, chance_ceiling]`, then to their PvP cap.
//! A blade barrier replaces parry with a flat chance and skips every
//! adjustment.

use crate::combat::defense::{SwingFacts, clamp_chance};
use crate::env::CombatEnv;
use crate::state::{ActiveWeaponSlot, Effect, EffectKind, Living, LivingFlags, SpellId};
use crate::stats::Property;

fn can_defend_actively(defender: &Living) -> bool {
    !defender.flags.is_incapacitated()
        && !defender
            .flags
            .intersects(LivingFlags::SITTING | LivingFlags::DEFENSE_DISABLED)
}

pub fn evade_chance(env: &CombatEnv<'_>, defender: &Living, facts: &SwingFacts) -> Option<f64> {
    if !can_defend_actively(defender) || defender.flags.contains(LivingFlags::BERSERK) {
        return None;
    }
    let ability = env.prop(defender, Property::EvadeChance);
    if ability <= 0 {
        return None;
    }

    let mut chance = f64::from(ability) / 1000.0
        + 0.01 * facts.con
        + f64::from(defender.temp.prior_style_defense_bonus()) / 100.0;
    if facts.attacker_count > 1 {
        chance -= (facts.attacker_count - 1) as f64 * 0.03;
    }
    if facts.is_ranged() {
        chance /= 5.0;
    }

    Some(clamp_chance(
        env,
        chance,
        facts.pvp.then_some(env.config.pvp_evade_cap),
    ))
}

pub fn parry_chance(
    env: &CombatEnv<'_>,
    attacker: &Living,
    defender: &Living,
    facts: &SwingFacts,
) -> Option<f64> {
    if !can_defend_actively(defender) || facts.is_ranged() {
        return None;
    }
    let armed = defender.active_weapon().is_some() && !defender.is_ranged_active();
    if !armed || !defender.is_facing(attacker, env.config.defense_arc_degrees) {
        return None;
    }

    if defender.effects.has(EffectKind::BladeBarrier) {
        return Some(env.config.blade_barrier_chance);
    }

    let ability = env.prop(defender, Property::ParryChance);
    if ability <= 0 {
        return None;
    }

    let mut chance = f64::from(ability) / 1000.0 + 0.05 * facts.con;
    if facts.attacker_count > 1 {
        chance /= facts.attacker_count as f64 / 2.0;
    }

    Some(clamp_chance(
        env,
        chance,
        facts.pvp.then_some(env.config.pvp_parry_cap),
    ))
}

/// Block chance. Engaging the attacker spends endurance on `defender`,
/// or drops the engage bond when it cannot be paid.
pub fn block_chance(
    env: &CombatEnv<'_>,
    attacker: &Living,
    defender: &mut Living,
    facts: &SwingFacts,
) -> Option<f64> {
    if !can_defend_actively(defender) || defender.active_slot != ActiveWeaponSlot::Standard {
        return None;
    }
    let shield = defender.equipment.shield()?;
    if !defender.is_facing(attacker, env.config.defense_arc_degrees) {
        return None;
    }

    let ability = env.prop(defender, Property::BlockChance);
    if ability <= 0 {
        return None;
    }

    let coverage = shield.size.coverage();
    let mut chance =
        f64::from(ability) * f64::from(shield.quality) / 100_000.0 + 0.05 * facts.con;
    if facts.attacker_count > coverage {
        chance *= coverage as f64 / facts.attacker_count as f64;
    }

    let engaged = matches!(
        defender.effects.find(EffectKind::Engage),
        Some(Effect::Engage { target }) if *target == attacker.id
    );
    if engaged {
        let cost = env.config.engage_endurance_cost;
        if defender.endurance.current >= cost {
            defender.change_endurance(-i64::from(cost));
            chance = chance.max(env.config.engage_block_floor);
        } else {
            defender.effects.remove_all(EffectKind::Engage);
        }
    }

    Some(clamp_chance(
        env,
        chance,
        facts.pvp.then_some(env.config.pvp_block_cap),
    ))
}

/// Shield procs triggered by a successful block.
pub(crate) fn shield_procs(env: &CombatEnv<'_>, defender: &Living) -> Vec<SpellId> {
    let Some(shield) = defender.equipment.shield() else {
        return Vec::new();
    };
    shield
        .procs
        .iter()
        .copied()
        .filter(|_| env.rng.chance_percent(env.config.shield_proc_chance_percent))
        .collect()
}
