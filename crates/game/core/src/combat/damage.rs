//! Weapon damage.
//!
//! # Formula
//!
//! ```text
//! base    = (1 + level/3.7 + level²/175) * speed/1000
//! base   *= 1 + (MeleeDamage | RangedDamage)/100
//! damage  = base * effectiveness
//! damage *= (WeaponSkill + 90.68) / (AF + 93.4)          // AF at the struck location
//! damage *= 1 - absorb      (1 + absorb with a badge)     // absorb <= 0.85
//! damage *= (lower + rand[0, 50]) / 100                   // lower in [75, 125]
//! modifier  = -round(damage * (Resist + armorResist) / 100)
//! resist    = -round(damage * DamageResist / 100)
//! secondary = trunc(-damage * SecondaryResist / 100)
//! uncapped  = damage + modifier + resist + secondary
//! damage    = min(uncapped, base * effectiveness * (2.82 + 0.00009 * speed))
//! damage   *= PvP | PvE scalar for melee | ranged
//! ```
//!
//! Style damage is added by the resolver after the cap.

use crate::combat::{AttackRecord, AttackType, attack_speed};
use crate::env::CombatEnv;
use crate::state::{EffectKind, HitLocation, Living};
use crate::stats::Property;

const MAX_ABSORPTION: f64 = 0.85;

/// Outcome of the damage roll for one hit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DamageRoll {
    pub location: HitLocation,
    pub damage: i32,
    pub uncapped: i32,
    pub modifier: i32,
    /// Upper bound applied to `uncapped` before the global scalar.
    pub cap: f64,
}

/// Unmitigated damage of the attacker's swing at full effectiveness.
pub fn attack_damage(env: &CombatEnv<'_>, attacker: &Living, ranged: bool) -> f64 {
    let level = f64::from(attacker.level);
    let speed = f64::from(attack_speed(env, attacker));
    let base = (1.0 + level / 3.7 + level * level / 175.0) * speed / 1000.0;
    let modifier = if ranged {
        env.prop(attacker, Property::RangedDamage)
    } else {
        env.prop(attacker, Property::MeleeDamage)
    };
    base * (1.0 + f64::from(modifier) / 100.0)
}

/// Lower bound of the random damage spread, from weapon specialization
/// against the target's level.
pub fn spread_lower_bound(spec_level: i32, target_level: u8) -> i32 {
    ((spec_level - 1) * 50 / (i32::from(target_level) + 1) + 75).clamp(75, 125)
}

pub fn roll_damage(
    env: &CombatEnv<'_>,
    attacker: &Living,
    target: &Living,
    record: &AttackRecord,
) -> DamageRoll {
    let ranged = record.attack_type == AttackType::Ranged;
    let speed = f64::from(attack_speed(env, attacker));
    let base = attack_damage(env, attacker, ranged);
    let mut damage = base * record.effectiveness;

    let location = HitLocation::roll(env.rng);
    let armor = target.equipment.armor_at(location);

    let armor_factor = f64::from(armor.map_or(0, |a| a.armor_factor))
        + f64::from(env.prop(target, Property::ArmorFactor));
    let weapon_skill = f64::from(env.prop(attacker, Property::WeaponSkill));
    damage *= (weapon_skill + 90.68) / (armor_factor.max(0.0) + 93.4);

    let absorb = (armor.map_or(0.0, |a| a.kind.absorption())
        + f64::from(env.prop(target, Property::ArmorAbsorption)) / 100.0)
        .clamp(0.0, MAX_ABSORPTION);
    if attacker.effects.has(EffectKind::Badge) {
        damage *= 1.0 + absorb;
    } else {
        damage *= 1.0 - absorb;
    }

    let spec = record
        .weapon
        .as_ref()
        .map_or(i32::from(attacker.level), |w| i32::from(w.spec_level));
    let lower = spread_lower_bound(spec, target.level);
    damage *= f64::from(lower + env.rng.random_range(0, 50)) / 100.0;

    let damage_type = record.damage_type;
    let resist_percent = env.prop(target, Property::Resist(damage_type))
        + armor.map_or(0, |a| a.kind.resist(damage_type));
    let modifier = -(damage * f64::from(resist_percent) / 100.0).round();
    damage += modifier;

    let resist = -(damage * f64::from(env.prop(target, Property::DamageResist)) / 100.0).round();
    let secondary = (damage
        * f64::from(env.prop(target, Property::SecondaryResist(damage_type)))
        / -100.0)
        .trunc();
    damage += resist + secondary;

    let uncapped = damage;
    let cap = base * record.effectiveness * (2.82 + 0.00009 * speed);
    damage = damage.min(cap);

    let scalar = match (record.pvp, ranged) {
        (true, false) => env.config.pvp_melee_damage,
        (false, false) => env.config.pve_melee_damage,
        (true, true) => env.config.pvp_ranged_damage,
        (false, true) => env.config.pve_ranged_damage,
    };
    damage *= scalar;

    DamageRoll {
        location,
        damage: damage.max(0.0) as i32,
        uncapped: uncapped.max(0.0) as i32,
        modifier: modifier as i32,
        cap,
    }
}

/// Extra damage of a critical hit, or 0 when the critical roll fails.
///
/// Players take at most half the hit again; everyone else up to the full hit.
pub fn roll_critical(env: &CombatEnv<'_>, attacker: &Living, target: &Living, ranged: bool, damage: i32) -> i32 {
    if damage <= 0 {
        return 0;
    }
    let chance = if ranged {
        env.prop(attacker, Property::CriticalArcheryHitChance)
    } else {
        env.prop(attacker, Property::CriticalMeleeHitChance)
    };
    if !env.rng.chance_percent(f64::from(chance)) {
        return 0;
    }
    let upper = if target.is_player() { damage >> 1 } else { damage };
    env.rng.random_range(damage / 10, upper)
}
