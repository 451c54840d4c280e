//! Miss and fumble chances. Miss chances are percentages, fumble is a
//! probability.
//!
//! # Formula
//!
//! ```text
//! miss  = 20 (player) | 25 (other)  - ToHitBonus
//! PvE:    - 5 * con(defender -> leader)   when an assisting leader is near
//!         + 5 * con(attacker -> defender) otherwise
//! miss += armorBonus - weaponBonus
//! miss -= styleToHit
//! miss += defender's prior style defense bonus
//! PvP:    - 3 * SkillBonus
//! ranged: + ammo accuracy modifier
//! miss /= 2 when the defender sits
//! ```

use crate::combat::defense::SwingFacts;
use crate::combat::{AttackRecord, con_level};
use crate::env::CombatEnv;
use crate::state::{HasControllingOwner, HitLocation, Living, LivingFlags, Participants};
use crate::stats::Property;

/// Base miss percentage before any situational adjustment.
pub fn base_miss_chance(env: &CombatEnv<'_>, attacker: &Living) -> f64 {
    let base = if attacker.is_player() {
        env.config.player_base_miss_percent
    } else {
        env.config.npc_base_miss_percent
    };
    base - f64::from(env.prop(attacker, Property::ToHitBonus))
}

/// Group leader who lowers the attacker's PvE miss chance, if any.
///
/// The leader must be someone else, alive, close to the attacker and of a
/// higher level.
fn assisting_leader<'p>(
    env: &CombatEnv<'_>,
    attacker: &Living,
    participants: &'p Participants,
) -> Option<&'p Living> {
    let group = env.groups.group_of(attacker.credit_source())?;
    if group.leader == attacker.id {
        return None;
    }
    participants.get(group.leader).filter(|leader| {
        leader.is_alive()
            && leader.level > attacker.level
            && leader.is_within(attacker, env.config.group_leader_assist_radius)
    })
}

pub fn miss_chance(
    env: &CombatEnv<'_>,
    attacker: &Living,
    defender: &Living,
    participants: &Participants,
    facts: &SwingFacts,
    record: &AttackRecord,
) -> f64 {
    let mut miss = base_miss_chance(env, attacker);

    if !facts.pvp {
        match assisting_leader(env, attacker, participants) {
            Some(leader) => miss -= 5.0 * con_level(defender.level, leader.level),
            None => miss += 5.0 * facts.con,
        }
    }

    let armor_bonus = defender
        .equipment
        .armor_at(HitLocation::Torso)
        .map_or(0, |a| a.bonus);
    let weapon_bonus = record.weapon.as_ref().map_or(0, |w| w.bonus);
    miss += f64::from(armor_bonus - weapon_bonus);

    miss -= f64::from(facts.style_to_hit);
    miss += f64::from(defender.temp.prior_style_defense_bonus());

    if facts.pvp {
        miss -= 3.0 * f64::from(env.prop(attacker, Property::SkillBonus));
    }

    if facts.is_ranged()
        && let Some(ammo) = attacker.equipment.ammo
    {
        miss += ammo.accuracy.miss_modifier();
    }

    if defender.flags.contains(LivingFlags::SITTING) {
        miss /= 2.0;
    }

    miss.max(0.0)
}

/// Probability that a melee swing fumbles.
pub fn fumble_chance(env: &CombatEnv<'_>, attacker: &Living) -> f64 {
    (f64::from(env.prop(attacker, Property::FumbleChance)) / 1000.0)
        .clamp(0.0, env.config.max_fumble_chance)
}
