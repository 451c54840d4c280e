//! Swing resolution: validation, defense chain, style and damage.
//!
//! Resolution reads the attacker and third parties from snapshots and only
//! mutates the defender (ward consumption, engage endurance). Applying the
//! outcome is a separate step, see [`crate::combat::on_attacked_by_enemy`].

use tracing::debug;

use crate::combat::{
    AttackRecord, AttackResult, AttackType, SwingRequest, roll_critical, roll_damage,
    run_defense_chain, validate_swing,
};
use crate::env::CombatEnv;
use crate::state::{Living, Participants};
use crate::stats::Property;

/// Both sides are player-controlled.
pub fn is_pvp(attacker: &Living, defender: &Living) -> bool {
    attacker.is_player_controlled() && defender.is_player_controlled()
}

/// Resolves one swing of `attacker` at `defender`.
///
/// When the chain redirects the swing (bodyguard, intercept, guard),
/// `record.target` names the new defender and damage, if any, is computed
/// against its snapshot in `participants`.
pub fn resolve_swing(
    env: &CombatEnv<'_>,
    attacker: &Living,
    defender: Option<&mut Living>,
    participants: &Participants,
    request: &SwingRequest,
) -> AttackRecord {
    let target_id = defender.as_ref().map(|d| d.id);
    let mut record = AttackRecord::new(attacker, target_id, request);

    if let Some(failure) = validate_swing(env, attacker, defender.as_deref(), request, &record) {
        record.result = failure;
        debug!(
            target: "combat::swing",
            attacker = %attacker.id,
            defender = ?target_id,
            result = %failure,
            "swing rejected"
        );
        return record;
    }
    let Some(defender) = defender else {
        return record;
    };

    record.pvp = is_pvp(attacker, defender);
    record.result = run_defense_chain(env, attacker, defender, participants, &mut record);

    if record.result.is_hit() {
        let struck = match record.target {
            Some(id) if id != defender.id => participants.get(id),
            _ => Some(&*defender),
        };
        if let Some(struck) = struck {
            apply_hit(env, attacker, struck, &mut record);
        }
    }

    debug!(
        target: "combat::swing",
        attacker = %attacker.id,
        defender = ?record.target,
        result = %record.result,
        damage = record.damage,
        critical = record.critical_damage,
        "swing resolved"
    );
    record
}

fn apply_hit(env: &CombatEnv<'_>, attacker: &Living, struck: &Living, record: &mut AttackRecord) {
    if record.style.is_some() {
        let weapon = record.weapon.clone();
        env.styles
            .try_execute_style(attacker, record, weapon.as_ref());
    }

    let roll = roll_damage(env, attacker, struck, record);
    record.hit_location = Some(roll.location);
    record.modifier = roll.modifier;
    record.uncapped_damage = roll.uncapped;
    record.damage = roll.damage + record.style_damage;

    if record.damage <= 0 {
        record.damage = 0;
        record.result = AttackResult::Missed;
        return;
    }

    let ranged = record.attack_type == AttackType::Ranged;
    record.critical_damage = roll_critical(env, attacker, struck, ranged, record.damage);
}

/// Rolls whether a melee dispatch also swings the off-hand weapon.
pub fn wants_off_hand_swing(env: &CombatEnv<'_>, attacker: &Living) -> bool {
    attacker.can_dual_wield()
        && env
            .rng
            .chance_percent(f64::from(env.prop(attacker, Property::OffhandChance)))
}
