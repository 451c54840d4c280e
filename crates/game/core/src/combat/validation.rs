//! Swing preconditions.
//!
//! Checked in order before anything is rolled; the first failure becomes
//! the swing's result and the defender is left untouched.
//!
//! 1. no target                                 → `NoTarget`
//! 2. other region, inactive, or the attacker   → `NoValidTarget`
//! 3. melee target outside the forward arc      → `TargetNotVisible`
//! 4. target dead                               → `TargetDead`
//! 5. beyond weapon range                       → `OutOfRange`
//! 6. refused by the rule policy                → `NotAllowedServerRules`
//! 7. attacker out of phase                     → `Phaseshift`
//! 8. one-way invisibility owned by someone else → `NoValidTarget`
//! 9. damage immunity                           → `NoValidTarget`

use crate::combat::{AttackRecord, AttackResult, SwingRequest};
use crate::env::CombatEnv;
use crate::state::{Effect, EffectKind, Living};

/// Reach of a swing made with `record`'s weapon.
pub fn weapon_range(env: &CombatEnv<'_>, record: &AttackRecord) -> u32 {
    match &record.weapon {
        Some(weapon) if weapon.is_ranged() => {
            if weapon.range > 0 {
                weapon.range
            } else {
                env.config.default_ranged_range
            }
        }
        Some(weapon) => env.config.melee_range.max(weapon.range),
        None => env.config.melee_range,
    }
}

/// Returns the failing result, or `None` when the swing may proceed.
pub fn validate_swing(
    env: &CombatEnv<'_>,
    attacker: &Living,
    target: Option<&Living>,
    request: &SwingRequest,
    record: &AttackRecord,
) -> Option<AttackResult> {
    let Some(target) = target else {
        return Some(AttackResult::NoTarget);
    };

    if target.id == attacker.id
        || target.position.region != attacker.position.region
        || !target.is_active()
    {
        return Some(AttackResult::NoValidTarget);
    }

    if record.attack_type.is_melee()
        && !request.ignore_line_of_sight
        && !attacker.is_facing(target, env.config.attack_arc_degrees)
    {
        return Some(AttackResult::TargetNotVisible);
    }

    if !target.is_alive() {
        return Some(AttackResult::TargetDead);
    }

    let in_reach = attacker.is_within(target, weapon_range(env, record));
    if !in_reach {
        return Some(AttackResult::OutOfRange);
    }

    if !env.rules.is_allowed_to_attack(attacker, target, false) {
        return Some(AttackResult::NotAllowedServerRules);
    }

    if attacker.effects.has(EffectKind::Phaseshift) {
        return Some(AttackResult::Phaseshift);
    }

    if let Some(Effect::OneWayInvisibility { owner }) =
        target.effects.find(EffectKind::OneWayInvisibility)
        && *owner != attacker.id
    {
        return Some(AttackResult::NoValidTarget);
    }

    if target.effects.has(EffectKind::DamageImmunity) {
        return Some(AttackResult::NoValidTarget);
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CombatConfig;
    use crate::env::SequenceRng;
    use crate::state::{
        DamageType, EntityId, GameTime, LivingKind, Position, Realm, Weapon, WeaponHand,
    };
    use crate::stats::PropertyRegistry;

    fn fighters() -> (Living, Living) {
        let mut attacker = Living::new(
            EntityId(1),
            "attacker",
            LivingKind::Player { realm: Realm::Albion },
            20,
        );
        attacker.position = Position::new(1, 0, 0, 0);
        attacker.equipment.main_hand =
            Some(Weapon::new("mace", DamageType::Crush, 30, WeaponHand::OneHanded));

        let mut target = Living::new(
            EntityId(2),
            "target",
            LivingKind::Npc { realm: Realm::None },
            20,
        );
        target.position = Position::new(1, 0, 100, 0);
        (attacker, target)
    }

    fn check(env: &CombatEnv<'_>, attacker: &Living, target: Option<&Living>) -> Option<AttackResult> {
        let request = SwingRequest::primary(attacker, 0, GameTime(0));
        let record = AttackRecord::new(attacker, target.map(|t| t.id), &request);
        validate_swing(env, attacker, target, &request, &record)
    }

    #[test]
    fn valid_swing_passes() {
        let config = CombatConfig::default();
        let registry = PropertyRegistry::standard();
        let rng = SequenceRng::constant(0.5);
        let env = CombatEnv::new(&config, &registry, &rng);
        let (attacker, target) = fighters();

        assert_eq!(check(&env, &attacker, Some(&target)), None);
        assert_eq!(check(&env, &attacker, None), Some(AttackResult::NoTarget));
    }

    #[test]
    fn facing_is_checked_before_death() {
        let config = CombatConfig::default();
        let registry = PropertyRegistry::standard();
        let rng = SequenceRng::constant(0.5);
        let env = CombatEnv::new(&config, &registry, &rng);
        let (mut attacker, mut target) = fighters();
        target.health.current = 0;

        assert_eq!(check(&env, &attacker, Some(&target)), Some(AttackResult::TargetDead));

        attacker.heading = 2048;
        assert_eq!(
            check(&env, &attacker, Some(&target)),
            Some(AttackResult::TargetNotVisible)
        );
    }

    #[test]
    fn region_and_range_are_enforced() {
        let config = CombatConfig::default();
        let registry = PropertyRegistry::standard();
        let rng = SequenceRng::constant(0.5);
        let env = CombatEnv::new(&config, &registry, &rng);
        let (attacker, mut target) = fighters();

        target.position.y = 500;
        assert_eq!(check(&env, &attacker, Some(&target)), Some(AttackResult::OutOfRange));

        target.position.region = 2;
        assert_eq!(check(&env, &attacker, Some(&target)), Some(AttackResult::NoValidTarget));
    }

    #[test]
    fn same_realm_is_refused() {
        let config = CombatConfig::default();
        let registry = PropertyRegistry::standard();
        let rng = SequenceRng::constant(0.5);
        let env = CombatEnv::new(&config, &registry, &rng);
        let (attacker, mut target) = fighters();
        target.kind = LivingKind::Player { realm: Realm::Albion };

        assert_eq!(
            check(&env, &attacker, Some(&target)),
            Some(AttackResult::NotAllowedServerRules)
        );
    }

    #[test]
    fn effects_gate_the_swing() {
        let config = CombatConfig::default();
        let registry = PropertyRegistry::standard();
        let rng = SequenceRng::constant(0.5);
        let env = CombatEnv::new(&config, &registry, &rng);
        let (mut attacker, mut target) = fighters();

        target.effects.add(Effect::OneWayInvisibility { owner: EntityId(9) }, None);
        assert_eq!(check(&env, &attacker, Some(&target)), Some(AttackResult::NoValidTarget));

        let (_, mut target) = fighters();
        target.effects.add(Effect::OneWayInvisibility { owner: attacker.id }, None);
        assert_eq!(check(&env, &attacker, Some(&target)), None);

        target.effects.add(Effect::DamageImmunity, None);
        assert_eq!(check(&env, &attacker, Some(&target)), Some(AttackResult::NoValidTarget));

        attacker.effects.add(Effect::Phaseshift, None);
        assert_eq!(check(&env, &attacker, Some(&target)), Some(AttackResult::Phaseshift));
    }
}
