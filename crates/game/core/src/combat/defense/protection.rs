//! Third-party protection: bodyguard, intercept, guard and dashing defense.
//!
//! Protectors are read from the participant snapshot taken before the
//! defender was locked. A protector missing from the snapshot is treated as
//! out of reach.

use crate::combat::AttackResult;
use crate::combat::con_level;
use crate::combat::defense::{SwingFacts, clamp_chance, roll};
use crate::env::CombatEnv;
use crate::state::{Effect, EffectKind, EntityId, Living, LivingFlags, Participants};
use crate::stats::Property;

fn is_standing_by(protector: &Living) -> bool {
    protector.is_alive() && protector.is_active() && !protector.flags.is_incapacitated()
}

/// A bodyguard standing still next to the defender turns melee attacks away.
pub fn bodyguard(
    env: &CombatEnv<'_>,
    defender: &Living,
    participants: &Participants,
    facts: &SwingFacts,
) -> Option<EntityId> {
    if facts.is_ranged() {
        return None;
    }
    let Some(Effect::Bodyguard { guard }) = defender.effects.find(EffectKind::Bodyguard) else {
        return None;
    };
    let guard = participants.get(*guard)?;
    let ready = is_standing_by(guard)
        && !guard.flags.contains(LivingFlags::MOVING)
        && guard.casting.is_none()
        && guard.is_within(defender, env.config.bodyguard_range);
    ready.then_some(guard.id)
}

/// Consumes the intercept ward and rolls for the interceptor to step in.
///
/// Stealth openers slip past the interceptor without touching the ward.
pub fn intercept(
    env: &CombatEnv<'_>,
    defender: &mut Living,
    participants: &Participants,
    facts: &SwingFacts,
) -> Option<EntityId> {
    if facts.stealth_style {
        return None;
    }
    let Some(Effect::Intercept { interceptor }) = defender.effects.consume(EffectKind::Intercept)
    else {
        return None;
    };
    let interceptor = participants.get(interceptor)?;
    let eligible = is_standing_by(interceptor)
        && !interceptor.flags.contains(LivingFlags::SITTING)
        && interceptor.is_within(defender, env.config.intercept_range);
    if !eligible {
        return None;
    }
    let chance = env.config.intercept_chance_percent / 100.0;
    roll(env, "intercept", chance).then_some(interceptor.id)
}

/// Guards and dashing defenders try to stop the swing in the defender's place.
///
/// A guard may only block. A dashing defender tries a block, then a parry.
pub fn guard(
    env: &CombatEnv<'_>,
    attacker: &Living,
    defender: &Living,
    participants: &Participants,
    facts: &SwingFacts,
) -> Option<(EntityId, AttackResult)> {
    if facts.stealth_style {
        return None;
    }

    let protectors: Vec<(EntityId, bool)> = defender
        .effects
        .iter()
        .filter_map(|active| match active.effect {
            Effect::Guard { guard } => Some((guard, false)),
            Effect::DashingDefense { defender } => Some((defender, true)),
            _ => None,
        })
        .collect();

    for (id, dashing) in protectors {
        if id == attacker.id {
            continue;
        }
        let Some(protector) = participants.get(id) else {
            continue;
        };
        let eligible = is_standing_by(protector)
            && !protector.is_ranged_active()
            && protector.is_within(defender, env.config.guard_range);
        if !eligible {
            continue;
        }

        if let Some(chance) = protector_block_chance(env, attacker, protector, facts)
            && roll(env, "guard_block", chance)
        {
            return Some((id, AttackResult::Blocked));
        }
        if dashing
            && let Some(chance) = protector_parry_chance(env, attacker, protector, facts)
            && roll(env, "dashing_parry", chance)
        {
            return Some((id, AttackResult::Parried));
        }
    }
    None
}

fn protector_block_chance(
    env: &CombatEnv<'_>,
    attacker: &Living,
    protector: &Living,
    facts: &SwingFacts,
) -> Option<f64> {
    let shield = protector.equipment.shield()?;
    let ability = env.prop(protector, Property::BlockChance);
    if ability <= 0 {
        return None;
    }
    let chance = f64::from(ability) * f64::from(shield.quality) / 100_000.0
        + 0.05 * con_level(attacker.level, protector.level);
    Some(clamp_chance(
        env,
        chance,
        facts.pvp.then_some(env.config.pvp_block_cap),
    ))
}

fn protector_parry_chance(
    env: &CombatEnv<'_>,
    attacker: &Living,
    protector: &Living,
    facts: &SwingFacts,
) -> Option<f64> {
    protector.active_weapon()?;
    let ability = env.prop(protector, Property::ParryChance);
    if ability <= 0 {
        return None;
    }
    let chance =
        f64::from(ability) / 1000.0 + 0.05 * con_level(attacker.level, protector.level);
    Some(clamp_chance(
        env,
        chance,
        facts.pvp.then_some(env.config.pvp_parry_cap),
    ))
}

#[cfg(test)]
mod tests {
    use arrayvec::ArrayVec;

    use super::*;
    use crate::combat::AttackType;
    use crate::config::CombatConfig;
    use crate::env::SequenceRng;
    use crate::state::{
        DamageType, LivingKind, OffHand, Position, Realm, Shield, ShieldSize, Weapon, WeaponHand,
    };
    use crate::stats::PropertyRegistry;

    fn npc(id: u32, x: i32) -> Living {
        let mut living = Living::new(EntityId(id), "npc", LivingKind::Npc { realm: Realm::None }, 20);
        living.position = Position::new(1, x, 0, 0);
        living
    }

    fn melee_facts() -> SwingFacts {
        SwingFacts {
            attack_type: AttackType::MeleeOneHand,
            stealth_style: false,
            style_to_hit: 0,
            attacker_count: 1,
            pvp: false,
            con: 0.0,
        }
    }

    #[test]
    fn stationary_bodyguard_redirects_melee() {
        let config = CombatConfig::default();
        let registry = PropertyRegistry::standard();
        let rng = SequenceRng::constant(0.5);
        let env = CombatEnv::new(&config, &registry, &rng);

        let mut defender = npc(2, 0);
        defender.effects.add(Effect::Bodyguard { guard: EntityId(3) }, None);
        let mut guard = npc(3, 100);
        let participants: Participants = [guard.clone()].into_iter().collect();

        assert_eq!(
            bodyguard(&env, &defender, &participants, &melee_facts()),
            Some(EntityId(3))
        );

        let ranged = SwingFacts {
            attack_type: AttackType::Ranged,
            ..melee_facts()
        };
        assert_eq!(bodyguard(&env, &defender, &participants, &ranged), None);

        guard.flags.insert(LivingFlags::MOVING);
        let participants: Participants = [guard].into_iter().collect();
        assert_eq!(bodyguard(&env, &defender, &participants, &melee_facts()), None);
    }

    #[test]
    fn intercept_ward_is_spent_even_when_the_roll_fails() {
        let config = CombatConfig::default();
        let registry = PropertyRegistry::standard();
        let rng = SequenceRng::new([0.9, 0.1]);
        let env = CombatEnv::new(&config, &registry, &rng);

        let mut defender = npc(2, 0);
        let participants: Participants = [npc(4, 50)].into_iter().collect();

        defender.effects.add(Effect::Intercept { interceptor: EntityId(4) }, None);
        assert_eq!(intercept(&env, &mut defender, &participants, &melee_facts()), None);
        assert!(!defender.effects.has(EffectKind::Intercept));

        defender.effects.add(Effect::Intercept { interceptor: EntityId(4) }, None);
        assert_eq!(
            intercept(&env, &mut defender, &participants, &melee_facts()),
            Some(EntityId(4))
        );
        assert!(!defender.effects.has(EffectKind::Intercept));
    }

    #[test]
    fn distant_interceptor_still_spends_the_ward() {
        let config = CombatConfig::default();
        let registry = PropertyRegistry::standard();
        let rng = SequenceRng::constant(0.0);
        let env = CombatEnv::new(&config, &registry, &rng);

        let mut defender = npc(2, 0);
        defender.effects.add(Effect::Intercept { interceptor: EntityId(4) }, None);
        let participants: Participants = [npc(4, 5000)].into_iter().collect();

        assert_eq!(intercept(&env, &mut defender, &participants, &melee_facts()), None);
        assert!(defender.effects.is_empty());
    }

    #[test]
    fn guard_blocks_for_the_defender() {
        let config = CombatConfig::default();
        let registry = PropertyRegistry::standard();
        let rng = SequenceRng::new([0.4]);
        let env = CombatEnv::new(&config, &registry, &rng);

        let attacker = npc(1, -100);
        let mut defender = npc(2, 0);
        defender.effects.add(Effect::Guard { guard: EntityId(3) }, None);

        let mut guard_living = npc(3, 100);
        guard_living.set_base_property(Property::BlockChance, 500);
        guard_living.equipment.off_hand = Some(OffHand::Shield(Shield {
            size: ShieldSize::Medium,
            quality: 100,
            procs: ArrayVec::new(),
        }));
        let participants: Participants = [guard_living].into_iter().collect();

        assert_eq!(
            guard(&env, &attacker, &defender, &participants, &melee_facts()),
            Some((EntityId(3), AttackResult::Blocked))
        );
    }

    #[test]
    fn dashing_defender_falls_back_to_parry() {
        let config = CombatConfig::default();
        let registry = PropertyRegistry::standard();
        // block roll fails, parry roll succeeds
        let rng = SequenceRng::new([0.9, 0.1]);
        let env = CombatEnv::new(&config, &registry, &rng);

        let attacker = npc(1, -100);
        let mut defender = npc(2, 0);
        defender.effects.add(Effect::DashingDefense { defender: EntityId(3) }, None);

        let mut dasher = npc(3, 100);
        dasher.set_base_property(Property::BlockChance, 300);
        dasher.set_base_property(Property::ParryChance, 300);
        dasher.equipment.main_hand =
            Some(Weapon::new("blade", DamageType::Slash, 30, WeaponHand::OneHanded));
        dasher.equipment.off_hand = Some(OffHand::Shield(Shield {
            size: ShieldSize::Small,
            quality: 100,
            procs: ArrayVec::new(),
        }));
        let participants: Participants = [dasher].into_iter().collect();

        assert_eq!(
            guard(&env, &attacker, &defender, &participants, &melee_facts()),
            Some((EntityId(3), AttackResult::Parried))
        );
    }

    #[test]
    fn stealth_openers_ignore_guards() {
        let config = CombatConfig::default();
        let registry = PropertyRegistry::standard();
        let rng = SequenceRng::constant(0.0);
        let env = CombatEnv::new(&config, &registry, &rng);

        let attacker = npc(1, -100);
        let mut defender = npc(2, 0);
        defender.effects.add(Effect::Guard { guard: EntityId(3) }, None);
        let participants: Participants = [npc(3, 100)].into_iter().collect();
        let facts = SwingFacts {
            stealth_style: true,
            ..melee_facts()
        };

        assert_eq!(guard(&env, &attacker, &defender, &participants, &facts), None);
    }
}
