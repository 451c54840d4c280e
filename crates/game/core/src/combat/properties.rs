//! Combat property calculators.
//!
//! Chances are stored in tenths of a percent (`500` is 50%), as the defense
//! chain divides them by 1000. An untrained ability contributes nothing, so
//! a living without Evade still evades at its base plus buffs.

use strum::IntoEnumIterator;

use crate::state::{DamageType, Living, LivingKind};
use crate::stats::{Ability, Property, PropertyOracle, PropertyRegistry, base_plus_buffs};

const SIMPLE: [Property; 10] = [
    Property::MeleeDamage,
    Property::RangedDamage,
    Property::ToHitBonus,
    Property::SkillBonus,
    Property::FumbleChance,
    Property::DefensiveMissChance,
    Property::DamageResist,
    Property::MeleeSpeed,
    Property::ArcherySpeed,
    Property::WeaponSkill,
];

/// Registers every calculator the combat rules read.
pub fn register_properties(registry: &mut PropertyRegistry) {
    for property in SIMPLE {
        registry.register(property, move |living: &Living, props: &dyn PropertyOracle| {
            simple(living, props, property)
        });
    }
    for damage_type in DamageType::iter() {
        registry.register(
            Property::Resist(damage_type),
            move |living: &Living, _: &dyn PropertyOracle| {
                base_plus_buffs(living, Property::Resist(damage_type))
            },
        );
        registry.register(
            Property::SecondaryResist(damage_type),
            move |living: &Living, _: &dyn PropertyOracle| {
                base_plus_buffs(living, Property::SecondaryResist(damage_type))
            },
        );
    }

    registry.register(Property::EvadeChance, evade);
    registry.register(Property::ParryChance, parry);
    registry.register(Property::BlockChance, block);
    registry.register(Property::OffhandChance, offhand);
    for critical in [
        Property::CriticalMeleeHitChance,
        Property::CriticalArcheryHitChance,
    ] {
        registry.register(critical, move |living: &Living, _: &dyn PropertyOracle| {
            (10 + base_plus_buffs(living, critical)).clamp(0, 50)
        });
    }
    registry.register(Property::ArmorFactor, armor_factor);
    registry.register(Property::ArmorAbsorption, armor_absorption);
}

fn simple(living: &Living, props: &dyn PropertyOracle, property: Property) -> i32 {
    let value = base_plus_buffs(living, property);
    match property {
        // percent of the unmodified interval
        Property::MeleeSpeed | Property::ArcherySpeed => 100 + value,
        Property::WeaponSkill => {
            let stats = props.modified_value(living, Property::Strength)
                + props.modified_value(living, Property::Dexterity);
            i32::from(living.level) * 15 + stats / 2 + value
        }
        _ => value,
    }
}

fn evade(living: &Living, props: &dyn PropertyOracle) -> i32 {
    let mut chance = base_plus_buffs(living, Property::EvadeChance);
    let level = living.ability_level(Ability::Evade);
    if level > 0 {
        let dex = f64::from(props.modified_value(living, Property::Dexterity));
        let qui = f64::from(props.modified_value(living, Property::Quickness));
        let percent = ((dex + qui) / 2.0 - 50.0) * 0.05 + f64::from(level) * 5.0;
        chance += (percent * 10.0) as i32;
    }
    chance
}

fn trained_defense(living: &Living, props: &dyn PropertyOracle, ability: Ability) -> i32 {
    let level = living.ability_level(ability);
    if level == 0 {
        return 0;
    }
    let dex = f64::from(props.modified_value(living, Property::Dexterity));
    let percent = (dex * 2.0 - 100.0) / 40.0 + f64::from(level) / 2.0 + 5.0;
    (percent * 10.0) as i32
}

fn parry(living: &Living, props: &dyn PropertyOracle) -> i32 {
    base_plus_buffs(living, Property::ParryChance) + trained_defense(living, props, Ability::Parry)
}

fn block(living: &Living, props: &dyn PropertyOracle) -> i32 {
    base_plus_buffs(living, Property::BlockChance) + trained_defense(living, props, Ability::Shield)
}

fn offhand(living: &Living, _: &dyn PropertyOracle) -> i32 {
    let mut chance = base_plus_buffs(living, Property::OffhandChance);
    let level = i32::from(living.ability_level(Ability::DualWield));
    if level > 0 {
        chance += 25 + (level - 1) * 68 / 100;
    }
    chance
}

fn armor_factor(living: &Living, _: &dyn PropertyOracle) -> i32 {
    let natural = match living.kind {
        LivingKind::Player { .. } => 0,
        LivingKind::Npc { .. } | LivingKind::Pet { .. } => i32::from(living.level) * 2,
    };
    base_plus_buffs(living, Property::ArmorFactor) + natural
}

fn armor_absorption(living: &Living, _: &dyn PropertyOracle) -> i32 {
    let natural = match living.kind {
        LivingKind::Player { .. } => 0,
        LivingKind::Npc { .. } | LivingKind::Pet { .. } => i32::from(living.level) * 68 / 100,
    };
    base_plus_buffs(living, Property::ArmorAbsorption) + natural
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{Effect, EntityId, Realm};

    fn npc(level: u8) -> Living {
        Living::new(EntityId(1), "npc", LivingKind::Npc { realm: Realm::None }, level)
    }

    fn player(level: u8) -> Living {
        Living::new(EntityId(2), "player", LivingKind::Player { realm: Realm::Hibernia }, level)
    }

    #[test]
    fn every_combat_property_is_registered() {
        let registry = PropertyRegistry::standard();
        for property in [
            Property::MeleeSpeed,
            Property::WeaponSkill,
            Property::EvadeChance,
            Property::ParryChance,
            Property::BlockChance,
            Property::OffhandChance,
            Property::CriticalMeleeHitChance,
            Property::ArmorFactor,
            Property::Resist(DamageType::Crush),
            Property::SecondaryResist(DamageType::Thrust),
        ] {
            assert!(registry.contains(property), "{property}");
        }
    }

    #[test]
    fn evade_adds_trained_ability_to_base() {
        let registry = PropertyRegistry::standard();
        let mut living = player(20);
        living.set_base_property(Property::Dexterity, 70);
        living.set_base_property(Property::Quickness, 70);
        living.set_base_property(Property::EvadeChance, 15);
        assert_eq!(registry.modified_value(&living, Property::EvadeChance), 15);

        living.set_ability(Ability::Evade, 2);
        // ((70 + 70) / 2 - 50) * 0.05 + 2 * 5 = 11% -> 110
        assert_eq!(registry.modified_value(&living, Property::EvadeChance), 125);
    }

    #[test]
    fn parry_uses_dexterity_and_level() {
        let registry = PropertyRegistry::standard();
        let mut living = player(20);
        living.set_base_property(Property::Dexterity, 70);
        living.set_ability(Ability::Parry, 10);
        // (140 - 100) / 40 + 5 + 5 = 11% -> 110
        assert_eq!(registry.modified_value(&living, Property::ParryChance), 110);
    }

    #[test]
    fn critical_chance_is_clamped() {
        let registry = PropertyRegistry::standard();
        let mut living = player(20);
        assert_eq!(registry.modified_value(&living, Property::CriticalMeleeHitChance), 10);

        living.effects.add(
            Effect::Buff {
                property: Property::CriticalMeleeHitChance,
                amount: 90,
            },
            None,
        );
        assert_eq!(registry.modified_value(&living, Property::CriticalMeleeHitChance), 50);
        living.set_base_property(Property::CriticalMeleeHitChance, -200);
        assert_eq!(registry.modified_value(&living, Property::CriticalMeleeHitChance), 0);
    }

    #[test]
    fn creatures_carry_natural_armor() {
        let registry = PropertyRegistry::standard();
        assert_eq!(registry.modified_value(&npc(50), Property::ArmorFactor), 100);
        assert_eq!(registry.modified_value(&npc(50), Property::ArmorAbsorption), 34);
        assert_eq!(registry.modified_value(&player(50), Property::ArmorFactor), 0);
    }

    #[test]
    fn weapon_skill_grows_with_level_and_stats() {
        let registry = PropertyRegistry::standard();
        let mut living = player(10);
        living.set_base_property(Property::Strength, 60);
        living.set_base_property(Property::Dexterity, 40);
        assert_eq!(registry.modified_value(&living, Property::WeaponSkill), 200);
    }
}
