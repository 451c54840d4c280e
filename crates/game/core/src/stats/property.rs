use strum::{Display, EnumIter};

use crate::state::DamageType;

/// Keys of the derived-property table.
///
/// Every combat formula reads its inputs through
/// [`PropertyOracle::modified_value`](super::PropertyOracle::modified_value);
/// the key names which calculator to run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Property {
    // ===== primary stats =====
    Strength,
    Constitution,
    Dexterity,
    Quickness,

    // ===== offense =====
    MeleeSpeed,
    ArcherySpeed,
    MeleeDamage,
    RangedDamage,
    WeaponSkill,
    ToHitBonus,
    SkillBonus,
    OffhandChance,
    CriticalMeleeHitChance,
    CriticalArcheryHitChance,

    // ===== defense =====
    EvadeChance,
    ParryChance,
    BlockChance,
    FumbleChance,
    DefensiveMissChance,
    ArmorFactor,
    ArmorAbsorption,
    Resist(DamageType),
    SecondaryResist(DamageType),
    DamageResist,

    // ===== regeneration =====
    HealthRegenerationRate,
    PowerRegenerationRate,
    EnduranceRegenerationRate,
}

impl Property {
    /// The four primary stats, which are plain `base + buffs` sums.
    pub const PRIMARY: [Property; 4] = [
        Property::Strength,
        Property::Constitution,
        Property::Dexterity,
        Property::Quickness,
    ];
}

/// Trained abilities; the stored value is the ability level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Ability {
    Evade,
    Parry,
    Shield,
    DualWield,
    /// Ranged attacks pierce a bladeturn ward cast by someone else.
    PenetratingArrow,
}
