//! Weapons, shields, ammunition and armor as the combat rules see them.

use arrayvec::ArrayVec;
use strum::{Display, EnumIter, IntoEnumIterator};

use crate::env::RngOracle;

/// Proc slots per weapon or shield.
pub const MAX_PROCS: usize = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DamageType {
    Crush,
    Slash,
    Thrust,
    /// Unarmed creatures.
    Natural,
}

/// Identifier of a spell owned by the spell collaborator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpellId(pub u32);

/// Poison applied to a weapon; each landed hit spends a charge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Poison {
    pub spell: SpellId,
    pub charges: u16,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WeaponHand {
    OneHanded,
    TwoHanded,
    LeftHand,
    Ranged,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Weapon {
    pub name: String,
    pub damage_type: DamageType,
    /// Swing speed in tenths of a second.
    pub speed: u16,
    /// Specialization level of the wielder in this weapon's line.
    #[cfg_attr(feature = "serde", serde(default))]
    pub spec_level: u16,
    /// To-hit bonus points granted by the item.
    #[cfg_attr(feature = "serde", serde(default))]
    pub bonus: i16,
    pub hand: WeaponHand,
    /// Range for ranged weapons; melee weapons use the configured melee range.
    #[cfg_attr(feature = "serde", serde(default))]
    pub range: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub procs: ArrayVec<SpellId, MAX_PROCS>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub poison: Option<Poison>,
}

impl Weapon {
    pub fn new(name: impl Into<String>, damage_type: DamageType, speed: u16, hand: WeaponHand) -> Self {
        Self {
            name: name.into(),
            damage_type,
            speed,
            spec_level: 1,
            bonus: 0,
            hand,
            range: 0,
            procs: ArrayVec::new(),
            poison: None,
        }
    }

    pub fn is_ranged(&self) -> bool {
        self.hand == WeaponHand::Ranged
    }
}

/// Shield size class. The numeric value is how many attackers it covers fully.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ShieldSize {
    Small = 1,
    Medium = 2,
    Large = 3,
}

impl ShieldSize {
    pub const fn coverage(self) -> usize {
        self as usize
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Shield {
    pub size: ShieldSize,
    /// Item quality in percent.
    pub quality: u8,
    #[cfg_attr(feature = "serde", serde(default))]
    pub procs: ArrayVec<SpellId, MAX_PROCS>,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OffHand {
    Weapon(Weapon),
    Shield(Shield),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AmmoAccuracy {
    Rough,
    Standard,
    Footed,
    Precise,
}

impl AmmoAccuracy {
    /// Additive miss-chance modifier in percent.
    pub const fn miss_modifier(self) -> f64 {
        match self {
            Self::Rough => 15.0,
            Self::Standard => 0.0,
            Self::Footed => -15.0,
            Self::Precise => -25.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ammo {
    pub accuracy: AmmoAccuracy,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ArmorKind {
    Cloth,
    Leather,
    Studded,
    Chain,
    Plate,
}

impl ArmorKind {
    /// Flat absorption of the armor class, as a fraction.
    pub const fn absorption(self) -> f64 {
        match self {
            Self::Cloth => 0.0,
            Self::Leather => 0.10,
            Self::Studded => 0.19,
            Self::Chain => 0.27,
            Self::Plate => 0.34,
        }
    }

    /// Armor-class resist against a damage type, in percent.
    pub const fn resist(self, damage: DamageType) -> i32 {
        match (self, damage) {
            (Self::Leather, DamageType::Crush) => 0,
            (Self::Leather, DamageType::Slash) => 10,
            (Self::Leather, DamageType::Thrust) => -10,
            (Self::Studded, DamageType::Crush) => -10,
            (Self::Studded, DamageType::Slash) => 10,
            (Self::Studded, DamageType::Thrust) => 0,
            (Self::Chain, DamageType::Crush) => -10,
            (Self::Chain, DamageType::Slash) => 0,
            (Self::Chain, DamageType::Thrust) => 10,
            (Self::Plate, DamageType::Crush) => -10,
            (Self::Plate, DamageType::Slash) => 10,
            (Self::Plate, DamageType::Thrust) => 0,
            _ => 0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ArmorPiece {
    pub kind: ArmorKind,
    pub armor_factor: u16,
    /// Defensive bonus points granted by the item.
    pub bonus: i16,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HitLocation {
    Torso,
    Legs,
    Arms,
    Head,
    Hands,
    Feet,
}

impl HitLocation {
    /// Relative chance of each location being struck. Sums to 100.
    pub const fn weight(self) -> u32 {
        match self {
            Self::Torso => 40,
            Self::Legs => 25,
            Self::Arms => 15,
            Self::Head => 10,
            Self::Hands => 5,
            Self::Feet => 5,
        }
    }

    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn roll(rng: &dyn RngOracle) -> HitLocation {
        let mut roll = rng.random_range(0, 99) as u32;
        for location in HitLocation::iter() {
            if roll < location.weight() {
                return location;
            }
            roll -= location.weight();
        }
        HitLocation::Torso
    }
}

/// Which weapon a living swings with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ActiveWeaponSlot {
    #[default]
    Standard,
    TwoHanded,
    Distance,
}

#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Equipment {
    pub main_hand: Option<Weapon>,
    pub two_hand: Option<Weapon>,
    pub off_hand: Option<OffHand>,
    pub ranged: Option<Weapon>,
    pub ammo: Option<Ammo>,
    pub armor: [Option<ArmorPiece>; 6],
}

impl Equipment {
    /// The weapon swung in `slot`, `None` for an unarmed creature.
    pub fn active_weapon(&self, slot: ActiveWeaponSlot) -> Option<&Weapon> {
        match slot {
            ActiveWeaponSlot::Standard => self.main_hand.as_ref(),
            ActiveWeaponSlot::TwoHanded => self.two_hand.as_ref(),
            ActiveWeaponSlot::Distance => self.ranged.as_ref(),
        }
    }

    pub fn active_weapon_mut(&mut self, slot: ActiveWeaponSlot) -> Option<&mut Weapon> {
        match slot {
            ActiveWeaponSlot::Standard => self.main_hand.as_mut(),
            ActiveWeaponSlot::TwoHanded => self.two_hand.as_mut(),
            ActiveWeaponSlot::Distance => self.ranged.as_mut(),
        }
    }

    pub fn shield(&self) -> Option<&Shield> {
        match &self.off_hand {
            Some(OffHand::Shield(shield)) => Some(shield),
            _ => None,
        }
    }

    pub fn off_hand_weapon(&self) -> Option<&Weapon> {
        match &self.off_hand {
            Some(OffHand::Weapon(weapon)) => Some(weapon),
            _ => None,
        }
    }

    pub fn armor_at(&self, location: HitLocation) -> Option<&ArmorPiece> {
        self.armor[location.index()].as_ref()
    }

    pub fn set_armor(&mut self, location: HitLocation, piece: ArmorPiece) {
        self.armor[location.index()] = Some(piece);
    }
}
