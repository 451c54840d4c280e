//! Living-entity state.
//!
//! A [`Living`] owns everything the combat rules read or mutate: resource
//! pools, crowd-control flags, equipment, active effects, the attacker
//! registry, short-lived combat bookkeeping and its attack scheduler.
//! Other livings are referenced only by [`EntityId`] and resolved lazily by
//! the caller.

mod attackers;
mod common;
mod effects;
mod equipment;
mod flags;
mod living;
mod participants;
mod temp;

pub use attackers::AttackerRegistry;
pub use common::{EntityId, GameTime, HEADING_UNITS, Position, ResourceMeter, is_in_front};
pub use effects::{ActiveEffect, Effect, EffectId, EffectKind, EffectList};
pub use equipment::{
    ActiveWeaponSlot, Ammo, AmmoAccuracy, ArmorKind, ArmorPiece, DamageType, Equipment,
    HitLocation, MAX_PROCS, OffHand, Poison, Shield, ShieldSize, SpellId, Weapon, WeaponHand,
};
pub use flags::LivingFlags;
pub use living::{
    CanBeGuarded, CastState, ChangeReason, HasControllingOwner, IsStealthable, Living, LivingKind,
    PowerProfile, RangedAttackType, RangedPolicy, Realm, ResourceKind, StackCounters,
};
pub use participants::Participants;
pub use temp::{LastAttack, TempProperties};
