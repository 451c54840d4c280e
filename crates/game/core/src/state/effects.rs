//! Active effects on a living.
//!
//! Effects are a closed set: the defense chain asks "does this living carry
//! effect kind X" and, for one-shot wards, consumes the first instance.
//! Timed removal is driven by the caller through [`EffectList::remove_expired`].

use strum::EnumDiscriminants;

use crate::state::{EntityId, GameTime};
use crate::stats::Property;

/// Handle returned by [`EffectList::add`], used to cancel a specific instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EffectId(pub u32);

#[derive(Clone, Debug, PartialEq, EnumDiscriminants)]
#[strum_discriminants(name(EffectKind), derive(Hash, strum::Display))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Effect {
    /// `guard` may block melee hits aimed at the carrier.
    Guard { guard: EntityId },
    /// `defender` may block or parry hits aimed at the carrier.
    DashingDefense { defender: EntityId },
    /// Melee attacks on the carrier are turned away while `guard` stands still.
    Bodyguard { guard: EntityId },
    /// `interceptor` may step in and take one hit.
    Intercept { interceptor: EntityId },
    /// The carrier focuses its shield on `target`.
    Engage { target: EntityId },
    /// Out of phase: the carrier cannot attack and the next swing at it misses.
    Phaseshift,
    /// The carrier cannot be hit while the grapple holds.
    Grapple,
    /// Flat 90% chance to turn away melee blows.
    BladeBarrier,
    /// One-shot ward absorbing a single blow.
    Bladeturn { caster: EntityId, caster_level: u8 },
    /// Weakened block that the next incoming swing shatters.
    BrittleGuard,
    /// The carrier cannot be hit by anyone but `owner`.
    OneWayInvisibility { owner: EntityId },
    DamageImmunity,
    AntiPoison,
    /// Inverts armor absorption into a damage bonus for the carrier's swings.
    Badge,
    /// Flat adjustment picked up by the property calculators.
    Buff { property: Property, amount: i32 },
}

impl Effect {
    pub fn kind(&self) -> EffectKind {
        EffectKind::from(self)
    }

    /// Other livings this effect refers to.
    pub fn related_entity(&self) -> Option<EntityId> {
        match self {
            Self::Guard { guard } | Self::Bodyguard { guard } => Some(*guard),
            Self::DashingDefense { defender } => Some(*defender),
            Self::Intercept { interceptor } => Some(*interceptor),
            Self::Engage { target } => Some(*target),
            Self::Bladeturn { caster, .. } => Some(*caster),
            Self::OneWayInvisibility { owner } => Some(*owner),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActiveEffect {
    pub id: EffectId,
    pub effect: Effect,
    pub expires_at: Option<GameTime>,
}

#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EffectList {
    next_id: u32,
    effects: Vec<ActiveEffect>,
}

impl EffectList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, effect: Effect, expires_at: Option<GameTime>) -> EffectId {
        let id = EffectId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.effects.push(ActiveEffect {
            id,
            effect,
            expires_at,
        });
        id
    }

    pub fn has(&self, kind: EffectKind) -> bool {
        self.effects.iter().any(|e| e.effect.kind() == kind)
    }

    /// First instance of `kind`, in insertion order.
    pub fn find(&self, kind: EffectKind) -> Option<&Effect> {
        self.effects
            .iter()
            .find(|e| e.effect.kind() == kind)
            .map(|e| &e.effect)
    }

    /// Removes and returns the first instance of `kind`.
    pub fn consume(&mut self, kind: EffectKind) -> Option<Effect> {
        let index = self.effects.iter().position(|e| e.effect.kind() == kind)?;
        Some(self.effects.remove(index).effect)
    }

    pub fn cancel(&mut self, id: EffectId) -> Option<Effect> {
        let index = self.effects.iter().position(|e| e.id == id)?;
        Some(self.effects.remove(index).effect)
    }

    pub fn remove_all(&mut self, kind: EffectKind) -> usize {
        let before = self.effects.len();
        self.effects.retain(|e| e.effect.kind() != kind);
        before - self.effects.len()
    }

    /// Drops effects whose expiry is at or before `now` and returns them.
    pub fn remove_expired(&mut self, now: GameTime) -> Vec<ActiveEffect> {
        let (expired, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.effects)
            .into_iter()
            .partition(|e| e.expires_at.is_some_and(|at| at <= now));
        self.effects = kept;
        expired
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActiveEffect> {
        self.effects.iter()
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    /// Sum of every `Buff` on `property`.
    pub fn buff_total(&self, property: Property) -> i32 {
        self.effects
            .iter()
            .filter_map(|e| match e.effect {
                Effect::Buff {
                    property: p,
                    amount,
                } if p == property => Some(amount),
                _ => None,
            })
            .sum()
    }

    /// Ids of other livings referenced by any effect, deduplicated.
    pub fn related_entities(&self) -> Vec<EntityId> {
        let mut ids: Vec<EntityId> = self
            .effects
            .iter()
            .filter_map(|e| e.effect.related_entity())
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consume_removes_only_first_instance() {
        let mut list = EffectList::new();
        list.add(Effect::BrittleGuard, None);
        list.add(Effect::BrittleGuard, None);

        assert_eq!(list.consume(EffectKind::BrittleGuard), Some(Effect::BrittleGuard));
        assert!(list.has(EffectKind::BrittleGuard));
        assert_eq!(list.consume(EffectKind::BrittleGuard), Some(Effect::BrittleGuard));
        assert!(list.consume(EffectKind::BrittleGuard).is_none());
    }

    #[test]
    fn cancel_by_id_leaves_other_instances() {
        let mut list = EffectList::new();
        let first = list.add(Effect::AntiPoison, None);
        list.add(Effect::AntiPoison, None);

        assert!(list.cancel(first).is_some());
        assert!(list.cancel(first).is_none());
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn expiry_keeps_permanent_effects() {
        let mut list = EffectList::new();
        list.add(Effect::Grapple, Some(GameTime(1_000)));
        list.add(Effect::DamageImmunity, None);

        let expired = list.remove_expired(GameTime(1_000));

        assert_eq!(expired.len(), 1);
        assert!(list.has(EffectKind::DamageImmunity));
        assert!(!list.has(EffectKind::Grapple));
    }

    #[test]
    fn buffs_sum_per_property() {
        let mut list = EffectList::new();
        list.add(
            Effect::Buff {
                property: Property::Quickness,
                amount: 10,
            },
            None,
        );
        list.add(
            Effect::Buff {
                property: Property::Quickness,
                amount: -3,
            },
            None,
        );
        list.add(
            Effect::Buff {
                property: Property::Strength,
                amount: 50,
            },
            None,
        );

        assert_eq!(list.buff_total(Property::Quickness), 7);
    }
}
