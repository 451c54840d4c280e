use std::collections::{BTreeMap, BTreeSet};

use crate::state::EntityId;

/// Who is fighting a living, and how much each source has hurt it.
///
/// Two independent views: the attacker set (engagement, used by guard,
/// engage and parry/block attacker-count scaling) and the credit map
/// (damage-weighted experience shares). Ordered collections keep
/// snapshots deterministic.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttackerRegistry {
    attackers: BTreeSet<EntityId>,
    credit: BTreeMap<EntityId, f64>,
}

impl AttackerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `attacker` unless it is `owner` itself. Returns true if newly added.
    pub fn add(&mut self, owner: EntityId, attacker: EntityId) -> bool {
        if owner == attacker {
            return false;
        }
        self.attackers.insert(attacker)
    }

    pub fn remove(&mut self, attacker: EntityId) -> bool {
        self.attackers.remove(&attacker)
    }

    pub fn contains(&self, attacker: EntityId) -> bool {
        self.attackers.contains(&attacker)
    }

    pub fn len(&self) -> usize {
        self.attackers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attackers.is_empty()
    }

    pub fn snapshot(&self) -> Vec<EntityId> {
        self.attackers.iter().copied().collect()
    }

    /// Accumulates experience credit for `source`. Non-positive amounts are ignored.
    pub fn add_credit(&mut self, owner: EntityId, source: EntityId, amount: f64) {
        if owner == source || amount <= 0.0 || !amount.is_finite() {
            return;
        }
        *self.credit.entry(source).or_insert(0.0) += amount;
    }

    pub fn credit_of(&self, source: EntityId) -> f64 {
        self.credit.get(&source).copied().unwrap_or(0.0)
    }

    pub fn total_credit(&self) -> f64 {
        self.credit.values().sum()
    }

    pub fn credit_snapshot(&self) -> Vec<(EntityId, f64)> {
        self.credit.iter().map(|(id, c)| (*id, *c)).collect()
    }

    pub fn has_credit(&self) -> bool {
        !self.credit.is_empty()
    }

    pub fn clear_credit(&mut self) {
        self.credit.clear();
    }

    /// Empties both views.
    pub fn clear(&mut self) {
        self.attackers.clear();
        self.credit.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OWNER: EntityId = EntityId(1);

    #[test]
    fn registry_excludes_self() {
        let mut registry = AttackerRegistry::new();
        assert!(!registry.add(OWNER, OWNER));
        assert!(registry.add(OWNER, EntityId(2)));
        assert!(!registry.add(OWNER, EntityId(2)));
        assert_eq!(registry.snapshot(), vec![EntityId(2)]);
    }

    #[test]
    fn credit_accumulates_per_source() {
        let mut registry = AttackerRegistry::new();
        registry.add_credit(OWNER, EntityId(2), 10.0);
        registry.add_credit(OWNER, EntityId(2), 5.5);
        registry.add_credit(OWNER, EntityId(3), 4.5);
        registry.add_credit(OWNER, OWNER, 100.0);
        registry.add_credit(OWNER, EntityId(3), -1.0);

        assert_eq!(registry.credit_of(EntityId(2)), 15.5);
        assert_eq!(registry.total_credit(), 20.0);
    }

    #[test]
    fn clear_credit_keeps_attackers() {
        let mut registry = AttackerRegistry::new();
        registry.add(OWNER, EntityId(2));
        registry.add_credit(OWNER, EntityId(2), 1.0);

        registry.clear_credit();

        assert!(registry.contains(EntityId(2)));
        assert!(!registry.has_credit());
    }
}
