use std::collections::HashMap;
use std::fmt;

use tracing::warn;

use super::Property;
use crate::state::Living;

/// Read access to derived properties.
///
/// Combat and regeneration formulas depend on this trait rather than on the
/// concrete registry so tests can substitute fixed values.
pub trait PropertyOracle: Send + Sync {
    fn modified_value(&self, living: &Living, property: Property) -> i32;
}

/// Computes one property of a living.
///
/// The oracle argument lets a calculator build on other properties
/// (evade on dexterity and quickness, for example).
pub trait PropertyCalculator: Send + Sync {
    fn calc(&self, living: &Living, props: &dyn PropertyOracle) -> i32;
}

impl<F> PropertyCalculator for F
where
    F: Fn(&Living, &dyn PropertyOracle) -> i32 + Send + Sync,
{
    fn calc(&self, living: &Living, props: &dyn PropertyOracle) -> i32 {
        self(living, props)
    }
}

/// Explicit table of property calculators.
///
/// Built once at startup: each module that owns formulas registers its
/// calculators through a `register_properties` function, and
/// [`PropertyRegistry::standard`] calls them in a fixed order.
#[derive(Default)]
pub struct PropertyRegistry {
    calculators: HashMap<Property, Box<dyn PropertyCalculator>>,
}

impl PropertyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every calculator shipped by this crate.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        register_primary_stats(&mut registry);
        crate::combat::register_properties(&mut registry);
        crate::regen::register_properties(&mut registry);
        registry
    }

    /// Installs `calculator` for `property`, replacing any previous one.
    ///
    /// Returns true if a calculator was replaced.
    pub fn register<C>(&mut self, property: Property, calculator: C) -> bool
    where
        C: PropertyCalculator + 'static,
    {
        self.calculators
            .insert(property, Box::new(calculator))
            .is_some()
    }

    pub fn contains(&self, property: Property) -> bool {
        self.calculators.contains_key(&property)
    }

    pub fn len(&self) -> usize {
        self.calculators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calculators.is_empty()
    }
}

impl PropertyOracle for PropertyRegistry {
    fn modified_value(&self, living: &Living, property: Property) -> i32 {
        match self.calculators.get(&property) {
            Some(calculator) => calculator.calc(living, self),
            None => {
                warn!(
                    target: "combat::properties",
                    living = %living.id,
                    %property,
                    "no calculator registered, using 0"
                );
                0
            }
        }
    }
}

impl fmt::Debug for PropertyRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyRegistry")
            .field("calculators", &self.calculators.len())
            .finish()
    }
}

/// Stored base value plus the sum of active buffs.
pub fn base_plus_buffs(living: &Living, property: Property) -> i32 {
    living.base_property(property) + living.effects.buff_total(property)
}

fn register_primary_stats(registry: &mut PropertyRegistry) {
    for stat in Property::PRIMARY {
        registry.register(stat, move |living: &Living, _: &dyn PropertyOracle| {
            base_plus_buffs(living, stat).max(1)
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{Effect, EntityId, LivingKind, Realm};

    fn sample() -> Living {
        Living::new(
            EntityId(1),
            "sample",
            LivingKind::Npc {
                realm: Realm::None,
            },
            10,
        )
    }

    #[test]
    fn missing_calculator_yields_zero() {
        let registry = PropertyRegistry::new();
        assert_eq!(registry.modified_value(&sample(), Property::EvadeChance), 0);
    }

    #[test]
    fn primary_stat_adds_buffs() {
        let registry = PropertyRegistry::standard();
        let mut living = sample();
        living.set_base_property(Property::Dexterity, 60);
        living.effects.add(
            Effect::Buff {
                property: Property::Dexterity,
                amount: 15,
            },
            None,
        );

        assert_eq!(registry.modified_value(&living, Property::Dexterity), 75);
    }

    #[test]
    fn register_replaces_existing_calculator() {
        let mut registry = PropertyRegistry::standard();
        let replaced = registry.register(
            Property::Quickness,
            |_: &Living, _: &dyn PropertyOracle| 42,
        );

        assert!(replaced);
        assert_eq!(registry.modified_value(&sample(), Property::Quickness), 42);
    }
}
