//! Derived-property layer.
//!
//! A living stores only base values and trained abilities. Everything the
//! combat formulas consume (evade chance, armor factor, regeneration rates)
//! is computed on demand by a calculator looked up in a [`PropertyRegistry`].
//! An unregistered property evaluates to 0 and logs a warning; it never fails.

mod property;
mod registry;

pub use property::{Ability, Property};
pub use registry::{PropertyCalculator, PropertyOracle, PropertyRegistry, base_plus_buffs};
