//! Swing cadence.
//!
//! # Formula
//!
//! ```text
//! speed = base * (1 - (Quickness - 60) / 500)
//! speed *= (ArcherySpeed | MeleeSpeed) / 100     // by active slot
//! speed  = max(speed, min_attack_speed)
//! ```

use crate::env::CombatEnv;
use crate::state::Living;
use crate::stats::Property;

/// Milliseconds between two swings of `living` with its active slot.
pub fn attack_speed(env: &CombatEnv<'_>, living: &Living) -> u32 {
    let quickness = f64::from(env.prop(living, Property::Quickness));
    let mut speed = f64::from(env.config.base_attack_speed_ms) * (1.0 - (quickness - 60.0) / 500.0);

    let modifier = if living.is_ranged_active() {
        env.prop(living, Property::ArcherySpeed)
    } else {
        env.prop(living, Property::MeleeSpeed)
    };
    speed *= f64::from(modifier) / 100.0;

    (speed.max(0.0) as u32).max(env.config.min_attack_speed_ms)
}

/// Delay before a ranged shot lands, `1 + distance * 100 / 150` milliseconds.
pub fn ranged_travel_delay(distance: f64) -> u64 {
    1 + (distance.max(0.0) * 100.0 / 150.0) as u64
}
