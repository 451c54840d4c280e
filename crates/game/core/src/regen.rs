//! Resource regeneration.
//!
//! Each resource has its own recurring timer owned by the runtime. A tick
//! calls [`regen_tick`], which applies one step and says whether and when to
//! run again. A full pool stops its timer; any later loss restarts it via
//! [`needs_regen`].
//!
//! # Cadence
//!
//! ```text
//! period = base_period(kind)
//! period *= 2      // health and mana, while in combat
//! period /= 2      // health and mana, while sitting
//! period += uniform(-period / 1000, period / 1000)
//! ```

use tracing::{debug, trace};

use crate::env::CombatEnv;
use crate::state::{GameTime, Living, LivingFlags, PowerProfile, ResourceKind};
use crate::stats::{Property, PropertyOracle, PropertyRegistry, base_plus_buffs};

fn rate_property(kind: ResourceKind) -> Property {
    match kind {
        ResourceKind::Health => Property::HealthRegenerationRate,
        ResourceKind::Mana => Property::PowerRegenerationRate,
        ResourceKind::Endurance => Property::EnduranceRegenerationRate,
    }
}

/// Amount restored by one tick. Diseased livings heal at half rate.
pub fn regen_rate(env: &CombatEnv<'_>, living: &Living, kind: ResourceKind) -> i64 {
    let rate = i64::from(env.prop(living, rate_property(kind)));
    if kind == ResourceKind::Health && living.is_diseased() {
        rate / 2
    } else {
        rate
    }
}

/// Delay until the next tick, jitter included.
pub fn regen_period(env: &CombatEnv<'_>, living: &Living, kind: ResourceKind, now: GameTime) -> u64 {
    let base = u64::from(match kind {
        ResourceKind::Health => env.config.health_regen_period_ms,
        ResourceKind::Mana => env.config.mana_regen_period_ms,
        ResourceKind::Endurance => env.config.endurance_regen_period_ms,
    });
    let mut period = base;
    if kind != ResourceKind::Endurance {
        if living.in_combat(now, env.config.combat_window_ms) {
            period *= 2;
        }
        if living.flags.contains(LivingFlags::SITTING) {
            period /= 2;
        }
    }

    // spread comes from the unadjusted period
    let spread = (base / 1000) as i32;
    let jitter = env.rng.random_range(-spread, spread);
    period.saturating_add_signed(i64::from(jitter)).max(1)
}

/// True when a stopped timer of this kind should be started again.
pub fn needs_regen(living: &Living, kind: ResourceKind) -> bool {
    if !living.is_alive() || !living.is_active() {
        return false;
    }
    match (kind, living.power_profile) {
        (ResourceKind::Mana, PowerProfile::Drain { .. }) => true,
        _ => {
            let meter = living.meter(kind);
            meter.maximum > 0 && !meter.is_full()
        }
    }
}

/// Runs one regeneration tick. Returns the delay before the next one, or
/// `None` to stop the timer.
///
/// A pool found full is left untouched; for health the experience credit
/// is dropped as the fight is considered over.
pub fn regen_tick(
    env: &CombatEnv<'_>,
    living: &mut Living,
    kind: ResourceKind,
    now: GameTime,
) -> Option<u64> {
    if !living.is_alive() || !living.is_active() {
        debug!(target: "combat::regen", living = %living.id, %kind, "regen stopped, inactive");
        return None;
    }

    if kind == ResourceKind::Mana
        && let PowerProfile::Drain { per_tick } = living.power_profile
    {
        let delta = if living.in_combat(now, env.config.combat_window_ms) {
            regen_rate(env, living, kind)
        } else {
            -i64::from(per_tick)
        };
        let applied = living.change_mana(delta);
        trace!(target: "combat::regen", living = %living.id, applied, "mana drain tick");
        return Some(regen_period(env, living, kind, now));
    }

    if living.meter(kind).is_full() {
        if kind == ResourceKind::Health {
            living.attackers.clear_credit();
        }
        debug!(target: "combat::regen", living = %living.id, %kind, "pool full, regen stopped");
        return None;
    }

    let rate = regen_rate(env, living, kind);
    let applied = if rate > 0 {
        living.change_resource(kind, rate)
    } else {
        0
    };
    trace!(
        target: "combat::regen",
        living = %living.id,
        %kind,
        rate,
        applied,
        "regen tick"
    );

    if living.meter(kind).is_full() {
        debug!(target: "combat::regen", living = %living.id, %kind, "pool full, regen stopped");
        return None;
    }
    Some(regen_period(env, living, kind, now))
}

/// Registers the three regeneration rate calculators.
pub fn register_properties(registry: &mut PropertyRegistry) {
    registry.register(
        Property::HealthRegenerationRate,
        |living: &Living, _: &dyn PropertyOracle| {
            let base = if living.is_player() { 1 } else { 6 };
            base + i32::from(living.level) * 6 / 10
                + base_plus_buffs(living, Property::HealthRegenerationRate)
        },
    );
    registry.register(
        Property::PowerRegenerationRate,
        |living: &Living, _: &dyn PropertyOracle| {
            (i32::from(living.level) * 6 / 10).max(1)
                + base_plus_buffs(living, Property::PowerRegenerationRate)
        },
    );
    registry.register(
        Property::EnduranceRegenerationRate,
        |living: &Living, _: &dyn PropertyOracle| {
            3 + base_plus_buffs(living, Property::EnduranceRegenerationRate)
        },
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CombatConfig;
    use crate::env::SequenceRng;
    use crate::state::{EntityId, LivingKind, Realm, ResourceMeter};

    fn registry_with_health_rate(rate: i32) -> PropertyRegistry {
        let mut registry = PropertyRegistry::standard();
        registry.register(
            Property::HealthRegenerationRate,
            move |_: &Living, _: &dyn PropertyOracle| rate,
        );
        registry
    }

    fn wounded() -> Living {
        let mut living = Living::new(EntityId(1), "l", LivingKind::Player { realm: Realm::Albion }, 10);
        living.health = ResourceMeter::new(50, 100);
        living
    }

    #[test]
    fn tick_heals_then_stops_at_full() {
        let config = CombatConfig::default();
        let registry = registry_with_health_rate(10);
        let rng = SequenceRng::constant(0.5);
        let env = CombatEnv::new(&config, &registry, &rng);
        let mut living = wounded();

        let next = regen_tick(&env, &mut living, ResourceKind::Health, GameTime(0));
        assert_eq!(living.health.current, 60);
        assert_eq!(next, Some(3000));

        living.health.current = 95;
        living.attackers.add_credit(living.id, EntityId(9), 40.0);
        let next = regen_tick(&env, &mut living, ResourceKind::Health, GameTime(0));
        assert_eq!(living.health.current, 100);
        assert_eq!(next, None);
        assert!(!living.attackers.has_credit());
    }

    #[test]
    fn full_pool_is_not_touched() {
        let config = CombatConfig::default();
        let registry = registry_with_health_rate(10);
        let rng = SequenceRng::constant(0.5);
        let env = CombatEnv::new(&config, &registry, &rng);
        let mut living = wounded();
        living.health.current = 100;
        living.endurance = ResourceMeter::full(80);
        let before = living.clone();

        assert_eq!(regen_tick(&env, &mut living, ResourceKind::Endurance, GameTime(0)), None);
        assert_eq!(living, before);
        assert!(!needs_regen(&living, ResourceKind::Health));
    }

    #[test]
    fn combat_slows_and_sitting_speeds_up() {
        let config = CombatConfig::default();
        let registry = PropertyRegistry::standard();
        let rng = SequenceRng::constant(0.5);
        let env = CombatEnv::new(&config, &registry, &rng);
        let mut living = wounded();

        living.temp.mark_attacked(GameTime(1000), false);
        assert_eq!(regen_period(&env, &living, ResourceKind::Health, GameTime(2000)), 6000);
        assert_eq!(regen_period(&env, &living, ResourceKind::Health, GameTime(11_000)), 3000);

        living.flags.insert(LivingFlags::SITTING);
        assert_eq!(regen_period(&env, &living, ResourceKind::Mana, GameTime(11_000)), 1500);
        assert_eq!(regen_period(&env, &living, ResourceKind::Endurance, GameTime(11_000)), 1000);
    }

    #[test]
    fn jitter_stays_within_a_thousandth() {
        let config = CombatConfig::default();
        let registry = PropertyRegistry::standard();
        let living = wounded();

        let low = SequenceRng::constant(0.0);
        let env = CombatEnv::new(&config, &registry, &low);
        assert_eq!(regen_period(&env, &living, ResourceKind::Health, GameTime(0)), 2997);

        let high = SequenceRng::constant(0.999_999);
        let env = CombatEnv::new(&config, &registry, &high);
        assert_eq!(regen_period(&env, &living, ResourceKind::Health, GameTime(0)), 3003);
    }

    #[test]
    fn jitter_ignores_combat_and_sitting_adjustments() {
        let config = CombatConfig::default();
        let registry = PropertyRegistry::standard();
        let low = SequenceRng::constant(0.0);
        let env = CombatEnv::new(&config, &registry, &low);
        let mut living = wounded();

        living.temp.mark_attacked(GameTime(1000), false);
        assert_eq!(regen_period(&env, &living, ResourceKind::Health, GameTime(2000)), 5997);

        living.flags.insert(LivingFlags::SITTING);
        assert_eq!(regen_period(&env, &living, ResourceKind::Mana, GameTime(11_000)), 1497);
    }

    #[test]
    fn disease_halves_health_regen() {
        let config = CombatConfig::default();
        let registry = registry_with_health_rate(10);
        let rng = SequenceRng::constant(0.5);
        let env = CombatEnv::new(&config, &registry, &rng);
        let mut living = wounded();
        living.add_disease();

        regen_tick(&env, &mut living, ResourceKind::Health, GameTime(0));
        assert_eq!(living.health.current, 55);
    }

    #[test]
    fn drain_profile_never_stops() {
        let config = CombatConfig::default();
        let registry = PropertyRegistry::standard();
        let rng = SequenceRng::constant(0.5);
        let env = CombatEnv::new(&config, &registry, &rng);
        let mut living = wounded();
        living.mana = ResourceMeter::new(3, 100);
        living.power_profile = PowerProfile::Drain { per_tick: 2 };

        assert!(regen_tick(&env, &mut living, ResourceKind::Mana, GameTime(50_000)).is_some());
        assert_eq!(living.mana.current, 1);
        assert!(regen_tick(&env, &mut living, ResourceKind::Mana, GameTime(50_000)).is_some());
        assert_eq!(living.mana.current, 0);
        assert!(regen_tick(&env, &mut living, ResourceKind::Mana, GameTime(50_000)).is_some());

        living.temp.mark_attacking(GameTime(49_000), false);
        regen_tick(&env, &mut living, ResourceKind::Mana, GameTime(50_000));
        // level 10: max(1, 6) = 6
        assert_eq!(living.mana.current, 6);
    }

    #[test]
    fn default_rates_follow_level() {
        let registry = PropertyRegistry::standard();
        let player = wounded();
        let npc = Living::new(EntityId(2), "n", LivingKind::Npc { realm: Realm::None }, 10);

        assert_eq!(registry.modified_value(&player, Property::HealthRegenerationRate), 7);
        assert_eq!(registry.modified_value(&npc, Property::HealthRegenerationRate), 12);
        assert_eq!(registry.modified_value(&player, Property::PowerRegenerationRate), 6);
        assert_eq!(registry.modified_value(&player, Property::EnduranceRegenerationRate), 3);
    }
}
