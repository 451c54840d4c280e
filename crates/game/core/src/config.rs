use crate::error::ConfigError;

/// Tunable constants of the combat ruleset.
///
/// Defaults are the stock tuning values; every formula in [`crate::combat`] and
/// [`crate::regen`] reads its constants from here.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CombatConfig {
    // ===== swing cadence =====
    /// Base swing interval before quickness scaling.
    pub base_attack_speed_ms: u32,
    /// Floor applied to the computed attack speed.
    pub min_attack_speed_ms: u32,
    /// Minimum delay before the first melee swing after `start_attack`.
    pub first_swing_min_delay_ms: u32,
    /// Delay used when a tick cannot progress (stunned, holding a shot).
    pub retry_delay_ms: u32,

    // ===== reach =====
    pub melee_range: u32,
    pub default_ranged_range: u32,
    /// Forward arc (degrees) a melee attacker must face.
    pub attack_arc_degrees: u16,
    /// Forward arc (degrees) in which a defender can parry or block.
    pub defense_arc_degrees: u16,
    pub guard_range: u32,
    pub bodyguard_range: u32,
    pub intercept_range: u32,

    // ===== defense chain =====
    pub player_base_miss_percent: f64,
    pub npc_base_miss_percent: f64,
    pub chance_floor: f64,
    pub chance_ceiling: f64,
    pub pvp_evade_cap: f64,
    pub pvp_parry_cap: f64,
    pub pvp_block_cap: f64,
    pub blade_barrier_chance: f64,
    pub engage_block_floor: f64,
    pub engage_endurance_cost: u32,
    pub intercept_chance_percent: f64,
    pub max_fumble_chance: f64,
    pub group_leader_assist_radius: u32,

    // ===== damage =====
    pub pvp_melee_damage: f64,
    pub pve_melee_damage: f64,
    pub pvp_ranged_damage: f64,
    pub pve_ranged_damage: f64,
    /// Proc chance (percent) contributed by each tenth of a second of weapon speed.
    pub proc_chance_per_speed_unit: f64,
    pub shield_proc_chance_percent: f64,
    pub offhand_effectiveness: f64,
    pub experience_share_radius: u32,
    pub visibility_distance: u32,

    // ===== interrupts =====
    pub ranged_interrupt_base_percent: i32,
    pub ranged_interrupt_per_con_percent: i32,

    // ===== regeneration =====
    pub health_regen_period_ms: u32,
    pub mana_regen_period_ms: u32,
    pub endurance_regen_period_ms: u32,
    /// Window after the last attack (given or taken) during which a living counts as in combat.
    pub combat_window_ms: u64,
}

impl CombatConfig {
    pub fn new() -> Self {
        Self {
            base_attack_speed_ms: 3400,
            min_attack_speed_ms: 1500,
            first_swing_min_delay_ms: 500,
            retry_delay_ms: 100,

            melee_range: 128,
            default_ranged_range: 1500,
            attack_arc_degrees: 120,
            defense_arc_degrees: 120,
            guard_range: 256,
            bodyguard_range: 300,
            intercept_range: 350,

            player_base_miss_percent: 20.0,
            npc_base_miss_percent: 25.0,
            chance_floor: 0.01,
            chance_ceiling: 0.995,
            pvp_evade_cap: 0.50,
            pvp_parry_cap: 0.50,
            pvp_block_cap: 0.60,
            blade_barrier_chance: 0.90,
            engage_block_floor: 0.85,
            engage_endurance_cost: 15,
            intercept_chance_percent: 50.0,
            max_fumble_chance: 0.99,
            group_leader_assist_radius: 3000,

            pvp_melee_damage: 1.0,
            pve_melee_damage: 1.0,
            pvp_ranged_damage: 1.0,
            pve_ranged_damage: 1.0,
            proc_chance_per_speed_unit: 0.25,
            shield_proc_chance_percent: 10.0,
            offhand_effectiveness: 0.625,
            experience_share_radius: 16384,
            visibility_distance: 3600,

            ranged_interrupt_base_percent: 65,
            ranged_interrupt_per_con_percent: 10,

            health_regen_period_ms: 3000,
            mana_regen_period_ms: 3000,
            endurance_regen_period_ms: 1000,
            combat_window_ms: 10_000,
        }
    }

    /// Rejects values that would make the formulas meaningless.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_attack_speed_ms == 0 || self.min_attack_speed_ms == 0 {
            return Err(ConfigError::ZeroPeriod {
                field: "attack_speed",
            });
        }
        if self.health_regen_period_ms == 0
            || self.mana_regen_period_ms == 0
            || self.endurance_regen_period_ms == 0
        {
            return Err(ConfigError::ZeroPeriod {
                field: "regen_period",
            });
        }
        if self.retry_delay_ms == 0 {
            return Err(ConfigError::ZeroPeriod {
                field: "retry_delay_ms",
            });
        }

        for (field, value) in [
            ("chance_floor", self.chance_floor),
            ("chance_ceiling", self.chance_ceiling),
            ("pvp_evade_cap", self.pvp_evade_cap),
            ("pvp_parry_cap", self.pvp_parry_cap),
            ("pvp_block_cap", self.pvp_block_cap),
            ("blade_barrier_chance", self.blade_barrier_chance),
            ("engage_block_floor", self.engage_block_floor),
            ("max_fumble_chance", self.max_fumble_chance),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::ProbabilityOutOfRange { field, value });
            }
        }

        if self.chance_floor > self.chance_ceiling {
            return Err(ConfigError::InvertedBounds {
                low: "chance_floor",
                high: "chance_ceiling",
            });
        }

        Ok(())
    }
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self::new()
    }
}
