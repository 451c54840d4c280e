//! Hook that kills livings whose health reached zero.

use combat_core::LivingFlags;

use super::{HookCommand, HookContext, HookCriticality, PostSwingHook};

/// Turns a killing blow into a death.
///
/// Damage application only clamps health at zero; this hook runs the death
/// sequence so timers stop and reward logic gets its report.
#[derive(Debug, Clone, Copy)]
pub struct DeathCheckHook;

impl PostSwingHook for DeathCheckHook {
    fn name(&self) -> &'static str {
        "death_check"
    }

    fn priority(&self) -> i32 {
        -50
    }

    fn criticality(&self) -> HookCriticality {
        // A living stuck at zero health would keep its timers.
        HookCriticality::Critical
    }

    fn should_trigger(&self, ctx: &HookContext<'_>) -> bool {
        ctx.applied.killed
            && ctx
                .defender
                .is_some_and(|defender| !defender.flags.contains(LivingFlags::DEAD))
    }

    fn create_commands(&self, ctx: &HookContext<'_>) -> Vec<HookCommand> {
        ctx.defender
            .map(|defender| HookCommand::Kill {
                victim: defender.id,
                killer: Some(ctx.record.attacker),
            })
            .into_iter()
            .collect()
    }
}
