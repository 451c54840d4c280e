//! Hook that makes idle creatures fight back.

use super::{HookCommand, HookContext, HookCriticality, PostSwingHook};

/// An NPC or pet that is engaged while not attacking anyone turns on its
/// attacker. Players choose their own targets.
#[derive(Debug, Clone, Copy)]
pub struct AggroHook;

impl PostSwingHook for AggroHook {
    fn name(&self) -> &'static str {
        "aggro"
    }

    fn priority(&self) -> i32 {
        10
    }

    fn criticality(&self) -> HookCriticality {
        HookCriticality::Optional
    }

    fn should_trigger(&self, ctx: &HookContext<'_>) -> bool {
        let Some(defender) = ctx.defender else {
            return false;
        };
        ctx.record.result.is_engagement()
            && defender.id != ctx.record.attacker
            && !defender.is_player()
            && defender.is_alive()
            && !defender.attack.is_running()
    }

    fn create_commands(&self, ctx: &HookContext<'_>) -> Vec<HookCommand> {
        ctx.defender
            .map(|defender| HookCommand::StartAttack {
                attacker: defender.id,
                target: ctx.record.attacker,
            })
            .into_iter()
            .collect()
    }
}
