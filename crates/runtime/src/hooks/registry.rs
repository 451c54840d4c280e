//! Hook registry for managing and evaluating post-swing hooks.

use std::ops::ControlFlow;
use std::sync::Arc;

use tracing::{debug, error};

use super::{AggroHook, DeathCheckHook, HookCommand, HookContext, HookCriticality, PostSwingHook};
use crate::api::RuntimeError;

/// Registry that holds post-swing hooks in priority order.
#[derive(Clone)]
pub struct HookRegistry {
    hooks: Arc<[Arc<dyn PostSwingHook>]>,
}

impl HookRegistry {
    /// Creates a registry. Hooks are sorted by priority (lower values first).
    pub fn new(mut hooks: Vec<Arc<dyn PostSwingHook>>) -> Self {
        hooks.sort_by_key(|h| h.priority());
        Self {
            hooks: hooks.into(),
        }
    }

    /// Creates a registry with the default set of hooks.
    ///
    /// Default hooks include:
    /// - DeathCheckHook: runs the death sequence on a killing blow
    /// - AggroHook: makes an idle creature attack back
    pub fn default_hooks() -> Self {
        Self::new(vec![
            Arc::new(DeathCheckHook) as Arc<dyn PostSwingHook>,
            Arc::new(AggroHook) as Arc<dyn PostSwingHook>,
        ])
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Evaluates every hook against `ctx` and returns the commands of those
    /// that triggered, in execution order.
    pub fn plan(&self, ctx: &HookContext<'_>) -> Vec<(Arc<dyn PostSwingHook>, Vec<HookCommand>)> {
        self.hooks
            .iter()
            .filter(|hook| hook.should_trigger(ctx))
            .map(|hook| (Arc::clone(hook), hook.create_commands(ctx)))
            .filter(|(_, commands)| !commands.is_empty())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Returns an iterator over hook names and priorities (for debugging).
    pub fn hooks(&self) -> impl Iterator<Item = (&'static str, i32)> + '_ {
        self.hooks.iter().map(|h| (h.name(), h.priority()))
    }

    /// Logs a failed command according to the hook's criticality.
    ///
    /// Returns `Break` when the remaining hooks of this swing must be
    /// skipped.
    pub fn handle_hook_error(hook: &dyn PostSwingHook, error: &RuntimeError) -> ControlFlow<()> {
        match hook.criticality() {
            HookCriticality::Critical => {
                error!(
                    target: "runtime::hooks",
                    hook = hook.name(),
                    criticality = "critical",
                    error = %error,
                    "Critical hook failed, skipping remaining hooks"
                );
                ControlFlow::Break(())
            }
            HookCriticality::Important => {
                error!(
                    target: "runtime::hooks",
                    hook = hook.name(),
                    criticality = "important",
                    error = %error,
                    "Hook failed, continuing"
                );
                ControlFlow::Continue(())
            }
            HookCriticality::Optional => {
                debug!(
                    target: "runtime::hooks",
                    hook = hook.name(),
                    criticality = "optional",
                    error = %error,
                    "Optional hook failed"
                );
                ControlFlow::Continue(())
            }
        }
    }
}

impl Default for HookRegistry {
    fn default() -> Self {
        Self::default_hooks()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use combat_core::combat::AppliedAttack;
    use combat_core::{AttackRecord, AttackResult, EntityId, GameTime, Living, LivingKind, Realm, SwingRequest};

    fn swing(result: AttackResult, killed: bool) -> (AttackRecord, AppliedAttack, Living, Living) {
        let attacker = Living::new(EntityId(1), "hero", LivingKind::Player { realm: Realm::Albion }, 10);
        let defender = Living::new(EntityId(2), "rat", LivingKind::Npc { realm: Realm::None }, 3);
        let request = SwingRequest::primary(&attacker, 0, GameTime(0));
        let mut record = AttackRecord::new(&attacker, Some(defender.id), &request);
        record.result = result;
        let applied = AppliedAttack {
            killed,
            ..AppliedAttack::default()
        };
        (record, applied, attacker, defender)
    }

    #[test]
    fn default_hooks_are_sorted() {
        let registry = HookRegistry::default();
        let names: Vec<_> = registry.hooks().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["death_check", "aggro"]);
    }

    #[test]
    fn killing_blow_plans_a_death() {
        let (record, applied, attacker, mut defender) = swing(AttackResult::HitUnstyled, true);
        defender.health.current = 0;
        let ctx = HookContext {
            record: &record,
            applied: &applied,
            attacker: &attacker,
            defender: Some(&defender),
        };

        let plan = HookRegistry::default().plan(&ctx);
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].0.name(), "death_check");
        assert_eq!(
            plan[0].1,
            vec![HookCommand::Kill {
                victim: EntityId(2),
                killer: Some(EntityId(1)),
            }]
        );
    }

    #[test]
    fn idle_npc_fights_back_but_not_after_a_rejected_swing() {
        let (record, applied, attacker, defender) = swing(AttackResult::Parried, false);
        let ctx = HookContext {
            record: &record,
            applied: &applied,
            attacker: &attacker,
            defender: Some(&defender),
        };
        assert_eq!(
            HookRegistry::default().plan(&ctx)[0].1,
            vec![HookCommand::StartAttack {
                attacker: EntityId(2),
                target: EntityId(1),
            }]
        );

        let (record, applied, attacker, defender) = swing(AttackResult::OutOfRange, false);
        let ctx = HookContext {
            record: &record,
            applied: &applied,
            attacker: &attacker,
            defender: Some(&defender),
        };
        assert!(HookRegistry::default().plan(&ctx).is_empty());
    }
}
