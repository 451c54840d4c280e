//! Post-swing hook system.
//!
//! Hooks inspect a fully resolved swing and ask for follow-up work: killing
//! a defender that reached zero health, making an idle creature fight back.
//! They never mutate state themselves; they return [`HookCommand`]s that
//! the swing pipeline executes once every entity lock is released.
//!
//! # Execution Order
//!
//! Hooks run sorted by priority (lower first). A failing command is handled
//! by its hook's [`HookCriticality`]; no failure ever stops the simulation.

mod aggro;
mod context;
mod death;
mod registry;

pub use aggro::AggroHook;
pub use context::HookContext;
pub use death::DeathCheckHook;
pub use registry::HookRegistry;

use combat_core::EntityId;

/// Defines the criticality level of a hook for error handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookCriticality {
    /// Failure is logged as an error and skips the remaining hooks of this
    /// swing.
    Critical,

    /// Failure is logged as an error; remaining hooks still run.
    Important,

    /// Failure is expected now and then and logged at debug level.
    Optional,
}

/// Follow-up work requested by a hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookCommand {
    Kill {
        victim: EntityId,
        killer: Option<EntityId>,
    },
    StartAttack {
        attacker: EntityId,
        target: EntityId,
    },
}

/// Hook evaluated after every resolved swing.
pub trait PostSwingHook: Send + Sync {
    /// Returns a human-readable name for this hook (used in logging).
    fn name(&self) -> &'static str;

    /// Lower values execute first.
    fn priority(&self) -> i32 {
        0
    }

    fn criticality(&self) -> HookCriticality {
        HookCriticality::Important
    }

    fn should_trigger(&self, ctx: &HookContext<'_>) -> bool;

    /// Commands to run if this hook triggers. Empty means nothing to do.
    fn create_commands(&self, ctx: &HookContext<'_>) -> Vec<HookCommand>;
}
