//! Execution context provided to hooks during evaluation.

use combat_core::combat::AppliedAttack;
use combat_core::{AttackRecord, Living};

/// Read-only view of one resolved swing.
///
/// The livings are snapshots taken right after their half of the swing was
/// applied, so hooks never touch a locked entity.
pub struct HookContext<'a> {
    pub record: &'a AttackRecord,
    pub applied: &'a AppliedAttack,
    pub attacker: &'a Living,
    /// The living that actually took the swing, after any redirect.
    pub defender: Option<&'a Living>,
}
