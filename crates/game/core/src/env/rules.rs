use tracing::debug;

use crate::state::{EntityId, HasControllingOwner, Living, Realm};

/// Server rule policy: who may attack whom and what a kill is worth.
pub trait RuleOracle: Send + Sync {
    /// `quiet` suppresses any feedback the policy would send to the attacker.
    fn is_allowed_to_attack(&self, attacker: &Living, target: &Living, quiet: bool) -> bool;

    fn on_living_killed(&self, victim: &Living, killer: Option<EntityId>);

    fn experience_for_level(&self, level: u8) -> u64;
}

/// Realm-versus-realm rules.
///
/// Livings of the same realm never fight each other; realmless creatures
/// fight everyone. A pet and its owner never fight each other.
#[derive(Clone, Copy, Debug, Default)]
pub struct StandardRules;

impl RuleOracle for StandardRules {
    fn is_allowed_to_attack(&self, attacker: &Living, target: &Living, quiet: bool) -> bool {
        if attacker.id == target.id {
            return false;
        }
        if attacker.controlling_owner() == Some(target.id)
            || target.controlling_owner() == Some(attacker.id)
        {
            return false;
        }
        let allowed = match (attacker.realm(), target.realm()) {
            (Realm::None, _) | (_, Realm::None) => true,
            (a, b) => a != b,
        };
        if !allowed && !quiet {
            debug!(
                attacker = %attacker.id,
                target = %target.id,
                realm = %attacker.realm(),
                "attack refused: same realm"
            );
        }
        allowed
    }

    fn on_living_killed(&self, victim: &Living, killer: Option<EntityId>) {
        debug!(victim = %victim.id, killer = ?killer, "living killed");
    }

    /// `25 * level^3 + 100 * level`.
    fn experience_for_level(&self, level: u8) -> u64 {
        let level = u64::from(level);
        25 * level.pow(3) + 100 * level
    }
}
