use crate::combat::{AttackRecord, AttackResult};
use crate::state::{Living, Weapon};

/// Style engine: decides whether the requested style executes.
///
/// Called only when the defense chain produced an unstyled hit and a style
/// was requested. On success the engine upgrades the result to
/// [`AttackResult::HitStyle`] and may append proc spells.
pub trait StyleOracle: Send + Sync {
    fn try_execute_style(
        &self,
        attacker: &Living,
        record: &mut AttackRecord,
        weapon: Option<&Weapon>,
    ) -> bool;
}

/// Never executes a style.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoStyles;

impl StyleOracle for NoStyles {
    fn try_execute_style(&self, _: &Living, _: &mut AttackRecord, _: Option<&Weapon>) -> bool {
        false
    }
}

/// Executes any requested style that a weapon can perform.
///
/// Adds the style's flat bonus damage and its proc list. Stealth openers
/// require the attacker to be stealthed when the swing started, which the
/// caller enforces when building the request.
#[derive(Clone, Copy, Debug, Default)]
pub struct FlatStyles;

impl StyleOracle for FlatStyles {
    fn try_execute_style(
        &self,
        _attacker: &Living,
        record: &mut AttackRecord,
        weapon: Option<&Weapon>,
    ) -> bool {
        let Some(style) = record.style.as_ref() else {
            return false;
        };
        if weapon.is_none() {
            return false;
        }
        record.style_damage = style.bonus_damage.max(0);
        record.animation_id = style.animation;
        record.style_procs.extend(style.procs.iter().copied());
        record.result = AttackResult::HitStyle;
        true
    }
}
