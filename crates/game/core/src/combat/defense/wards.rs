//! One-shot wards. Each is removed the moment its step is reached.

use crate::combat::AttackResult;
use crate::combat::defense::{SwingFacts, roll};
use crate::env::CombatEnv;
use crate::state::{Effect, EffectKind, Living, RangedAttackType};
use crate::stats::Ability;

/// Phaseshift, grapple and brittle guard, in that order.
pub fn consume_blocking_ward(defender: &mut Living) -> Option<AttackResult> {
    const WARDS: [(EffectKind, AttackResult); 3] = [
        (EffectKind::Phaseshift, AttackResult::Missed),
        (EffectKind::Grapple, AttackResult::Grappled),
        (EffectKind::BrittleGuard, AttackResult::Missed),
    ];
    WARDS
        .into_iter()
        .find_map(|(kind, result)| defender.effects.consume(kind).map(|_| result))
}

/// Consumes a bladeturn ward and returns true if it stopped the swing.
///
/// Stealth openers, long shots and penetrating arrows (against a ward cast by
/// someone else) always get through. A melee swing penetrates with
/// probability `attacker level / caster level`.
pub fn bladeturn_stops(
    env: &CombatEnv<'_>,
    attacker: &Living,
    defender: &mut Living,
    facts: &SwingFacts,
) -> bool {
    let Some(Effect::Bladeturn {
        caster,
        caster_level,
    }) = defender.effects.consume(EffectKind::Bladeturn)
    else {
        return false;
    };

    let penetrated = if facts.stealth_style {
        true
    } else if facts.is_ranged() {
        attacker.ranged_type == RangedAttackType::Long
            || (attacker.has_ability(Ability::PenetratingArrow) && caster != defender.id)
    } else {
        let chance = f64::from(attacker.level) / f64::from(caster_level.max(1));
        roll(env, "bladeturn", chance)
    };
    !penetrated
}
