//! Death processing.

use tracing::{debug, info};

use crate::env::CombatEnv;
use crate::state::{EntityId, GameTime, Living, LivingFlags};

/// One source's share of the experience credit on a corpse.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CreditShare {
    pub source: EntityId,
    pub credit: f64,
    /// `credit` over the total of all shares, in `[0, 1]`.
    pub fraction: f64,
}

/// Snapshot handed to reward logic once a living has died.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeathReport {
    pub victim: EntityId,
    pub killer: Option<EntityId>,
    pub level: u8,
    /// Livings that were engaged with the victim; each must drop it from
    /// its own registry.
    pub attackers: Vec<EntityId>,
    pub credit: Vec<CreditShare>,
    /// Experience the ruleset assigns to the victim's level.
    pub experience: u64,
}

impl DeathReport {
    pub fn share_of(&self, source: EntityId) -> Option<&CreditShare> {
        self.credit.iter().find(|share| share.source == source)
    }
}

fn credit_shares(victim: &Living) -> Vec<CreditShare> {
    let total = victim.attackers.total_credit();
    victim
        .attackers
        .credit_snapshot()
        .into_iter()
        .map(|(source, credit)| CreditShare {
            source,
            credit,
            fraction: if total > 0.0 { credit / total } else { 0.0 },
        })
        .collect()
}

/// Kills `victim`. Returns `None` if its death was already processed.
///
/// Health drops to 0, the attack scheduler stops, both registries are
/// emptied and the rule policy is told. Regeneration timers live with the
/// caller, which cancels them on `Some`.
pub fn die(env: &CombatEnv<'_>, victim: &mut Living, killer: Option<EntityId>) -> Option<DeathReport> {
    if victim.flags.contains(LivingFlags::DEAD) {
        debug!(target: "combat::death", victim = %victim.id, "already dead");
        return None;
    }

    victim.health.current = 0;
    victim.attack.stop();
    victim.temp.clear_last_attack();
    victim.temp.interrupted_until = GameTime::ZERO;
    victim.casting = None;

    let report = DeathReport {
        victim: victim.id,
        killer,
        level: victim.level,
        attackers: victim.attackers.snapshot(),
        credit: credit_shares(victim),
        experience: env.rules.experience_for_level(victim.level),
    };
    victim.attackers.clear();
    victim.flags.insert(LivingFlags::DEAD);

    env.rules.on_living_killed(victim, killer);
    info!(
        target: "combat::death",
        victim = %victim.id,
        killer = ?killer,
        attackers = report.attackers.len(),
        "living died"
    );
    Some(report)
}
