use crate::combat::AttackResult;
use crate::state::{EntityId, GameTime};

/// Summary of the last swing a living made.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LastAttack {
    pub target: EntityId,
    pub result: AttackResult,
    pub at: GameTime,
    /// Defense bonus of the style that landed, 0 for unstyled swings.
    pub style_defense_bonus: i32,
}

/// Short-lived combat bookkeeping.
///
/// Timestamps are split by context so PvP and PvE combat windows can be
/// reasoned about separately.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TempProperties {
    pub last_attack: Option<LastAttack>,
    pub last_attack_pve: Option<GameTime>,
    pub last_attack_pvp: Option<GameTime>,
    pub last_attacked_pve: Option<GameTime>,
    pub last_attacked_pvp: Option<GameTime>,
    /// Casting and drawn shots are disrupted until this time.
    pub interrupted_until: GameTime,
}

impl TempProperties {
    pub fn mark_attacking(&mut self, now: GameTime, pvp: bool) {
        if pvp {
            self.last_attack_pvp = Some(now);
        } else {
            self.last_attack_pve = Some(now);
        }
    }

    pub fn mark_attacked(&mut self, now: GameTime, pvp: bool) {
        if pvp {
            self.last_attacked_pvp = Some(now);
        } else {
            self.last_attacked_pve = Some(now);
        }
    }

    /// Latest attack given or taken, in any context.
    pub fn last_combat_activity(&self) -> Option<GameTime> {
        [
            self.last_attack_pve,
            self.last_attack_pvp,
            self.last_attacked_pve,
            self.last_attacked_pvp,
        ]
        .into_iter()
        .flatten()
        .max()
    }

    pub fn in_combat(&self, now: GameTime, window_ms: u64) -> bool {
        self.last_combat_activity()
            .is_some_and(|at| now.since(at) < window_ms)
    }

    pub fn is_interrupted(&self, now: GameTime) -> bool {
        self.interrupted_until > now
    }

    /// Defense bonus of the style this living last landed, if any.
    pub fn prior_style_defense_bonus(&self) -> i32 {
        match self.last_attack {
            Some(last) if last.result == AttackResult::HitStyle => last.style_defense_bonus,
            _ => 0,
        }
    }

    pub fn clear_last_attack(&mut self) -> Option<LastAttack> {
        self.last_attack.take()
    }
}
