//! Attack scheduler state machine.
//!
//! Pure transition logic: the runtime owns the timer, feeds each tick's
//! inputs in and arms the next timer from the returned decision. Every
//! (re)start and stop bumps a generation counter so a timer armed for an
//! earlier run can recognize itself as stale.

use strum::Display;
use tracing::debug;

use crate::combat::ranged_travel_delay;
use crate::state::{EntityId, GameTime, RangedPolicy};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AttackPhase {
    #[default]
    Idle,
    /// Winding up a swing or aiming a shot.
    Preparing,
    /// Shot drawn and held.
    Holding,
    /// Projectile in flight.
    Dispatched,
    /// Waiting out the interval after a swing.
    Reloading,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StopReason {
    /// Stopped explicitly, or the scheduler was already idle.
    Stopped,
    /// Target gone, dead or inactive.
    TargetInvalid,
    /// Ranged policy told the shooter to stand down.
    PolicyStop,
}

/// Inputs sampled when the attack timer fires.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TickInput {
    pub now: GameTime,
    /// Stunned, mesmerized or casting something uninterruptible.
    pub busy: bool,
    /// Focused on an engage bond instead of attacking.
    pub engaging: bool,
    pub ranged: bool,
    pub rapid_fire: bool,
    pub policy: RangedPolicy,
    pub target_valid: bool,
    pub target_distance: Option<f64>,
    /// Current attack speed in milliseconds.
    pub attack_speed: u32,
    pub retry_delay: u32,
}

/// What the runtime should do after a tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickDecision {
    /// Nothing happens now, fire again after `delay` ms.
    Wait { delay: u64 },
    /// Swing at `target`; the weapon connects after `connect_delay` ms and
    /// the next tick is due after `next` ms.
    Dispatch {
        target: EntityId,
        connect_delay: u64,
        next: u64,
    },
    /// A fumble costs this tick.
    Skip { next: u64 },
    /// The timer must not be rearmed.
    Stop { reason: StopReason },
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttackScheduler {
    phase: AttackPhase,
    target: Option<EntityId>,
    last_swing_at: Option<GameTime>,
    interval: u32,
    skip_next: bool,
    generation: u64,
}

impl AttackScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> AttackPhase {
        self.phase
    }

    pub fn target(&self) -> Option<EntityId> {
        self.target
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_running(&self) -> bool {
        self.phase != AttackPhase::Idle
    }

    /// Drawing, aiming or holding a shot that has not left yet.
    pub fn is_aiming(&self) -> bool {
        matches!(self.phase, AttackPhase::Preparing | AttackPhase::Holding)
    }

    /// Arms the scheduler and returns the delay before the first tick.
    ///
    /// Returns `None` when it was already running: the target is switched
    /// and the existing timer keeps its cadence.
    pub fn start(
        &mut self,
        target: EntityId,
        now: GameTime,
        attack_speed: u32,
        ranged: bool,
        min_first_delay: u32,
    ) -> Option<u64> {
        if self.is_running() {
            if self.target != Some(target) {
                debug!(target: "combat::schedule", defender = ?target, "attack retargeted");
                self.target = Some(target);
            }
            return None;
        }

        let remaining = self
            .last_swing_at
            .map_or(0, |at| u64::from(self.interval).saturating_sub(now.since(at)));
        let delay = if ranged {
            u64::from(attack_speed)
        } else {
            remaining.max(u64::from(min_first_delay))
        };

        self.generation += 1;
        self.phase = AttackPhase::Preparing;
        self.target = Some(target);
        self.interval = attack_speed;
        self.skip_next = false;
        debug!(target: "combat::schedule", defender = ?target, delay, generation = self.generation, "attack started");
        Some(delay)
    }

    /// Advances the machine by one timer tick.
    pub fn tick(&mut self, input: &TickInput) -> TickDecision {
        if self.phase == AttackPhase::Idle {
            return TickDecision::Stop {
                reason: StopReason::Stopped,
            };
        }
        // incapacitated or casting: retry shortly even if the target is gone
        if input.busy {
            return TickDecision::Wait {
                delay: u64::from(input.retry_delay),
            };
        }
        let Some(target) = self.target.filter(|_| input.target_valid) else {
            self.stop();
            return TickDecision::Stop {
                reason: StopReason::TargetInvalid,
            };
        };

        if input.engaging {
            return TickDecision::Wait {
                delay: u64::from(input.attack_speed),
            };
        }

        if input.ranged {
            match input.policy {
                RangedPolicy::Stop => {
                    self.stop();
                    return TickDecision::Stop {
                        reason: StopReason::PolicyStop,
                    };
                }
                RangedPolicy::Hold => {
                    self.phase = AttackPhase::Holding;
                    return TickDecision::Wait {
                        delay: u64::from(input.retry_delay),
                    };
                }
                RangedPolicy::Fire => {}
            }
        }

        if self.skip_next {
            self.skip_next = false;
            self.phase = AttackPhase::Reloading;
            self.interval = input.attack_speed;
            return TickDecision::Skip {
                next: u64::from(input.attack_speed),
            };
        }

        let interval = if input.ranged && input.rapid_fire {
            input.attack_speed / 2
        } else {
            input.attack_speed
        };
        let connect_delay = if input.ranged {
            ranged_travel_delay(input.target_distance.unwrap_or(0.0))
        } else {
            0
        };

        self.interval = interval;
        self.last_swing_at = Some(input.now);
        self.phase = if input.ranged {
            AttackPhase::Dispatched
        } else {
            AttackPhase::Reloading
        };

        TickDecision::Dispatch {
            target,
            connect_delay,
            next: u64::from(interval),
        }
    }

    /// Shot landed; the shooter starts drawing the next one.
    pub fn on_connect(&mut self) {
        if self.phase == AttackPhase::Dispatched {
            self.phase = AttackPhase::Preparing;
        }
    }

    /// Called when the next tick is armed after a melee swing.
    pub fn on_rearm(&mut self) {
        if self.phase == AttackPhase::Reloading {
            self.phase = AttackPhase::Preparing;
        }
    }

    /// A fumble makes the next tick a no-op.
    pub fn note_fumble(&mut self) {
        if self.is_running() {
            self.skip_next = true;
        }
    }

    /// Stops the scheduler and returns the target it was attacking.
    ///
    /// Stopping an idle scheduler changes nothing.
    pub fn stop(&mut self) -> Option<EntityId> {
        if self.phase == AttackPhase::Idle {
            return None;
        }
        self.phase = AttackPhase::Idle;
        self.skip_next = false;
        self.generation += 1;
        let target = self.target.take();
        debug!(target: "combat::schedule", defender = ?target, generation = self.generation, "attack stopped");
        target
    }
}
