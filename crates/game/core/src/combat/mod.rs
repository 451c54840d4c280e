//! Combat resolution.
//!
//! One swing flows through these modules in order:
//!
//! 1. [`validate_swing`]: cheap preconditions, reported as a non-damaging
//!    [`AttackResult`].
//! 2. [`run_defense_chain`]: every countermeasure of the defender and its
//!    protectors, first success wins.
//! 3. [`roll_damage`] / [`roll_critical`] on a hit.
//! 4. [`on_attacked_by_enemy`] on the defender and [`after_swing`] on the
//!    attacker, each under that living's own lock.
//! 5. [`notify_swing`] from snapshots, once every lock is released.
//!
//! Everything here is a plain function over [`Living`](crate::state::Living)
//! values and a [`CombatEnv`](crate::env::CombatEnv). Timing, locking and
//! lookups belong to the caller.

mod apply;
mod conlevel;
mod damage;
mod death;
pub mod defense;
mod interrupt;
mod notify;
mod properties;
mod record;
mod resolver;
mod speed;
mod validation;

pub use apply::{
    AppliedAttack, after_swing, credit_recipients, on_attacked_by_enemy, propagate_to_owner,
};
pub use conlevel::con_level;
pub use damage::{DamageRoll, attack_damage, roll_critical, roll_damage, spread_lower_bound};
pub use death::{CreditShare, DeathReport, die};
pub use defense::{SwingFacts, run_defense_chain};
pub use interrupt::{InterruptOutcome, ranged_interrupt_chance, start_interrupt};
pub use notify::{attacker_message, defender_message, notify_swing};
pub use properties::register_properties;
pub use record::{AttackRecord, AttackResult, AttackType, StyleInfo, SwingRequest};
pub use resolver::{is_pvp, resolve_swing, wants_off_hand_swing};
pub use speed::{attack_speed, ranged_travel_delay};
pub use validation::{validate_swing, weapon_range};
