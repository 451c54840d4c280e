//! Combat rules for living entities.
//!
//! `combat-core` decides whether a swing lands, how much it hurts, who gets
//! the credit and when the next swing or regeneration tick is due. It owns
//! no clock, thread or lock: every operation is a function over
//! [`Living`] values plus a [`CombatEnv`] of collaborator traits, so the
//! runtime can schedule and serialize them however it likes.
pub mod combat;
pub mod config;
pub mod env;
pub mod error;
pub mod regen;
pub mod schedule;
pub mod state;
pub mod stats;

pub use combat::{
    AppliedAttack, AttackRecord, AttackResult, AttackType, DeathReport, StyleInfo, SwingRequest,
    after_swing, attack_speed, die, notify_swing, on_attacked_by_enemy, resolve_swing,
    start_interrupt,
};
pub use config::CombatConfig;
pub use env::{
    CombatEnv, GroupOracle, PresentationSink, RngOracle, RuleOracle, SequenceRng, SpatialOracle,
    SpellOracle, StdRngOracle, StyleOracle,
};
pub use error::{CombatError, ConfigError, ErrorSeverity, LivingError};
pub use regen::{needs_regen, regen_tick};
pub use schedule::{AttackScheduler, TickDecision, attack_tick, start_attack};
pub use state::{
    ChangeReason, EntityId, GameTime, Living, LivingFlags, LivingKind, Participants, Position,
    Realm, ResourceKind, ResourceMeter,
};
pub use stats::{Ability, Property, PropertyOracle, PropertyRegistry};
