//! Timer tasks and the swing pipeline.
//!
//! Every living owns an attack timer and three regeneration timers, each a
//! task on the shared tokio pool. Timers carry the generation they were armed
//! with and exit quietly once it is stale, so stopping is a counter bump and
//! never waits on a task.
//!
//! Locking rule: a task holds at most one entity cell at a time. Anything
//! that needs a second living works from a snapshot taken under a separate
//! lock.

mod lifecycle;
mod swing;
mod timers;

pub(crate) use lifecycle::{change_resource, kill, remove, set_attacker};
pub use swing::SwingOutcome;
pub(crate) use swing::{apply_record, execute_swing, gather_participants, resolve_only};
pub(crate) use timers::{ensure_all_regen, shot_spoiled, start_attack, stop_attack};
