//! Runtime orchestration for the combat engine.
//!
//! This crate gives every living its own timers on the shared tokio pool and
//! serializes all mutation of one living behind that living's lock, so
//! attackers hitting the same defender queue up while unrelated fights run in
//! parallel. Consumers embed [`Runtime`], drive it through [`CombatHandle`]
//! and watch what happens on the [`EventBus`].
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the orchestrator and builder
//! - [`api`] exposes the types downstream clients interact with
//! - [`events`] provides topic-based event bus for flexible event routing
//! - [`hooks`] provides post-swing hooks (death check, aggro)
//! - `world` and `workers` keep the registry and timer tasks internal
pub mod api;
pub mod events;
pub mod hooks;
pub mod runtime;

mod workers;
mod world;

pub use api::{CombatHandle, Result, RuntimeError};
pub use events::{CombatEvent, Event, EventBus, LifecycleEvent, ResourceEvent, Topic};
pub use hooks::{
    AggroHook, DeathCheckHook, HookCommand, HookContext, HookCriticality, HookRegistry,
    PostSwingHook,
};
pub use runtime::{Runtime, RuntimeBuilder, RuntimeConfig};
pub use workers::SwingOutcome;
