//! Unified error types surfaced by the runtime API.
//!
//! Combat outcomes are never errors; these cover lookups, spawning and
//! worker coordination.
use thiserror::Error;

use combat_core::{ConfigError, EntityId, LivingError};

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("entity {0} is not registered")]
    UnknownEntity(EntityId),

    #[error("entity {0} is already registered")]
    DuplicateEntity(EntityId),

    #[error("runtime is shutting down")]
    ShuttingDown,

    #[error("timer worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),

    #[error(transparent)]
    InvalidLiving(#[from] LivingError),

    #[error(transparent)]
    InvalidConfig(#[from] ConfigError),
}
