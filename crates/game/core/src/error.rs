//! Common error infrastructure for combat-core.
//!
//! Combat resolution itself never fails: an aborted swing is reported through
//! [`AttackResult`](crate::combat::AttackResult) rather than an error. The
//! errors here cover setup problems (configuration, templates) that callers
//! must reject before the simulation starts.

use crate::state::EntityId;

/// Severity level of an error, used for categorization and recovery strategies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Temporary condition; retrying later may succeed.
    ///
    /// Examples: entity despawned between lookup and use
    Recoverable,

    /// Invalid input that should not be retried unchanged.
    ///
    /// Examples: probability outside `[0, 1]`, zero timer period
    Validation,

    /// Unexpected state inconsistency. Indicates a bug.
    Internal,
}

impl ErrorSeverity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
        }
    }

    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }
}

/// Common trait for all combat errors.
///
/// Mirrors the classification every crate in the workspace uses so that the
/// runtime can decide whether to log, retry or surface a failure.
pub trait CombatError: core::fmt::Display + core::fmt::Debug {
    fn severity(&self) -> ErrorSeverity;

    /// The entity the failure concerns, if any.
    fn entity(&self) -> Option<EntityId> {
        None
    }

    /// Static identifier for this error variant.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}

/// Rejected [`CombatConfig`](crate::config::CombatConfig) values.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("{field} must be a probability in [0, 1], got {value}")]
    ProbabilityOutOfRange { field: &'static str, value: f64 },

    #[error("{field} must be non-zero")]
    ZeroPeriod { field: &'static str },

    #[error("{low} must not exceed {high}")]
    InvertedBounds {
        low: &'static str,
        high: &'static str,
    },
}

impl CombatError for ConfigError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::ProbabilityOutOfRange { .. } => "CONFIG_PROBABILITY_OUT_OF_RANGE",
            Self::ZeroPeriod { .. } => "CONFIG_ZERO_PERIOD",
            Self::InvertedBounds { .. } => "CONFIG_INVERTED_BOUNDS",
        }
    }
}

/// Rejected living definitions.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum LivingError {
    #[error("living {id} has zero maximum health")]
    ZeroMaxHealth { id: EntityId },

    #[error("living {id} has level 0")]
    ZeroLevel { id: EntityId },

    #[error("pet {id} cannot be its own owner")]
    SelfOwned { id: EntityId },
}

impl CombatError for LivingError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn entity(&self) -> Option<EntityId> {
        match self {
            Self::ZeroMaxHealth { id } | Self::ZeroLevel { id } | Self::SelfOwned { id } => {
                Some(*id)
            }
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::ZeroMaxHealth { .. } => "LIVING_ZERO_MAX_HEALTH",
            Self::ZeroLevel { .. } => "LIVING_ZERO_LEVEL",
            Self::SelfOwned { .. } => "LIVING_SELF_OWNED",
        }
    }
}
