//! Event types for different topics.

use serde::{Deserialize, Serialize};

use combat_core::combat::{AttackRecord, DeathReport};
use combat_core::env::{CombatAnimation, MessageChannel, ProcTrigger};
use combat_core::schedule::StopReason;
use combat_core::{ChangeReason, EntityId, GameTime, ResourceKind};

/// Events on the combat topic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum CombatEvent {
    /// A swing went through the whole pipeline.
    SwingResolved {
        record: Box<AttackRecord>,
        health_lost: i64,
        killed: bool,
    },

    ProcTriggered(ProcTrigger),

    Interrupted {
        living: EntityId,
        source: Option<EntityId>,
        until: GameTime,
        cast_interrupted: bool,
        shot_spoiled: bool,
    },

    // Presentation output, one event per recipient.
    Animation {
        observer: EntityId,
        animation: CombatAnimation,
    },
    Message {
        recipient: EntityId,
        channel: MessageChannel,
        text: String,
    },
    ChangeTarget {
        observer: EntityId,
        living: EntityId,
        target: Option<EntityId>,
    },
}

/// Events on the resources topic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ResourceEvent {
    Changed {
        living: EntityId,
        kind: ResourceKind,
        reason: ChangeReason,
        source: Option<EntityId>,
        /// Amount actually applied after clamping.
        delta: i64,
        current: u32,
        maximum: u32,
    },
    RegenStopped {
        living: EntityId,
        kind: ResourceKind,
    },
}

/// Events on the lifecycle topic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum LifecycleEvent {
    Spawned {
        living: EntityId,
        name: String,
    },
    Removed {
        living: EntityId,
    },
    AttackStarted {
        attacker: EntityId,
        target: EntityId,
    },
    AttackStopped {
        attacker: EntityId,
        reason: StopReason,
    },
    Died(Box<DeathReport>),
}
