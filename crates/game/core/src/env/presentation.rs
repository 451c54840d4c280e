use strum::Display;

use crate::combat::AttackResult;
use crate::state::{EntityId, SpellId};

/// Swing animation sent to every observer in range.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatAnimation {
    pub attacker: EntityId,
    pub defender: Option<EntityId>,
    pub style_animation: u16,
    pub result: AttackResult,
    pub result_code: u8,
    pub defender_health_percent: u8,
    pub off_hand: bool,
}

/// Chat channel a combat message is classified into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MessageChannel {
    YouHit,
    YouWereHit,
    Missed,
    Defended,
    Damaged,
    Pet,
    System,
}

/// Fire-and-forget display output. Never awaited.
pub trait PresentationSink: Send + Sync {
    fn send_combat_animation(&self, observer: EntityId, animation: &CombatAnimation);

    fn send_message(&self, recipient: EntityId, channel: MessageChannel, text: &str);

    fn send_change_target(&self, observer: EntityId, living: EntityId, target: Option<EntityId>);
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NullPresentation;

impl PresentationSink for NullPresentation {
    fn send_combat_animation(&self, _: EntityId, _: &CombatAnimation) {}

    fn send_message(&self, _: EntityId, _: MessageChannel, _: &str) {}

    fn send_change_target(&self, _: EntityId, _: EntityId, _: Option<EntityId>) {}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ProcSource {
    Weapon,
    Shield,
    Style,
    Poison,
}

/// A proc spell that must be cast once the swing has fully resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProcTrigger {
    pub caster: EntityId,
    pub target: EntityId,
    pub spell: SpellId,
    pub source: ProcSource,
}

/// Spell collaborator: casts procs and interrupts casting.
pub trait SpellOracle: Send + Sync {
    fn cast_proc(&self, trigger: &ProcTrigger);

    fn interrupt_cast(&self, caster: EntityId, source: EntityId);
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NoSpells;

impl SpellOracle for NoSpells {
    fn cast_proc(&self, _: &ProcTrigger) {}

    fn interrupt_cast(&self, _: EntityId, _: EntityId) {}
}
