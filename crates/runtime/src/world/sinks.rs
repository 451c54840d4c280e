//! Collaborator implementations backed by the event bus.

use combat_core::EntityId;
use combat_core::env::{CombatAnimation, MessageChannel, PresentationSink};

use crate::events::{CombatEvent, EventBus};

/// Presentation sink that republishes every notification on the combat
/// topic. Network delivery is up to whoever subscribes.
#[derive(Clone)]
pub struct BusPresentation {
    bus: EventBus,
}

impl BusPresentation {
    pub fn new(bus: EventBus) -> Self {
        Self { bus }
    }
}

impl PresentationSink for BusPresentation {
    fn send_combat_animation(&self, observer: EntityId, animation: &CombatAnimation) {
        self.bus.publish(CombatEvent::Animation {
            observer,
            animation: animation.clone(),
        });
    }

    fn send_message(&self, recipient: EntityId, channel: MessageChannel, text: &str) {
        self.bus.publish(CombatEvent::Message {
            recipient,
            channel,
            text: text.to_owned(),
        });
    }

    fn send_change_target(&self, observer: EntityId, living: EntityId, target: Option<EntityId>) {
        self.bus.publish(CombatEvent::ChangeTarget {
            observer,
            living,
            target,
        });
    }
}
