//! Observer notification for a resolved swing.
//!
//! Runs after both locks are released, from snapshots. The animation goes to
//! every player-controlled observer near the attacker. Text goes to the two
//! sides, with a pet's lines redirected to its owner.

use crate::combat::{AppliedAttack, AttackRecord, AttackResult};
use crate::env::{CombatAnimation, CombatEnv, MessageChannel, SpatialKind};
use crate::state::{EntityId, HasControllingOwner, Living, LivingKind};

/// Who reads `living`'s combat text, and on which channel. A player's pet
/// speaks to its owner on the pet channel; NPCs have no reader.
fn reader(living: &Living, channel: MessageChannel) -> Option<(EntityId, MessageChannel)> {
    match living.kind {
        LivingKind::Player { .. } => Some((living.id, channel)),
        LivingKind::Pet {
            owner_is_player: true,
            ..
        } => living.controlling_owner().map(|owner| (owner, MessageChannel::Pet)),
        _ => None,
    }
}

/// Line shown to the attacker.
pub fn attacker_message(record: &AttackRecord, defender_name: &str) -> Option<(MessageChannel, String)> {
    let line = match record.result {
        AttackResult::HitUnstyled | AttackResult::HitStyle => {
            let mut text = format!(
                "You hit {defender_name} for {} damage!",
                record.damage
            );
            if record.modifier != 0 {
                text.push_str(&format!(" ({:+})", record.modifier));
            }
            if record.critical_damage > 0 {
                text.push_str(&format!(
                    " You critically hit for an additional {} damage!",
                    record.critical_damage
                ));
            }
            (MessageChannel::YouHit, text)
        }
        AttackResult::Missed => (MessageChannel::Missed, "You miss!".to_owned()),
        AttackResult::Fumbled => (MessageChannel::Missed, "You fumble the attack!".to_owned()),
        AttackResult::Evaded => (
            MessageChannel::Missed,
            format!("{defender_name} evades your attack!"),
        ),
        AttackResult::Parried => (
            MessageChannel::Missed,
            format!("{defender_name} parries your attack!"),
        ),
        AttackResult::Blocked => (
            MessageChannel::Missed,
            format!("{defender_name} blocks your attack!"),
        ),
        AttackResult::Bodyguarded => (
            MessageChannel::Missed,
            format!("{defender_name} is protected by a bodyguard!"),
        ),
        AttackResult::Grappled => (
            MessageChannel::Missed,
            format!("{defender_name} is grappling and cannot be hit!"),
        ),
        AttackResult::NoTarget => (
            MessageChannel::System,
            "You need a target to attack!".to_owned(),
        ),
        AttackResult::TargetNotVisible => (
            MessageChannel::System,
            format!("You can't see {defender_name}!"),
        ),
        AttackResult::OutOfRange => (
            MessageChannel::System,
            format!("{defender_name} is too far away to attack!"),
        ),
        AttackResult::TargetDead => (
            MessageChannel::System,
            format!("{defender_name} is already dead!"),
        ),
        AttackResult::Phaseshift => (
            MessageChannel::System,
            "You can't attack while out of phase!".to_owned(),
        ),
        AttackResult::NoValidTarget | AttackResult::NotAllowedServerRules => return None,
    };
    Some(line)
}

/// Line shown to the defender.
pub fn defender_message(record: &AttackRecord, attacker_name: &str) -> Option<(MessageChannel, String)> {
    let line = match record.result {
        AttackResult::HitUnstyled | AttackResult::HitStyle => {
            let mut text = format!(
                "{attacker_name} hits you for {} damage!",
                record.damage
            );
            if record.critical_damage > 0 {
                text.push_str(&format!(
                    " {attacker_name} critically hits you for an additional {} damage!",
                    record.critical_damage
                ));
            }
            (MessageChannel::YouWereHit, text)
        }
        AttackResult::Missed | AttackResult::Fumbled => (
            MessageChannel::Missed,
            format!("{attacker_name} attacks you and misses!"),
        ),
        AttackResult::Evaded => (
            MessageChannel::Defended,
            format!("You evade {attacker_name}'s attack!"),
        ),
        AttackResult::Parried => (
            MessageChannel::Defended,
            format!("You parry {attacker_name}'s attack!"),
        ),
        AttackResult::Blocked => (
            MessageChannel::Defended,
            format!("You block {attacker_name}'s attack!"),
        ),
        AttackResult::Grappled => (
            MessageChannel::Defended,
            format!("Your grapple turns away {attacker_name}'s attack!"),
        ),
        _ => return None,
    };
    Some(line)
}

/// Publishes the animation and text of one resolved swing.
///
/// `defender` is a snapshot of whoever the record names as target after any
/// redirection.
pub fn notify_swing(
    env: &CombatEnv<'_>,
    attacker: &Living,
    defender: Option<&Living>,
    record: &AttackRecord,
    applied: &AppliedAttack,
) {
    if record.result.is_invalid() {
        let name = defender.map_or("", |d| d.name.as_str());
        if let Some((channel, text)) = attacker_message(record, name)
            && let Some((recipient, channel)) = reader(attacker, channel)
        {
            env.presentation.send_message(recipient, channel, &text);
        }
        return;
    }

    let animation = CombatAnimation {
        attacker: attacker.id,
        defender: record.target,
        style_animation: record.animation_id,
        result: record.result,
        result_code: record.result.animation_code(),
        defender_health_percent: applied.health_percent,
        off_hand: record.off_hand,
    };
    let observers = env.spatial.entities_within_radius(
        &attacker.position,
        env.config.visibility_distance,
        SpatialKind::Players,
    );
    for observer in observers {
        env.presentation.send_combat_animation(observer, &animation);
    }

    let Some(defender) = defender else {
        return;
    };
    if let Some((channel, text)) = attacker_message(record, &defender.name)
        && let Some((recipient, channel)) = reader(attacker, channel)
    {
        env.presentation.send_message(recipient, channel, &text);
    }
    if let Some((channel, text)) = defender_message(record, &attacker.name)
        && let Some((recipient, channel)) = reader(defender, channel)
    {
        env.presentation.send_message(recipient, channel, &text);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::combat::SwingRequest;
    use crate::config::CombatConfig;
    use crate::env::{PresentationSink, SequenceRng, SpatialOracle};
    use crate::state::{GameTime, Position, Realm};
    use crate::stats::PropertyRegistry;

    #[derive(Default)]
    struct Recorder {
        animations: Mutex<Vec<(EntityId, AttackResult)>>,
        messages: Mutex<Vec<(EntityId, MessageChannel, String)>>,
    }

    impl PresentationSink for Recorder {
        fn send_combat_animation(&self, observer: EntityId, animation: &CombatAnimation) {
            self.animations
                .lock()
                .unwrap()
                .push((observer, animation.result));
        }

        fn send_message(&self, recipient: EntityId, channel: MessageChannel, text: &str) {
            self.messages
                .lock()
                .unwrap()
                .push((recipient, channel, text.to_owned()));
        }

        fn send_change_target(&self, _: EntityId, _: EntityId, _: Option<EntityId>) {}
    }

    struct Crowd(Vec<EntityId>);

    impl SpatialOracle for Crowd {
        fn entities_within_radius(&self, _: &Position, _: u32, _: SpatialKind) -> Vec<EntityId> {
            self.0.clone()
        }
    }

    fn living(id: u32, name: &str, kind: LivingKind) -> Living {
        Living::new(EntityId(id), name, kind, 10)
    }

    fn record(attacker: &Living, result: AttackResult) -> AttackRecord {
        let mut record = AttackRecord::new(
            attacker,
            Some(EntityId(2)),
            &SwingRequest::primary(attacker, 0, GameTime(0)),
        );
        record.result = result;
        record.damage = 12;
        record
    }

    #[test]
    fn hit_reaches_observers_and_both_sides() {
        let config = CombatConfig::default();
        let registry = PropertyRegistry::standard();
        let rng = SequenceRng::constant(0.5);
        let recorder = Recorder::default();
        let crowd = Crowd(vec![EntityId(1), EntityId(2), EntityId(9)]);
        let env = CombatEnv::new(&config, &registry, &rng)
            .with_presentation(&recorder)
            .with_spatial(&crowd);

        let attacker = living(1, "Aelfric", LivingKind::Player { realm: Realm::Albion });
        let defender = living(2, "Bjorn", LivingKind::Player { realm: Realm::Midgard });
        let record = record(&attacker, AttackResult::HitUnstyled);

        notify_swing(&env, &attacker, Some(&defender), &record, &AppliedAttack::default());

        assert_eq!(recorder.animations.lock().unwrap().len(), 3);
        let messages = recorder.messages.lock().unwrap();
        assert_eq!(
            messages[0],
            (
                EntityId(1),
                MessageChannel::YouHit,
                "You hit Bjorn for 12 damage!".to_owned()
            )
        );
        assert_eq!(messages[1].0, EntityId(2));
        assert_eq!(messages[1].1, MessageChannel::YouWereHit);
    }

    #[test]
    fn pet_lines_go_to_the_owner() {
        let config = CombatConfig::default();
        let registry = PropertyRegistry::standard();
        let rng = SequenceRng::constant(0.5);
        let recorder = Recorder::default();
        let env = CombatEnv::new(&config, &registry, &rng).with_presentation(&recorder);

        let pet = living(
            3,
            "wolf",
            LivingKind::Pet {
                owner: EntityId(7),
                owner_is_player: true,
                realm: Realm::Albion,
            },
        );
        let defender = living(2, "goblin", LivingKind::Npc { realm: Realm::None });
        let record = record(&pet, AttackResult::Evaded);

        notify_swing(&env, &pet, Some(&defender), &record, &AppliedAttack::default());

        let messages = recorder.messages.lock().unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].0, EntityId(7));
        assert_eq!(messages[0].1, MessageChannel::Pet);
        assert_eq!(messages[0].2, "goblin evades your attack!");
    }

    #[test]
    fn rejected_swing_only_tells_the_attacker() {
        let config = CombatConfig::default();
        let registry = PropertyRegistry::standard();
        let rng = SequenceRng::constant(0.5);
        let recorder = Recorder::default();
        let crowd = Crowd(vec![EntityId(9)]);
        let env = CombatEnv::new(&config, &registry, &rng)
            .with_presentation(&recorder)
            .with_spatial(&crowd);

        let attacker = living(1, "Aelfric", LivingKind::Player { realm: Realm::Albion });
        let defender = living(2, "Bjorn", LivingKind::Npc { realm: Realm::None });
        let record = record(&attacker, AttackResult::OutOfRange);

        notify_swing(&env, &attacker, Some(&defender), &record, &AppliedAttack::default());

        assert!(recorder.animations.lock().unwrap().is_empty());
        let messages = recorder.messages.lock().unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].1, MessageChannel::System);
    }

    #[test]
    fn critical_and_modifier_are_reported() {
        let attacker = living(1, "a", LivingKind::Player { realm: Realm::Albion });
        let mut record = record(&attacker, AttackResult::HitStyle);
        record.modifier = -3;
        record.critical_damage = 4;

        let (_, text) = attacker_message(&record, "b").unwrap();
        assert_eq!(
            text,
            "You hit b for 12 damage! (-3) You critically hit for an additional 4 damage!"
        );
    }
}
