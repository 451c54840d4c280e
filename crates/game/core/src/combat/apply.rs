//! Damage application and the attacker's after-swing bookkeeping.
//!
//! Both halves run under exactly one living's lock: the defender half on the
//! (possibly redirected) defender, the attacker half on the attacker. Procs
//! are returned rather than cast so the caller can fire them after the lock
//! is released.

use tracing::{debug, warn};

use crate::combat::{AttackRecord, AttackResult, InterruptOutcome, start_interrupt};
use crate::env::{CombatEnv, ProcSource, ProcTrigger};
use crate::state::{
    EffectKind, EntityId, HasControllingOwner, IsStealthable, LastAttack, Living, OffHand,
    Participants, Weapon,
};

/// What happened to the defender when a record was applied.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AppliedAttack {
    pub health_lost: i64,
    pub killed: bool,
    /// The defender carries an anti-poison ward.
    pub poison_immune: bool,
    pub interrupt: InterruptOutcome,
    /// Health percentage after the hit, for presentation.
    pub health_percent: u8,
}

/// Livings that receive experience credit for `attacker`'s damage.
///
/// A pet's credit goes to its owner. A grouped owner shares it evenly with
/// every group member near it that is alive and active.
pub fn credit_recipients(
    env: &CombatEnv<'_>,
    attacker: &Living,
    participants: &Participants,
) -> Vec<EntityId> {
    let source = attacker.credit_source();
    let Some(group) = env.groups.group_of(source) else {
        return vec![source];
    };
    let anchor = if source == attacker.id {
        Some(attacker)
    } else {
        participants.get(source)
    };
    let Some(anchor) = anchor else {
        return vec![source];
    };

    let mut members: Vec<EntityId> = group
        .members
        .iter()
        .copied()
        .filter(|id| {
            let member = if *id == attacker.id {
                Some(attacker)
            } else {
                participants.get(*id)
            };
            member.is_some_and(|m| {
                m.is_alive()
                    && m.is_active()
                    && m.is_within(anchor, env.config.experience_share_radius)
            })
        })
        .collect();
    if members.is_empty() {
        members.push(source);
    }
    members
}

/// Applies a resolved record to the living it landed on.
///
/// Only engagements touch the defender. Hits also deduct health, book
/// experience credit and interrupt.
pub fn on_attacked_by_enemy(
    env: &CombatEnv<'_>,
    defender: &mut Living,
    attacker: &Living,
    participants: &Participants,
    record: &AttackRecord,
) -> AppliedAttack {
    let mut applied = AppliedAttack {
        poison_immune: defender.effects.has(EffectKind::AntiPoison),
        health_percent: defender.health.percent(),
        ..AppliedAttack::default()
    };
    if !record.result.is_engagement() || !defender.is_alive() {
        return applied;
    }

    defender.add_attacker(record.attacker);
    defender.temp.mark_attacked(record.at, record.pvp);

    if record.result.is_hit() {
        let damage = record.total_damage();
        applied.health_lost = -defender.change_health(-i64::from(damage));

        let recipients = credit_recipients(env, attacker, participants);
        let share = f64::from(damage) / recipients.len() as f64;
        for recipient in recipients {
            defender.attackers.add_credit(defender.id, recipient, share);
        }

        applied.interrupt = start_interrupt(
            env,
            defender,
            attacker.level,
            record.interrupt_duration,
            record.attack_type,
            record.at,
        );
    }

    applied.killed = !defender.is_alive();
    applied.health_percent = defender.health.percent();
    debug!(
        target: "combat::apply",
        defender = %defender.id,
        attacker = %record.attacker,
        lost = applied.health_lost,
        killed = applied.killed,
        "attack applied"
    );
    applied
}

fn swung_weapon<'a>(attacker: &'a mut Living, record: &AttackRecord) -> Option<&'a mut Weapon> {
    if record.off_hand {
        match attacker.equipment.off_hand.as_mut() {
            Some(OffHand::Weapon(weapon)) => Some(weapon),
            _ => None,
        }
    } else {
        let slot = attacker.active_slot;
        attacker.equipment.active_weapon_mut(slot)
    }
}

/// Attacker-side bookkeeping after a swing. Returns the procs to cast.
pub fn after_swing(
    env: &CombatEnv<'_>,
    attacker: &mut Living,
    record: &AttackRecord,
    applied: &AppliedAttack,
) -> Vec<ProcTrigger> {
    let mut procs = Vec::new();

    if let Some(target) = record.target {
        attacker.temp.last_attack = Some(LastAttack {
            target,
            result: record.result,
            at: record.at,
            style_defense_bonus: record.style.as_ref().map_or(0, |s| s.defense_bonus),
        });
    }
    if record.result.is_invalid() {
        return procs;
    }

    attacker.temp.mark_attacking(record.at, record.pvp);
    if attacker.reveal() {
        debug!(target: "combat::apply", attacker = %attacker.id, "revealed by attacking");
    }
    if record.result == AttackResult::Fumbled {
        attacker.attack.note_fumble();
    }

    let attacker_id = attacker.id;
    if let Some(target) = record.target
        && record.result.is_hit()
    {
        if let Some(weapon) = swung_weapon(attacker, record) {
            let chance = f64::from(weapon.speed) * env.config.proc_chance_per_speed_unit;
            for spell in weapon.procs.iter().copied() {
                if env.rng.chance_percent(chance) {
                    procs.push(ProcTrigger {
                        caster: attacker_id,
                        target,
                        spell,
                        source: ProcSource::Weapon,
                    });
                }
            }

            if !applied.poison_immune
                && let Some(poison) = weapon.poison.as_mut()
            {
                procs.push(ProcTrigger {
                    caster: attacker_id,
                    target,
                    spell: poison.spell,
                    source: ProcSource::Poison,
                });
                match poison.charges.checked_sub(1) {
                    Some(0) | None => weapon.poison = None,
                    Some(left) => poison.charges = left,
                }
                if weapon.poison.is_none() {
                    debug!(target: "combat::apply", attacker = %attacker_id, "poison spent");
                }
            }
        } else if record.weapon.is_some() {
            warn!(
                target: "combat::apply",
                attacker = %attacker_id,
                "swung weapon no longer equipped, procs skipped"
            );
        }

        procs.extend(record.style_procs.iter().map(|&spell| ProcTrigger {
            caster: attacker_id,
            target,
            spell,
            source: ProcSource::Style,
        }));
    }

    if let Some(defender) = record.target {
        procs.extend(record.defender_procs.iter().map(|&spell| ProcTrigger {
            caster: defender,
            target: attacker_id,
            spell,
            source: ProcSource::Shield,
        }));
    }

    procs
}

/// A pet's swing keeps its owner in combat too.
pub fn propagate_to_owner(owner: &mut Living, record: &AttackRecord) {
    if record.result.is_engagement() {
        owner.temp.mark_attacking(record.at, record.pvp);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::SwingRequest;
    use crate::config::CombatConfig;
    use crate::env::{GroupOracle, GroupView, SequenceRng};
    use crate::state::{
        DamageType, Effect, GameTime, LivingKind, Poison, Position, Realm, SpellId, WeaponHand,
    };
    use crate::stats::PropertyRegistry;

    fn living(id: u32, kind: LivingKind) -> Living {
        let mut living = Living::new(EntityId(id), "l", kind, 20);
        living.position = Position::new(1, 0, 0, 0);
        living
    }

    fn hit(attacker: &Living, target: EntityId, damage: i32) -> AttackRecord {
        let mut record = AttackRecord::new(
            attacker,
            Some(target),
            &SwingRequest::primary(attacker, 2000, GameTime(100)),
        );
        record.result = AttackResult::HitUnstyled;
        record.damage = damage;
        record
    }

    struct Party(Vec<EntityId>);

    impl GroupOracle for Party {
        fn group_of(&self, member: EntityId) -> Option<GroupView> {
            self.0.contains(&member).then(|| GroupView {
                leader: self.0[0],
                members: self.0.clone(),
            })
        }
    }

    #[test]
    fn hit_deducts_health_and_books_credit() {
        let config = CombatConfig::default();
        let registry = PropertyRegistry::standard();
        let rng = SequenceRng::constant(0.5);
        let env = CombatEnv::new(&config, &registry, &rng);

        let attacker = living(1, LivingKind::Player { realm: Realm::Albion });
        let mut defender = living(2, LivingKind::Npc { realm: Realm::None });
        let mut record = hit(&attacker, defender.id, 30);
        record.critical_damage = 5;

        let applied = on_attacked_by_enemy(&env, &mut defender, &attacker, &Participants::new(), &record);

        assert_eq!(applied.health_lost, 35);
        assert_eq!(defender.health.current, 65);
        assert!(defender.attackers.contains(attacker.id));
        assert_eq!(defender.attackers.credit_of(attacker.id), 35.0);
        assert_eq!(defender.temp.interrupted_until, GameTime(2100));
        assert_eq!(defender.temp.last_attacked_pve, Some(GameTime(100)));
    }

    #[test]
    fn health_never_goes_below_zero() {
        let config = CombatConfig::default();
        let registry = PropertyRegistry::standard();
        let rng = SequenceRng::constant(0.5);
        let env = CombatEnv::new(&config, &registry, &rng);

        let attacker = living(1, LivingKind::Player { realm: Realm::Albion });
        let mut defender = living(2, LivingKind::Npc { realm: Realm::None });
        let record = hit(&attacker, defender.id, 500);

        let applied = on_attacked_by_enemy(&env, &mut defender, &attacker, &Participants::new(), &record);
        assert_eq!(applied.health_lost, 100);
        assert_eq!(defender.health.current, 0);
        assert!(applied.killed);
    }

    #[test]
    fn bodyguarded_swing_leaves_the_defender_alone() {
        let config = CombatConfig::default();
        let registry = PropertyRegistry::standard();
        let rng = SequenceRng::constant(0.5);
        let env = CombatEnv::new(&config, &registry, &rng);

        let attacker = living(1, LivingKind::Player { realm: Realm::Albion });
        let mut defender = living(2, LivingKind::Npc { realm: Realm::None });
        let mut record = hit(&attacker, defender.id, 10);
        record.result = AttackResult::Bodyguarded;

        on_attacked_by_enemy(&env, &mut defender, &attacker, &Participants::new(), &record);
        assert!(defender.attackers.is_empty());
        assert!(defender.temp.last_attacked_pve.is_none());
    }

    #[test]
    fn pet_credit_goes_to_the_group_of_its_owner() {
        let config = CombatConfig::default();
        let registry = PropertyRegistry::standard();
        let rng = SequenceRng::constant(0.5);
        let party = Party(vec![EntityId(10), EntityId(11), EntityId(12)]);
        let env = CombatEnv::new(&config, &registry, &rng).with_groups(&party);

        let pet = living(
            1,
            LivingKind::Pet {
                owner: EntityId(10),
                owner_is_player: true,
                realm: Realm::Albion,
            },
        );
        let owner = living(10, LivingKind::Player { realm: Realm::Albion });
        let near = living(11, LivingKind::Player { realm: Realm::Albion });
        let mut far = living(12, LivingKind::Player { realm: Realm::Albion });
        far.position.x = 100_000;
        let participants: Participants = [owner, near, far].into_iter().collect();

        assert_eq!(
            credit_recipients(&env, &pet, &participants),
            vec![EntityId(10), EntityId(11)]
        );

        let mut defender = living(2, LivingKind::Npc { realm: Realm::None });
        let record = hit(&pet, defender.id, 40);
        on_attacked_by_enemy(&env, &mut defender, &pet, &participants, &record);
        assert_eq!(defender.attackers.credit_of(EntityId(10)), 20.0);
        assert_eq!(defender.attackers.credit_of(EntityId(11)), 20.0);
        assert_eq!(defender.attackers.credit_of(pet.id), 0.0);
    }

    #[test]
    fn poison_fires_and_spends_charges() {
        let config = CombatConfig::default();
        let registry = PropertyRegistry::standard();
        let rng = SequenceRng::constant(0.99);
        let env = CombatEnv::new(&config, &registry, &rng);

        let mut attacker = living(1, LivingKind::Player { realm: Realm::Albion });
        let mut dagger = Weapon::new("dagger", DamageType::Thrust, 22, WeaponHand::OneHanded);
        dagger.poison = Some(Poison {
            spell: SpellId(77),
            charges: 2,
        });
        attacker.equipment.main_hand = Some(dagger);
        let record = hit(&attacker, EntityId(2), 10);

        let procs = after_swing(&env, &mut attacker, &record, &AppliedAttack::default());
        assert_eq!(procs.len(), 1);
        assert_eq!(procs[0].source, ProcSource::Poison);

        after_swing(&env, &mut attacker, &record, &AppliedAttack::default());
        assert!(attacker.active_weapon().is_some_and(|w| w.poison.is_none()));

        let procs = after_swing(&env, &mut attacker, &record, &AppliedAttack::default());
        assert!(procs.is_empty());
    }

    #[test]
    fn anti_poison_blocks_the_poison() {
        let config = CombatConfig::default();
        let registry = PropertyRegistry::standard();
        let rng = SequenceRng::constant(0.99);
        let env = CombatEnv::new(&config, &registry, &rng);

        let mut attacker = living(1, LivingKind::Player { realm: Realm::Albion });
        let mut dagger = Weapon::new("dagger", DamageType::Thrust, 22, WeaponHand::OneHanded);
        dagger.poison = Some(Poison {
            spell: SpellId(77),
            charges: 2,
        });
        attacker.equipment.main_hand = Some(dagger);
        let mut defender = living(2, LivingKind::Npc { realm: Realm::None });
        defender.effects.add(Effect::AntiPoison, None);

        let record = hit(&attacker, defender.id, 10);
        let applied = on_attacked_by_enemy(&env, &mut defender, &attacker, &Participants::new(), &record);
        let procs = after_swing(&env, &mut attacker, &record, &applied);

        assert!(procs.is_empty());
        assert!(attacker.active_weapon().is_some_and(|w| w.poison.is_some()));
    }

    #[test]
    fn weapon_procs_scale_with_speed() {
        let config = CombatConfig::default();
        let registry = PropertyRegistry::standard();
        // speed 40 -> 10% per proc slot
        let rng = SequenceRng::new([0.05, 0.5]);
        let env = CombatEnv::new(&config, &registry, &rng);

        let mut attacker = living(1, LivingKind::Player { realm: Realm::Albion });
        let mut hammer = Weapon::new("hammer", DamageType::Crush, 40, WeaponHand::TwoHanded);
        hammer.procs.push(SpellId(1));
        hammer.procs.push(SpellId(2));
        attacker.equipment.main_hand = Some(hammer);
        let record = hit(&attacker, EntityId(2), 10);

        let procs = after_swing(&env, &mut attacker, &record, &AppliedAttack::default());
        assert_eq!(procs.len(), 1);
        assert_eq!(procs[0].spell, SpellId(1));
    }

    #[test]
    fn fumble_skips_the_next_tick_and_stealth_drops() {
        let config = CombatConfig::default();
        let registry = PropertyRegistry::standard();
        let rng = SequenceRng::constant(0.99);
        let env = CombatEnv::new(&config, &registry, &rng);

        let mut attacker = living(1, LivingKind::Player { realm: Realm::Albion });
        attacker.flags.insert(crate::state::LivingFlags::STEALTHED);
        attacker.attack.start(EntityId(2), GameTime(0), 3400, false, 500);
        let mut record = hit(&attacker, EntityId(2), 0);
        record.result = AttackResult::Fumbled;

        after_swing(&env, &mut attacker, &record, &AppliedAttack::default());

        assert!(!attacker.is_stealthed());
        assert_eq!(attacker.temp.last_attack_pve, Some(GameTime(100)));
        assert_eq!(
            attacker.temp.last_attack.map(|l| l.result),
            Some(AttackResult::Fumbled)
        );
    }
}
