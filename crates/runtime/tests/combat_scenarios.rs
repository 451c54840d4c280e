use std::time::Duration;

use combat_core::env::SequenceRng;
use combat_core::schedule::StopReason;
use combat_core::state::{ActiveWeaponSlot, DamageType, Weapon, WeaponHand};
use combat_core::{
    AttackResult, AttackType, ChangeReason, EntityId, Living, LivingFlags, LivingKind, Position, Property,
    PropertyOracle, PropertyRegistry, Realm, ResourceKind, ResourceMeter,
};
use combat_runtime::{
    CombatEvent, CombatHandle, Event, LifecycleEvent, ResourceEvent, Runtime, RuntimeConfig,
    RuntimeError, Topic,
};
use tokio::sync::broadcast;

fn fighter(id: EntityId, kind: LivingKind, y: i32) -> Living {
    let mut living = Living::new(id, format!("fighter-{}", id.0), kind, 20);
    living.position = Position::new(1, 0, y, 0);
    living.set_base_property(Property::Quickness, 60);
    living.equipment.main_hand = Some(Weapon::new("axe", DamageType::Slash, 40, WeaponHand::OneHanded));
    living
}

fn player(id: EntityId) -> Living {
    fighter(id, LivingKind::Player { realm: Realm::Albion }, 0)
}

fn npc(id: EntityId) -> Living {
    let mut living = fighter(id, LivingKind::Npc { realm: Realm::None }, 100);
    living.heading = 2048;
    living
}

/// Every roll lands: no misses, no defenses, no criticals.
fn sure_hits() -> Runtime {
    Runtime::builder()
        .config(RuntimeConfig {
            regeneration: false,
            ..RuntimeConfig::default()
        })
        .rng(SequenceRng::constant(0.99))
        .build()
        .expect("runtime should build")
}

fn drain(rx: &mut broadcast::Receiver<Event>) -> Vec<Event> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

async fn spawn(handle: &CombatHandle, build: fn(EntityId) -> Living) -> EntityId {
    handle
        .spawn(|id| Ok(build(id)))
        .await
        .expect("spawn should succeed")
}

#[tokio::test(start_paused = true)]
async fn concurrent_swings_on_one_defender_are_both_applied() {
    let runtime = sure_hits();
    let handle = runtime.handle();

    let first = spawn(&handle, player).await;
    let second = spawn(&handle, player).await;
    let defender = handle
        .spawn(|id| {
            let mut living = npc(id);
            living.health = ResourceMeter::full(5000);
            Ok(living)
        })
        .await
        .expect("spawn defender");

    let (a, b) = tokio::join!(
        handle.swing(first, defender, None),
        handle.swing(second, defender, None)
    );
    let a = a.expect("first swing");
    let b = b.expect("second swing");

    assert!(a.record.result.is_hit());
    assert!(b.record.result.is_hit());
    assert!(a.applied.health_lost > 0);
    assert!(b.applied.health_lost > 0);

    let after = handle.snapshot(defender).await.expect("defender exists");
    let lost = i64::from(5000 - after.health.current);
    assert_eq!(lost, a.applied.health_lost + b.applied.health_lost);
    assert_eq!(after.attackers.snapshot(), vec![first, second]);

    runtime.shutdown().await.expect("clean shutdown");
}

#[tokio::test(start_paused = true)]
async fn lethal_swing_kills_through_the_death_hook() {
    let runtime = sure_hits();
    let handle = runtime.handle();
    let mut lifecycle = handle.subscribe(Topic::Lifecycle);

    let attacker = spawn(&handle, player).await;
    let victim = handle
        .spawn(|id| {
            let mut living = npc(id);
            living.health = ResourceMeter::new(1, 100);
            Ok(living)
        })
        .await
        .expect("spawn victim");

    let outcome = handle.swing(attacker, victim, None).await.expect("swing");
    assert!(outcome.applied.killed);

    let corpse = handle.snapshot(victim).await.expect("corpse stays registered");
    assert!(corpse.flags.contains(LivingFlags::DEAD));
    assert!(corpse.attackers.is_empty());
    assert!(!corpse.attack.is_running());

    let report = drain(&mut lifecycle)
        .into_iter()
        .find_map(|event| match event {
            Event::Lifecycle(LifecycleEvent::Died(report)) => Some(report),
            _ => None,
        })
        .expect("death is published");
    assert_eq!(report.victim, victim);
    assert_eq!(report.killer, Some(attacker));
    assert_eq!(report.attackers, vec![attacker]);
    let share = report.share_of(attacker).expect("attacker earned credit");
    assert!((share.fraction - 1.0).abs() < f64::EPSILON);
    assert_eq!(report.experience, handle.experience_for_level(20));

    // a second death is ignored
    assert_eq!(handle.die(victim, Some(attacker)).await.expect("die"), None);

    runtime.shutdown().await.expect("clean shutdown");
}

#[tokio::test(start_paused = true)]
async fn attack_timer_swings_after_the_first_delay() {
    let runtime = sure_hits();
    let handle = runtime.handle();
    let mut combat = handle.subscribe(Topic::Combat);

    let attacker = spawn(&handle, player).await;
    let defender = handle
        .spawn(|id| {
            let mut living = npc(id);
            living.health = ResourceMeter::full(5000);
            Ok(living)
        })
        .await
        .expect("spawn defender");

    assert!(handle.start_attack(attacker, defender).await.expect("start"));
    tokio::time::sleep(Duration::from_millis(400)).await;
    assert!(
        !drain(&mut combat)
            .iter()
            .any(|e| matches!(e, Event::Combat(CombatEvent::SwingResolved { .. }))),
        "no swing before the minimum first delay"
    );

    tokio::time::sleep(Duration::from_millis(200)).await;
    let swings: Vec<_> = drain(&mut combat)
        .into_iter()
        .filter_map(|event| match event {
            Event::Combat(CombatEvent::SwingResolved { record, .. }) => Some(record),
            _ => None,
        })
        .collect();
    assert_eq!(swings.len(), 1);
    assert_eq!(swings[0].attacker, attacker);
    assert_eq!(swings[0].result, AttackResult::HitUnstyled);

    // the idle creature fought back
    let retaliating = handle.snapshot(defender).await.expect("defender");
    assert_eq!(retaliating.attack.target(), Some(attacker));

    runtime.shutdown().await.expect("clean shutdown");
}

#[tokio::test(start_paused = true)]
async fn pet_swing_keeps_its_owner_in_combat() {
    let runtime = sure_hits();
    let handle = runtime.handle();

    let owner = spawn(&handle, player).await;
    let pet = handle
        .spawn(|id| {
            Ok(fighter(
                id,
                LivingKind::Pet {
                    owner,
                    owner_is_player: true,
                    realm: Realm::Albion,
                },
                0,
            ))
        })
        .await
        .expect("spawn pet");
    let defender = spawn(&handle, npc).await;

    let outcome = handle.swing(pet, defender, None).await.expect("swing");
    assert!(outcome.record.result.is_hit());

    let owner = handle.snapshot(owner).await.expect("owner");
    assert_eq!(owner.temp.last_attack_pve, Some(outcome.record.at));

    runtime.shutdown().await.expect("clean shutdown");
}

#[tokio::test(start_paused = true)]
async fn stop_attack_twice_is_a_no_op() {
    let runtime = sure_hits();
    let handle = runtime.handle();
    let mut lifecycle = handle.subscribe(Topic::Lifecycle);

    let attacker = spawn(&handle, player).await;
    let defender = spawn(&handle, npc).await;

    assert!(handle.start_attack(attacker, defender).await.expect("start"));
    assert!(handle.stop_attack(attacker).await.expect("first stop"));
    let once = handle.snapshot(attacker).await.expect("attacker");

    assert!(!handle.stop_attack(attacker).await.expect("second stop"));
    let twice = handle.snapshot(attacker).await.expect("attacker");
    assert_eq!(once, twice);
    assert!(!twice.attack.is_running());

    let stops = drain(&mut lifecycle)
        .into_iter()
        .filter(|e| matches!(e, Event::Lifecycle(LifecycleEvent::AttackStopped { .. })))
        .count();
    assert_eq!(stops, 1);

    // the cancelled timer never swings
    let mut combat = handle.subscribe(Topic::Combat);
    tokio::time::sleep(Duration::from_secs(5)).await;
    assert!(drain(&mut combat).is_empty());

    runtime.shutdown().await.expect("clean shutdown");
}

#[tokio::test(start_paused = true)]
async fn stopping_releases_the_prior_target() {
    let runtime = sure_hits();
    let handle = runtime.handle();

    let attacker = spawn(&handle, player).await;
    let defender = spawn(&handle, npc).await;
    handle.start_attack(attacker, defender).await.expect("start");
    handle.add_attacker(defender, attacker).await.expect("engage");

    assert!(handle.stop_attack(attacker).await.expect("stop"));
    let defender = handle.snapshot(defender).await.expect("defender");
    assert!(!defender.attackers.contains(attacker));

    runtime.shutdown().await.expect("clean shutdown");
}

#[tokio::test(start_paused = true)]
async fn spoiled_shot_finishes_the_stop() {
    // every roll succeeds, so the drawn shot is always spoiled
    let runtime = Runtime::builder()
        .config(RuntimeConfig {
            regeneration: false,
            ..RuntimeConfig::default()
        })
        .rng(SequenceRng::constant(0.0))
        .build()
        .expect("runtime should build");
    let handle = runtime.handle();
    let mut lifecycle = handle.subscribe(Topic::Lifecycle);

    let archer = handle
        .spawn(|id| {
            let mut living = player(id);
            living.active_slot = ActiveWeaponSlot::Distance;
            Ok(living)
        })
        .await
        .expect("spawn archer");
    let target = spawn(&handle, npc).await;
    assert!(handle.start_attack(archer, target).await.expect("start"));
    handle.add_attacker(target, archer).await.expect("engage");

    let outcome = handle
        .start_interrupt(archer, 1000, AttackType::MeleeOneHand, Some(target))
        .await
        .expect("interrupt");
    assert!(outcome.shot_spoiled);
    assert_eq!(outcome.stopped_target, Some(target));

    let archer_after = handle.snapshot(archer).await.expect("archer");
    assert!(!archer_after.attack.is_running());
    assert!(archer_after.temp.last_attack.is_none());
    let target_after = handle.snapshot(target).await.expect("target");
    assert!(!target_after.attackers.contains(archer));

    let stopped = drain(&mut lifecycle).into_iter().any(|event| {
        matches!(
            event,
            Event::Lifecycle(LifecycleEvent::AttackStopped {
                attacker,
                reason: StopReason::Stopped,
            }) if attacker == archer
        )
    });
    assert!(stopped, "the spoiled shot publishes its stop");

    runtime.shutdown().await.expect("clean shutdown");
}

#[tokio::test(start_paused = true)]
async fn regeneration_heals_to_full_then_stops() {
    let mut properties = PropertyRegistry::standard();
    properties.register(
        Property::HealthRegenerationRate,
        |_: &Living, _: &dyn PropertyOracle| 10,
    );
    let runtime = Runtime::builder()
        .properties(properties)
        .rng(SequenceRng::constant(0.5))
        .build()
        .expect("runtime should build");
    let handle = runtime.handle();
    let mut resources = handle.subscribe(Topic::Resources);

    let wounded = handle
        .spawn(|id| {
            let mut living = player(id);
            living.health = ResourceMeter::new(50, 100);
            Ok(living)
        })
        .await
        .expect("spawn");

    tokio::time::sleep(Duration::from_millis(3001)).await;
    assert_eq!(handle.snapshot(wounded).await.expect("living").health.current, 60);

    tokio::time::sleep(Duration::from_secs(20)).await;
    assert_eq!(handle.snapshot(wounded).await.expect("living").health.current, 100);

    let events = drain(&mut resources);
    let ticks = events
        .iter()
        .filter(|e| {
            matches!(
                e,
                Event::Resources(ResourceEvent::Changed {
                    reason: ChangeReason::Regeneration,
                    delta: 10,
                    ..
                })
            )
        })
        .count();
    assert_eq!(ticks, 5);
    assert!(events.iter().any(|e| matches!(
        e,
        Event::Resources(ResourceEvent::RegenStopped {
            kind: ResourceKind::Health,
            ..
        })
    )));

    // damage restarts the stopped timer
    let applied = handle
        .change_health(wounded, None, ChangeReason::Spell, -30)
        .await
        .expect("change health");
    assert_eq!(applied, -30);
    tokio::time::sleep(Duration::from_millis(3001)).await;
    assert_eq!(handle.snapshot(wounded).await.expect("living").health.current, 80);

    runtime.shutdown().await.expect("clean shutdown");
}

#[tokio::test(start_paused = true)]
async fn removed_livings_are_forgotten() {
    let runtime = sure_hits();
    let handle = runtime.handle();

    let attacker = spawn(&handle, player).await;
    let defender = spawn(&handle, npc).await;
    handle.add_attacker(defender, attacker).await.expect("engage");
    handle.start_attack(attacker, defender).await.expect("start");

    handle.remove(attacker).await.expect("remove");
    assert!(matches!(
        handle.snapshot(attacker).await,
        Err(RuntimeError::UnknownEntity(id)) if id == attacker
    ));
    assert!(matches!(
        handle.remove(attacker).await,
        Err(RuntimeError::UnknownEntity(_))
    ));
    assert!(handle
        .snapshot(defender)
        .await
        .expect("defender")
        .attackers
        .is_empty());
    assert_eq!(handle.ids(), vec![defender]);

    runtime.shutdown().await.expect("clean shutdown");
}

#[tokio::test(start_paused = true)]
async fn shutdown_refuses_new_work() {
    let runtime = sure_hits();
    let handle = runtime.handle();
    let living = spawn(&handle, player).await;

    runtime.shutdown().await.expect("clean shutdown");

    assert!(matches!(
        handle.spawn(|id| Ok(player(id))).await,
        Err(RuntimeError::ShuttingDown)
    ));
    assert!(matches!(
        handle.change_mana(living, None, ChangeReason::Spell, 5).await,
        Err(RuntimeError::ShuttingDown)
    ));
}
