//! Headless skirmish runner.
//!
//! Spawns a small melee around a knight, lets the attack and regeneration
//! timers play out for a while, then prints a JSON summary to stdout.
//!
//! ```bash
//! COMBAT_SEED=7 COMBAT_DURATION_MS=20000 cargo run -p combat-arena
//! RUST_LOG=runtime::swing=debug cargo run -p combat-arena
//! ```
mod config;
mod roster;

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use combat_content::ContentFactory;
use combat_core::combat::DeathReport;
use combat_core::EntityId;
use combat_runtime::{CombatHandle, Event, LifecycleEvent, Runtime, Topic};
use serde::Serialize;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use config::ArenaConfig;

#[derive(Debug, Default)]
struct Tally {
    counts: BTreeMap<String, u64>,
    deaths: Vec<DeathReport>,
    lagged: u64,
}

impl Tally {
    fn record(&mut self, event: &Event) {
        *self.counts.entry(event_name(event)).or_default() += 1;
        if let Event::Lifecycle(LifecycleEvent::Died(report)) = event {
            self.deaths.push(report.as_ref().clone());
        }
    }
}

fn event_name(event: &Event) -> String {
    // variant name without its payload
    let debug = format!("{event:?}");
    let inner = debug
        .split_once('(')
        .map(|(_, rest)| rest)
        .unwrap_or(debug.as_str());
    inner
        .split(|c: char| !c.is_alphanumeric())
        .next()
        .unwrap_or_default()
        .to_string()
}

#[derive(Debug, Serialize)]
struct LivingSummary {
    id: EntityId,
    name: String,
    level: u8,
    health: u32,
    max_health: u32,
    alive: bool,
    target: Option<EntityId>,
}

#[derive(Debug, Serialize)]
struct Summary {
    duration_ms: u64,
    livings: Vec<LivingSummary>,
    events: BTreeMap<String, u64>,
    lagged: u64,
    deaths: Vec<DeathReport>,
}

fn collect(handle: &CombatHandle, tally: Arc<Mutex<Tally>>) -> Vec<JoinHandle<()>> {
    Topic::ALL
        .into_iter()
        .map(|topic| {
            let mut rx = handle.subscribe(topic);
            let tally = Arc::clone(&tally);
            tokio::spawn(async move {
                loop {
                    match rx.recv().await {
                        Ok(event) => {
                            if let Ok(json) = event.to_json() {
                                debug!(target: "arena", ?topic, %json, "event");
                            }
                            if let Ok(mut tally) = tally.lock() {
                                tally.record(&event);
                            }
                        }
                        Err(RecvError::Lagged(skipped)) => {
                            warn!(target: "arena", ?topic, skipped, "event collector lagged");
                            if let Ok(mut tally) = tally.lock() {
                                tally.lagged += skipped;
                            }
                        }
                        Err(RecvError::Closed) => break,
                    }
                }
            })
        })
        .collect()
}

async fn summarize(handle: &CombatHandle, ids: &[EntityId]) -> Vec<LivingSummary> {
    let mut livings = Vec::with_capacity(ids.len());
    for &id in ids {
        match handle.snapshot(id).await {
            Ok(living) => livings.push(LivingSummary {
                id,
                name: living.name.clone(),
                level: living.level,
                health: living.health.current,
                max_health: living.health.maximum,
                alive: living.is_alive(),
                target: living.attack.target(),
            }),
            Err(error) => warn!(target: "arena", %id, %error, "living vanished before the summary"),
        }
    }
    livings
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = ArenaConfig::from_env()?;
    let catalog = match &config.data_dir {
        Some(dir) => ContentFactory::new(dir).load_templates()?,
        None => roster::builtin_catalog(),
    };
    info!(
        target: "arena",
        templates = catalog.len(),
        duration_ms = config.duration_ms,
        seed = ?config.runtime.seed,
        "starting skirmish"
    );

    let runtime = Runtime::builder().config(config.runtime.clone()).build()?;
    let handle = runtime.handle();

    let tally = Arc::new(Mutex::new(Tally::default()));
    let collectors = collect(&handle, Arc::clone(&tally));

    let skirmish = roster::stage(&handle, &catalog).await?;
    tokio::time::sleep(Duration::from_millis(config.duration_ms)).await;

    let livings = summarize(&handle, &skirmish.ids()).await;
    runtime.shutdown().await?;
    for collector in collectors {
        collector.abort();
    }

    let tally = match Arc::try_unwrap(tally) {
        Ok(mutex) => mutex.into_inner().unwrap_or_else(|poisoned| poisoned.into_inner()),
        Err(shared) => std::mem::take(&mut *shared.lock().unwrap_or_else(|p| p.into_inner())),
    };
    let summary = Summary {
        duration_ms: config.duration_ms,
        livings,
        events: tally.counts,
        lagged: tally.lagged,
        deaths: tally.deaths,
    };
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use combat_core::ResourceKind;
    use combat_runtime::ResourceEvent;

    #[test]
    fn event_names_drop_the_payload() {
        let event = Event::Lifecycle(LifecycleEvent::Removed {
            living: EntityId(3),
        });
        assert_eq!(event_name(&event), "Removed");

        let event = Event::Resources(ResourceEvent::RegenStopped {
            living: EntityId(1),
            kind: ResourceKind::Mana,
        });
        assert_eq!(event_name(&event), "RegenStopped");
    }

    #[test]
    fn tally_keeps_death_reports() {
        let mut tally = Tally::default();
        let report = DeathReport {
            victim: EntityId(2),
            killer: Some(EntityId(1)),
            level: 10,
            attackers: vec![EntityId(1)],
            credit: Vec::new(),
            experience: 25_000 + 1_000,
        };
        tally.record(&Event::Lifecycle(LifecycleEvent::Died(Box::new(report.clone()))));
        tally.record(&Event::Lifecycle(LifecycleEvent::Removed {
            living: EntityId(2),
        }));

        assert_eq!(tally.deaths, vec![report]);
        assert_eq!(tally.counts.get("Died"), Some(&1));
        assert_eq!(tally.counts.get("Removed"), Some(&1));
    }
}
