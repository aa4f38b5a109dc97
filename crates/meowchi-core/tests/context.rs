//! Integration tests for the wired-up pet.
//!
//! Each test runs a [`PetContext`] over a scratch save directory with a
//! [`ManualClock`], so hours of pet time pass instantly.

// Integration tests use expect/unwrap extensively for clarity -- panicking
// on failure is the correct behavior in test code.
#![allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use meowchi_core::{ManualClock, PetConfig, PetContext};
use meowchi_pet::EquipError;
use meowchi_store::{InitOutcome, SaveOutcome, StoreConfig, StoreError};
use meowchi_types::{ActivityKind, PetEvent, SaveDocument};
use tempfile::TempDir;
use tokio::sync::broadcast;

fn start() -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000, 0).unwrap()
}

fn config_in(dir: &TempDir, test_mode: bool) -> PetConfig {
    let mut config = PetConfig {
        test_mode,
        storage: StoreConfig::in_dir(dir.path().join("save")),
        ..PetConfig::default()
    };
    config.apply_overrides(|_| None);
    config
}

async fn load(config: &PetConfig, clock: &Arc<ManualClock>) -> (PetContext, InitOutcome) {
    let (pet, init) =
        PetContext::load(config.clone(), Arc::clone(clock) as Arc<dyn meowchi_core::Clock>).await;
    (pet, init.expect("initialize storage"))
}

fn drain(rx: &mut broadcast::Receiver<PetEvent>) -> Vec<PetEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

#[tokio::test]
async fn storage_failure_still_yields_a_pet() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, b"not a directory").unwrap();
    let mut config = config_in(&dir, false);
    config.storage = StoreConfig::in_dir(blocker.join("save"));
    let clock = Arc::new(ManualClock::new(start()));

    let (mut pet, init) =
        PetContext::load(config, Arc::clone(&clock) as Arc<dyn meowchi_core::Clock>).await;

    assert!(matches!(init, Err(StoreError::Io { .. })));
    assert_eq!(pet.session().session_count, 1);
    assert_eq!(pet.snapshot().hunger, 80);
    assert_eq!(pet.feed().new_value, 100);
    assert!(pet.save().await.is_err(), "saves keep failing but never panic");
}

#[tokio::test]
async fn first_load_seeds_a_fresh_pet() {
    let dir = tempfile::tempdir().unwrap();
    let clock = Arc::new(ManualClock::new(start()));
    let (pet, outcome) = load(&config_in(&dir, false), &clock).await;

    assert_eq!(outcome, InitOutcome::Seeded);
    let snapshot = pet.snapshot();
    assert_eq!((snapshot.hunger, snapshot.cleanliness, snapshot.mood), (80, 80, 80));
    assert_eq!(pet.session().session_count, 1);
    assert_eq!(pet.evolution_state().current.id, "base");
    assert_eq!(pet.inventory().equipped_item, "none");
}

#[tokio::test]
async fn feeding_publishes_stats_then_inventory() {
    let dir = tempfile::tempdir().unwrap();
    let clock = Arc::new(ManualClock::new(start()));
    let (mut pet, _) = load(&config_in(&dir, false), &clock).await;
    let mut rx = pet.subscribe();

    let receipt = pet.feed();
    assert_eq!(receipt.new_value, 100);
    assert_eq!(receipt.message, "Yum! That was delicious! 😋");

    let events = drain(&mut rx);
    assert!(matches!(&events[0], PetEvent::StatsUpdated(s) if s.hunger == 100));
    assert!(matches!(events.last(), Some(PetEvent::InventoryUpdated(_))));
    assert_eq!(pet.evolution_state().total_interactions, 1);
}

#[tokio::test]
async fn twenty_feeds_unlock_the_chef_hat() {
    let dir = tempfile::tempdir().unwrap();
    let clock = Arc::new(ManualClock::new(start()));
    let (mut pet, _) = load(&config_in(&dir, false), &clock).await;
    let mut rx = pet.subscribe();

    for _ in 0..19 {
        pet.feed();
    }
    assert!(
        drain(&mut rx)
            .iter()
            .all(|e| !matches!(e, PetEvent::ItemUnlocked(_)))
    );

    pet.feed();
    let unlocked: Vec<_> = drain(&mut rx)
        .into_iter()
        .filter_map(|e| match e {
            PetEvent::ItemUnlocked(u) => Some(u),
            _ => None,
        })
        .collect();
    assert_eq!(unlocked.len(), 1);
    assert_eq!(unlocked[0].item.id, "chef");
    assert_eq!(unlocked[0].message, "🎉 New hat unlocked: Chef Hat!");

    let view = pet.equip("chef").unwrap();
    assert!(view.equipped);
    assert_eq!(pet.inventory().equipped_item, "chef");
}

#[tokio::test]
async fn equip_rejects_unknown_and_locked_items() {
    let dir = tempfile::tempdir().unwrap();
    let clock = Arc::new(ManualClock::new(start()));
    let (mut pet, _) = load(&config_in(&dir, false), &clock).await;

    assert_eq!(
        pet.equip("unknown-id"),
        Err(EquipError::NotFound("unknown-id".to_owned()))
    );
    assert_eq!(pet.equip("crown"), Err(EquipError::Locked("crown".to_owned())));
    assert_eq!(pet.inventory().equipped_item, "none");

    assert_eq!(pet.cycle_next().unwrap().id, "party");
    assert_eq!(pet.cycle_next().unwrap().id, "none");
}

#[tokio::test]
async fn raw_input_unlocks_the_cowboy_hat() {
    let dir = tempfile::tempdir().unwrap();
    let clock = Arc::new(ManualClock::new(start()));
    let (mut pet, _) = load(&config_in(&dir, false), &clock).await;

    for i in 0..250 {
        let kind = if i % 2 == 0 {
            ActivityKind::KeyPress
        } else {
            ActivityKind::MouseClick
        };
        pet.record_activity(kind);
    }

    assert_eq!(pet.session().total_key_presses, 125);
    assert_eq!(pet.session().total_mouse_clicks, 125);
    let cowboy = pet
        .inventory()
        .items
        .into_iter()
        .find(|item| item.id == "cowboy")
        .unwrap();
    assert!(cowboy.unlocked);
    // 250 inputs at 0.1 dirt each.
    assert_eq!(pet.snapshot().cleanliness, 55);
}

#[tokio::test]
async fn hunger_decays_on_tick() {
    let dir = tempfile::tempdir().unwrap();
    let clock = Arc::new(ManualClock::new(start()));
    let (mut pet, _) = load(&config_in(&dir, false), &clock).await;

    clock.advance(TimeDelta::minutes(19));
    pet.tick();
    assert_eq!(pet.snapshot().hunger, 80);

    clock.advance(TimeDelta::minutes(1));
    pet.tick();
    assert_eq!(pet.snapshot().hunger, 75);
}

#[tokio::test]
async fn attentive_care_evolves_into_an_angel() {
    let dir = tempfile::tempdir().unwrap();
    let clock = Arc::new(ManualClock::new(start()));
    let (mut pet, _) = load(&config_in(&dir, true), &clock).await;
    let mut rx = pet.subscribe();
    let mut evolutions = Vec::new();

    for _ in 0..61 {
        pet.feed();
        pet.clean();
        pet.play();
        clock.advance(TimeDelta::minutes(1));
        pet.tick();
        evolutions.extend(drain(&mut rx).into_iter().filter_map(|e| match e {
            PetEvent::EvolutionTriggered(t) => Some(t),
            _ => None,
        }));
    }

    assert_eq!(evolutions.len(), 1);
    assert_eq!(evolutions[0].old_form.id, "base");
    assert_eq!(evolutions[0].new_form.id, "angel");
    assert_eq!(evolutions[0].message, "Meowchi is evolving into Meowchi Angel!");

    let journal = pet.journal();
    let ids: Vec<_> = journal.history.iter().map(|f| f.id.as_str()).collect();
    assert_eq!(ids, ["base", "angel"]);
    assert_eq!(journal.total_evolutions, 1);
}

#[tokio::test]
async fn save_and_reload_keeps_progress() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(&dir, false);
    let clock = Arc::new(ManualClock::new(start()));
    let (mut pet, _) = load(&config, &clock).await;

    for _ in 0..5 {
        pet.play();
        pet.record_activity(ActivityKind::KeyPress);
    }
    pet.equip("party").unwrap();
    clock.advance(TimeDelta::minutes(30));
    assert_eq!(pet.save().await.unwrap(), SaveOutcome::Saved);
    let before = pet.collect_document();
    drop(pet);

    let (reloaded, outcome) = load(&config, &clock).await;
    assert_eq!(outcome, InitOutcome::Loaded);
    let after = reloaded.collect_document();

    assert_eq!(after.pet_state, before.pet_state);
    assert_eq!(after.inventory, before.inventory);
    assert_eq!(after.evolution.total_interactions, 5);
    assert_eq!(after.stats.total_key_presses, 5);
    assert_eq!(after.stats.session_count, 2);
    assert_eq!(after.stats.total_playtime, 30 * 60 * 1000);
    assert_eq!(reloaded.inventory().equipped_item, "party");
}

#[tokio::test]
async fn reset_returns_to_a_fresh_pet() {
    let dir = tempfile::tempdir().unwrap();
    let clock = Arc::new(ManualClock::new(start()));
    let (mut pet, _) = load(&config_in(&dir, false), &clock).await;
    for _ in 0..20 {
        pet.feed();
    }
    pet.equip("chef").unwrap();
    let mut rx = pet.subscribe();

    clock.advance(TimeDelta::seconds(5));
    pet.reset_to_defaults().await.unwrap();

    let events = drain(&mut rx);
    assert!(matches!(events[0], PetEvent::SaveReset));
    assert!(matches!(&events[1], PetEvent::StatsUpdated(s) if s.hunger == 80));
    assert!(matches!(&events[2], PetEvent::InventoryUpdated(v) if v.equipped_item == "none"));

    let on_disk: SaveDocument =
        serde_json::from_slice(&std::fs::read(&pet.store().paths().primary).unwrap()).unwrap();
    assert_eq!(on_disk, SaveDocument::fresh(clock_now(&clock)));
    assert_eq!(pet.evolution_state().total_interactions, 0);
}

fn clock_now(clock: &ManualClock) -> DateTime<Utc> {
    use meowchi_core::Clock;
    clock.now()
}
