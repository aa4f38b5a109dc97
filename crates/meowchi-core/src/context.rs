//! The pet context: all components wired together.
//!
//! [`PetContext`] owns the stat simulator, the evolution engine, the
//! progress tracker, the session statistics, and a handle to the
//! persistence store. Every entry point (care actions, raw activity, timer
//! ticks, equip requests) goes through it, and it propagates the effects
//! across components synchronously:
//!
//! - A stat change publishes [`PetEvent::StatsUpdated`] and feeds a care
//!   sample to the evolution engine
//! - A care action also counts as an interaction and bumps its progress
//!   counter, which may unlock items
//! - A tick runs the decay cadences and the evolution cadence
//!
//! Notifications fan out through a `tokio::sync::broadcast` channel. Having
//! no subscriber is normal and not an error.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use meowchi_pet::{
    CollectibleItem, EquipError, EvolutionEngine, ProgressTracker, StatSimulator,
};
use meowchi_store::{InitOutcome, PersistenceStore, SaveOutcome, StoreError};
use meowchi_types::{
    ActivityKind, CareReceipt, Counter, DOCUMENT_VERSION, EvolutionJournal, EvolutionStatus,
    InteractionKind, InventoryView, ItemView, PetEvent, SaveDocument, SessionStats, StatSnapshot,
};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::config::PetConfig;

/// Capacity of the notification channel. Slow subscribers skip ahead.
pub const EVENT_CHANNEL_CAPACITY: usize = 256;

/// The wired-up pet.
#[derive(Debug)]
pub struct PetContext {
    config: PetConfig,
    clock: Arc<dyn Clock>,
    stats: StatSimulator,
    evolution: EvolutionEngine,
    progress: ProgressTracker,
    session: SessionStats,
    store: Arc<PersistenceStore>,
    events: broadcast::Sender<PetEvent>,
}

impl PetContext {
    /// Initialize storage, start a session, and restore every component.
    ///
    /// Always produces a pet. A storage failure is already recorded in the
    /// crash log and comes back next to the context; the pet then runs on
    /// the in-memory document and later saves retry the disk.
    pub async fn load(
        config: PetConfig,
        clock: Arc<dyn Clock>,
    ) -> (Self, Result<InitOutcome, StoreError>) {
        let now = clock.now();
        let store = Arc::new(PersistenceStore::new(config.storage.clone(), now));
        let init = store.initialize(now).await;
        let document = store.load_session().await;

        let mut context = Self::fresh(config, clock, store, now);
        context.restore(&document, now);
        match &init {
            Ok(outcome) => info!(
                ?outcome,
                form = context.evolution.current().id,
                session = context.session.session_count,
                "pet loaded"
            ),
            Err(e) => warn!(
                error = %e,
                form = context.evolution.current().id,
                "pet loaded without durable storage"
            ),
        }
        (context, init)
    }

    fn fresh(
        config: PetConfig,
        clock: Arc<dyn Clock>,
        store: Arc<PersistenceStore>,
        now: DateTime<Utc>,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            stats: StatSimulator::new(config.stats.clone(), now),
            evolution: EvolutionEngine::new(config.evolution.clone(), now),
            progress: ProgressTracker::new(),
            session: SessionStats::fresh(now),
            config,
            clock,
            store,
            events,
        }
    }

    fn restore(&mut self, document: &SaveDocument, now: DateTime<Utc>) {
        self.session = document.stats.clone();
        self.stats.restore(&document.pet_state, now);
        self.evolution
            .restore(&document.evolution, document.stats.total_playtime, now);
        self.progress
            .restore(&document.inventory, document.stats.total_inputs());
    }

    // -----------------------------------------------------------------------
    // Subscriptions
    // -----------------------------------------------------------------------

    /// Subscribe to notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<PetEvent> {
        self.events.subscribe()
    }

    /// A sender for the notification channel, so handles can subscribe
    /// without borrowing the context.
    pub fn event_sender(&self) -> broadcast::Sender<PetEvent> {
        self.events.clone()
    }

    fn publish(&self, event: PetEvent) {
        let kind = event.kind();
        if self.events.send(event).is_err() {
            debug!(kind, "no subscribers for notification");
        }
    }

    // -----------------------------------------------------------------------
    // Care and activity
    // -----------------------------------------------------------------------

    /// Feed the pet.
    pub fn feed(&mut self) -> CareReceipt {
        self.care(InteractionKind::Feed)
    }

    /// Clean the pet.
    pub fn clean(&mut self) -> CareReceipt {
        self.care(InteractionKind::Clean)
    }

    /// Play with the pet.
    pub fn play(&mut self) -> CareReceipt {
        self.care(InteractionKind::Play)
    }

    /// Perform a care action and propagate its effects.
    pub fn care(&mut self, kind: InteractionKind) -> CareReceipt {
        let now = self.clock.now();
        let receipt = self.stats.care(kind, now);
        info!(interaction = ?kind, value = receipt.new_value, "care action");

        let snapshot = self.stats.snapshot();
        self.stats_changed(snapshot, now);
        self.evolution
            .track_interaction(kind, &self.stats.stats(), now);
        self.bump(kind.counter());
        receipt
    }

    /// Count an interaction reported by an external source.
    pub fn track_interaction(&mut self, kind: InteractionKind) {
        let now = self.clock.now();
        self.evolution
            .track_interaction(kind, &self.stats.stats(), now);
    }

    /// Register one raw input event.
    pub fn record_activity(&mut self, kind: ActivityKind) {
        let now = self.clock.now();
        match kind {
            ActivityKind::KeyPress => {
                self.session.total_key_presses = self.session.total_key_presses.saturating_add(1);
            }
            ActivityKind::MouseClick => {
                self.session.total_mouse_clicks =
                    self.session.total_mouse_clicks.saturating_add(1);
            }
        }
        self.evolution.note_activity(now);
        if let Some(snapshot) = self.stats.record_activity() {
            self.stats_changed(snapshot, now);
        }
        self.bump(Counter::Inputs);
    }

    fn stats_changed(&mut self, snapshot: StatSnapshot, now: DateTime<Utc>) {
        self.evolution
            .ingest_care_sample(&self.stats.stats(), now);
        self.publish(PetEvent::StatsUpdated(snapshot));
    }

    fn bump(&mut self, counter: Counter) {
        let unlocked = self.progress.increment(counter, 1);
        if unlocked.is_empty() {
            // Input counts change constantly; only care counters refresh the view.
            if counter != Counter::Inputs {
                self.publish(PetEvent::InventoryUpdated(self.progress.inventory()));
            }
            return;
        }
        for item in unlocked {
            self.publish(PetEvent::ItemUnlocked(self.progress.unlock_event(item)));
        }
        self.publish(PetEvent::InventoryUpdated(self.progress.inventory()));
    }

    // -----------------------------------------------------------------------
    // Inventory
    // -----------------------------------------------------------------------

    /// Equip an unlocked item.
    ///
    /// # Errors
    ///
    /// Returns [`EquipError::NotFound`] or [`EquipError::Locked`]; the
    /// equipped item is unchanged in both cases.
    pub fn equip(&mut self, item_id: &str) -> Result<ItemView, EquipError> {
        let item = self.progress.equip(item_id)?;
        Ok(self.equipped_changed(item))
    }

    /// Equip the next unlocked item, wrapping around.
    pub fn cycle_next(&mut self) -> Option<ItemView> {
        let item = self.progress.cycle_next()?;
        Some(self.equipped_changed(item))
    }

    fn equipped_changed(&self, item: &CollectibleItem) -> ItemView {
        self.publish(PetEvent::InventoryUpdated(self.progress.inventory()));
        self.progress.item_view(item)
    }

    // -----------------------------------------------------------------------
    // Timers
    // -----------------------------------------------------------------------

    /// Run every cadence that is due now.
    pub fn tick(&mut self) {
        let now = self.clock.now();
        for snapshot in self.stats.update(now) {
            self.stats_changed(snapshot, now);
        }
        if let Some(transition) = self.evolution.update(now) {
            self.publish(PetEvent::EvolutionTriggered(transition.event()));
        }
    }

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    /// Merge every component's state into a save document.
    pub fn collect_document(&self) -> SaveDocument {
        let now = self.clock.now();
        let mut stats = self.session.clone();
        stats.total_playtime = self.evolution.playtime_ms(now);
        SaveDocument {
            version: DOCUMENT_VERSION.to_owned(),
            last_saved: None,
            pet_state: self.stats.pet_state(),
            stats,
            inventory: self.progress.persisted(),
            evolution: self.evolution.persisted(),
        }
    }

    /// Persist the current state.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the save could not be written. The failure
    /// is already in the crash log.
    pub async fn save(&self) -> Result<SaveOutcome, StoreError> {
        let document = self.collect_document();
        self.store.save(document, self.clock.now()).await
    }

    /// Wipe the save and reset every component to its defaults.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the fresh save could not be written; the
    /// in-memory state is left untouched in that case.
    pub async fn reset_to_defaults(&mut self) -> Result<(), StoreError> {
        let now = self.clock.now();
        let document = self.store.reset_to_defaults(now).await?;
        self.stats = StatSimulator::new(self.config.stats.clone(), now);
        self.evolution = EvolutionEngine::new(self.config.evolution.clone(), now);
        self.progress = ProgressTracker::new();
        self.restore(&document, now);

        info!("pet reset to defaults");
        self.publish(PetEvent::SaveReset);
        self.publish(PetEvent::StatsUpdated(self.stats.snapshot()));
        self.publish(PetEvent::InventoryUpdated(self.progress.inventory()));
        Ok(())
    }

    /// Record a failure in the crash log.
    pub async fn record_failure(
        &self,
        context: &str,
        error: &(dyn std::error::Error + Send + Sync + 'static),
    ) {
        self.store
            .record_failure(context, error, self.clock.now())
            .await;
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Rounded stats for presentation.
    pub fn snapshot(&self) -> StatSnapshot {
        self.stats.snapshot()
    }

    /// Evolution status with candidate progress.
    pub fn evolution_state(&self) -> EvolutionStatus {
        self.evolution.state(self.clock.now())
    }

    /// The evolution journal.
    pub fn journal(&self) -> EvolutionJournal {
        self.evolution.journal()
    }

    /// Every catalog item with its runtime state.
    pub fn inventory(&self) -> InventoryView {
        self.progress.inventory()
    }

    /// Session statistics (playtime excluded; see [`Self::collect_document`]).
    pub const fn session(&self) -> &SessionStats {
        &self.session
    }

    /// The shared store.
    pub const fn store(&self) -> &Arc<PersistenceStore> {
        &self.store
    }

    /// The clock in use.
    pub fn clock(&self) -> Arc<dyn Clock> {
        Arc::clone(&self.clock)
    }

    /// The configuration in use.
    pub const fn config(&self) -> &PetConfig {
        &self.config
    }
}
