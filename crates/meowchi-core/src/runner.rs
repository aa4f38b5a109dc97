//! The async runner that keeps the pet alive.
//!
//! [`Runner::run`] owns the [`PetContext`] and drives a single loop that
//! selects over:
//!
//! - **Base tick**: [`PetContext::tick`] runs whichever decay and evolution
//!   cadences are due
//! - **Autosave**: once on start, then on the configured period
//! - **Commands**: [`PetCommand`]s sent through a [`RunnerHandle`]
//! - **Shutdown**: [`RunControl::stopped`]
//!
//! Save failures are already in the crash log when they reach the runner;
//! the loop logs them and keeps going. Stopping performs one final save.

use std::sync::Arc;
use std::time::Duration;

use meowchi_pet::EquipError;
use meowchi_store::{SaveOutcome, StoreError};
use meowchi_types::{
    ActivityKind, CareReceipt, EvolutionJournal, EvolutionStatus, InteractionKind, InventoryView,
    ItemView, PetEvent, StatSnapshot,
};
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::time::{Instant, MissedTickBehavior, interval, interval_at};
use tracing::{debug, info, warn};

use crate::context::PetContext;
use crate::control::{RunControl, RunEndReason};

/// Depth of the command queue between handles and the runner.
pub const COMMAND_QUEUE_DEPTH: usize = 64;

/// Errors surfaced to [`RunnerHandle`] callers and by [`Runner::run`].
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// The runner is no longer accepting commands.
    #[error("pet runner has stopped")]
    Stopped,

    /// An equip request was rejected.
    #[error("equip rejected: {source}")]
    Equip {
        /// The underlying equip error.
        #[from]
        source: EquipError,
    },

    /// A storage operation failed.
    #[error("storage error: {source}")]
    Store {
        /// The underlying store error.
        #[from]
        source: StoreError,
    },
}

/// A request from the host to the running pet.
#[derive(Debug)]
pub enum PetCommand {
    /// Feed, clean, or play.
    Care {
        /// Which care action.
        kind: InteractionKind,
        /// Receives the pet's response.
        reply: oneshot::Sender<CareReceipt>,
    },
    /// One raw input event.
    Activity(ActivityKind),
    /// An interaction counted without a stat effect.
    TrackInteraction(InteractionKind),
    /// Equip an item by id.
    Equip {
        /// Catalog id of the item.
        item_id: String,
        /// Receives the equipped item or the rejection.
        reply: oneshot::Sender<Result<ItemView, EquipError>>,
    },
    /// Equip the next unlocked item.
    CycleNext {
        /// Receives the newly equipped item, if any.
        reply: oneshot::Sender<Option<ItemView>>,
    },
    /// Read the rounded stats.
    Snapshot {
        /// Receives the snapshot.
        reply: oneshot::Sender<StatSnapshot>,
    },
    /// Read the evolution status.
    EvolutionState {
        /// Receives the status.
        reply: oneshot::Sender<EvolutionStatus>,
    },
    /// Read the evolution journal.
    Journal {
        /// Receives the journal.
        reply: oneshot::Sender<EvolutionJournal>,
    },
    /// Read the inventory.
    Inventory {
        /// Receives the inventory view.
        reply: oneshot::Sender<InventoryView>,
    },
    /// Save now.
    Save {
        /// Receives the save result.
        reply: oneshot::Sender<Result<SaveOutcome, StoreError>>,
    },
    /// Wipe the save and start over.
    Reset {
        /// Receives the reset result.
        reply: oneshot::Sender<Result<(), StoreError>>,
    },
}

/// Cloneable handle for talking to a running pet.
#[derive(Debug, Clone)]
pub struct RunnerHandle {
    commands: mpsc::Sender<PetCommand>,
    events: broadcast::Sender<PetEvent>,
    control: Arc<RunControl>,
}

impl RunnerHandle {
    /// Subscribe to push notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<PetEvent> {
        self.events.subscribe()
    }

    /// Ask the runner to save and stop.
    pub fn request_stop(&self) {
        self.control.request_stop();
    }

    /// The shared shutdown control.
    pub fn control(&self) -> Arc<RunControl> {
        Arc::clone(&self.control)
    }

    /// Feed the pet.
    pub async fn feed(&self) -> Result<CareReceipt, RunnerError> {
        self.care(InteractionKind::Feed).await
    }

    /// Clean the pet.
    pub async fn clean(&self) -> Result<CareReceipt, RunnerError> {
        self.care(InteractionKind::Clean).await
    }

    /// Play with the pet.
    pub async fn play(&self) -> Result<CareReceipt, RunnerError> {
        self.care(InteractionKind::Play).await
    }

    /// Perform a care action.
    pub async fn care(&self, kind: InteractionKind) -> Result<CareReceipt, RunnerError> {
        self.request(|reply| PetCommand::Care { kind, reply }).await
    }

    /// Report a raw input event.
    pub async fn record_activity(&self, kind: ActivityKind) -> Result<(), RunnerError> {
        self.send(PetCommand::Activity(kind)).await
    }

    /// Report an interaction from an external source.
    pub async fn track_interaction(&self, kind: InteractionKind) -> Result<(), RunnerError> {
        self.send(PetCommand::TrackInteraction(kind)).await
    }

    /// Equip an item.
    pub async fn equip(&self, item_id: impl Into<String>) -> Result<ItemView, RunnerError> {
        let item_id = item_id.into();
        let result = self
            .request(|reply| PetCommand::Equip { item_id, reply })
            .await?;
        Ok(result?)
    }

    /// Equip the next unlocked item.
    pub async fn cycle_next(&self) -> Result<Option<ItemView>, RunnerError> {
        self.request(|reply| PetCommand::CycleNext { reply }).await
    }

    /// Current rounded stats.
    pub async fn snapshot(&self) -> Result<StatSnapshot, RunnerError> {
        self.request(|reply| PetCommand::Snapshot { reply }).await
    }

    /// Current evolution status.
    pub async fn evolution_state(&self) -> Result<EvolutionStatus, RunnerError> {
        self.request(|reply| PetCommand::EvolutionState { reply })
            .await
    }

    /// The evolution journal.
    pub async fn journal(&self) -> Result<EvolutionJournal, RunnerError> {
        self.request(|reply| PetCommand::Journal { reply }).await
    }

    /// The inventory view.
    pub async fn inventory(&self) -> Result<InventoryView, RunnerError> {
        self.request(|reply| PetCommand::Inventory { reply }).await
    }

    /// Save immediately.
    pub async fn save(&self) -> Result<SaveOutcome, RunnerError> {
        let result = self.request(|reply| PetCommand::Save { reply }).await?;
        Ok(result?)
    }

    /// Reset the pet and its save to defaults.
    pub async fn reset_to_defaults(&self) -> Result<(), RunnerError> {
        let result = self.request(|reply| PetCommand::Reset { reply }).await?;
        Ok(result?)
    }

    async fn send(&self, command: PetCommand) -> Result<(), RunnerError> {
        self.commands
            .send(command)
            .await
            .map_err(|_closed| RunnerError::Stopped)
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> PetCommand,
    ) -> Result<T, RunnerError> {
        let (reply, response) = oneshot::channel();
        self.send(build(reply)).await?;
        response.await.map_err(|_closed| RunnerError::Stopped)
    }
}

/// What happened during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Why the loop ended.
    pub end_reason: RunEndReason,
    /// Base ticks processed.
    pub ticks: u64,
    /// Commands handled.
    pub commands: u64,
    /// Autosaves that wrote the document.
    pub autosaves: u64,
    /// Autosaves that failed (each one is in the crash log).
    pub failed_saves: u64,
    /// Result of the final save.
    pub final_save: SaveOutcome,
}

#[derive(Debug, Default)]
struct Tally {
    ticks: u64,
    commands: u64,
    autosaves: u64,
    failed_saves: u64,
}

impl Tally {
    fn record_save(&mut self, result: Result<SaveOutcome, StoreError>) {
        match result {
            Ok(SaveOutcome::Saved) => self.autosaves = self.autosaves.saturating_add(1),
            Ok(SaveOutcome::Skipped) => debug!("autosave skipped"),
            Err(e) => {
                warn!(error = %e, "autosave failed, retrying next period");
                self.failed_saves = self.failed_saves.saturating_add(1);
            }
        }
    }
}

/// Drives a [`PetContext`] until stopped.
#[derive(Debug)]
pub struct Runner {
    context: PetContext,
    commands: mpsc::Receiver<PetCommand>,
    control: Arc<RunControl>,
}

impl Runner {
    /// Wrap `context` and return the runner with a handle to it.
    pub fn new(context: PetContext) -> (Self, RunnerHandle) {
        let (commands_tx, commands) = mpsc::channel(COMMAND_QUEUE_DEPTH);
        let control = Arc::new(RunControl::new());
        let handle = RunnerHandle {
            commands: commands_tx,
            events: context.event_sender(),
            control: Arc::clone(&control),
        };
        (
            Self {
                context,
                commands,
                control,
            },
            handle,
        )
    }

    /// The shared shutdown control.
    pub fn control(&self) -> Arc<RunControl> {
        Arc::clone(&self.control)
    }

    /// Run the loop until a stop is requested or every handle is dropped,
    /// then save one last time.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::Store`] if the final save fails.
    pub async fn run(mut self) -> Result<RunSummary, RunnerError> {
        let schedule = self.context.config().schedule;
        let tick_period = Duration::from_millis(schedule.tick_interval_ms.max(1));
        let autosave_period = Duration::from_millis(schedule.autosave_interval_ms.max(1));
        let mut tick = interval(tick_period);
        tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let first_autosave = Instant::now()
            .checked_add(autosave_period)
            .unwrap_or_else(Instant::now);
        let mut autosave = interval_at(first_autosave, autosave_period);
        autosave.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut tally = Tally::default();

        info!(
            tick_interval_ms = schedule.tick_interval_ms,
            autosave_interval_ms = schedule.autosave_interval_ms,
            "Pet runner starting"
        );
        tally.record_save(self.context.save().await);

        let end_reason = loop {
            if self.control.is_stop_requested() {
                break RunEndReason::StopRequested;
            }

            tokio::select! {
                () = self.control.stopped() => break RunEndReason::StopRequested,
                _ = tick.tick() => {
                    self.context.tick();
                    tally.ticks = tally.ticks.saturating_add(1);
                }
                _ = autosave.tick() => tally.record_save(self.context.save().await),
                command = self.commands.recv() => match command {
                    Some(command) => {
                        self.dispatch(command).await;
                        tally.commands = tally.commands.saturating_add(1);
                    }
                    None => break RunEndReason::HandlesDropped,
                },
            }
        };

        info!(
            ?end_reason,
            ticks = tally.ticks,
            commands = tally.commands,
            "Pet runner stopping, final save"
        );
        let final_save = self.context.save().await?;
        Ok(RunSummary {
            end_reason,
            ticks: tally.ticks,
            commands: tally.commands,
            autosaves: tally.autosaves,
            failed_saves: tally.failed_saves,
            final_save,
        })
    }

    async fn dispatch(&mut self, command: PetCommand) {
        let context = &mut self.context;
        // A dropped reply receiver only means the caller stopped waiting.
        match command {
            PetCommand::Care { kind, reply } => {
                let _ = reply.send(context.care(kind));
            }
            PetCommand::Activity(kind) => context.record_activity(kind),
            PetCommand::TrackInteraction(kind) => context.track_interaction(kind),
            PetCommand::Equip { item_id, reply } => {
                let _ = reply.send(context.equip(&item_id));
            }
            PetCommand::CycleNext { reply } => {
                let _ = reply.send(context.cycle_next());
            }
            PetCommand::Snapshot { reply } => {
                let _ = reply.send(context.snapshot());
            }
            PetCommand::EvolutionState { reply } => {
                let _ = reply.send(context.evolution_state());
            }
            PetCommand::Journal { reply } => {
                let _ = reply.send(context.journal());
            }
            PetCommand::Inventory { reply } => {
                let _ = reply.send(context.inventory());
            }
            PetCommand::Save { reply } => {
                let _ = reply.send(context.save().await);
            }
            PetCommand::Reset { reply } => {
                let _ = reply.send(context.reset_to_defaults().await);
            }
        }
    }
}

/// Log the end of a run.
pub fn log_run_end(summary: &RunSummary) {
    info!(
        reason = ?summary.end_reason,
        ticks = summary.ticks,
        commands = summary.commands,
        autosaves = summary.autosaves,
        failed_saves = summary.failed_saves,
        final_save = ?summary.final_save,
        "Pet runner ended"
    );
    if summary.failed_saves > 0 {
        warn!(
            failed_saves = summary.failed_saves,
            "Some autosaves failed during the run; see the crash log"
        );
    }
}
