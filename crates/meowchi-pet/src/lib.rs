//! Simulation logic for the Meowchi virtual pet.
//!
//! Everything in this crate operates on in-memory state only. It sits
//! between `meowchi-types` (the data definitions) and `meowchi-core` (which
//! wires the components together, schedules them, and persists them).
//!
//! # Modules
//!
//! - [`cadence`] -- Fixed-period timers driven by an external clock ([`Cadence`])
//! - [`catalog`] -- The evolution tree and the hat collection
//! - [`config`] -- Tunables ([`StatsConfig`], [`EvolutionConfig`])
//! - [`error`] -- Error types ([`EquipError`])
//! - [`evolution`] -- The evolution state machine ([`EvolutionEngine`])
//! - [`progress`] -- Counters and collectible unlocks ([`ProgressTracker`])
//! - [`stats`] -- Well-being stats ([`StatSimulator`])

pub mod cadence;
pub mod catalog;
pub mod config;
pub mod error;
pub mod evolution;
pub mod progress;
pub mod stats;

// Re-export primary types at crate root for convenience.
pub use cadence::Cadence;
pub use catalog::{
    CollectibleItem, EvolutionForm, FORMS, ITEMS, Requirement, UnlockCriterion, base_form,
    find_form, find_item,
};
pub use config::{DayClassification, EvolutionConfig, StatsConfig};
pub use error::EquipError;
pub use evolution::{EvolutionEngine, EvolutionTransition};
pub use progress::ProgressTracker;
pub use stats::{StatSet, StatSimulator};
