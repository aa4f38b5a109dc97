//! Wiring, scheduling, and configuration for the Meowchi virtual pet.
//!
//! This crate assembles the simulation components from `meowchi-pet` and
//! the storage from `meowchi-store` into a running pet.
//!
//! # Modules
//!
//! - [`clock`] -- [`Clock`] trait with the system clock and a manual clock
//!   for tests.
//! - [`config`] -- Configuration loading from `meowchi.yaml` into
//!   strongly-typed structs.
//! - [`context`] -- [`PetContext`], which owns the components and
//!   propagates effects between them.
//! - [`control`] -- Shared stop flag for the runner.
//! - [`runner`] -- The async loop (ticks, autosave, commands, shutdown) and
//!   its [`RunnerHandle`].
//!
//! [`Clock`]: clock::Clock
//! [`PetContext`]: context::PetContext
//! [`RunnerHandle`]: runner::RunnerHandle

pub mod clock;
pub mod config;
pub mod context;
pub mod control;
pub mod runner;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ConfigError, PetConfig};
pub use context::PetContext;
pub use control::{RunControl, RunEndReason};
pub use runner::{PetCommand, RunSummary, Runner, RunnerError, RunnerHandle};
