//! Durable storage for the Meowchi virtual pet.
//!
//! A single JSON document holds all persisted pet state. It is written
//! atomically, mirrored to a backup before every overwrite, validated on
//! load, and recovered from the backup (or reset) when it is unusable.
//! Failures are appended to a bounded crash log next to the save.
//!
//! # Modules
//!
//! - [`config`] -- File locations and retention limits ([`StoreConfig`])
//! - [`crash_log`] -- Bounded failure log ([`CrashLog`])
//! - [`error`] -- Error types ([`StoreError`], [`ValidationError`])
//! - [`store`] -- The save/load/recovery protocol ([`PersistenceStore`])
//! - [`validate`] -- Structural checks on stored documents

pub mod config;
pub mod crash_log;
pub mod error;
pub mod store;
pub mod validate;

pub use config::{StoragePaths, StoreConfig};
pub use crash_log::{CrashDetail, CrashEntry, CrashLog};
pub use error::{StoreError, ValidationError};
pub use store::{InitOutcome, PersistenceStore, SaveOutcome};
pub use validate::parse_document;
