//! The persistence store: primary save, backup mirror, and recovery.
//!
//! # Save protocol
//!
//! 1. Skip if another save is already in flight
//! 2. Stamp `lastSaved` and keep only the most recent care samples
//! 3. Copy the current primary over the backup (a missing primary is fine)
//! 4. Write the new primary to a scratch file and rename it into place
//!
//! The backup is therefore always a byte-identical copy of the primary as
//! of the previous successful save.
//!
//! # Load protocol
//!
//! The primary is validated ([`crate::validate`]) before it is trusted. A
//! rejected primary is replaced by the backup if that validates, otherwise
//! by a fresh document, and the replacement is written back to the primary.
//! A primary that cannot be read at all is an I/O failure, not a rejection:
//! it is left on disk and the fresh in-memory document is not written back.

use std::io::ErrorKind;
use std::path::Path;

use chrono::{DateTime, Utc};
use meowchi_types::SaveDocument;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::config::{StoreConfig, StoragePaths};
use crate::crash_log::{CrashDetail, CrashLog};
use crate::error::StoreError;
use crate::validate::parse_document;

/// How [`PersistenceStore::initialize`] obtained its document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitOutcome {
    /// The primary save was valid.
    Loaded,
    /// No save existed; a fresh document was written.
    Seeded,
    /// The primary was rejected and the backup was restored.
    RecoveredFromBackup,
    /// Neither file was usable; a fresh document was written.
    ResetToDefaults,
}

/// Result of a [`PersistenceStore::save`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The document was written.
    Saved,
    /// Another save was in flight; nothing was written.
    Skipped,
}

/// Durable storage for the save document.
#[derive(Debug)]
pub struct PersistenceStore {
    config: StoreConfig,
    paths: StoragePaths,
    document: RwLock<SaveDocument>,
    save_lock: Mutex<()>,
    crash_log: CrashLog,
}

impl PersistenceStore {
    /// A store over `config`. Call [`Self::initialize`] before use; until
    /// then the in-memory document is a fresh one created at `now`.
    pub fn new(config: StoreConfig, now: DateTime<Utc>) -> Self {
        let paths = config.paths();
        let crash_log = CrashLog::new(paths.crash_log.clone(), config.crash_log_limit);
        Self {
            config,
            paths,
            document: RwLock::new(SaveDocument::fresh(now)),
            save_lock: Mutex::new(()),
            crash_log,
        }
    }

    /// Resolved file locations.
    pub const fn paths(&self) -> &StoragePaths {
        &self.paths
    }

    /// The crash log.
    pub const fn crash_log(&self) -> &CrashLog {
        &self.crash_log
    }

    /// Load (or create) the save document.
    ///
    /// Always leaves a well-formed document in memory, even when an error is
    /// returned for a write that could not be completed.
    pub async fn initialize(&self, now: DateTime<Utc>) -> Result<InitOutcome, StoreError> {
        if let Err(e) = tokio::fs::create_dir_all(&self.paths.dir).await {
            let err = StoreError::io("creating the storage directory", e);
            self.record_failure("PersistenceStore.initialize", &err, now).await;
            return Err(err);
        }

        let (document, outcome) = match tokio::fs::read(&self.paths.primary).await {
            Ok(bytes) => match parse_document(&bytes) {
                Ok(document) => (document, InitOutcome::Loaded),
                Err(reason) => {
                    warn!(error = %reason, "primary save rejected, attempting recovery");
                    self.recover(now).await
                }
            },
            Err(e) if e.kind() == ErrorKind::NotFound => {
                (SaveDocument::fresh(now), InitOutcome::Seeded)
            }
            Err(e) => {
                // The primary may still be valid; keep it on disk untouched.
                let err = StoreError::io("reading the primary save", e);
                self.record_failure("PersistenceStore.initialize", &err, now).await;
                return Err(err);
            }
        };

        *self.document.write().await = document.clone();

        if outcome != InitOutcome::Loaded {
            let _guard = self.save_lock.lock().await;
            if let Err(err) = write_atomic(&self.paths.primary, &document).await {
                self.record_failure("PersistenceStore.initialize", &err, now).await;
                return Err(err);
            }
        }

        info!(?outcome, path = %self.paths.primary.display(), "save system initialized");
        Ok(outcome)
    }

    /// Start a session: bump the session counter and return the document.
    pub async fn load_session(&self) -> SaveDocument {
        let mut document = self.document.write().await;
        document.stats.session_count = document.stats.session_count.saturating_add(1);
        debug!(session = document.stats.session_count, "session started");
        document.clone()
    }

    /// The most recently loaded or saved document.
    pub async fn document(&self) -> SaveDocument {
        self.document.read().await.clone()
    }

    /// Persist `document`.
    ///
    /// Returns [`SaveOutcome::Skipped`] without touching disk if another
    /// save is in flight. Write failures are recorded in the crash log and
    /// returned; a failed backup copy is recorded but does not stop the save.
    pub async fn save(
        &self,
        mut document: SaveDocument,
        now: DateTime<Utc>,
    ) -> Result<SaveOutcome, StoreError> {
        let Ok(_guard) = self.save_lock.try_lock() else {
            debug!("save already in flight, skipping");
            return Ok(SaveOutcome::Skipped);
        };

        document.last_saved = Some(now);
        let history = &mut document.evolution.care_history;
        let excess = history.len().saturating_sub(self.config.care_history_limit);
        history.drain(..excess);

        self.create_backup(now).await;

        if let Err(err) = write_atomic(&self.paths.primary, &document).await {
            self.record_failure("PersistenceStore.save", &err, now).await;
            return Err(err);
        }

        *self.document.write().await = document;
        debug!(path = %self.paths.primary.display(), "game saved");
        Ok(SaveOutcome::Saved)
    }

    /// Overwrite the save with a fresh document created at `now`.
    pub async fn reset_to_defaults(&self, now: DateTime<Utc>) -> Result<SaveDocument, StoreError> {
        let _guard = self.save_lock.lock().await;
        let document = SaveDocument::fresh(now);
        if let Err(err) = write_atomic(&self.paths.primary, &document).await {
            self.record_failure("PersistenceStore.reset_to_defaults", &err, now).await;
            return Err(err);
        }
        *self.document.write().await = document.clone();
        info!("save data reset");
        Ok(document)
    }

    /// Append a failure to the crash log. Never fails.
    pub async fn record_failure(
        &self,
        context: &str,
        error: &(dyn std::error::Error + Send + Sync + 'static),
        now: DateTime<Utc>,
    ) {
        warn!(context, error = %error, "operation failed");
        self.crash_log
            .record(context, CrashDetail::from_error(error), now)
            .await;
    }

    async fn recover(&self, now: DateTime<Utc>) -> (SaveDocument, InitOutcome) {
        match tokio::fs::read(&self.paths.backup).await {
            Ok(bytes) => match parse_document(&bytes) {
                Ok(document) => {
                    info!("recovered from backup save");
                    return (document, InitOutcome::RecoveredFromBackup);
                }
                Err(reason) => warn!(error = %reason, "backup save rejected"),
            },
            Err(e) => warn!(error = %e, "backup save unreadable"),
        }
        info!("creating fresh save data");
        (SaveDocument::fresh(now), InitOutcome::ResetToDefaults)
    }

    async fn create_backup(&self, now: DateTime<Utc>) {
        match tokio::fs::copy(&self.paths.primary, &self.paths.backup).await {
            Ok(_) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => {
                let err = StoreError::io("creating the backup", e);
                self.record_failure("PersistenceStore.backup", &err, now).await;
            }
        }
    }
}

/// Serialize `document` and atomically replace `target` with it.
async fn write_atomic(target: &Path, document: &SaveDocument) -> Result<(), StoreError> {
    let bytes = serde_json::to_vec_pretty(document)?;
    let temp = StoragePaths::temp_for(target);
    tokio::fs::write(&temp, &bytes)
        .await
        .map_err(|e| StoreError::io("writing the scratch save", e))?;
    tokio::fs::rename(&temp, target)
        .await
        .map_err(|e| StoreError::io("replacing the primary save", e))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    #[tokio::test]
    async fn save_in_flight_skips_the_next_save() {
        let dir = tempfile::tempdir().unwrap();
        let store = PersistenceStore::new(StoreConfig::in_dir(dir.path().join("save")), at(0));
        store.initialize(at(0)).await.unwrap();
        let document = store.document().await;

        let guard = store.save_lock.lock().await;
        let outcome = store.save(document.clone(), at(1)).await.unwrap();
        assert_eq!(outcome, SaveOutcome::Skipped);
        assert_eq!(store.document().await.last_saved, None);
        drop(guard);

        let outcome = store.save(document, at(2)).await.unwrap();
        assert_eq!(outcome, SaveOutcome::Saved);
        assert_eq!(store.document().await.last_saved, Some(at(2)));
    }
}
