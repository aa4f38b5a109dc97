//! Bounded on-disk log of failures.
//!
//! Each entry records when something failed, where, and why. The log keeps
//! only the most recent entries. Recording never fails from the caller's
//! point of view: a log that cannot be read is started afresh, and a log
//! that cannot be written is reported through `tracing` and dropped.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// One recorded failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrashEntry {
    /// When the failure was recorded.
    pub timestamp: DateTime<Utc>,
    /// Operation that failed, e.g. `PersistenceStore.save`.
    pub context: String,
    /// What went wrong.
    pub error: CrashDetail,
}

/// Error details of a [`CrashEntry`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrashDetail {
    /// Display form of the error.
    pub message: String,
    /// Display form of the error's source chain, outermost first.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub causes: Vec<String>,
    /// Operating-system error kind, for I/O failures.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl CrashDetail {
    /// Details of a plain message, such as a panic payload.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            causes: Vec::new(),
            code: None,
        }
    }

    /// Details of an error, walking its source chain.
    pub fn from_error(error: &(dyn std::error::Error + 'static)) -> Self {
        let mut causes = Vec::new();
        let mut code = None;
        let mut current: Option<&(dyn std::error::Error + 'static)> = Some(error);
        while let Some(err) = current {
            if code.is_none()
                && let Some(io) = err.downcast_ref::<std::io::Error>()
            {
                code = Some(format!("{:?}", io.kind()));
            }
            current = err.source();
            if let Some(source) = current {
                causes.push(source.to_string());
            }
        }
        Self {
            message: error.to_string(),
            causes,
            code,
        }
    }
}

/// Handle to the crash log file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrashLog {
    path: PathBuf,
    limit: usize,
}

impl CrashLog {
    /// A crash log at `path` keeping the most recent `limit` entries.
    pub const fn new(path: PathBuf, limit: usize) -> Self {
        Self { path, limit }
    }

    /// Location of the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append an entry. Failures are logged and swallowed.
    pub async fn record(&self, context: &str, detail: CrashDetail, now: DateTime<Utc>) {
        let existing = match tokio::fs::read(&self.path).await {
            Ok(bytes) => decode(&bytes),
            Err(_) => Vec::new(),
        };
        let entries = self.appended(existing, context, detail, now);
        match serde_json::to_vec_pretty(&entries) {
            Ok(bytes) => {
                if let Err(e) = tokio::fs::write(&self.path, bytes).await {
                    warn!(path = %self.path.display(), error = %e, "failed to write crash log");
                } else {
                    debug!(context, entries = entries.len(), "failure recorded");
                }
            }
            Err(e) => warn!(error = %e, "failed to encode crash log"),
        }
    }

    /// Blocking variant of [`Self::record`] for contexts without a runtime,
    /// such as a panic hook.
    pub fn record_blocking(&self, context: &str, detail: CrashDetail, now: DateTime<Utc>) {
        let existing = std::fs::read(&self.path).map(|b| decode(&b)).unwrap_or_default();
        let entries = self.appended(existing, context, detail, now);
        let written = serde_json::to_vec_pretty(&entries)
            .map_err(std::io::Error::other)
            .and_then(|bytes| std::fs::write(&self.path, bytes));
        if let Err(e) = written {
            warn!(path = %self.path.display(), error = %e, "failed to write crash log");
        }
    }

    /// Every retained entry, oldest first. An unreadable log is empty.
    pub async fn entries(&self) -> Vec<CrashEntry> {
        tokio::fs::read(&self.path)
            .await
            .map(|bytes| decode(&bytes))
            .unwrap_or_default()
    }

    fn appended(
        &self,
        mut entries: Vec<CrashEntry>,
        context: &str,
        detail: CrashDetail,
        now: DateTime<Utc>,
    ) -> Vec<CrashEntry> {
        entries.push(CrashEntry {
            timestamp: now,
            context: context.to_owned(),
            error: detail,
        });
        let excess = entries.len().saturating_sub(self.limit);
        entries.drain(..excess);
        entries
    }
}

fn decode(bytes: &[u8]) -> Vec<CrashEntry> {
    serde_json::from_slice(bytes).unwrap_or_default()
}
