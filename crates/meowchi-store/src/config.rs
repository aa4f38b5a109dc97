//! Storage locations and retention limits.
//!
//! Deserialized from the `storage` section of `meowchi.yaml`.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Storage configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Directory holding the save, backup, and crash log.
    pub save_dir: PathBuf,

    /// File name of the primary save (default: `meowchi-save.json`).
    pub save_file: String,

    /// File name of the backup mirror (default: `meowchi-save.backup.json`).
    pub backup_file: String,

    /// File name of the crash log (default: `crashlog.json`).
    pub crash_log_file: String,

    /// Care samples written per save, most recent first (default: 100).
    pub care_history_limit: usize,

    /// Crash log entries retained (default: 50).
    pub crash_log_limit: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            save_dir: PathBuf::from("meowchi-data"),
            save_file: "meowchi-save.json".to_owned(),
            backup_file: "meowchi-save.backup.json".to_owned(),
            crash_log_file: "crashlog.json".to_owned(),
            care_history_limit: 100,
            crash_log_limit: 50,
        }
    }
}

impl StoreConfig {
    /// Default configuration rooted at `dir`.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            save_dir: dir.into(),
            ..Self::default()
        }
    }

    /// Resolve the file locations.
    pub fn paths(&self) -> StoragePaths {
        StoragePaths {
            dir: self.save_dir.clone(),
            primary: self.save_dir.join(&self.save_file),
            backup: self.save_dir.join(&self.backup_file),
            crash_log: self.save_dir.join(&self.crash_log_file),
        }
    }
}

/// Resolved file locations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoragePaths {
    /// Storage directory.
    pub dir: PathBuf,
    /// Primary save document.
    pub primary: PathBuf,
    /// Backup mirror of the primary.
    pub backup: PathBuf,
    /// Crash log.
    pub crash_log: PathBuf,
}

impl StoragePaths {
    /// Scratch file used for atomic replacement of `target`.
    pub fn temp_for(target: &Path) -> PathBuf {
        let mut name = target.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        name.push(".tmp");
        target.with_file_name(name)
    }
}
