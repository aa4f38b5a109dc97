//! The persisted save document.
//!
//! This is the on-disk schema shared by the persistence store (which reads
//! and writes it) and the simulation components (which restore from and
//! project into it). Field names are camelCase and timestamps are epoch
//! milliseconds so that saves stay readable by other tooling.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::structs::CareSample;

/// Schema version stamped into every document.
pub const DOCUMENT_VERSION: &str = "1.0.0";

/// Identifier of the tier-0 evolution form.
pub const BASE_FORM_ID: &str = "base";

/// Item equipped on a fresh save.
pub const DEFAULT_EQUIPPED_ITEM: &str = "none";

/// Items unlocked on a fresh save.
pub const DEFAULT_UNLOCKED_ITEMS: [&str; 2] = ["none", "party"];

/// Top-level keys every valid document must carry.
pub const REQUIRED_SECTIONS: [&str; 5] = ["version", "petState", "stats", "inventory", "evolution"];

/// Starting value of every well-being stat.
pub const STARTING_STAT: f64 = 80.0;

/// Versioned aggregate of all persisted pet state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveDocument {
    /// Schema version.
    pub version: String,
    /// When the document was last written, `None` if never.
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub last_saved: Option<DateTime<Utc>>,
    /// Well-being stats and care timestamps.
    pub pet_state: PetStateSection,
    /// Cross-session usage statistics.
    pub stats: SessionStats,
    /// Collectible unlocks, equip state, and counters.
    pub inventory: InventorySection,
    /// Evolution progress and the recent care history.
    pub evolution: EvolutionSection,
}

impl SaveDocument {
    /// Build the schema-default document for a pet created at `now`.
    pub fn fresh(now: DateTime<Utc>) -> Self {
        Self {
            version: DOCUMENT_VERSION.to_owned(),
            last_saved: None,
            pet_state: PetStateSection::fresh(now),
            stats: SessionStats::fresh(now),
            inventory: InventorySection::default(),
            evolution: EvolutionSection::default(),
        }
    }
}

/// Persisted well-being stats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PetStateSection {
    /// Fullness, 0 to 100.
    pub hunger: f64,
    /// Cleanliness, 0 to 100.
    pub cleanliness: f64,
    /// Mood, 0 to 100.
    pub mood: f64,
    /// When the pet was last fed.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub last_fed: DateTime<Utc>,
    /// When the pet was last cleaned.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub last_cleaned: DateTime<Utc>,
    /// When the pet was last played with.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub last_played: DateTime<Utc>,
}

impl PetStateSection {
    /// Starting stats for a pet created at `now`.
    pub const fn fresh(now: DateTime<Utc>) -> Self {
        Self {
            hunger: STARTING_STAT,
            cleanliness: STARTING_STAT,
            mood: STARTING_STAT,
            last_fed: now,
            last_cleaned: now,
            last_played: now,
        }
    }
}

/// Cross-session usage statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStats {
    /// Key presses observed across all sessions.
    #[serde(default)]
    pub total_key_presses: u64,
    /// Mouse clicks observed across all sessions.
    #[serde(default)]
    pub total_mouse_clicks: u64,
    /// Accumulated playtime in milliseconds.
    #[serde(default)]
    pub total_playtime: u64,
    /// Number of sessions started.
    #[serde(default)]
    pub session_count: u64,
    /// When the pet was first created.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub first_played: DateTime<Utc>,
}

impl SessionStats {
    /// Empty statistics for a pet created at `now`.
    pub const fn fresh(now: DateTime<Utc>) -> Self {
        Self {
            total_key_presses: 0,
            total_mouse_clicks: 0,
            total_playtime: 0,
            session_count: 0,
            first_played: now,
        }
    }

    /// Total raw inputs (key presses plus clicks).
    pub const fn total_inputs(&self) -> u64 {
        self.total_key_presses.saturating_add(self.total_mouse_clicks)
    }
}

/// Persisted collectible state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventorySection {
    /// Identifier of the equipped item.
    pub equipped_item: String,
    /// Identifiers of every unlocked item.
    #[serde(default)]
    pub unlocked_items: Vec<String>,
    /// Care-action counters.
    #[serde(default)]
    pub counters: CounterSection,
}

impl Default for InventorySection {
    fn default() -> Self {
        Self {
            equipped_item: DEFAULT_EQUIPPED_ITEM.to_owned(),
            unlocked_items: DEFAULT_UNLOCKED_ITEMS.iter().map(|id| (*id).to_owned()).collect(),
            counters: CounterSection::default(),
        }
    }
}

/// Persisted care-action counters.
///
/// The input counter is not stored here; it is rebuilt from
/// [`SessionStats::total_inputs`] on load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CounterSection {
    /// Feed actions performed.
    #[serde(default)]
    pub feeds: u64,
    /// Clean actions performed.
    #[serde(default)]
    pub cleans: u64,
    /// Play actions performed.
    #[serde(default)]
    pub plays: u64,
}

/// Persisted evolution progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvolutionSection {
    /// Identifier of the current form.
    pub current_form: String,
    /// Every form held, oldest first; ends with `current_form`.
    #[serde(default)]
    pub evolution_history: Vec<String>,
    /// Care interactions performed.
    #[serde(default)]
    pub total_interactions: u64,
    /// Detected neglect periods.
    #[serde(default)]
    pub neglect_periods: u64,
    /// Play actions performed while the pet was hungry or dirty.
    #[serde(default)]
    pub chaos_actions: u64,
    /// Evaluations that found a near-perfect daily average.
    #[serde(default)]
    pub perfect_care_days: u64,
    /// Evaluations that found a balanced daily average.
    #[serde(default)]
    pub balanced_days: u64,
    /// Most recent care samples.
    #[serde(default)]
    pub care_history: Vec<CareSample>,
}

impl Default for EvolutionSection {
    fn default() -> Self {
        Self {
            current_form: BASE_FORM_ID.to_owned(),
            evolution_history: vec![BASE_FORM_ID.to_owned()],
            total_interactions: 0,
            neglect_periods: 0,
            chaos_actions: 0,
            perfect_care_days: 0,
            balanced_days: 0,
            care_history: Vec::new(),
        }
    }
}
