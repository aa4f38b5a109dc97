//! Core payload structs: stat snapshots, care samples, catalog views, and
//! progress reports handed to the presentation layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{Counter, FormPath, InteractionKind, MoodClass, Rarity};

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// Rounded, presentation-ready view of the pet's well-being stats.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct StatSnapshot {
    /// Fullness, 0 (starving) to 100 (full).
    pub hunger: u8,
    /// Cleanliness, 0 (filthy) to 100 (spotless).
    pub cleanliness: u8,
    /// Mood, 0 (miserable) to 100 (delighted).
    pub mood: u8,
    /// When the pet was last fed.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    #[ts(type = "number")]
    pub last_fed: DateTime<Utc>,
    /// When the pet was last cleaned.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    #[ts(type = "number")]
    pub last_cleaned: DateTime<Utc>,
    /// When the pet was last played with.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    #[ts(type = "number")]
    pub last_played: DateTime<Utc>,
    /// Highest-priority mood classification.
    pub mood_class: MoodClass,
    /// Face shown for the current overall state.
    pub mood_emoji: String,
    /// Status line matching `mood_class`.
    pub status: String,
    /// True when any stat is below 30.
    pub needs_attention: bool,
}

/// One entry of the rolling care history.
///
/// `score` is the unweighted mean of the three stats at `timestamp`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct CareSample {
    /// When the sample was taken.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    #[ts(type = "number")]
    pub timestamp: DateTime<Utc>,
    /// Mean of hunger, cleanliness and mood.
    pub score: f64,
    /// Hunger at sample time.
    pub hunger: f64,
    /// Cleanliness at sample time.
    pub cleanliness: f64,
    /// Mood at sample time.
    pub mood: f64,
}

/// Reply to a care action, for the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct CareReceipt {
    /// Which care action was performed.
    pub interaction: InteractionKind,
    /// Line the pet says in response.
    pub message: String,
    /// Rounded value of the stat the action primarily affects.
    pub new_value: u8,
}

// ---------------------------------------------------------------------------
// Evolution
// ---------------------------------------------------------------------------

/// Owned view of an evolution form from the fixed catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct FormView {
    /// Stable catalog identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Emoji rendered for the form.
    pub emoji: String,
    /// Depth in the evolution tree (0 = base).
    pub tier: u8,
    /// Branch the form belongs to.
    pub path: FormPath,
    /// Flavor text.
    pub description: String,
}

/// Progress toward a single evolution requirement.
///
/// Durations are reported in milliseconds. Purely informational: the
/// evaluation itself does not read these values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct RequirementProgress {
    /// Requirement name (`avg_care`, `playtime`, `interactions`, ...).
    pub requirement: String,
    /// Current value.
    pub current: u64,
    /// Threshold that must be reached.
    pub required: u64,
    /// `current / required` as a percentage, capped at 100.
    pub percentage: f64,
}

/// A next-tier evolution candidate with per-requirement progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct CandidateProgress {
    /// The candidate form.
    pub form: FormView,
    /// Progress for each declared requirement, in declaration order.
    pub requirements: Vec<RequirementProgress>,
}

/// Summary of where the pet stands in the evolution tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct EvolutionStatus {
    /// Current form.
    pub current: FormView,
    /// Tier of the current form.
    pub tier: u8,
    /// Rounded average care over the trailing hour.
    pub avg_care: u64,
    /// Total playtime across sessions, in milliseconds.
    pub total_playtime_ms: u64,
    /// Total care interactions.
    pub total_interactions: u64,
    /// Time spent in the current form, in milliseconds.
    pub evolution_age_ms: u64,
    /// Next-tier candidates with progress.
    pub possible_evolutions: Vec<CandidateProgress>,
}

/// The pet's evolution journal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct EvolutionJournal {
    /// Every form the pet has held, oldest first.
    pub history: Vec<FormView>,
    /// Number of transitions taken.
    pub total_evolutions: u32,
    /// Current form.
    pub current_form: FormView,
    /// Start of the current session.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    #[ts(type = "number")]
    pub started_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Inventory
// ---------------------------------------------------------------------------

/// Progress toward unlocking a locked item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct UnlockProgress {
    /// Counter the criterion watches.
    pub counter: Counter,
    /// Current counter value, capped at `required`.
    pub current: u64,
    /// Threshold that unlocks the item.
    pub required: u64,
    /// Rounded percentage, capped at 100.
    pub percentage: f64,
}

/// Owned view of a collectible item with its runtime state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct ItemView {
    /// Stable catalog identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Emoji rendered on the pet.
    pub emoji: String,
    /// Rarity tier.
    pub rarity: Rarity,
    /// Flavor text.
    pub description: String,
    /// Whether the item can be equipped.
    pub unlocked: bool,
    /// Whether the item is currently worn.
    pub equipped: bool,
    /// Unlock progress, present only for locked items with a criterion.
    pub progress: Option<UnlockProgress>,
}

/// The full item catalog with equip state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct InventoryView {
    /// Every catalog item, in catalog order.
    pub items: Vec<ItemView>,
    /// Identifier of the equipped item.
    pub equipped_item: String,
}
