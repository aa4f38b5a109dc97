//! Enumeration types shared across the Meowchi workspace.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Evolution paths
// ---------------------------------------------------------------------------

/// Branch of the evolution tree a form belongs to.
///
/// The base form sits on no branch; every other form is reached by a
/// sustained pattern of good, middling, or poor care.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum FormPath {
    /// Reached through consistently attentive care.
    Good,
    /// Reached through balanced, low-intensity care.
    Neutral,
    /// Reached through neglect and chaotic play.
    Bad,
    /// The root of the tree.
    None,
}

// ---------------------------------------------------------------------------
// Collectibles
// ---------------------------------------------------------------------------

/// Rarity tier of a collectible item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum Rarity {
    /// Available from the start or after light play.
    Common,
    /// Requires a noticeable amount of interaction.
    Rare,
    /// Long-term rewards.
    Epic,
}

/// A cumulative interaction counter tracked for item unlocks.
///
/// Counters only ever increase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum Counter {
    /// Raw input events (key presses and mouse clicks).
    Inputs,
    /// Feed care actions.
    Feeds,
    /// Clean care actions.
    Cleans,
    /// Play care actions.
    Plays,
}

impl Counter {
    /// Every counter, in a stable order.
    pub const ALL: [Self; 4] = [Self::Inputs, Self::Feeds, Self::Cleans, Self::Plays];

    /// Stable lowercase name used in logs and the persisted document.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Inputs => "inputs",
            Self::Feeds => "feeds",
            Self::Cleans => "cleans",
            Self::Plays => "plays",
        }
    }
}

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// Derived mood classification of the pet, in priority order.
///
/// The first matching class wins: a starving pet is reported as starving
/// even if it is also dirty and sad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum MoodClass {
    /// Hunger below 20.
    Starving,
    /// Cleanliness below 20.
    Dirty,
    /// Mood below 20.
    Sad,
    /// Hunger below 50.
    Hungry,
    /// Cleanliness below 50.
    Grubby,
    /// Mood below 50.
    Bored,
    /// Mood at or above 80.
    Happy,
    /// Nothing notable.
    Neutral,
}

impl MoodClass {
    /// Status line shown next to the pet for this class.
    pub const fn status_message(self) -> &'static str {
        match self {
            Self::Starving => "Starving! Feed me! 🍔",
            Self::Dirty => "I need a bath! 🛁",
            Self::Sad => "I'm sad... play with me? 😢",
            Self::Hungry => "Getting hungry... 🍽️",
            Self::Grubby => "Feeling a bit dirty... 🧽",
            Self::Bored => "I'm bored... 🎮",
            Self::Happy => "I'm so happy! 💖",
            Self::Neutral => "Doing okay! 😊",
        }
    }
}

// ---------------------------------------------------------------------------
// Interactions
// ---------------------------------------------------------------------------

/// A deliberate care interaction performed by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum InteractionKind {
    /// Feeding raises hunger.
    Feed,
    /// Cleaning raises cleanliness.
    Clean,
    /// Playing raises mood at a small cost to hunger and cleanliness.
    Play,
}

impl InteractionKind {
    /// The progress counter this interaction feeds.
    pub const fn counter(self) -> Counter {
        match self {
            Self::Feed => Counter::Feeds,
            Self::Clean => Counter::Cleans,
            Self::Play => Counter::Plays,
        }
    }
}

/// A raw input event reported by the activity source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum ActivityKind {
    /// A keyboard key went down.
    KeyPress,
    /// A mouse button was clicked.
    MouseClick,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_serialize_as_lowercase_names() {
        for counter in Counter::ALL {
            let json = serde_json::to_string(&counter).unwrap_or_default();
            assert_eq!(json, format!("\"{}\"", counter.as_str()));
        }
    }

    #[test]
    fn interactions_map_to_counters() {
        assert_eq!(InteractionKind::Feed.counter(), Counter::Feeds);
        assert_eq!(InteractionKind::Clean.counter(), Counter::Cleans);
        assert_eq!(InteractionKind::Play.counter(), Counter::Plays);
    }

    #[test]
    fn form_path_none_is_snake_case() {
        let json = serde_json::to_string(&FormPath::None).unwrap_or_default();
        assert_eq!(json, "\"none\"");
    }
}
