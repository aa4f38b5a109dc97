//! Push notifications emitted to subscribers (the presentation layer).

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::structs::{FormView, InventoryView, ItemView, StatSnapshot};

/// A notification pushed to every subscriber of the pet context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum PetEvent {
    /// The stat snapshot changed.
    StatsUpdated(StatSnapshot),
    /// The pet moved to a new evolution form.
    EvolutionTriggered(EvolutionTriggered),
    /// A collectible item was unlocked.
    ItemUnlocked(ItemUnlocked),
    /// The inventory (catalog or equip state) changed.
    InventoryUpdated(InventoryView),
    /// The save was wiped and every component reset to defaults.
    SaveReset,
}

/// Payload of [`PetEvent::EvolutionTriggered`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct EvolutionTriggered {
    /// Form before the transition.
    pub old_form: FormView,
    /// Form after the transition.
    pub new_form: FormView,
    /// Announcement text.
    pub message: String,
}

/// Payload of [`PetEvent::ItemUnlocked`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct ItemUnlocked {
    /// The newly unlocked item.
    pub item: ItemView,
    /// Announcement text.
    pub message: String,
}

impl PetEvent {
    /// Short name used as a structured log field.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::StatsUpdated(_) => "stats_updated",
            Self::EvolutionTriggered(_) => "evolution_triggered",
            Self::ItemUnlocked(_) => "item_unlocked",
            Self::InventoryUpdated(_) => "inventory_updated",
            Self::SaveReset => "save_reset",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_reset_serializes_with_tag_only() {
        let json = serde_json::to_value(PetEvent::SaveReset).unwrap_or_default();
        assert_eq!(json, serde_json::json!({ "type": "save_reset" }));
    }

    #[test]
    fn kind_matches_serde_tag() {
        let event = PetEvent::InventoryUpdated(InventoryView {
            items: Vec::new(),
            equipped_item: "none".to_owned(),
        });
        let json = serde_json::to_value(&event).unwrap_or_default();
        assert_eq!(json.get("type").and_then(|v| v.as_str()), Some(event.kind()));
    }
}
