//! Cumulative counters and collectible unlocks.
//!
//! Counters only increase, and an item once unlocked stays unlocked. After
//! every increment the tracker checks each locked item's criterion and
//! reports the items that became available.

use std::collections::{BTreeMap, BTreeSet};

use meowchi_types::{
    Counter, CounterSection, DEFAULT_EQUIPPED_ITEM, InventorySection, InventoryView, ItemUnlocked,
    ItemView, UnlockProgress,
};
use tracing::{info, warn};

use crate::catalog::{CollectibleItem, ITEMS, find_item};
use crate::error::EquipError;

/// Tracks interaction counters, unlocked items, and the equipped item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressTracker {
    counters: BTreeMap<Counter, u64>,
    unlocked: BTreeSet<&'static str>,
    equipped: &'static str,
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressTracker {
    /// Zero counters, default items unlocked, default item equipped.
    pub fn new() -> Self {
        Self {
            counters: Counter::ALL.iter().map(|counter| (*counter, 0)).collect(),
            unlocked: default_unlocked(),
            equipped: DEFAULT_EQUIPPED_ITEM,
        }
    }

    /// Replace the state with a persisted section.
    ///
    /// The input counter is not part of the section; callers pass the total
    /// of recorded key presses and clicks. Default items are always
    /// unlocked, unknown identifiers are dropped, and any criterion already
    /// met by the restored counters unlocks its item.
    pub fn restore(&mut self, section: &InventorySection, inputs_total: u64) {
        self.counters = BTreeMap::from([
            (Counter::Inputs, inputs_total),
            (Counter::Feeds, section.counters.feeds),
            (Counter::Cleans, section.counters.cleans),
            (Counter::Plays, section.counters.plays),
        ]);

        self.unlocked = default_unlocked();
        for id in &section.unlocked_items {
            match find_item(id) {
                Some(item) => {
                    self.unlocked.insert(item.id);
                }
                None => warn!(item = %id, "unknown item in save, dropping"),
            }
        }
        let _ = self.unlock_satisfied();

        self.equipped = match find_item(&section.equipped_item) {
            Some(item) if self.unlocked.contains(item.id) => item.id,
            _ => {
                warn!(item = %section.equipped_item, "equipped item unavailable, using default");
                DEFAULT_EQUIPPED_ITEM
            }
        };
    }

    /// Projection into the persisted section.
    pub fn persisted(&self) -> InventorySection {
        InventorySection {
            equipped_item: self.equipped.to_owned(),
            unlocked_items: ITEMS
                .iter()
                .filter(|item| self.unlocked.contains(item.id))
                .map(|item| item.id.to_owned())
                .collect(),
            counters: CounterSection {
                feeds: self.counter(Counter::Feeds),
                cleans: self.counter(Counter::Cleans),
                plays: self.counter(Counter::Plays),
            },
        }
    }

    /// Current value of `counter`.
    pub fn counter(&self, counter: Counter) -> u64 {
        self.counters.get(&counter).copied().unwrap_or(0)
    }

    /// Whether the item with `id` is unlocked.
    pub fn is_unlocked(&self, id: &str) -> bool {
        self.unlocked.contains(id)
    }

    /// Add `amount` to `counter` and return the items this unlocked.
    pub fn increment(&mut self, counter: Counter, amount: u64) -> Vec<&'static CollectibleItem> {
        let value = self.counters.entry(counter).or_insert(0);
        *value = value.saturating_add(amount);
        self.unlock_satisfied()
    }

    /// Equip an unlocked item. State is unchanged on error.
    pub fn equip(&mut self, id: &str) -> Result<&'static CollectibleItem, EquipError> {
        let item = find_item(id).ok_or_else(|| EquipError::NotFound(id.to_owned()))?;
        if !self.unlocked.contains(item.id) {
            return Err(EquipError::Locked(id.to_owned()));
        }
        self.equipped = item.id;
        info!(item = item.id, "item equipped");
        Ok(item)
    }

    /// Equip the next unlocked item in catalog order, wrapping around.
    pub fn cycle_next(&mut self) -> Option<&'static CollectibleItem> {
        let unlocked: Vec<&'static CollectibleItem> = ITEMS
            .iter()
            .filter(|item| self.unlocked.contains(item.id))
            .collect();
        let next = unlocked
            .iter()
            .position(|item| item.id == self.equipped)
            .and_then(|pos| unlocked.get(pos.saturating_add(1)))
            .or_else(|| unlocked.first())
            .copied()?;
        self.equipped = next.id;
        Some(next)
    }

    /// The equipped item.
    pub fn equipped(&self) -> Option<&'static CollectibleItem> {
        find_item(self.equipped)
    }

    /// Identifier of the equipped item.
    pub const fn equipped_id(&self) -> &'static str {
        self.equipped
    }

    /// Progress toward unlocking `item`, `None` once it is unlocked or if it
    /// has no criterion.
    pub fn unlock_progress(&self, item: &CollectibleItem) -> Option<UnlockProgress> {
        if self.unlocked.contains(item.id) {
            return None;
        }
        let criterion = item.criterion?;
        let current = self.counter(criterion.counter);
        Some(UnlockProgress {
            counter: criterion.counter,
            current: current.min(criterion.threshold),
            required: criterion.threshold,
            percentage: rounded_percentage(current, criterion.threshold),
        })
    }

    /// Presentation view of one catalog item.
    pub fn item_view(&self, item: &CollectibleItem) -> ItemView {
        ItemView {
            id: item.id.to_owned(),
            name: item.name.to_owned(),
            emoji: item.emoji.to_owned(),
            rarity: item.rarity,
            description: item.description.to_owned(),
            unlocked: self.unlocked.contains(item.id),
            equipped: item.id == self.equipped,
            progress: self.unlock_progress(item),
        }
    }

    /// Every catalog item with its runtime state.
    pub fn inventory(&self) -> InventoryView {
        InventoryView {
            items: ITEMS.iter().map(|item| self.item_view(item)).collect(),
            equipped_item: self.equipped.to_owned(),
        }
    }

    /// Notification payload announcing `item`.
    pub fn unlock_event(&self, item: &CollectibleItem) -> ItemUnlocked {
        ItemUnlocked {
            item: self.item_view(item),
            message: format!("🎉 New hat unlocked: {}!", item.name),
        }
    }

    fn unlock_satisfied(&mut self) -> Vec<&'static CollectibleItem> {
        let newly: Vec<&'static CollectibleItem> = ITEMS
            .iter()
            .filter(|item| !self.unlocked.contains(item.id))
            .filter(|item| {
                item.criterion
                    .is_some_and(|c| self.counter(c.counter) >= c.threshold)
            })
            .collect();
        for item in &newly {
            self.unlocked.insert(item.id);
            info!(item = item.id, rarity = ?item.rarity, "item unlocked");
        }
        newly
    }
}

fn default_unlocked() -> BTreeSet<&'static str> {
    ITEMS
        .iter()
        .filter(|item| item.unlocked_by_default)
        .map(|item| item.id)
        .collect()
}

#[allow(clippy::cast_precision_loss)]
fn rounded_percentage(current: u64, required: u64) -> f64 {
    if required == 0 {
        return 100.0;
    }
    (current as f64 / required as f64 * 100.0).round().min(100.0)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn fresh_tracker_has_default_items() {
        let tracker = ProgressTracker::new();
        assert!(tracker.is_unlocked("none"));
        assert!(tracker.is_unlocked("party"));
        assert!(!tracker.is_unlocked("crown"));
        assert_eq!(tracker.equipped_id(), "none");
    }

    #[test]
    fn increment_reports_new_unlocks_once() {
        let mut tracker = ProgressTracker::new();
        assert!(tracker.increment(Counter::Feeds, 19).is_empty());

        let unlocked = tracker.increment(Counter::Feeds, 1);
        let ids: Vec<_> = unlocked.iter().map(|item| item.id).collect();
        assert_eq!(ids, ["chef"]);

        assert!(tracker.increment(Counter::Feeds, 1).is_empty());
        assert!(tracker.is_unlocked("chef"));
    }

    #[test]
    fn one_increment_can_unlock_several_items() {
        let mut tracker = ProgressTracker::new();
        let unlocked = tracker.increment(Counter::Inputs, 1000);
        let ids: Vec<_> = unlocked.iter().map(|item| item.id).collect();
        assert_eq!(ids, ["crown", "wizard", "cowboy"]);
    }

    #[test]
    fn equip_unknown_item_is_not_found() {
        let mut tracker = ProgressTracker::new();
        let err = tracker.equip("unknown-id").unwrap_err();
        assert_eq!(err, EquipError::NotFound("unknown-id".to_owned()));
        assert_eq!(err.reason(), "Hat not found");
        assert_eq!(tracker.equipped_id(), "none");
    }

    #[test]
    fn equip_locked_item_is_rejected() {
        let mut tracker = ProgressTracker::new();
        let err = tracker.equip("santa").unwrap_err();
        assert!(matches!(err, EquipError::Locked(_)));
        assert_eq!(tracker.equipped_id(), "none");

        assert_eq!(tracker.equip("party").unwrap().id, "party");
        assert_eq!(tracker.equipped_id(), "party");
    }

    #[test]
    fn cycle_walks_unlocked_items_and_wraps() {
        let mut tracker = ProgressTracker::new();
        tracker.increment(Counter::Plays, 50);
        let order: Vec<_> = (0..4).map(|_| tracker.cycle_next().unwrap().id).collect();
        assert_eq!(order, ["party", "pirate", "none", "party"]);
    }

    #[test]
    fn progress_is_capped_for_locked_items_only() {
        let mut tracker = ProgressTracker::new();
        tracker.increment(Counter::Inputs, 300);
        let inventory = tracker.inventory();

        let crown = inventory.items.iter().find(|item| item.id == "crown").unwrap();
        let progress = crown.progress.as_ref().unwrap();
        assert_eq!((progress.current, progress.required), (300, 500));
        assert!((progress.percentage - 60.0).abs() < f64::EPSILON);

        let cowboy = inventory.items.iter().find(|item| item.id == "cowboy").unwrap();
        assert!(cowboy.unlocked);
        assert!(cowboy.progress.is_none());

        let party = inventory.items.iter().find(|item| item.id == "party").unwrap();
        assert!(party.progress.is_none());
        assert_eq!(inventory, tracker.inventory());
    }

    #[test]
    fn restore_merges_defaults_and_reevaluates() {
        let section = InventorySection {
            equipped_item: "wizard".to_owned(),
            unlocked_items: vec!["pirate".to_owned(), "jetpack".to_owned()],
            counters: CounterSection {
                feeds: 25,
                cleans: 3,
                plays: 1,
            },
        };
        let mut tracker = ProgressTracker::new();
        tracker.restore(&section, 600);

        assert!(tracker.is_unlocked("none"));
        assert!(tracker.is_unlocked("pirate"));
        assert!(tracker.is_unlocked("chef"));
        assert!(tracker.is_unlocked("crown"));
        // Wizard needs 1000 inputs, so the save's equip is not honored.
        assert_eq!(tracker.equipped_id(), "none");
        assert_eq!(tracker.counter(Counter::Inputs), 600);

        let persisted = tracker.persisted();
        assert_eq!(persisted.unlocked_items, ["none", "party", "crown", "chef", "pirate", "cowboy"]);
        assert_eq!(persisted.counters.feeds, 25);
    }

    #[test]
    fn unlock_message_names_the_item() {
        let tracker = ProgressTracker::new();
        let event = tracker.unlock_event(find_item("crown").unwrap());
        assert_eq!(event.message, "🎉 New hat unlocked: Royal Crown!");
    }
}
