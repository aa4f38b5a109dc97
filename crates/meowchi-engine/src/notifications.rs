//! Log subscriber for pet notifications.
//!
//! Without a presentation layer attached, the engine still wants the
//! interesting moments in its log: evolutions, unlocks, and a pet that
//! needs attention.

use meowchi_types::PetEvent;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, info, warn};

/// Drain `events` into the log until the channel closes.
pub async fn log_notifications(mut events: broadcast::Receiver<PetEvent>) {
    let mut needed_attention = false;
    loop {
        match events.recv().await {
            Ok(PetEvent::StatsUpdated(snapshot)) => {
                if snapshot.needs_attention && !needed_attention {
                    warn!(
                        hunger = snapshot.hunger,
                        cleanliness = snapshot.cleanliness,
                        mood = snapshot.mood,
                        status = %snapshot.status,
                        "Meowchi needs attention"
                    );
                }
                needed_attention = snapshot.needs_attention;
                debug!(
                    hunger = snapshot.hunger,
                    cleanliness = snapshot.cleanliness,
                    mood = snapshot.mood,
                    emoji = %snapshot.mood_emoji,
                    "stats updated"
                );
            }
            Ok(PetEvent::EvolutionTriggered(evolution)) => {
                info!(
                    from = %evolution.old_form.id,
                    to = %evolution.new_form.id,
                    "{}",
                    evolution.message
                );
            }
            Ok(PetEvent::ItemUnlocked(unlocked)) => {
                info!(item = %unlocked.item.id, "{}", unlocked.message);
            }
            Ok(PetEvent::InventoryUpdated(inventory)) => {
                debug!(equipped = %inventory.equipped_item, "inventory updated");
            }
            Ok(PetEvent::SaveReset) => info!("save data reset"),
            Err(RecvError::Lagged(skipped)) => {
                debug!(skipped, "notification logger lagged");
            }
            Err(RecvError::Closed) => break,
        }
    }
}
