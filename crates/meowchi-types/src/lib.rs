//! Shared type definitions for the Meowchi virtual pet.
//!
//! This crate is the single source of truth for the data that crosses
//! component boundaries: stat snapshots, care samples, catalog views, push
//! notifications, and the persisted save document. Presentation-facing types
//! flow downstream to `TypeScript` via `ts-rs`.
//!
//! # Modules
//!
//! - [`enums`] -- Paths, rarities, counters, mood classes, interaction kinds
//! - [`structs`] -- Snapshots, care samples, and catalog/progress views
//! - [`events`] -- Push notifications ([`PetEvent`])
//! - [`document`] -- The persisted save document ([`SaveDocument`])

pub mod document;
pub mod enums;
pub mod events;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use document::{
    BASE_FORM_ID, CounterSection, DEFAULT_EQUIPPED_ITEM, DEFAULT_UNLOCKED_ITEMS, DOCUMENT_VERSION,
    EvolutionSection, InventorySection, PetStateSection, REQUIRED_SECTIONS, STARTING_STAT,
    SaveDocument, SessionStats,
};
pub use enums::{ActivityKind, Counter, FormPath, InteractionKind, MoodClass, Rarity};
pub use events::{EvolutionTriggered, ItemUnlocked, PetEvent};
pub use structs::{
    CandidateProgress, CareReceipt, CareSample, EvolutionJournal, EvolutionStatus, FormView,
    InventoryView, ItemView, RequirementProgress, StatSnapshot, UnlockProgress,
};

#[cfg(test)]
mod tests {
    //! `TypeScript` binding generation for the presentation layer.

    #[test]
    fn export_bindings() {
        // ts-rs writes the files to the `bindings/` directory relative to
        // the crate root.
        use ts_rs::TS;

        // Enums
        let _ = crate::enums::FormPath::export_all();
        let _ = crate::enums::Rarity::export_all();
        let _ = crate::enums::Counter::export_all();
        let _ = crate::enums::MoodClass::export_all();
        let _ = crate::enums::InteractionKind::export_all();
        let _ = crate::enums::ActivityKind::export_all();

        // Structs
        let _ = crate::structs::StatSnapshot::export_all();
        let _ = crate::structs::CareSample::export_all();
        let _ = crate::structs::CareReceipt::export_all();
        let _ = crate::structs::FormView::export_all();
        let _ = crate::structs::RequirementProgress::export_all();
        let _ = crate::structs::CandidateProgress::export_all();
        let _ = crate::structs::EvolutionStatus::export_all();
        let _ = crate::structs::EvolutionJournal::export_all();
        let _ = crate::structs::UnlockProgress::export_all();
        let _ = crate::structs::ItemView::export_all();
        let _ = crate::structs::InventoryView::export_all();

        // Events
        let _ = crate::events::PetEvent::export_all();
        let _ = crate::events::EvolutionTriggered::export_all();
        let _ = crate::events::ItemUnlocked::export_all();
    }
}
