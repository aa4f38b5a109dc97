//! Error types for the meowchi-pet crate.
//!
//! The simulation itself never fails: stats clamp and unmet evolution
//! requirements simply block. The only rejected operation is equipping an
//! item that does not exist or is still locked.

/// Errors returned by [`crate::ProgressTracker::equip`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EquipError {
    /// No catalog item has the requested identifier.
    #[error("item not found: {0}")]
    NotFound(String),

    /// The item exists but has not been unlocked yet.
    #[error("item is locked: {0}")]
    Locked(String),
}

impl EquipError {
    /// Short user-facing reason.
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "Hat not found",
            Self::Locked(_) => "Hat is locked",
        }
    }

    /// Identifier that was requested.
    pub fn item_id(&self) -> &str {
        match self {
            Self::NotFound(id) | Self::Locked(id) => id,
        }
    }
}
