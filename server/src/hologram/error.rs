use thiserror::Error;

use crate::sync::SyncError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HologramError {
    /// The hologram was deleted and cannot be changed anymore
    #[error("The hologram has been deleted")]
    Deleted,

    /// No line exists at this index
    #[error("Line index {index} is out of bounds (hologram has {len} lines)")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error(transparent)]
    Sync(#[from] SyncError),
}
