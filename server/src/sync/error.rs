use thiserror::Error;

use holosync_shared::{CarrierError, CarrierKind, ChunkPos, EntityId, WorldId};

/// Why a carrier could not be registered with the host.
///
/// The carrier is dead when this is returned; the owning line should try
/// again on the next world or chunk load.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpawnError {
    /// The target chunk is not loaded
    #[error("Cannot spawn {entity_id} in {world}: chunk {chunk} is not loaded")]
    ChunkNotLoaded {
        entity_id: EntityId,
        world: WorldId,
        chunk: ChunkPos,
    },

    /// The host refused the registration
    #[error("The host rejected registration of {entity_id} in {world}")]
    HostRejected { entity_id: EntityId, world: WorldId },

    /// The render state is for a different kind of carrier
    #[error("A {kind} carrier cannot show {render} content")]
    RenderKindMismatch {
        kind: CarrierKind,
        render: &'static str,
    },
}

/// Errors from operating on an existing carrier
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    /// The handle does not refer to a tracked carrier
    #[error("{entity_id} is not tracked by this manager")]
    UnknownHandle { entity_id: EntityId },

    /// The carrier is not in the Active state
    #[error("{entity_id} is not active")]
    NotActive { entity_id: EntityId },

    /// The render state is for a different kind of carrier
    #[error("{entity_id} is a {kind} carrier and cannot show {render} content")]
    KindMismatch {
        entity_id: EntityId,
        kind: CarrierKind,
        render: &'static str,
    },

    /// Mount linkage or lifecycle bookkeeping failed
    #[error(transparent)]
    Carrier(#[from] CarrierError),
}
