//! # Holosync Server
//! Spawns inert carrier entities for hologram lines, keeps the host's entity
//! bookkeeping in step with them, and sends every viewer only the spawn,
//! metadata and destroy packets it needs, with placeholders resolved per
//! viewer.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

pub mod shared {
    pub use holosync_shared::{
        ChunkPos, EntityId, ItemStack, LineId, Position, ProtocolRevision, Settings,
        TextComponent, ViewerId, WorldId,
    };
}

mod hologram;
mod pinger;
mod runtime;
mod sync;
mod transport;

pub use hologram::{
    Hologram, HologramError, HologramLine, LineContent, ITEM_LINE_HEIGHT, TEXT_LINE_HEIGHT,
};
pub use pinger::{
    fetch_status, PingError, ServerStatus, StatusTracker, MAX_RESPONSE_LENGTH,
    STATUS_PLACEHOLDER_REFRESH_SECONDS,
};
pub use runtime::Runtime;
pub use sync::{CarrierHandle, EntitySyncManager, RenderState, SpawnError, SyncError};
pub use transport::{PacketChannel, PacketChannelReceiver, PacketDispatcher, WORKER_QUEUE_CAPACITY};
