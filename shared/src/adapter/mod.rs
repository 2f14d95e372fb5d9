//! The seam between holosync and one revision of the host server.

mod error;
mod reference;

use std::sync::Arc;

pub use error::{SendError, StartupError};
pub use reference::ReferenceAdapter;

use crate::{
    entity::{CarrierEntity, CarrierKind},
    protocol::ProtocolRevision,
    text::TextAdapter,
    types::{ChunkPos, EntityId, Position, Tick, ViewerId, WorldId},
};

/// What the host's own bookkeeping knows about a registered entity
#[derive(Clone, Debug, PartialEq)]
pub struct HostEntity {
    pub id: EntityId,
    pub kind: CarrierKind,
    pub world: WorldId,
    pub position: Position,
}

/// Everything holosync needs from one host revision.
///
/// One implementation exists per supported revision; the rest of holosync is
/// written only against this trait.
pub trait VersionAdapter: Send {
    /// Host revision name, e.g. `v1_16_R3`
    fn revision(&self) -> &str;

    fn protocol(&self) -> &ProtocolRevision;

    /// Registers custom entity types and checks required capabilities
    fn setup(&mut self) -> Result<(), StartupError>;

    /// Reserves a network entity id from the host's counter
    fn allocate_entity_id(&mut self) -> EntityId;

    fn create_carrier(
        &mut self,
        kind: CarrierKind,
        world: &WorldId,
        position: Position,
    ) -> CarrierEntity {
        let id = self.allocate_entity_id();
        CarrierEntity::new(id, kind, world.clone(), position)
    }

    /// Adds a carrier to the host's per-world entity and chunk bookkeeping.
    /// Returns false if the host refused it.
    fn register_entity(&mut self, carrier: &CarrierEntity) -> bool;

    /// Returns false if the host had already discarded the entity
    fn unregister_entity(&mut self, world: &WorldId, id: EntityId) -> bool;

    /// Keeps the host's chunk index in step with a moved carrier
    fn move_entity(&mut self, world: &WorldId, id: EntityId, position: Position) -> bool;

    fn is_chunk_loaded(&self, world: &WorldId, chunk: ChunkPos) -> bool;

    fn entity_by_id(&self, world: &WorldId, id: EntityId) -> Option<HostEntity>;

    fn current_tick(&self) -> Tick;

    fn text_adapter(&self) -> &dyn TextAdapter;

    /// True on the host's single simulation thread
    fn is_primary_thread(&self) -> bool;

    /// Connected viewers close enough to see something at `position`
    fn viewers_in_range(&self, world: &WorldId, position: Position) -> Vec<ViewerId>;
}

/// Delivers encoded frames to one viewer's connection
pub trait PacketSink: Send + Sync {
    fn send(&self, viewer: ViewerId, payload: &[u8]) -> Result<(), SendError>;
}

impl<S: PacketSink + ?Sized> PacketSink for Arc<S> {
    fn send(&self, viewer: ViewerId, payload: &[u8]) -> Result<(), SendError> {
        (**self).send(viewer, payload)
    }
}

/// Revisions `select_adapter` can serve
pub const SUPPORTED_REVISIONS: &[&str] = &[reference::REFERENCE_REVISION];

/// Picks the adapter for the running host revision
pub fn select_adapter(revision: &str) -> Result<Box<dyn VersionAdapter>, StartupError> {
    match revision {
        reference::REFERENCE_REVISION => Ok(Box::new(ReferenceAdapter::new())),
        _ => Err(StartupError::UnsupportedRevision {
            revision: revision.to_string(),
            supported: SUPPORTED_REVISIONS.join(", "),
        }),
    }
}
