use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard},
    thread::{self, ThreadId},
};

use log::{debug, info};

use crate::{
    entity::{CarrierEntity, CarrierKind},
    protocol::ProtocolRevision,
    text::{DefaultTextAdapter, TextAdapter},
    types::{ChunkPos, EntityId, Position, Tick, ViewerId, WorldId},
};

use super::{HostEntity, StartupError, VersionAdapter};

pub(crate) const REFERENCE_REVISION: &str = "v1_16_R3";

/// Blocks within which a viewer sees carriers
pub const DEFAULT_VIEW_DISTANCE: f64 = 64.0;

struct ViewerState {
    world: WorldId,
    position: Position,
}

struct HostState {
    primary_thread: ThreadId,
    tick: Tick,
    next_entity_id: i32,
    loaded_chunks: HashSet<(WorldId, ChunkPos)>,
    entities: HashMap<WorldId, HashMap<EntityId, HostEntity>>,
    viewers: HashMap<ViewerId, ViewerState>,
    view_distance: f64,
    rejects_registration: bool,
    custom_entities_supported: bool,
    setup_done: bool,
}

/// A self-contained host model implementing the adapter contract.
///
/// Clones share the same host state, so a caller can keep a handle to drive
/// the host (load chunks, move viewers, advance ticks) after giving the
/// adapter to a sync manager. The thread that creates it is the primary
/// thread.
#[derive(Clone)]
pub struct ReferenceAdapter {
    state: Arc<RwLock<HostState>>,
    protocol: ProtocolRevision,
    text_adapter: DefaultTextAdapter,
}

impl Default for ReferenceAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReferenceAdapter {
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(HostState {
                primary_thread: thread::current().id(),
                tick: 0,
                next_entity_id: 1,
                loaded_chunks: HashSet::new(),
                entities: HashMap::new(),
                viewers: HashMap::new(),
                view_distance: DEFAULT_VIEW_DISTANCE,
                rejects_registration: false,
                custom_entities_supported: true,
                setup_done: false,
            })),
            protocol: ProtocolRevision::reference(),
            text_adapter: DefaultTextAdapter,
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, HostState> {
        match self.state.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write(&self) -> RwLockWriteGuard<'_, HostState> {
        match self.state.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    // Host-side controls

    pub fn set_primary_thread(&self, thread: ThreadId) {
        self.write().primary_thread = thread;
    }

    pub fn set_view_distance(&self, blocks: f64) {
        self.write().view_distance = blocks;
    }

    pub fn set_rejects_registration(&self, rejects: bool) {
        self.write().rejects_registration = rejects;
    }

    pub fn set_custom_entities_supported(&self, supported: bool) {
        self.write().custom_entities_supported = supported;
    }

    pub fn is_set_up(&self) -> bool {
        self.read().setup_done
    }

    pub fn load_chunk(&self, world: &WorldId, chunk: ChunkPos) {
        self.write().loaded_chunks.insert((world.clone(), chunk));
    }

    /// Unloads a chunk, discarding every entity the host kept in it.
    /// Returns the discarded ids.
    pub fn unload_chunk(&self, world: &WorldId, chunk: ChunkPos) -> Vec<EntityId> {
        let mut state = self.write();
        state.loaded_chunks.remove(&(world.clone(), chunk));
        let Some(entities) = state.entities.get_mut(world) else {
            return Vec::new();
        };
        let mut discarded: Vec<EntityId> = entities
            .values()
            .filter(|entity| entity.position.chunk() == chunk)
            .map(|entity| entity.id)
            .collect();
        discarded.sort();
        for id in &discarded {
            entities.remove(id);
        }
        discarded
    }

    pub fn add_viewer(&self, viewer: ViewerId, world: &WorldId, position: Position) {
        self.write().viewers.insert(
            viewer,
            ViewerState {
                world: world.clone(),
                position,
            },
        );
    }

    pub fn move_viewer(&self, viewer: ViewerId, position: Position) {
        if let Some(state) = self.write().viewers.get_mut(&viewer) {
            state.position = position;
        }
    }

    pub fn remove_viewer(&self, viewer: ViewerId) {
        self.write().viewers.remove(&viewer);
    }

    pub fn advance_ticks(&self, ticks: Tick) {
        let mut state = self.write();
        state.tick = state.tick.wrapping_add(ticks);
    }

    pub fn set_tick(&self, tick: Tick) {
        self.write().tick = tick;
    }

    pub fn registered_count(&self, world: &WorldId) -> usize {
        self.read().entities.get(world).map_or(0, HashMap::len)
    }

    pub fn is_registered(&self, world: &WorldId, id: EntityId) -> bool {
        self.entity_by_id(world, id).is_some()
    }
}

impl VersionAdapter for ReferenceAdapter {
    fn revision(&self) -> &str {
        REFERENCE_REVISION
    }

    fn protocol(&self) -> &ProtocolRevision {
        &self.protocol
    }

    fn setup(&mut self) -> Result<(), StartupError> {
        let mut state = self.write();
        if !state.custom_entities_supported {
            return Err(StartupError::EntityRegistrationFailed {
                kind: CarrierKind::Mount.name(),
                reason: "the entity type registry is frozen".to_string(),
            });
        }
        state.setup_done = true;
        info!("ReferenceAdapter: registered carrier entity types for {}", REFERENCE_REVISION);
        Ok(())
    }

    fn allocate_entity_id(&mut self) -> EntityId {
        let mut state = self.write();
        let id = EntityId::new(state.next_entity_id);
        state.next_entity_id = state.next_entity_id.wrapping_add(1);
        id
    }

    fn register_entity(&mut self, carrier: &CarrierEntity) -> bool {
        let mut state = self.write();
        let key = (carrier.world().clone(), carrier.position().chunk());
        if !state.loaded_chunks.contains(&key) || state.rejects_registration {
            return false;
        }
        debug!(
            "ReferenceAdapter: registering {} in {} chunk {}",
            carrier.id(),
            carrier.world(),
            key.1
        );
        state.entities.entry(key.0).or_default().insert(
            carrier.id(),
            HostEntity {
                id: carrier.id(),
                kind: carrier.kind(),
                world: carrier.world().clone(),
                position: carrier.position(),
            },
        );
        true
    }

    fn unregister_entity(&mut self, world: &WorldId, id: EntityId) -> bool {
        self.write()
            .entities
            .get_mut(world)
            .is_some_and(|entities| entities.remove(&id).is_some())
    }

    fn move_entity(&mut self, world: &WorldId, id: EntityId, position: Position) -> bool {
        let mut state = self.write();
        match state
            .entities
            .get_mut(world)
            .and_then(|entities| entities.get_mut(&id))
        {
            Some(entity) => {
                entity.position = position;
                true
            }
            None => false,
        }
    }

    fn is_chunk_loaded(&self, world: &WorldId, chunk: ChunkPos) -> bool {
        self.read().loaded_chunks.contains(&(world.clone(), chunk))
    }

    fn entity_by_id(&self, world: &WorldId, id: EntityId) -> Option<HostEntity> {
        self.read()
            .entities
            .get(world)
            .and_then(|entities| entities.get(&id))
            .cloned()
    }

    fn current_tick(&self) -> Tick {
        self.read().tick
    }

    fn text_adapter(&self) -> &dyn TextAdapter {
        &self.text_adapter
    }

    fn is_primary_thread(&self) -> bool {
        thread::current().id() == self.read().primary_thread
    }

    fn viewers_in_range(&self, world: &WorldId, position: Position) -> Vec<ViewerId> {
        let state = self.read();
        let max_distance = state.view_distance * state.view_distance;
        let mut viewers: Vec<ViewerId> = state
            .viewers
            .iter()
            .filter(|(_, viewer)| {
                &viewer.world == world
                    && viewer.position.distance_squared(&position) <= max_distance
            })
            .map(|(id, _)| *id)
            .collect();
        viewers.sort();
        viewers
    }
}
