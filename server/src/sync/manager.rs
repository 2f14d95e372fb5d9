use std::{
    collections::{BTreeSet, HashMap},
    fmt,
    sync::Arc,
};

use log::{debug, info, trace, warn};

use holosync_shared::{
    encode_packet, BufferPool, CarrierEntity, CarrierKind, CarrierStore, ChunkPos,
    DestroyEntitiesPacket, EntityId, EntityMetadataPacket, HostEntityHooks, LineId, Packet,
    PacketSink, Placeholder, PlaceholderError, PlaceholderRegistry, Position, ProtocolRevision,
    SerdeErr, SetPassengersPacket, Settings, SpawnEntityPacket, TextAdapter, TextComponent, Tick,
    VersionAdapter, ViewerId, WorldId,
};

use crate::transport::PacketDispatcher;

use super::{
    error::{SpawnError, SyncError},
    render::{RenderState, ResolvedRender},
    viewer_scope::ViewerScope,
};

/// Refers to one carrier owned by an [`EntitySyncManager`]
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct CarrierHandle(EntityId);

impl CarrierHandle {
    pub fn id(&self) -> EntityId {
        self.0
    }
}

impl fmt::Display for CarrierHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Owns every carrier entity, keeps the host's bookkeeping in step with them,
/// and sends each viewer exactly the packets it needs.
///
/// All mutation happens on the host's primary thread; calling a mutating
/// operation from any other thread panics.
pub struct EntitySyncManager {
    adapter: Box<dyn VersionAdapter>,
    settings: Arc<Settings>,
    carriers: CarrierStore,
    scopes: HashMap<EntityId, ViewerScope>,
    placeholders: PlaceholderRegistry,
    dispatcher: PacketDispatcher,
    pool: BufferPool,
}

impl EntitySyncManager {
    pub fn new(
        adapter: Box<dyn VersionAdapter>,
        settings: Arc<Settings>,
        sink: Arc<dyn PacketSink>,
    ) -> Self {
        let dispatcher = PacketDispatcher::new(sink, settings.worker_threads);
        info!(
            "EntitySyncManager: started for {} with {} dispatch worker(s)",
            adapter.revision(),
            dispatcher.worker_count()
        );
        Self {
            adapter,
            settings,
            carriers: CarrierStore::new(),
            scopes: HashMap::new(),
            placeholders: PlaceholderRegistry::new(),
            dispatcher,
            pool: BufferPool::default(),
        }
    }

    pub fn adapter(&self) -> &dyn VersionAdapter {
        self.adapter.as_ref()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn carrier(&self, handle: &CarrierHandle) -> Option<&CarrierEntity> {
        self.carriers.get(&handle.0)
    }

    pub fn contains(&self, handle: &CarrierHandle) -> bool {
        self.carriers.contains(&handle.0)
    }

    pub fn handles(&self) -> Vec<CarrierHandle> {
        self.carriers.ids().into_iter().map(CarrierHandle).collect()
    }

    pub fn len(&self) -> usize {
        self.carriers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.carriers.is_empty()
    }

    /// Viewers that currently have the carrier spawned client-side
    pub fn viewers_of(&self, handle: &CarrierHandle) -> Vec<ViewerId> {
        self.scopes
            .get(&handle.0)
            .map(ViewerScope::viewers)
            .unwrap_or_default()
    }

    /// The behaviour the host drives from its own entity tick
    pub fn host_hooks_mut(&mut self, handle: &CarrierHandle) -> Option<&mut dyn HostEntityHooks> {
        self.carriers.host_hooks_mut(&handle.0)
    }

    /// Blocks until every packet sent so far has reached the sink
    pub fn flush(&self) {
        self.dispatcher.flush();
    }

    // Placeholders

    pub fn placeholders(&self) -> &PlaceholderRegistry {
        &self.placeholders
    }

    pub fn placeholders_mut(&mut self) -> &mut PlaceholderRegistry {
        &mut self.placeholders
    }

    pub fn register_placeholder(&mut self, placeholder: Placeholder) -> Result<(), PlaceholderError> {
        self.placeholders.register(placeholder)
    }

    pub fn unregister_placeholder(&mut self, owner: &str, token: &str) -> bool {
        self.placeholders.unregister(owner, token)
    }

    // Lifecycle

    /// Creates a carrier, registers it with the host and shows it to every
    /// viewer in range.
    ///
    /// Fails if the target chunk is not loaded or the host refuses the
    /// entity. Nothing is registered in that case and the carrier is dead.
    pub fn spawn(
        &mut self,
        kind: CarrierKind,
        world: &WorldId,
        position: Position,
        render: RenderState,
    ) -> Result<CarrierHandle, SpawnError> {
        self.assert_primary_thread("spawn");

        if render.kind() != kind {
            return Err(SpawnError::RenderKindMismatch {
                kind,
                render: render.name(),
            });
        }

        let mut carrier = self.adapter.create_carrier(kind, world, position);
        carrier.set_position(position);
        let tenth = self.current_tenth();
        apply_global_render(
            &mut carrier,
            &render,
            self.adapter.text_adapter(),
            &mut self.placeholders,
            tenth,
        );

        let entity_id = carrier.id();
        let chunk = position.chunk();
        if !self.adapter.is_chunk_loaded(world, chunk) {
            mark_spawn_failed(&mut carrier);
            debug!(
                "EntitySyncManager: {} not spawned, chunk {} of {} is not loaded",
                entity_id, chunk, world
            );
            return Err(SpawnError::ChunkNotLoaded {
                entity_id,
                world: world.clone(),
                chunk,
            });
        }

        if !self.adapter.register_entity(&carrier) {
            mark_spawn_failed(&mut carrier);
            warn!(
                "EntitySyncManager: the host rejected {} in {}",
                entity_id, world
            );
            return Err(SpawnError::HostRejected {
                entity_id,
                world: world.clone(),
            });
        }

        if let Err(error) = carrier.activate() {
            warn!("EntitySyncManager: {}", error);
        }
        if let Err(error) = self.carriers.insert(carrier) {
            warn!("EntitySyncManager: {}", error);
            self.adapter.unregister_entity(world, entity_id);
            return Err(SpawnError::HostRejected {
                entity_id,
                world: world.clone(),
            });
        }
        self.scopes.insert(entity_id, ViewerScope::new(render));
        trace!("EntitySyncManager: spawned {} {} at {:?}", kind, entity_id, position);

        self.sync_scope(entity_id, tenth);
        Ok(CarrierHandle(entity_id))
    }

    /// Ties a carrier to the hologram line it renders
    pub fn set_line(&mut self, handle: &CarrierHandle, line: LineId) -> Result<(), SyncError> {
        self.carriers
            .get_mut(&handle.0)
            .ok_or(SyncError::UnknownHandle {
                entity_id: handle.0,
            })?
            .set_line(line);
        Ok(())
    }

    /// Replaces what a carrier shows.
    ///
    /// Each viewer that has the carrier is sent a metadata packet only if its
    /// resolved content differs from what it was last sent. Returns the number
    /// of packets sent.
    pub fn update_render_state(
        &mut self,
        handle: &CarrierHandle,
        render: RenderState,
    ) -> Result<usize, SyncError> {
        self.assert_primary_thread("update_render_state");
        let entity_id = handle.0;
        self.check_active(entity_id)?;
        let tenth = self.current_tenth();

        let Some(carrier) = self.carriers.get_mut(&entity_id) else {
            return Err(SyncError::UnknownHandle { entity_id });
        };
        if render.kind() != carrier.kind() {
            return Err(SyncError::KindMismatch {
                entity_id,
                kind: carrier.kind(),
                render: render.name(),
            });
        }

        apply_global_render(
            carrier,
            &render,
            self.adapter.text_adapter(),
            &mut self.placeholders,
            tenth,
        );

        let Some(scope) = self.scopes.get_mut(&entity_id) else {
            return Err(SyncError::UnknownHandle { entity_id });
        };
        scope.render = render;

        let mut sent = 0;
        for viewer in scope.viewers() {
            if self.push_changes(entity_id, viewer, tenth) {
                sent += 1;
            }
        }
        Ok(sent)
    }

    /// Moves a carrier. Viewers that had it are sent a fresh spawn at the new
    /// position.
    pub fn move_carrier(
        &mut self,
        handle: &CarrierHandle,
        position: Position,
    ) -> Result<(), SyncError> {
        self.assert_primary_thread("move_carrier");
        let entity_id = handle.0;
        self.check_active(entity_id)?;

        let Some(carrier) = self.carriers.get_mut(&entity_id) else {
            return Err(SyncError::UnknownHandle { entity_id });
        };
        carrier.set_position(position);
        let world = carrier.world().clone();
        if !self.adapter.move_entity(&world, entity_id, position) {
            warn!(
                "EntitySyncManager: the host no longer tracks {} in {}",
                entity_id, world
            );
        }

        let previous = self
            .scopes
            .get_mut(&entity_id)
            .map(ViewerScope::clear)
            .unwrap_or_default();
        self.send_destroy(entity_id, &previous);
        let tenth = self.current_tenth();
        self.sync_scope(entity_id, tenth);
        Ok(())
    }

    /// Removes a carrier: viewers are told to destroy it, mount links are
    /// released (passengers first) and the host forgets it.
    pub fn despawn(&mut self, handle: &CarrierHandle) -> Result<(), SyncError> {
        self.assert_primary_thread("despawn");
        self.check_active(handle.0)?;
        self.teardown(handle.0);
        Ok(())
    }

    /// The host unloaded a chunk and discarded whatever it kept there.
    /// Returns the carriers that were torn down so their lines can respawn
    /// once the chunk loads again.
    pub fn on_chunk_unload(&mut self, world: &WorldId, chunk: ChunkPos) -> Vec<CarrierHandle> {
        self.assert_primary_thread("on_chunk_unload");
        let mut removed = Vec::new();
        for entity_id in self.carriers.ids_in_chunk(world, chunk) {
            if self.check_active(entity_id).is_err() {
                continue;
            }
            self.teardown(entity_id);
            removed.push(CarrierHandle(entity_id));
        }
        if !removed.is_empty() {
            debug!(
                "EntitySyncManager: chunk {} of {} unloaded, {} carrier(s) removed",
                chunk,
                world,
                removed.len()
            );
        }
        removed
    }

    fn teardown(&mut self, entity_id: EntityId) {
        let Some(carrier) = self.carriers.get_mut(&entity_id) else {
            return;
        };
        if let Err(error) = carrier.begin_despawn() {
            warn!("EntitySyncManager: {}", error);
            return;
        }
        let world = carrier.world().clone();

        for vehicle in self.carriers.release_links(&entity_id) {
            if vehicle != entity_id {
                self.send_passengers(vehicle);
            }
        }

        let viewers = self
            .scopes
            .remove(&entity_id)
            .map(|mut scope| scope.clear())
            .unwrap_or_default();
        self.send_destroy(entity_id, &viewers);

        if !self.adapter.unregister_entity(&world, entity_id) {
            debug!(
                "EntitySyncManager: {} was already discarded by the host",
                entity_id
            );
        }

        if let Some(mut carrier) = self.carriers.remove(&entity_id) {
            if let Err(error) = carrier.finish_despawn() {
                warn!("EntitySyncManager: {}", error);
            }
        }
        trace!("EntitySyncManager: despawned {}", entity_id);
    }

    // Mount linkage

    /// Seats `passenger` on the mount carrier `vehicle`, replacing whatever
    /// rode it before.
    pub fn set_passenger(
        &mut self,
        vehicle: &CarrierHandle,
        passenger: &CarrierHandle,
    ) -> Result<(), SyncError> {
        self.assert_primary_thread("set_passenger");
        let old_vehicle = self.carriers.get(&passenger.0).and_then(CarrierEntity::vehicle);

        self.carriers.set_passenger(&vehicle.0, &passenger.0)?;

        if let Some(old_vehicle) = old_vehicle {
            if old_vehicle != vehicle.0 {
                self.send_passengers(old_vehicle);
            }
        }
        self.send_passengers(vehicle.0);
        Ok(())
    }

    /// Takes a carrier off whatever it rides
    pub fn dismount(&mut self, passenger: &CarrierHandle) -> Result<Option<CarrierHandle>, SyncError> {
        self.assert_primary_thread("dismount");
        if !self.carriers.contains(&passenger.0) {
            return Err(SyncError::UnknownHandle {
                entity_id: passenger.0,
            });
        }
        let old_vehicle = self.carriers.dismount(&passenger.0);
        if let Some(vehicle) = old_vehicle {
            self.send_passengers(vehicle);
        }
        Ok(old_vehicle.map(CarrierHandle))
    }

    // Viewers

    /// The text one viewer sees for a text carrier, with every registered
    /// placeholder substituted by that viewer's cached value
    pub fn resolve_per_viewer_text(
        &mut self,
        handle: &CarrierHandle,
        viewer: ViewerId,
    ) -> Result<TextComponent, SyncError> {
        let entity_id = handle.0;
        let Some(scope) = self.scopes.get(&entity_id) else {
            return Err(SyncError::UnknownHandle { entity_id });
        };
        let RenderState::Text(template) = &scope.render else {
            return Err(SyncError::KindMismatch {
                entity_id,
                kind: scope.render.kind(),
                render: "text",
            });
        };
        let tenth = PlaceholderRegistry::tenth_of(self.adapter.current_tick());
        Ok(self.placeholders.resolve(
            self.adapter.text_adapter(),
            template,
            tenth,
            Some(viewer),
        ))
    }

    /// One refresh pass: viewers that came into range get the carrier,
    /// viewers that left are told to destroy it, and everyone else gets a
    /// metadata packet if their resolved content changed. Viewers a dispatch
    /// worker failed to reach since the last pass are sent everything again.
    ///
    /// Returns the number of viewer updates sent.
    pub fn refresh(&mut self) -> usize {
        self.assert_primary_thread("refresh");
        for viewer in self.dispatcher.take_failed() {
            debug!("EntitySyncManager: resending carriers to {}", viewer);
            for scope in self.scopes.values_mut() {
                scope.exclude(&viewer);
            }
        }
        let tenth = self.current_tenth();
        let mut updates = 0;
        for entity_id in self.carriers.ids() {
            if self.check_active(entity_id).is_err() {
                continue;
            }
            updates += self.sync_scope(entity_id, tenth);
        }
        updates
    }

    /// A viewer disconnected. Its caches are dropped; nothing is sent.
    pub fn viewer_left(&mut self, viewer: ViewerId) {
        for scope in self.scopes.values_mut() {
            scope.exclude(&viewer);
        }
        self.placeholders.forget_viewer(&viewer);
    }

    fn sync_scope(&mut self, entity_id: EntityId, tenth: Tick) -> usize {
        let Some(carrier) = self.carriers.get(&entity_id) else {
            return 0;
        };
        let in_range: BTreeSet<ViewerId> = self
            .adapter
            .viewers_in_range(carrier.world(), carrier.position())
            .into_iter()
            .collect();
        let Some(scope) = self.scopes.get_mut(&entity_id) else {
            return 0;
        };

        let leaving = scope.leaving(&in_range);
        for viewer in &leaving {
            scope.exclude(viewer);
        }
        self.send_destroy(entity_id, &leaving);

        let mut updates = leaving.len();
        for viewer in in_range {
            let has = self
                .scopes
                .get(&entity_id)
                .is_some_and(|scope| scope.has(&viewer));
            let sent = if has {
                self.push_changes(entity_id, viewer, tenth)
            } else {
                self.enter(entity_id, viewer, tenth)
            };
            if sent {
                updates += 1;
            }
        }
        updates
    }

    /// Spawn and full metadata for a viewer that does not have the carrier
    fn enter(&mut self, entity_id: EntityId, viewer: ViewerId, tenth: Tick) -> bool {
        let (Some(carrier), Some(scope)) =
            (self.carriers.get(&entity_id), self.scopes.get_mut(&entity_id))
        else {
            return false;
        };
        let resolved = resolve_render(
            &scope.render,
            self.adapter.text_adapter(),
            &mut self.placeholders,
            tenth,
            Some(viewer),
        );
        if scope.already_failed(&viewer, &resolved) {
            return false;
        }

        let frames = match encode_entry(&self.pool, self.adapter.protocol(), carrier, &resolved) {
            Ok(frames) => frames,
            Err(error) => {
                warn!(
                    "EntitySyncManager: could not encode {} for {}: {}",
                    entity_id, viewer, error
                );
                scope.mark_failed(viewer, resolved);
                return false;
            }
        };
        for frame in frames {
            if let Err(error) = self.dispatcher.dispatch(viewer, frame) {
                warn!("EntitySyncManager: {}", error);
                return false;
            }
        }
        scope.include(viewer, resolved);

        let vehicle = carrier.vehicle();
        let passenger = carrier.passenger();
        if let Some(vehicle) = vehicle {
            self.send_passengers_to(vehicle, viewer);
        }
        if passenger.is_some() {
            self.send_passengers_to(entity_id, viewer);
        }
        true
    }

    /// Metadata for a viewer that already has the carrier, only if what it
    /// should see differs from what it was last sent
    fn push_changes(&mut self, entity_id: EntityId, viewer: ViewerId, tenth: Tick) -> bool {
        let Some(scope) = self.scopes.get_mut(&entity_id) else {
            return false;
        };
        let resolved = resolve_render(
            &scope.render,
            self.adapter.text_adapter(),
            &mut self.placeholders,
            tenth,
            Some(viewer),
        );
        if scope.last_sent(&viewer) == Some(&resolved) || scope.already_failed(&viewer, &resolved)
        {
            return false;
        }

        let protocol = self.adapter.protocol();
        let entries = match &resolved {
            ResolvedRender::Text(name) => protocol.metadata.name_entries(Some(name)),
            ResolvedRender::Item(item) => Ok(vec![protocol.metadata.item_entry(Some(item))]),
            ResolvedRender::Mount => return false,
        };
        let frame = entries.and_then(|entries| {
            encode_packet(
                &self.pool,
                protocol,
                &EntityMetadataPacket { entity_id, entries },
            )
        });
        let frame = match frame {
            Ok(frame) => frame,
            Err(error) => {
                warn!(
                    "EntitySyncManager: could not encode metadata of {} for {}: {}",
                    entity_id, viewer, error
                );
                scope.mark_failed(viewer, resolved);
                return false;
            }
        };
        if let Err(error) = self.dispatcher.dispatch(viewer, frame) {
            warn!("EntitySyncManager: {}", error);
            return false;
        }
        scope.include(viewer, resolved);
        true
    }

    fn send_destroy(&self, entity_id: EntityId, viewers: &[ViewerId]) {
        if viewers.is_empty() {
            return;
        }
        let packet = DestroyEntitiesPacket {
            entity_ids: vec![entity_id],
        };
        for viewer in viewers {
            self.send(*viewer, &packet);
        }
    }

    /// Tells every viewer of `vehicle` who rides it now
    fn send_passengers(&self, vehicle: EntityId) {
        let Some(scope) = self.scopes.get(&vehicle) else {
            return;
        };
        for viewer in scope.viewers() {
            self.send_passengers_to(vehicle, viewer);
        }
    }

    fn send_passengers_to(&self, vehicle: EntityId, viewer: ViewerId) {
        let visible = |id: &EntityId| self.scopes.get(id).is_some_and(|scope| scope.has(&viewer));
        if !visible(&vehicle) {
            return;
        }
        let passengers = self
            .carriers
            .get(&vehicle)
            .and_then(CarrierEntity::passenger)
            .filter(visible)
            .into_iter()
            .collect();
        self.send(viewer, &SetPassengersPacket { vehicle, passengers });
    }

    fn send<P: Packet>(&self, viewer: ViewerId, packet: &P) -> bool {
        let frame = match encode_packet(&self.pool, self.adapter.protocol(), packet) {
            Ok(frame) => frame,
            Err(error) => {
                warn!("EntitySyncManager: could not encode a packet for {}: {}", viewer, error);
                return false;
            }
        };
        match self.dispatcher.dispatch(viewer, frame) {
            Ok(()) => true,
            Err(error) => {
                warn!("EntitySyncManager: {}", error);
                false
            }
        }
    }

    fn check_active(&self, entity_id: EntityId) -> Result<(), SyncError> {
        match self.carriers.get(&entity_id) {
            None => Err(SyncError::UnknownHandle { entity_id }),
            Some(carrier) if !carrier.is_active() => Err(SyncError::NotActive { entity_id }),
            Some(_) => Ok(()),
        }
    }

    fn current_tenth(&self) -> Tick {
        PlaceholderRegistry::tenth_of(self.adapter.current_tick())
    }

    fn assert_primary_thread(&self, operation: &str) {
        if !self.adapter.is_primary_thread() {
            panic!(
                "EntitySyncManager: {} must be called on the host's primary thread",
                operation
            );
        }
    }
}

/// Keeps the carrier's own name or item in step with the shared (not per
/// viewer) resolution of its render state
fn apply_global_render(
    carrier: &mut CarrierEntity,
    render: &RenderState,
    text_adapter: &dyn TextAdapter,
    placeholders: &mut PlaceholderRegistry,
    tenth: Tick,
) {
    match resolve_render(render, text_adapter, placeholders, tenth, None) {
        ResolvedRender::Text(name) => carrier.set_name(Some(name)),
        ResolvedRender::Item(item) => carrier.set_item(Some(item)),
        ResolvedRender::Mount => {}
    }
}

fn resolve_render(
    render: &RenderState,
    text_adapter: &dyn TextAdapter,
    placeholders: &mut PlaceholderRegistry,
    tenth: Tick,
    viewer: Option<ViewerId>,
) -> ResolvedRender {
    match render {
        RenderState::Text(template) => {
            ResolvedRender::Text(placeholders.resolve(text_adapter, template, tenth, viewer))
        }
        RenderState::Item(item) => ResolvedRender::Item(item.clone()),
        RenderState::Mount => ResolvedRender::Mount,
    }
}

fn encode_entry(
    pool: &BufferPool,
    protocol: &ProtocolRevision,
    carrier: &CarrierEntity,
    resolved: &ResolvedRender,
) -> Result<[Box<[u8]>; 2], SerdeErr> {
    let entity_type = match carrier.kind() {
        CarrierKind::Text => protocol.entity_types.text,
        CarrierKind::Item => protocol.entity_types.item,
        CarrierKind::Mount => protocol.entity_types.mount,
    };
    let spawn = SpawnEntityPacket::new(carrier.id(), entity_type, carrier.position());
    let entries = protocol.metadata.carrier_entries(
        carrier.kind(),
        carrier.is_invisible(),
        resolved.name(),
        resolved.item(),
    )?;
    let metadata = EntityMetadataPacket {
        entity_id: carrier.id(),
        entries,
    };
    Ok([
        encode_packet(pool, protocol, &spawn)?,
        encode_packet(pool, protocol, &metadata)?,
    ])
}

fn mark_spawn_failed(carrier: &mut CarrierEntity) {
    if let Err(error) = carrier.fail_spawn() {
        warn!("EntitySyncManager: {}", error);
    }
}
