use std::collections::HashMap;

use log::debug;

use crate::types::{ChunkPos, EntityId, WorldId};

use super::{
    carrier::{CarrierEntity, CarrierKind, HostEntityHooks},
    error::CarrierError,
};

/// All carriers owned by one sync manager, plus their mount links.
///
/// Mount links are kept symmetric: a vehicle's passenger always points back
/// at the vehicle, and a vehicle carries at most one passenger.
#[derive(Default)]
pub struct CarrierStore {
    carriers: HashMap<EntityId, CarrierEntity>,
}

impl CarrierStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, carrier: CarrierEntity) -> Result<(), CarrierError> {
        let id = carrier.id();
        if self.carriers.contains_key(&id) {
            return Err(CarrierError::AlreadyTracked {
                entity_id: id.to_string(),
            });
        }
        self.carriers.insert(id, carrier);
        Ok(())
    }

    pub fn remove(&mut self, id: &EntityId) -> Option<CarrierEntity> {
        self.release_links(id);
        self.carriers.remove(id)
    }

    pub fn get(&self, id: &EntityId) -> Option<&CarrierEntity> {
        self.carriers.get(id)
    }

    pub fn get_mut(&mut self, id: &EntityId) -> Option<&mut CarrierEntity> {
        self.carriers.get_mut(id)
    }

    pub fn contains(&self, id: &EntityId) -> bool {
        self.carriers.contains_key(id)
    }

    /// The view a host gets of a carrier: only the neutralized hooks
    pub fn host_hooks_mut(&mut self, id: &EntityId) -> Option<&mut dyn HostEntityHooks> {
        self.carriers
            .get_mut(id)
            .map(|carrier| carrier as &mut dyn HostEntityHooks)
    }

    pub fn len(&self) -> usize {
        self.carriers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.carriers.is_empty()
    }

    pub fn ids(&self) -> Vec<EntityId> {
        let mut ids: Vec<EntityId> = self.carriers.keys().copied().collect();
        ids.sort();
        ids
    }

    pub fn iter(&self) -> impl Iterator<Item = &CarrierEntity> {
        self.carriers.values()
    }

    pub fn ids_in_chunk(&self, world: &WorldId, chunk: ChunkPos) -> Vec<EntityId> {
        let mut ids: Vec<EntityId> = self
            .carriers
            .values()
            .filter(|carrier| carrier.world() == world && carrier.position().chunk() == chunk)
            .map(|carrier| carrier.id())
            .collect();
        ids.sort();
        ids
    }

    /// Seat `passenger` on `vehicle`.
    ///
    /// The passenger first leaves whatever it was riding, and whatever was
    /// riding the vehicle is dismounted, before the new link is made.
    pub fn set_passenger(
        &mut self,
        vehicle: &EntityId,
        passenger: &EntityId,
    ) -> Result<(), CarrierError> {
        if vehicle == passenger {
            return Err(CarrierError::SelfMount {
                entity_id: vehicle.to_string(),
            });
        }
        let vehicle_kind = self.kind_of(vehicle)?;
        if vehicle_kind != CarrierKind::Mount {
            return Err(CarrierError::NotAMount {
                entity_id: vehicle.to_string(),
                kind: vehicle_kind.name(),
            });
        }
        self.kind_of(passenger)?;

        self.dismount(passenger);
        self.clear_passenger(vehicle);

        if let Some(carrier) = self.carriers.get_mut(passenger) {
            carrier.set_vehicle(Some(*vehicle));
        }
        if let Some(carrier) = self.carriers.get_mut(vehicle) {
            carrier.set_passenger(Some(*passenger));
        }
        debug!("Carrier {} now rides {}", passenger, vehicle);
        Ok(())
    }

    /// Take `passenger` off its vehicle. Returns the old vehicle.
    pub fn dismount(&mut self, passenger: &EntityId) -> Option<EntityId> {
        let old_vehicle = self.carriers.get_mut(passenger)?.vehicle()?;
        if let Some(carrier) = self.carriers.get_mut(passenger) {
            carrier.set_vehicle(None);
        }
        if let Some(vehicle) = self.carriers.get_mut(&old_vehicle) {
            if vehicle.passenger() == Some(*passenger) {
                vehicle.set_passenger(None);
            }
        }
        Some(old_vehicle)
    }

    /// Remove whatever rides `vehicle`. Returns the old passenger.
    pub fn clear_passenger(&mut self, vehicle: &EntityId) -> Option<EntityId> {
        let old_passenger = self.carriers.get_mut(vehicle)?.passenger()?;
        if let Some(carrier) = self.carriers.get_mut(vehicle) {
            carrier.set_passenger(None);
        }
        if let Some(passenger) = self.carriers.get_mut(&old_passenger) {
            if passenger.vehicle() == Some(*vehicle) {
                passenger.set_vehicle(None);
            }
        }
        Some(old_passenger)
    }

    /// Drop every mount link touching `id`, passengers first. Returns the
    /// vehicles whose passenger changed.
    pub fn release_links(&mut self, id: &EntityId) -> Vec<EntityId> {
        let mut changed_vehicles = Vec::new();
        if self.clear_passenger(id).is_some() {
            changed_vehicles.push(*id);
        }
        if let Some(vehicle) = self.dismount(id) {
            changed_vehicles.push(vehicle);
        }
        changed_vehicles
    }

    fn kind_of(&self, id: &EntityId) -> Result<CarrierKind, CarrierError> {
        self.carriers
            .get(id)
            .map(|carrier| carrier.kind())
            .ok_or_else(|| CarrierError::NotFound {
                entity_id: id.to_string(),
            })
    }
}
