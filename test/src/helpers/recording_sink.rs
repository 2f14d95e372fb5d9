use std::{collections::HashSet, sync::Mutex};

use holosync_shared::{
    decode_frame, decode_packet, DestroyEntitiesPacket, EntityId, EntityMetadataPacket,
    PacketSink, ProtocolRevision, SendError, SetPassengersPacket, SpawnEntityPacket, ViewerId,
};

/// A decoded frame as one viewer received it
#[derive(Clone, Debug, PartialEq)]
pub enum RecordedPacket {
    Spawn(SpawnEntityPacket),
    Metadata(EntityMetadataPacket),
    Destroy(DestroyEntitiesPacket),
    Passengers(SetPassengersPacket),
    Unknown(i32),
}

impl RecordedPacket {
    /// The entity the packet is about; for passengers, the vehicle
    pub fn entity_id(&self) -> Option<EntityId> {
        match self {
            RecordedPacket::Spawn(packet) => Some(packet.entity_id),
            RecordedPacket::Metadata(packet) => Some(packet.entity_id),
            RecordedPacket::Destroy(packet) => packet.entity_ids.first().copied(),
            RecordedPacket::Passengers(packet) => Some(packet.vehicle),
            RecordedPacket::Unknown(_) => None,
        }
    }
}

/// A packet sink that remembers every frame, per viewer, in arrival order
pub struct RecordingSink {
    revision: ProtocolRevision,
    frames: Mutex<Vec<(ViewerId, Vec<u8>)>>,
    disconnected: Mutex<HashSet<ViewerId>>,
}

impl RecordingSink {
    pub fn new(revision: ProtocolRevision) -> Self {
        Self {
            revision,
            frames: Mutex::new(Vec::new()),
            disconnected: Mutex::new(HashSet::new()),
        }
    }

    pub fn count(&self) -> usize {
        self.frames.lock().unwrap().len()
    }

    pub fn count_for(&self, viewer: ViewerId) -> usize {
        self.frames_for(viewer).len()
    }

    pub fn clear(&self) {
        self.frames.lock().unwrap().clear();
    }

    /// Further sends to `viewer` fail as if its connection closed
    pub fn disconnect(&self, viewer: ViewerId) {
        self.disconnected.lock().unwrap().insert(viewer);
    }

    pub fn reconnect(&self, viewer: ViewerId) {
        self.disconnected.lock().unwrap().remove(&viewer);
    }

    pub fn frames_for(&self, viewer: ViewerId) -> Vec<Vec<u8>> {
        self.frames
            .lock()
            .unwrap()
            .iter()
            .filter(|(id, _)| *id == viewer)
            .map(|(_, frame)| frame.clone())
            .collect()
    }

    pub fn packets_for(&self, viewer: ViewerId) -> Vec<RecordedPacket> {
        self.frames_for(viewer)
            .iter()
            .map(|frame| self.decode(frame))
            .collect()
    }

    fn decode(&self, frame: &[u8]) -> RecordedPacket {
        let (packet_id, _) = decode_frame(frame).expect("recorded frame is well formed");
        let ids = &self.revision.packet_ids;
        let revision = &self.revision;
        if packet_id == ids.spawn_entity {
            RecordedPacket::Spawn(decode_packet(revision, frame).unwrap())
        } else if packet_id == ids.entity_metadata {
            RecordedPacket::Metadata(decode_packet(revision, frame).unwrap())
        } else if packet_id == ids.destroy_entities {
            RecordedPacket::Destroy(decode_packet(revision, frame).unwrap())
        } else if packet_id == ids.set_passengers {
            RecordedPacket::Passengers(decode_packet(revision, frame).unwrap())
        } else {
            RecordedPacket::Unknown(packet_id)
        }
    }
}

impl PacketSink for RecordingSink {
    fn send(&self, viewer: ViewerId, payload: &[u8]) -> Result<(), SendError> {
        if self.disconnected.lock().unwrap().contains(&viewer) {
            return Err(SendError::Disconnected { viewer });
        }
        self.frames.lock().unwrap().push((viewer, payload.to_vec()));
        Ok(())
    }
}
