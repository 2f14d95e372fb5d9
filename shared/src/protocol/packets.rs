use holosync_serde::{ByteReader, ByteWrite, Serde, SerdeErr, VarInt};

use crate::types::{EntityId, Position};

use super::{
    metadata::{MetadataEntry, METADATA_END},
    revision::ProtocolRevision,
};

/// A clientbound packet whose id and body layout depend on the revision
pub trait Packet: Sized {
    fn packet_id(revision: &ProtocolRevision) -> i32;

    fn write(&self, revision: &ProtocolRevision, writer: &mut dyn ByteWrite)
        -> Result<(), SerdeErr>;

    fn read(revision: &ProtocolRevision, reader: &mut ByteReader) -> Result<Self, SerdeErr>;
}

/// Client-side UUID for a carrier, derived from its entity id
pub fn carrier_uuid(entity_id: EntityId) -> u128 {
    const NAMESPACE: u128 = 0x686f_6c6f_7379_6e63 << 64;
    NAMESPACE | u128::from(entity_id.get() as u32)
}

#[derive(Clone, Debug, PartialEq)]
pub struct SpawnEntityPacket {
    pub entity_id: EntityId,
    pub uuid: u128,
    pub entity_type: i32,
    pub position: Position,
    pub pitch: u8,
    pub yaw: u8,
    pub data: i32,
    pub velocity: [i16; 3],
}

impl SpawnEntityPacket {
    pub fn new(entity_id: EntityId, entity_type: i32, position: Position) -> Self {
        Self {
            entity_id,
            uuid: carrier_uuid(entity_id),
            entity_type,
            position,
            pitch: 0,
            yaw: 0,
            data: 0,
            velocity: [0; 3],
        }
    }
}

impl Packet for SpawnEntityPacket {
    fn packet_id(revision: &ProtocolRevision) -> i32 {
        revision.packet_ids.spawn_entity
    }

    fn write(&self, _: &ProtocolRevision, writer: &mut dyn ByteWrite) -> Result<(), SerdeErr> {
        VarInt(self.entity_id.get()).ser(writer)?;
        self.uuid.ser(writer)?;
        VarInt(self.entity_type).ser(writer)?;
        self.position.x.ser(writer)?;
        self.position.y.ser(writer)?;
        self.position.z.ser(writer)?;
        self.pitch.ser(writer)?;
        self.yaw.ser(writer)?;
        self.data.ser(writer)?;
        for component in &self.velocity {
            component.ser(writer)?;
        }
        Ok(())
    }

    fn read(_: &ProtocolRevision, reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        let entity_id = EntityId::new(VarInt::de(reader)?.get());
        let uuid = u128::de(reader)?;
        let entity_type = VarInt::de(reader)?.get();
        let position = Position::new(f64::de(reader)?, f64::de(reader)?, f64::de(reader)?);
        let pitch = u8::de(reader)?;
        let yaw = u8::de(reader)?;
        let data = i32::de(reader)?;
        let velocity = [i16::de(reader)?, i16::de(reader)?, i16::de(reader)?];
        Ok(Self {
            entity_id,
            uuid,
            entity_type,
            position,
            pitch,
            yaw,
            data,
            velocity,
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct EntityMetadataPacket {
    pub entity_id: EntityId,
    pub entries: Vec<MetadataEntry>,
}

impl Packet for EntityMetadataPacket {
    fn packet_id(revision: &ProtocolRevision) -> i32 {
        revision.packet_ids.entity_metadata
    }

    fn write(
        &self,
        revision: &ProtocolRevision,
        writer: &mut dyn ByteWrite,
    ) -> Result<(), SerdeErr> {
        VarInt(self.entity_id.get()).ser(writer)?;
        for entry in &self.entries {
            entry.write(&revision.metadata.serializers, writer)?;
        }
        METADATA_END.ser(writer)
    }

    fn read(revision: &ProtocolRevision, reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        let entity_id = EntityId::new(VarInt::de(reader)?.get());
        let mut entries = Vec::new();
        while let Some(entry) = MetadataEntry::read(&revision.metadata.serializers, reader)? {
            entries.push(entry);
        }
        Ok(Self { entity_id, entries })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DestroyEntitiesPacket {
    pub entity_ids: Vec<EntityId>,
}

impl Packet for DestroyEntitiesPacket {
    fn packet_id(revision: &ProtocolRevision) -> i32 {
        revision.packet_ids.destroy_entities
    }

    fn write(&self, _: &ProtocolRevision, writer: &mut dyn ByteWrite) -> Result<(), SerdeErr> {
        write_id_list(&self.entity_ids, writer)
    }

    fn read(_: &ProtocolRevision, reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        Ok(Self {
            entity_ids: read_id_list(reader)?,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SetPassengersPacket {
    pub vehicle: EntityId,
    pub passengers: Vec<EntityId>,
}

impl Packet for SetPassengersPacket {
    fn packet_id(revision: &ProtocolRevision) -> i32 {
        revision.packet_ids.set_passengers
    }

    fn write(&self, _: &ProtocolRevision, writer: &mut dyn ByteWrite) -> Result<(), SerdeErr> {
        VarInt(self.vehicle.get()).ser(writer)?;
        write_id_list(&self.passengers, writer)
    }

    fn read(_: &ProtocolRevision, reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        let vehicle = EntityId::new(VarInt::de(reader)?.get());
        Ok(Self {
            vehicle,
            passengers: read_id_list(reader)?,
        })
    }
}

fn write_id_list(ids: &[EntityId], writer: &mut dyn ByteWrite) -> Result<(), SerdeErr> {
    VarInt(ids.len() as i32).ser(writer)?;
    for id in ids {
        VarInt(id.get()).ser(writer)?;
    }
    Ok(())
}

fn read_id_list(reader: &mut ByteReader) -> Result<Vec<EntityId>, SerdeErr> {
    let count = VarInt::de_length(reader)?;
    // every id takes at least one byte
    if count > reader.remaining() {
        return Err(SerdeErr::Truncated {
            needed: count,
            remaining: reader.remaining(),
        });
    }
    let mut ids = Vec::with_capacity(count);
    for _ in 0..count {
        ids.push(EntityId::new(VarInt::de(reader)?.get()));
    }
    Ok(ids)
}
