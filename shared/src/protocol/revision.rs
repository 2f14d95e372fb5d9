/// Everything about the wire format that changes between host revisions
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProtocolRevision {
    /// Protocol number sent in the status handshake
    pub protocol_version: i32,
    pub packet_ids: PacketIds,
    pub metadata: MetadataLayout,
    pub entity_types: EntityTypeIds,
}

/// Clientbound packet ids for the packets holosync writes itself
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PacketIds {
    pub spawn_entity: i32,
    pub entity_metadata: i32,
    pub destroy_entities: i32,
    pub set_passengers: i32,
}

/// Entity metadata indices and serializer ids
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MetadataLayout {
    pub flags_index: u8,
    pub custom_name_index: u8,
    pub custom_name_visible_index: u8,
    pub silent_index: u8,
    pub no_gravity_index: u8,
    pub item_index: u8,
    /// Armor stand flags (small, marker...) if text carriers are armor stands
    pub text_carrier_flags_index: Option<u8>,
    /// Older revisions send the custom name as a plain legacy string
    pub custom_name_is_chat: bool,
    pub serializers: SerializerIds,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SerializerIds {
    pub byte: i32,
    pub var_int: i32,
    pub float: i32,
    pub string: i32,
    pub optional_chat: i32,
    pub item_slot: i32,
    pub boolean: i32,
}

/// Network entity type id of each carrier kind
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EntityTypeIds {
    pub text: i32,
    pub item: i32,
    pub mount: i32,
}

impl ProtocolRevision {
    /// The revision the reference adapter speaks
    pub fn reference() -> Self {
        Self {
            protocol_version: 754,
            packet_ids: PacketIds {
                spawn_entity: 0x00,
                entity_metadata: 0x44,
                destroy_entities: 0x36,
                set_passengers: 0x4B,
            },
            metadata: MetadataLayout {
                flags_index: 0,
                custom_name_index: 2,
                custom_name_visible_index: 3,
                silent_index: 4,
                no_gravity_index: 5,
                item_index: 7,
                text_carrier_flags_index: Some(14),
                custom_name_is_chat: true,
                serializers: SerializerIds {
                    byte: 0,
                    var_int: 1,
                    float: 2,
                    string: 3,
                    optional_chat: 5,
                    item_slot: 6,
                    boolean: 7,
                },
            },
            entity_types: EntityTypeIds {
                text: 1,
                item: 37,
                mount: 75,
            },
        }
    }
}
