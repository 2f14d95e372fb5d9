//! The narrow packet set holosync writes to viewers directly, plus the
//! status exchange used by the pinger.

mod frame;
mod metadata;
mod packets;
mod revision;
mod status;

pub use frame::{decode_frame, decode_packet, encode_frame, encode_packet};
pub use metadata::{MetadataEntry, MetadataValue, METADATA_END};
pub use packets::{
    carrier_uuid, DestroyEntitiesPacket, EntityMetadataPacket, Packet, SetPassengersPacket,
    SpawnEntityPacket,
};
pub use revision::{EntityTypeIds, MetadataLayout, PacketIds, ProtocolRevision, SerializerIds};
pub use status::{
    encode_status_request, HandshakePacket, StatusResponse, HANDSHAKE_PACKET_ID,
    NEXT_STATE_STATUS, PING_PROTOCOL_VERSION, STATUS_REQUEST_PACKET_ID,
    STATUS_RESPONSE_PACKET_ID,
};
