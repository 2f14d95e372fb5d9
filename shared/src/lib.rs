//! # Holosync Shared
//! Data model and host seam shared by the holosync crates: carrier entities,
//! rich text, placeholders, settings, the packet set, and the
//! [`VersionAdapter`] every host revision implements.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

pub use holosync_serde::{
    BufferPool, ByteReader, ByteWrite, PooledBuffer, Serde, SerdeErr, StreamWriter, VarInt,
    VarIntDecoder, MAX_STRING_LENGTH,
};

mod adapter;
mod entity;
mod item;
mod placeholder;
mod protocol;
mod settings;
mod text;
mod types;

pub use adapter::{
    select_adapter, HostEntity, PacketSink, ReferenceAdapter, SendError, StartupError,
    VersionAdapter, SUPPORTED_REVISIONS,
};
pub use entity::{
    CarrierEntity, CarrierError, CarrierKind, CarrierState, CarrierStore, DamageSource,
    HostEntityHooks, TouchEvent,
};
pub use item::ItemStack;
pub use placeholder::{
    tenths_from_seconds, time_placeholder, Placeholder, PlaceholderError, PlaceholderRegistry,
    Replacer, ReplacerResult, BUILTIN_OWNER, HOST_TICKS_PER_TENTH, NULL_REPLACEMENT, TIME_TOKEN,
};
pub use protocol::{
    carrier_uuid, decode_frame, decode_packet, encode_frame, encode_packet,
    encode_status_request, DestroyEntitiesPacket, EntityMetadataPacket, EntityTypeIds,
    HandshakePacket, MetadataEntry, MetadataLayout, MetadataValue, Packet, PacketIds,
    ProtocolRevision, SerializerIds, SetPassengersPacket, SpawnEntityPacket, StatusResponse,
    HANDSHAKE_PACKET_ID, METADATA_END, NEXT_STATE_STATUS, PING_PROTOCOL_VERSION,
    STATUS_REQUEST_PACKET_ID, STATUS_RESPONSE_PACKET_ID,
};
pub use settings::{
    clamp_refresh_seconds, parse_server_address, parse_time_zone, pinger_timeout, ConfigError,
    PingerSettings, RawPingerSettings, RawSettings, ServerAddress, Settings, TimeSettings,
    DEFAULT_PINGER_TIMEOUT_MS, DEFAULT_PORT, DEFAULT_TIME_FORMAT, MAX_PINGER_TIMEOUT_MS,
    MAX_REFRESH_SECONDS, MIN_REFRESH_SECONDS,
};
pub use text::{
    replace_text, translate_legacy_codes, ChatColor, ChatFormat, DefaultTextAdapter, TextAdapter,
    TextComponent, TextStyle, SECTION_SIGN,
};
pub use types::{ChunkPos, EntityId, LineId, Position, Tick, ViewerId, WorldId};
