use holosync_shared::{
    decode_frame, decode_packet, encode_packet, BufferPool, ByteReader, CarrierKind, EntityId,
    EntityMetadataPacket, MetadataEntry, MetadataValue, Position, ProtocolRevision, Serde,
    SerdeErr, TextComponent, VarInt, ViewerId,
};
use holosync_test::{RecordedPacket, TestHost};

#[test]
fn metadata_round_trip_keeps_id_and_text() {
    let revision = ProtocolRevision::reference();
    let pool = BufferPool::default();
    let packet = EntityMetadataPacket {
        entity_id: EntityId::new(1000),
        entries: vec![MetadataEntry::new(2, MetadataValue::String("Hello".to_string()))],
    };

    let frame = encode_packet(&pool, &revision, &packet).unwrap();

    // read it back by hand: length, packet id, entity id, entry
    let mut reader = ByteReader::new(&frame);
    assert_eq!(VarInt::de_length(&mut reader).unwrap(), frame.len() - 1);
    assert_eq!(VarInt::de(&mut reader).unwrap().get(), revision.packet_ids.entity_metadata);
    assert_eq!(VarInt::de(&mut reader).unwrap().get(), 1000);
    assert_eq!(u8::de(&mut reader).unwrap(), 2);
    assert_eq!(
        VarInt::de(&mut reader).unwrap().get(),
        revision.metadata.serializers.string
    );
    assert_eq!(String::de(&mut reader).unwrap(), "Hello");

    let decoded: EntityMetadataPacket = decode_packet(&revision, &frame).unwrap();
    assert_eq!(decoded, packet);
}

#[test]
fn truncated_frame_is_an_error() {
    let revision = ProtocolRevision::reference();
    let pool = BufferPool::default();
    let packet = EntityMetadataPacket {
        entity_id: EntityId::new(7),
        entries: vec![MetadataEntry::new(3, MetadataValue::Boolean(true))],
    };
    let frame = encode_packet(&pool, &revision, &packet).unwrap();

    let cut = &frame[..frame.len() - 2];
    assert!(matches!(
        decode_frame(cut),
        Err(SerdeErr::Truncated { .. })
    ));
}

#[test]
fn spawned_text_carrier_carries_chat_name() {
    let mut test = TestHost::builder()
        .loaded_chunk(0, 0)
        .viewer(1, Position::new(0.0, 64.0, 0.0))
        .build();
    let handle = test
        .spawn_text(Position::new(1.5, 65.0, 1.5), "&cRed line")
        .unwrap();
    let revision = ProtocolRevision::reference();

    let packets = test.sink.packets_for(ViewerId::new(1));
    let RecordedPacket::Spawn(spawn) = &packets[0] else {
        panic!("expected spawn first, got {:?}", packets);
    };
    assert_eq!(spawn.entity_id, handle.id());
    assert_eq!(spawn.entity_type, revision.entity_types.text);
    assert_eq!(spawn.position, Position::new(1.5, 65.0, 1.5));

    let RecordedPacket::Metadata(metadata) = &packets[1] else {
        panic!("expected metadata second, got {:?}", packets);
    };
    let expected = revision
        .metadata
        .carrier_entries(
            CarrierKind::Text,
            true,
            Some(&TextComponent::from_legacy("&cRed line")),
            None,
        )
        .unwrap();
    assert_eq!(metadata.entries, expected);
}
