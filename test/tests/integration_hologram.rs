use holosync_server::{Hologram, HologramError, LineContent, TEXT_LINE_HEIGHT};
use holosync_shared::{
    CarrierKind, ChunkPos, ItemStack, Position, ProtocolRevision, RawSettings, Settings,
    TextComponent, ViewerId, WorldId,
};
use holosync_test::{assert_packet_kinds, RecordedPacket, TestHost};

fn host() -> TestHost {
    TestHost::builder()
        .loaded_chunk(0, 0)
        .viewer(1, Position::new(0.0, 64.0, 0.0))
        .build()
}

fn hologram_at(test: &TestHost, position: Position) -> Hologram {
    Hologram::new(test.world.clone(), position, 0.02)
}

#[test]
fn sync_spawns_text_and_item_lines() {
    let mut test = host();
    let mut hologram = hologram_at(&test, Position::new(2.0, 70.0, 2.0));
    hologram.add_line(LineContent::text("&bShop")).unwrap();
    hologram
        .add_line(LineContent::Item(ItemStack::new(264, 1)))
        .unwrap();

    let failures = hologram.sync(&mut test.manager);

    assert!(failures.is_empty());
    assert!(hologram.unspawned_lines().is_empty());
    // text carrier, then the item and the mount it rides
    assert_eq!(test.manager.len(), 3);
    assert_packet_kinds!(
        test.sink,
        ViewerId::new(1),
        [Spawn, Metadata, Spawn, Metadata, Spawn, Metadata, Passengers]
    );

    let item = hologram.line(1).unwrap().carrier().unwrap();
    let carrier = test.manager.carrier(&item).unwrap();
    assert_eq!(carrier.line(), Some(hologram.line(1).unwrap().id()));
    assert!(carrier.vehicle().is_some());
}

#[test]
fn second_sync_without_edits_sends_nothing() {
    let mut test = host();
    let mut hologram = hologram_at(&test, Position::new(2.0, 70.0, 2.0));
    hologram.add_line(LineContent::text("static")).unwrap();
    hologram.sync(&mut test.manager);
    test.sink.clear();

    assert!(hologram.sync(&mut test.manager).is_empty());
    assert_eq!(test.sink.count(), 0);
}

#[test]
fn changed_content_is_pushed_as_metadata() {
    let mut test = host();
    let mut hologram = hologram_at(&test, Position::new(2.0, 70.0, 2.0));
    hologram.add_line(LineContent::text("first")).unwrap();
    hologram.add_line(LineContent::text("second")).unwrap();
    hologram.sync(&mut test.manager);
    let carrier = hologram.line(1).unwrap().carrier().unwrap();
    test.sink.clear();

    hologram.set_line(1, LineContent::text("changed")).unwrap();
    hologram.sync(&mut test.manager);

    assert_packet_kinds!(test.sink, ViewerId::new(1), [Metadata]);
    assert_eq!(hologram.line(1).unwrap().carrier(), Some(carrier));
    assert_eq!(
        test.manager.carrier(&carrier).unwrap().custom_name().unwrap().plain_text(),
        "changed"
    );
}

#[test]
fn inserting_a_line_moves_the_ones_below() {
    let mut test = host();
    let mut hologram = hologram_at(&test, Position::new(2.0, 70.0, 2.0));
    hologram.add_line(LineContent::text("old top")).unwrap();
    hologram.sync(&mut test.manager);
    let old_top = hologram.line(0).unwrap().carrier().unwrap();
    test.sink.clear();

    hologram.insert_line(0, LineContent::text("new top")).unwrap();
    hologram.sync(&mut test.manager);

    assert_packet_kinds!(
        test.sink,
        ViewerId::new(1),
        [Spawn, Metadata, Destroy, Spawn, Metadata]
    );
    let moved = test.manager.carrier(&old_top).unwrap();
    let expected_y = 70.0 - 2.0 * TEXT_LINE_HEIGHT - 0.02;
    assert!((moved.position().y - expected_y).abs() < 1e-9);
}

#[test]
fn changing_line_kind_replaces_its_carriers() {
    let mut test = host();
    let mut hologram = hologram_at(&test, Position::new(2.0, 70.0, 2.0));
    hologram.add_line(LineContent::text("soon an item")).unwrap();
    hologram.sync(&mut test.manager);
    let text = hologram.line(0).unwrap().carrier().unwrap();

    hologram
        .set_line(0, LineContent::Item(ItemStack::new(1, 1)))
        .unwrap();
    hologram.sync(&mut test.manager);

    assert!(!test.manager.contains(&text));
    assert_eq!(test.manager.len(), 2);
    assert!(hologram.line(0).unwrap().is_spawned());
}

#[test]
fn removed_lines_are_despawned_on_sync() {
    let mut test = host();
    let mut hologram = hologram_at(&test, Position::new(2.0, 70.0, 2.0));
    hologram.add_line(LineContent::text("keep")).unwrap();
    hologram
        .add_line(LineContent::Item(ItemStack::new(264, 1)))
        .unwrap();
    hologram.sync(&mut test.manager);
    test.sink.clear();

    hologram.remove_line(1).unwrap();
    assert_eq!(test.manager.len(), 3);
    hologram.sync(&mut test.manager);

    assert_eq!(test.manager.len(), 1);
    let destroyed: Vec<_> = test
        .sink
        .packets_for(ViewerId::new(1))
        .into_iter()
        .filter(|packet| matches!(packet, RecordedPacket::Destroy(_)))
        .collect();
    assert_eq!(destroyed.len(), 2);
}

#[test]
fn lines_in_unloaded_chunks_spawn_when_it_loads() {
    let mut test = host();
    let far = Position::new(40.0, 70.0, 40.0);
    let mut hologram = hologram_at(&test, far);
    let text = hologram.add_line(LineContent::text("later")).unwrap();
    let item = hologram
        .add_line(LineContent::Item(ItemStack::new(264, 1)))
        .unwrap();

    let failures = hologram.sync(&mut test.manager);

    assert_eq!(failures.len(), 2);
    assert_eq!(hologram.unspawned_lines(), vec![text, item]);
    assert!(test.manager.is_empty());
    assert_eq!(test.host.registered_count(&test.world), 0);

    // an unrelated chunk changes nothing
    test.host.load_chunk(&test.world, ChunkPos::new(5, 5));
    assert!(hologram
        .on_chunk_load(&mut test.manager, &test.world.clone(), ChunkPos::new(5, 5))
        .is_empty());
    assert_eq!(hologram.unspawned_lines().len(), 2);

    let chunk = far.chunk();
    test.host.load_chunk(&test.world, chunk);
    let world = test.world.clone();
    let failures = hologram.on_chunk_load(&mut test.manager, &world, chunk);

    assert!(failures.is_empty());
    assert!(hologram.unspawned_lines().is_empty());
    assert_eq!(test.manager.len(), 3);
}

#[test]
fn chunk_unload_and_reload_respawns_lines() {
    let mut test = host();
    let mut hologram = hologram_at(&test, Position::new(2.0, 70.0, 2.0));
    hologram.add_line(LineContent::text("persistent")).unwrap();
    hologram
        .add_line(LineContent::Item(ItemStack::new(264, 1)))
        .unwrap();
    hologram.sync(&mut test.manager);
    let before = hologram.line(0).unwrap().carrier().unwrap();

    let world = test.world.clone();
    let chunk = ChunkPos::new(0, 0);
    test.host.unload_chunk(&world, chunk);
    let removed = test.manager.on_chunk_unload(&world, chunk);
    hologram.on_carriers_removed(&removed);

    assert_eq!(removed.len(), 3);
    assert!(test.manager.is_empty());
    assert_eq!(hologram.unspawned_lines().len(), 2);

    test.host.load_chunk(&world, chunk);
    assert!(hologram.on_chunk_load(&mut test.manager, &world, chunk).is_empty());

    let after = hologram.line(0).unwrap().carrier().unwrap();
    assert_ne!(before, after);
    assert_eq!(test.manager.len(), 3);
    assert_eq!(test.host.registered_count(&world), 3);
}

#[test]
fn delete_despawns_everything_and_locks_the_hologram() {
    let mut test = host();
    let mut hologram = hologram_at(&test, Position::new(2.0, 70.0, 2.0));
    hologram.add_line(LineContent::text("bye")).unwrap();
    hologram
        .add_line(LineContent::Item(ItemStack::new(264, 1)))
        .unwrap();
    hologram.sync(&mut test.manager);

    hologram.delete(&mut test.manager);

    assert!(hologram.is_deleted());
    assert!(hologram.is_empty());
    assert!(test.manager.is_empty());
    assert_eq!(test.host.registered_count(&test.world), 0);
    assert_eq!(
        hologram.add_line(LineContent::text("again")),
        Err(HologramError::Deleted)
    );
    assert_eq!(hologram.teleport(Position::default()), Err(HologramError::Deleted));
}

#[test]
fn holograms_in_other_worlds_ignore_chunk_loads() {
    let mut test = host();
    let mut hologram = Hologram::new(WorldId::new("nether"), Position::new(2.0, 70.0, 2.0), 0.02);
    hologram.add_line(LineContent::text("elsewhere")).unwrap();

    assert_eq!(hologram.sync(&mut test.manager).len(), 1);
    let world = test.world.clone();
    assert!(hologram
        .on_chunk_load(&mut test.manager, &world, ChunkPos::new(0, 0))
        .is_empty());
    assert_eq!(hologram.unspawned_lines().len(), 1);
}

#[test]
fn transparency_symbol_is_shown_in_its_color() {
    let settings = Settings::load(RawSettings {
        transparency_symbol: "[ ]".to_string(),
        transparency_color: "&8".to_string(),
        ..RawSettings::default()
    });
    let mut test = TestHost::builder()
        .loaded_chunk(0, 0)
        .viewer(1, Position::new(0.0, 64.0, 0.0))
        .settings(settings)
        .build();
    let mut hologram = hologram_at(&test, Position::new(2.0, 70.0, 2.0));
    hologram
        .add_line(LineContent::Text(TextComponent::new("slot [ ] free")))
        .unwrap();

    assert!(hologram.sync(&mut test.manager).is_empty());

    let packets = test.sink.packets_for(ViewerId::new(1));
    let RecordedPacket::Metadata(metadata) = &packets[1] else {
        panic!("expected metadata second, got {:?}", packets);
    };
    let expected = ProtocolRevision::reference()
        .metadata
        .carrier_entries(
            CarrierKind::Text,
            true,
            Some(&TextComponent::new("slot §8[ ] free")),
            None,
        )
        .unwrap();
    assert_eq!(metadata.entries, expected);
}
