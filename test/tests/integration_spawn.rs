use holosync_shared::{CarrierKind, ChunkPos, Position};
use holosync_server::{RenderState, SpawnError};
use holosync_test::TestHost;

#[test]
fn spawn_into_unloaded_chunk_fails_and_registers_nothing() {
    let mut test = TestHost::builder().loaded_chunk(0, 0).build();

    let result = test.spawn_text(Position::new(40.0, 64.0, 40.0), "far away");

    let Err(SpawnError::ChunkNotLoaded { world, chunk, .. }) = result else {
        panic!("expected ChunkNotLoaded, got {:?}", result);
    };
    assert_eq!(world, test.world);
    assert_eq!(chunk, ChunkPos::new(2, 2));
    assert_eq!(test.host.registered_count(&test.world), 0);
    assert!(test.manager.is_empty());
    assert_eq!(test.sink.count(), 0);
}

#[test]
fn spawn_succeeds_once_chunk_loads() {
    let mut test = TestHost::builder().build();
    let position = Position::new(-1.0, 64.0, -1.0);
    assert!(test.spawn_text(position, "retry").is_err());

    test.host.load_chunk(&test.world, ChunkPos::new(-1, -1));
    let handle = test.spawn_text(position, "retry").unwrap();

    assert!(test.host.is_registered(&test.world, handle.id()));
    assert_eq!(test.host.registered_count(&test.world), 1);
}

#[test]
fn host_rejection_is_reported() {
    let mut test = TestHost::builder().loaded_chunk(0, 0).build();
    test.host.set_rejects_registration(true);

    let result = test.spawn(
        CarrierKind::Mount,
        Position::new(1.0, 1.0, 1.0),
        RenderState::Mount,
    );

    assert!(matches!(result, Err(SpawnError::HostRejected { .. })));
    assert_eq!(test.host.registered_count(&test.world), 0);
}

#[test]
fn failed_spawns_do_not_reuse_ids() {
    let mut test = TestHost::builder().loaded_chunk(0, 0).build();
    let Err(SpawnError::ChunkNotLoaded { entity_id: failed, .. }) =
        test.spawn_text(Position::new(100.0, 64.0, 0.0), "x")
    else {
        panic!("spawn should fail");
    };
    let handle = test.spawn_text(Position::new(1.0, 64.0, 1.0), "y").unwrap();
    assert_ne!(handle.id(), failed);
}
