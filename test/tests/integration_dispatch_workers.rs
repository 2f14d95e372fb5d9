use holosync_server::RenderState;
use holosync_shared::{Position, ProtocolRevision, TextComponent, ViewerId};
use holosync_test::{assert_packet_kinds, RecordedPacket, TestHost};

fn host_with_workers() -> TestHost {
    TestHost::builder()
        .loaded_chunk(0, 0)
        .viewer(1, Position::new(0.0, 64.0, 0.0))
        .viewer(2, Position::new(4.0, 64.0, 4.0))
        .viewer(3, Position::new(8.0, 64.0, 8.0))
        .worker_threads(2)
        .build()
}

#[test]
fn workers_deliver_everything_after_flush() {
    let mut test = host_with_workers();
    let first = test.spawn_text(Position::new(2.0, 66.0, 2.0), "one").unwrap();
    let second = test.spawn_text(Position::new(3.0, 66.0, 3.0), "two").unwrap();
    test.manager
        .update_render_state(&first, RenderState::text("one, again"))
        .unwrap();
    test.manager.despawn(&second).unwrap();

    test.manager.flush();

    for id in 1..=3 {
        let viewer = ViewerId::new(id);
        assert_packet_kinds!(
            test.sink,
            viewer,
            [Spawn, Metadata, Spawn, Metadata, Metadata, Destroy]
        );
        let packets = test.sink.packets_for(viewer);
        assert_eq!(packets[0].entity_id(), Some(first.id()));
        assert_eq!(packets[2].entity_id(), Some(second.id()));
        assert!(matches!(&packets[5], RecordedPacket::Destroy(packet)
            if packet.entity_ids == vec![second.id()]));
    }
}

#[test]
fn many_updates_stay_ordered_per_viewer() {
    let mut test = host_with_workers();
    let handle = test.spawn_text(Position::new(2.0, 66.0, 2.0), "0").unwrap();
    for step in 1..=50 {
        test.manager
            .update_render_state(&handle, RenderState::text(step.to_string().as_str()))
            .unwrap();
    }
    test.manager.flush();

    let layout = ProtocolRevision::reference().metadata;
    let expected: Vec<_> = (1..=50)
        .map(|step| {
            layout
                .name_entries(Some(&TextComponent::from(step.to_string().as_str())))
                .unwrap()
        })
        .collect();
    for id in 1..=3 {
        let updates: Vec<_> = test
            .sink
            .packets_for(ViewerId::new(id))
            .into_iter()
            .filter_map(|packet| match packet {
                RecordedPacket::Metadata(packet) => Some(packet.entries),
                _ => None,
            })
            // the first one is the full entry metadata
            .skip(1)
            .collect();
        assert_eq!(updates, expected);
    }
}

#[test]
fn inline_and_worker_modes_send_the_same_frames() {
    let mut inline = TestHost::builder()
        .loaded_chunk(0, 0)
        .viewer(1, Position::new(0.0, 64.0, 0.0))
        .build();
    let mut workers = TestHost::builder()
        .loaded_chunk(0, 0)
        .viewer(1, Position::new(0.0, 64.0, 0.0))
        .worker_threads(3)
        .build();

    for test in [&mut inline, &mut workers] {
        let handle = test.spawn_text(Position::new(2.0, 66.0, 2.0), "&aSame").unwrap();
        test.manager
            .update_render_state(&handle, RenderState::legacy_text("&bStill same"))
            .unwrap();
        test.manager.flush();
    }

    assert_eq!(
        inline.sink.frames_for(ViewerId::new(1)),
        workers.sink.frames_for(ViewerId::new(1))
    );
}
