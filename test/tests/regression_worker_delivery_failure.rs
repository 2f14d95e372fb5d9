use holosync_shared::{Position, ViewerId};
use holosync_test::{assert_packet_kinds, TestHost};

// A spawn a dispatch worker could not deliver must be sent again on the next
// refresh, not forgotten because it was queued successfully.

#[test]
fn failed_worker_delivery_is_resent_on_refresh() {
    let mut test = TestHost::builder()
        .loaded_chunk(0, 0)
        .viewer(1, Position::new(0.0, 64.0, 0.0))
        .viewer(2, Position::new(4.0, 64.0, 4.0))
        .worker_threads(2)
        .build();
    test.sink.disconnect(ViewerId::new(2));

    let handle = test.spawn_text(Position::new(2.0, 66.0, 2.0), "hello").unwrap();
    test.manager.flush();
    assert_eq!(test.sink.count_for(ViewerId::new(2)), 0);

    test.sink.reconnect(ViewerId::new(2));
    test.manager.refresh();
    test.manager.flush();

    assert_packet_kinds!(test.sink, ViewerId::new(1), [Spawn, Metadata]);
    assert_packet_kinds!(test.sink, ViewerId::new(2), [Spawn, Metadata]);
    assert_eq!(
        test.manager.viewers_of(&handle),
        vec![ViewerId::new(1), ViewerId::new(2)]
    );
}

#[test]
fn healthy_viewers_are_not_resent() {
    let mut test = TestHost::builder()
        .loaded_chunk(0, 0)
        .viewer(1, Position::new(0.0, 64.0, 0.0))
        .worker_threads(2)
        .build();
    test.spawn_text(Position::new(2.0, 66.0, 2.0), "hello").unwrap();
    test.manager.flush();
    test.sink.clear();

    test.manager.refresh();
    test.manager.flush();

    assert_eq!(test.sink.count(), 0);
}
