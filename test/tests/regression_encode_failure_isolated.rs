use holosync_shared::{Placeholder, Position, Replacer, ViewerId, MAX_STRING_LENGTH};
use holosync_test::{assert_packet_kinds, TestHost};

// A value too long to encode for one viewer used to abort the whole refresh
// pass and was retried (and logged) on every tick afterwards.

fn host_with_oversized_name_for_viewer_two() -> TestHost {
    let mut test = TestHost::builder()
        .loaded_chunk(0, 0)
        .viewer(1, Position::new(0.0, 64.0, 0.0))
        .viewer(2, Position::new(4.0, 64.0, 4.0))
        .build();
    test.manager
        .register_placeholder(Placeholder::with_tenths(
            "greeter",
            "{name}",
            1,
            Replacer::per_viewer(|viewer| {
                if viewer == ViewerId::new(2) {
                    Ok(Some("x".repeat(MAX_STRING_LENGTH + 8000)))
                } else {
                    Ok(Some(format!("viewer {}", viewer.get())))
                }
            }),
        ))
        .unwrap();
    test
}

#[test]
fn other_viewers_still_get_updates() {
    let mut test = host_with_oversized_name_for_viewer_two();
    let handle = test.spawn_text(Position::new(2.0, 66.0, 2.0), "Hi {name}").unwrap();

    test.set_tenth(1);
    test.manager.refresh();

    assert_packet_kinds!(test.sink, ViewerId::new(1), [Spawn, Metadata, Metadata]);
    assert_packet_kinds!(test.sink, ViewerId::new(2), [Spawn, Metadata]);
    assert_eq!(
        test.manager.viewers_of(&handle),
        vec![ViewerId::new(1), ViewerId::new(2)]
    );
}

#[test]
fn failed_state_is_not_retried_until_it_changes() {
    let mut test = host_with_oversized_name_for_viewer_two();
    test.spawn_text(Position::new(2.0, 66.0, 2.0), "Hi {name}").unwrap();
    test.set_tenth(1);
    test.manager.refresh();
    test.sink.clear();

    for tenth in 2..10 {
        test.set_tenth(tenth);
        assert_eq!(test.manager.refresh(), 0);
    }

    assert_eq!(test.sink.count(), 0);
}

#[test]
fn entering_viewer_with_unencodable_state_is_skipped() {
    let mut test = host_with_oversized_name_for_viewer_two();
    test.host.move_viewer(ViewerId::new(2), Position::new(900.0, 64.0, 0.0));
    let handle = test.spawn_text(Position::new(2.0, 66.0, 2.0), "Hi {name}").unwrap();
    test.set_tenth(1);
    test.manager.refresh();

    test.host.move_viewer(ViewerId::new(2), Position::new(4.0, 64.0, 4.0));
    test.set_tenth(2);
    test.manager.refresh();

    assert_eq!(test.sink.count_for(ViewerId::new(2)), 0);
    assert_eq!(test.manager.viewers_of(&handle), vec![ViewerId::new(1)]);
}
