use std::sync::Arc;

use holosync_server::{RenderState, Runtime};
use holosync_shared::{
    CarrierKind, ChunkPos, Position, ProtocolRevision, RawPingerSettings, RawSettings,
    ReferenceAdapter, Settings, StartupError, ViewerId, WorldId, TIME_TOKEN,
};
use holosync_test::RecordingSink;

fn sink() -> Arc<RecordingSink> {
    Arc::new(RecordingSink::new(ProtocolRevision::reference()))
}

#[test]
fn activates_on_the_reference_revision() {
    let runtime = Runtime::activate("v1_16_R3", Settings::default(), sink()).unwrap();

    assert_eq!(runtime.manager().adapter().revision(), "v1_16_R3");
    assert!(runtime.manager().placeholders().is_registered(TIME_TOKEN));
    // pinger disabled, so no status tokens
    assert_eq!(runtime.manager().placeholders().len(), 1);
    assert!(!runtime.tracker().is_running());
}

#[test]
fn debug_setting_raises_the_log_level() {
    let settings = Settings::load(RawSettings {
        debug: true,
        ..RawSettings::default()
    });

    let runtime = Runtime::activate("v1_16_R3", settings, sink()).unwrap();

    assert!(runtime.settings().debug);
    assert!(log::max_level() >= log::LevelFilter::Debug);
}

#[test]
fn unknown_revision_refuses_to_activate() {
    let result = Runtime::activate("v1_8_R1", Settings::default(), sink());

    let Err(error) = result else {
        panic!("activation should have been refused");
    };
    assert_eq!(
        error,
        StartupError::UnsupportedRevision {
            revision: "v1_8_R1".to_string(),
            supported: "v1_16_R3".to_string(),
        }
    );
    assert!(error.operator_message().contains("could not start"));
}

#[test]
fn failed_entity_registration_refuses_to_activate() {
    let host = ReferenceAdapter::new();
    host.set_custom_entities_supported(false);

    let result = Runtime::activate_with(Box::new(host.clone()), Settings::default(), sink());

    assert!(matches!(
        result,
        Err(StartupError::EntityRegistrationFailed { .. })
    ));
    assert!(!host.is_set_up());
}

#[test]
fn status_tokens_are_registered_when_the_pinger_is_enabled() {
    let settings = Settings::load(RawSettings {
        pinger: RawPingerSettings {
            enabled: true,
            servers: vec!["lobby:127.0.0.1".to_string(), "games:127.0.0.1:25570".to_string()],
            ..RawPingerSettings::default()
        },
        ..RawSettings::default()
    });

    let runtime = Runtime::activate("v1_16_R3", settings, sink()).unwrap();

    let placeholders = runtime.manager().placeholders();
    assert_eq!(placeholders.len(), 9);
    for token in ["{online: lobby}", "{max_players: games}", "{status: lobby}", "{motd: games}"] {
        assert!(placeholders.is_registered(token), "{} missing", token);
    }
}

#[test]
fn shutdown_despawns_every_carrier() {
    let host = ReferenceAdapter::new();
    let world = WorldId::new("world");
    host.load_chunk(&world, ChunkPos::new(0, 0));
    host.add_viewer(ViewerId::new(1), &world, Position::new(0.0, 64.0, 0.0));
    let sink = sink();
    let mut runtime =
        Runtime::activate_with(Box::new(host.clone()), Settings::default(), sink.clone()).unwrap();
    for x in 0..3 {
        runtime
            .manager_mut()
            .spawn(
                CarrierKind::Text,
                &world,
                Position::new(f64::from(x), 66.0, 1.0),
                RenderState::text("line"),
            )
            .unwrap();
    }
    assert_eq!(host.registered_count(&world), 3);

    runtime.shutdown();

    assert_eq!(host.registered_count(&world), 0);
    // spawn + metadata + destroy for each
    assert_eq!(sink.count_for(ViewerId::new(1)), 9);
}
