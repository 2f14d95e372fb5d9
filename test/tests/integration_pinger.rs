use std::time::Duration;

use holosync_server::{fetch_status, PingError, ServerStatus, StatusTracker};
use holosync_shared::{
    pinger_timeout, DefaultTextAdapter, PlaceholderRegistry, RawPingerSettings, RawSettings,
    SerdeErr, ServerAddress, Settings, TextComponent, NEXT_STATE_STATUS, PING_PROTOCOL_VERSION,
};
use holosync_test::StatusServer;

const STATUS_JSON: &str =
    r#"{"version":{"name":"1.16.5","protocol":754},"players":{"max":50,"online":12},"description":{"text":" Survival games "}}"#;

#[test]
fn timeout_zero_uses_default() {
    assert_eq!(pinger_timeout(0), Duration::from_millis(100));
}

#[test]
fn timeout_above_limit_is_clamped() {
    assert_eq!(pinger_timeout(20000), Duration::from_millis(10000));
}

#[test]
fn configured_timeouts_flow_into_settings() {
    let settings = Settings::load(RawSettings {
        pinger: RawPingerSettings {
            enabled: true,
            timeout_ms: -5,
            ..RawPingerSettings::default()
        },
        ..RawSettings::default()
    });
    assert_eq!(settings.pinger.timeout, Duration::from_millis(100));
}

#[tokio::test]
async fn fetches_status_over_loopback() {
    let server = StatusServer::answering(STATUS_JSON).await;

    let response = fetch_status(&server.address("lobby"), Duration::from_secs(2))
        .await
        .unwrap();

    assert_eq!(response.json, STATUS_JSON);
    let handshakes = server.handshakes();
    assert_eq!(handshakes.len(), 1);
    assert_eq!(handshakes[0].protocol_version, PING_PROTOCOL_VERSION);
    assert_eq!(handshakes[0].address, "127.0.0.1");
    assert_eq!(handshakes[0].next_state, NEXT_STATE_STATUS);
}

#[tokio::test]
async fn silent_server_times_out() {
    let server = StatusServer::silent().await;

    let result = fetch_status(&server.address("stuck"), Duration::from_millis(100)).await;

    assert!(matches!(result, Err(PingError::Timeout { timeout_ms: 100, .. })));
}

#[tokio::test]
async fn short_response_is_a_protocol_error() {
    let server = StatusServer::truncated().await;

    let result = fetch_status(&server.address("broken"), Duration::from_secs(2)).await;

    assert_eq!(
        result,
        Err(PingError::Protocol(SerdeErr::Truncated {
            needed: 16,
            remaining: 0
        }))
    );
}

fn tracker_settings(servers: Vec<String>) -> Settings {
    Settings::load(RawSettings {
        pinger: RawPingerSettings {
            enabled: true,
            timeout_ms: 300,
            trim_motd: true,
            offline_motd: "&cOffline".to_string(),
            servers,
            ..RawPingerSettings::default()
        },
        ..RawSettings::default()
    })
}

#[tokio::test]
async fn one_dead_target_does_not_affect_the_others() {
    let live = StatusServer::answering(STATUS_JSON).await;
    let stuck = StatusServer::silent().await;
    // bind then drop, so nothing listens on this port
    let closed_port = {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap().port()
    };
    let settings = tracker_settings(vec![
        format!("live: 127.0.0.1:{}", live.address("live").port()),
        format!("stuck: 127.0.0.1:{}", stuck.address("stuck").port()),
        format!("closed: 127.0.0.1:{}", closed_port),
    ]);
    let tracker = StatusTracker::new(&settings);

    let mut results = tracker.ping_all().await;
    results.sort_by(|a, b| a.0.cmp(&b.0));

    assert_eq!(results[0].0, "closed");
    assert!(matches!(results[0].1, Err(PingError::Connect { .. })));
    assert_eq!(
        results[1],
        (
            "live".to_string(),
            Ok(ServerStatus {
                online: true,
                players_online: 12,
                players_max: 50,
                motd: "Survival games".to_string(),
            })
        )
    );
    assert_eq!(results[2].0, "stuck");
    assert!(matches!(results[2].1, Err(PingError::Timeout { .. })));

    assert!(tracker.status("live").unwrap().online);
    assert_eq!(tracker.status("stuck"), Some(ServerStatus::offline("§cOffline")));
    assert_eq!(tracker.status("closed"), Some(ServerStatus::offline("§cOffline")));
}

#[tokio::test]
async fn status_placeholders_follow_the_tracker() {
    let live = StatusServer::answering(STATUS_JSON).await;
    let settings = tracker_settings(vec![format!(
        "lobby: 127.0.0.1:{}",
        live.address("lobby").port()
    )]);
    let tracker = StatusTracker::new(&settings);
    let mut registry = PlaceholderRegistry::new();
    tracker.register_placeholders(&mut registry).unwrap();

    let template = TextComponent::new("{online: lobby}/{max_players: lobby} {status: lobby}");
    let before = registry.resolve(&DefaultTextAdapter, &template, 10, None);
    assert_eq!(before.plain_text(), "0/0 §cOffline");

    tracker.ping_all().await;
    let after = registry.resolve(&DefaultTextAdapter, &template, 20, None);
    assert_eq!(after.plain_text(), "12/50 §aOnline");
}

#[test]
fn status_placeholder_shows_colored_text() {
    let tracker = StatusTracker::new(&tracker_settings(vec!["lobby:127.0.0.1".to_string()]));
    let mut registry = PlaceholderRegistry::new();
    tracker.register_placeholders(&mut registry).unwrap();

    let template = TextComponent::from_legacy("&fLobby: {status: lobby}");
    let resolved = registry.resolve(&DefaultTextAdapter, &template, 10, None);
    let json = resolved.to_json().unwrap();

    assert!(json.contains("Lobby: §cOffline"), "{}", json);
    assert!(!json.contains("&c"), "{}", json);
}

#[test]
fn unknown_server_name_is_not_tracked() {
    let tracker = StatusTracker::new(&tracker_settings(vec!["lobby:127.0.0.1".to_string()]));
    assert_eq!(
        tracker.servers(),
        &[ServerAddress::new("lobby", "127.0.0.1", 25565)]
    );
    assert_eq!(tracker.status("survival"), None);
}
