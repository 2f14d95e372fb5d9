use std::time::Duration;

use holosync_shared::{
    ChatColor, ConfigError, RawPingerSettings, RawSettings, ServerAddress, Settings,
};

fn with_servers(servers: &[&str]) -> RawSettings {
    RawSettings {
        pinger: RawPingerSettings {
            enabled: true,
            servers: servers.iter().map(|entry| entry.to_string()).collect(),
            ..RawPingerSettings::default()
        },
        ..RawSettings::default()
    }
}

#[test]
fn malformed_server_entries_are_skipped() {
    let (settings, problems) =
        Settings::validate(with_servers(&["survival", "lobby:127.0.0.1", "games: mc.example.net : 25570"]));

    assert_eq!(
        settings.pinger.servers,
        vec![
            ServerAddress::new("lobby", "127.0.0.1", 25565),
            ServerAddress::new("games", "mc.example.net", 25570),
        ]
    );
    assert_eq!(
        problems,
        vec![ConfigError::MalformedServerEntry {
            entry: "survival".to_string()
        }]
    );
}

#[test]
fn bad_ports_and_empty_fields_are_reported() {
    let (settings, problems) =
        Settings::validate(with_servers(&["hub:host:port", ":127.0.0.1", "ok:10.0.0.1:25566"]));

    assert_eq!(settings.pinger.servers.len(), 1);
    assert_eq!(
        problems,
        vec![
            ConfigError::InvalidPort {
                entry: "hub:host:port".to_string()
            },
            ConfigError::EmptyServerField {
                entry: ":127.0.0.1".to_string()
            },
        ]
    );
}

#[test]
fn servers_are_ignored_while_the_pinger_is_disabled() {
    let mut raw = with_servers(&["lobby:127.0.0.1"]);
    raw.pinger.enabled = false;

    let (settings, problems) = Settings::validate(raw);

    assert!(settings.pinger.servers.is_empty());
    assert!(problems.is_empty());
}

#[test]
fn out_of_range_values_fall_back() {
    let (settings, problems) = Settings::validate(RawSettings {
        space_between_lines: -1.0,
        transparency_color: "purple".to_string(),
        bungee_refresh_seconds: 600,
        time_zone: "Mars/Olympus".to_string(),
        ..RawSettings::default()
    });

    assert_eq!(settings.space_between_lines, 0.0);
    assert_eq!(settings.transparency_color, ChatColor::Gray);
    assert_eq!(settings.refresh_interval, Duration::from_secs(60));
    assert_eq!(settings.time.zone().local_minus_utc(), 0);
    assert_eq!(problems.len(), 4);
    assert!(problems.contains(&ConfigError::InvalidTimeZone {
        zone: "Mars/Olympus".to_string()
    }));
}

#[test]
fn defaults_need_no_corrections() {
    let (settings, problems) = Settings::validate(RawSettings::default());

    assert!(problems.is_empty());
    assert!(!settings.pinger.enabled);
    assert_eq!(settings.refresh_interval, Duration::from_secs(3));
    assert_eq!(settings.worker_threads, 0);
}

#[test]
fn partial_config_file_keeps_defaults_for_missing_keys() {
    let raw: RawSettings = serde_json::from_str(
        r#"{
            "time_zone": "+02:00",
            "pinger": { "enabled": true, "timeout_ms": 0, "servers": ["lobby: localhost:25577"] }
        }"#,
    )
    .unwrap();

    let settings = Settings::load(raw);

    assert_eq!(settings.time.zone().local_minus_utc(), 7200);
    assert_eq!(settings.pinger.timeout, Duration::from_millis(100));
    assert_eq!(settings.pinger.status_online, "§aOnline");
    assert_eq!(
        settings.pinger.servers,
        vec![ServerAddress::new("lobby", "localhost", 25577)]
    );
    assert_eq!(settings.space_between_lines, 0.02);
}
