//! Validated runtime settings.
//!
//! Reading the configuration file is left to the host plugin; it hands over a
//! [`RawSettings`] (any serde format) and gets back [`Settings`], with every
//! bad value replaced by its default and reported as a warning.

mod error;
mod server_address;
mod time;

use std::time::Duration;

use log::warn;
use serde::Deserialize;

pub use error::ConfigError;
pub use server_address::{parse_server_address, ServerAddress, DEFAULT_PORT};
pub use time::{parse_time_zone, TimeSettings, DEFAULT_TIME_FORMAT};

use crate::text::{translate_legacy_codes, ChatColor};

pub const DEFAULT_PINGER_TIMEOUT_MS: u64 = 100;
pub const MAX_PINGER_TIMEOUT_MS: u64 = 10_000;
pub const MIN_REFRESH_SECONDS: u64 = 1;
pub const MAX_REFRESH_SECONDS: u64 = 60;

/// Settings exactly as written in the configuration file
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct RawSettings {
    pub space_between_lines: f64,
    pub transparency_symbol: String,
    pub transparency_color: String,
    pub time_format: String,
    pub time_zone: String,
    pub bungee_refresh_seconds: i64,
    pub pinger: RawPingerSettings,
    pub debug: bool,
    pub worker_threads: usize,
}

impl Default for RawSettings {
    fn default() -> Self {
        Self {
            space_between_lines: 0.02,
            transparency_symbol: "[x]".to_string(),
            transparency_color: "&7".to_string(),
            time_format: DEFAULT_TIME_FORMAT.to_string(),
            time_zone: "UTC".to_string(),
            bungee_refresh_seconds: 3,
            pinger: RawPingerSettings::default(),
            debug: false,
            worker_threads: 0,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct RawPingerSettings {
    pub enabled: bool,
    pub timeout_ms: i64,
    pub trim_motd: bool,
    pub offline_motd: String,
    pub status_online: String,
    pub status_offline: String,
    pub servers: Vec<String>,
}

impl Default for RawPingerSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            timeout_ms: 500,
            trim_motd: true,
            offline_motd: "&cOffline, couldn't get the MOTD.".to_string(),
            status_online: "&aOnline".to_string(),
            status_offline: "&cOffline".to_string(),
            servers: Vec::new(),
        }
    }
}

/// Validated settings, shared read-only (usually as `Arc<Settings>`)
#[derive(Clone, Debug)]
pub struct Settings {
    /// Vertical gap between two hologram lines, in blocks
    pub space_between_lines: f64,
    /// Shown in [`Settings::transparency_color`] wherever it appears in a text line
    pub transparency_symbol: String,
    pub transparency_color: ChatColor,
    pub time: TimeSettings,
    /// How often remote servers are pinged
    pub refresh_interval: Duration,
    pub pinger: PingerSettings,
    pub debug: bool,
    /// Packet dispatch workers; 0 sends inline on the caller's thread
    pub worker_threads: usize,
}

#[derive(Clone, Debug)]
pub struct PingerSettings {
    pub enabled: bool,
    pub timeout: Duration,
    pub trim_motd: bool,
    /// The strings below hold `§` codes, ready to be shown as they are
    pub offline_motd: String,
    pub status_online: String,
    pub status_offline: String,
    pub servers: Vec<ServerAddress>,
}

impl Default for Settings {
    fn default() -> Self {
        Self::validate(RawSettings::default()).0
    }
}

impl Settings {
    /// Validates `raw`, logging a warning for every corrected value
    pub fn load(raw: RawSettings) -> Self {
        let (settings, problems) = Self::validate(raw);
        for problem in &problems {
            warn!("Settings: {}", problem);
        }
        settings
    }

    /// The transparency symbol prefixed with its color code
    pub fn transparency_text(&self) -> String {
        format!("{}{}", self.transparency_color.to_legacy(), self.transparency_symbol)
    }

    /// Validates `raw` and returns the corrections instead of logging them
    pub fn validate(raw: RawSettings) -> (Self, Vec<ConfigError>) {
        let mut problems = Vec::new();

        let space_between_lines = if raw.space_between_lines.is_finite()
            && raw.space_between_lines >= 0.0
        {
            raw.space_between_lines
        } else {
            problems.push(ConfigError::OutOfRange {
                key: "space_between_lines",
                value: raw.space_between_lines.to_string(),
                used: "0".to_string(),
            });
            0.0
        };

        let transparency_color = match ChatColor::from_legacy(&raw.transparency_color) {
            Some(color) => color,
            None => {
                problems.push(ConfigError::InvalidColor {
                    value: raw.transparency_color.clone(),
                });
                ChatColor::Gray
            }
        };

        let time = TimeSettings::parse(&raw.time_format, &raw.time_zone, &mut problems);

        let refresh_seconds = clamp_refresh_seconds(raw.bungee_refresh_seconds);
        if refresh_seconds as i64 != raw.bungee_refresh_seconds {
            problems.push(ConfigError::OutOfRange {
                key: "bungee_refresh_seconds",
                value: raw.bungee_refresh_seconds.to_string(),
                used: refresh_seconds.to_string(),
            });
        }

        let timeout = pinger_timeout(raw.pinger.timeout_ms);
        if timeout.as_millis() as i64 != raw.pinger.timeout_ms {
            problems.push(ConfigError::OutOfRange {
                key: "pinger.timeout_ms",
                value: raw.pinger.timeout_ms.to_string(),
                used: timeout.as_millis().to_string(),
            });
        }

        let mut servers: Vec<ServerAddress> = Vec::new();
        if raw.pinger.enabled {
            for entry in &raw.pinger.servers {
                match parse_server_address(entry) {
                    Ok(address) => {
                        // a repeated name replaces the earlier entry
                        servers.retain(|existing| existing.name() != address.name());
                        servers.push(address);
                    }
                    Err(problem) => problems.push(problem),
                }
            }
        }

        let settings = Self {
            space_between_lines,
            transparency_symbol: translate_legacy_codes(&raw.transparency_symbol),
            transparency_color,
            time,
            refresh_interval: Duration::from_secs(refresh_seconds),
            pinger: PingerSettings {
                enabled: raw.pinger.enabled,
                timeout,
                trim_motd: raw.pinger.trim_motd,
                offline_motd: translate_legacy_codes(&raw.pinger.offline_motd),
                status_online: translate_legacy_codes(&raw.pinger.status_online),
                status_offline: translate_legacy_codes(&raw.pinger.status_offline),
                servers,
            },
            debug: raw.debug,
            worker_threads: raw.worker_threads,
        };
        (settings, problems)
    }
}

/// `<= 0` means "unset" and becomes the default; anything past the maximum
/// is clamped.
pub fn pinger_timeout(timeout_ms: i64) -> Duration {
    let millis = if timeout_ms <= 0 {
        DEFAULT_PINGER_TIMEOUT_MS
    } else {
        (timeout_ms as u64).min(MAX_PINGER_TIMEOUT_MS)
    };
    Duration::from_millis(millis)
}

pub fn clamp_refresh_seconds(seconds: i64) -> u64 {
    seconds.clamp(MIN_REFRESH_SECONDS as i64, MAX_REFRESH_SECONDS as i64) as u64
}
