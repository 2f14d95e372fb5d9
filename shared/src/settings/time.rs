use chrono::{
    format::{Item, StrftimeItems},
    DateTime, FixedOffset, Offset, Utc,
};

use super::error::ConfigError;

pub const DEFAULT_TIME_FORMAT: &str = "%H:%M";

/// Format and zone used by the `{time}` placeholder
#[derive(Clone, Debug)]
pub struct TimeSettings {
    format: String,
    zone: FixedOffset,
}

impl Default for TimeSettings {
    fn default() -> Self {
        Self {
            format: DEFAULT_TIME_FORMAT.to_string(),
            zone: utc(),
        }
    }
}

impl TimeSettings {
    pub(crate) fn parse(format: &str, zone: &str, problems: &mut Vec<ConfigError>) -> Self {
        let format = if is_valid_format(format) {
            format.to_string()
        } else {
            problems.push(ConfigError::InvalidTimeFormat {
                format: format.to_string(),
            });
            DEFAULT_TIME_FORMAT.to_string()
        };
        let zone = match parse_time_zone(zone) {
            Ok(zone) => zone,
            Err(problem) => {
                problems.push(problem);
                utc()
            }
        };
        Self { format, zone }
    }

    pub fn format(&self) -> &str {
        &self.format
    }

    pub fn zone(&self) -> FixedOffset {
        self.zone
    }

    pub fn render(&self, instant: DateTime<Utc>) -> String {
        instant
            .with_timezone(&self.zone)
            .format(&self.format)
            .to_string()
    }

    pub fn render_now(&self) -> String {
        self.render(Utc::now())
    }
}

fn is_valid_format(format: &str) -> bool {
    !format.is_empty() && !StrftimeItems::new(format).any(|item| matches!(item, Item::Error))
}

fn utc() -> FixedOffset {
    Utc.fix()
}

/// Accepts `UTC`, `GMT`, `Z`, or an offset like `+02:00`, `-0330`, `GMT+1`
pub fn parse_time_zone(zone: &str) -> Result<FixedOffset, ConfigError> {
    let invalid = || ConfigError::InvalidTimeZone {
        zone: zone.to_string(),
    };
    let trimmed = zone.trim();
    let offset = trimmed
        .strip_prefix("UTC")
        .or_else(|| trimmed.strip_prefix("GMT"))
        .unwrap_or(trimmed);
    if offset.is_empty() || offset == "Z" {
        return Ok(utc());
    }

    let (sign, digits) = if let Some(rest) = offset.strip_prefix('+') {
        (1, rest)
    } else if let Some(rest) = offset.strip_prefix('-') {
        (-1, rest)
    } else {
        return Err(invalid());
    };
    let (hours, minutes) = match digits.split_once(':') {
        Some((hours, minutes)) => (hours, minutes),
        None if digits.len() == 4 && digits.is_ascii() => digits.split_at(2),
        None => (digits, "0"),
    };
    let (Ok(hours), Ok(minutes)) = (hours.parse::<i32>(), minutes.parse::<i32>()) else {
        return Err(invalid());
    };
    if !(0..=18).contains(&hours) || !(0..60).contains(&minutes) {
        return Err(invalid());
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).ok_or_else(invalid)
}
