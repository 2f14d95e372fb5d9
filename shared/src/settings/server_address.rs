use std::fmt;

use super::error::ConfigError;

/// Port assumed when a pinger target leaves it out
pub const DEFAULT_PORT: u16 = 25565;

/// A named remote server the status pinger polls
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct ServerAddress {
    name: String,
    host: String,
    port: u16,
}

impl ServerAddress {
    pub fn new(name: impl Into<String>, host: impl Into<String>, port: u16) -> Self {
        Self {
            name: name.into(),
            host: host.into(),
            port,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

impl fmt::Display for ServerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}:{})", self.name, self.host, self.port)
    }
}

/// Parses a `name:host[:port]` entry.
///
/// The name is trimmed and every space is removed from the address part.
pub fn parse_server_address(entry: &str) -> Result<ServerAddress, ConfigError> {
    let Some((name, address)) = entry.split_once(':') else {
        return Err(ConfigError::MalformedServerEntry {
            entry: entry.to_string(),
        });
    };
    let name = name.trim();
    let address = address.replace(' ', "");

    let (host, port) = match address.split_once(':') {
        Some((host, port)) => {
            let Ok(port) = port.parse::<u16>() else {
                return Err(ConfigError::InvalidPort {
                    entry: entry.to_string(),
                });
            };
            (host.to_string(), port)
        }
        None => (address, DEFAULT_PORT),
    };

    if name.is_empty() || host.is_empty() {
        return Err(ConfigError::EmptyServerField {
            entry: entry.to_string(),
        });
    }

    Ok(ServerAddress::new(name, host, port))
}
