use serde::Deserialize;
use serde_json::Value;

use super::error::PingError;

/// What the status tracker knows about one remote server
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerStatus {
    pub online: bool,
    pub players_online: u32,
    pub players_max: u32,
    pub motd: String,
}

impl ServerStatus {
    pub fn offline(offline_motd: &str) -> Self {
        Self {
            online: false,
            players_online: 0,
            players_max: 0,
            motd: offline_motd.to_string(),
        }
    }

    /// Parses a status response document. Lines of the motd are trimmed when
    /// `trim_motd` is set.
    pub fn parse(json: &str, trim_motd: bool) -> Result<Self, PingError> {
        let document: StatusDocument =
            serde_json::from_str(json).map_err(|error| PingError::InvalidJson {
                reason: error.to_string(),
            })?;

        let mut motd = String::new();
        if let Some(description) = &document.description {
            flatten_description(description, &mut motd);
        }
        if trim_motd {
            motd = motd
                .split('\n')
                .map(str::trim)
                .collect::<Vec<_>>()
                .join("\n");
        }

        let players = document.players.unwrap_or_default();
        Ok(Self {
            online: true,
            players_online: players.online,
            players_max: players.max,
            motd,
        })
    }
}

#[derive(Deserialize)]
struct StatusDocument {
    description: Option<Value>,
    players: Option<Players>,
}

#[derive(Default, Deserialize)]
struct Players {
    #[serde(default)]
    online: u32,
    #[serde(default)]
    max: u32,
}

/// The description is either a plain string or a chat component with
/// `text` and `extra`
fn flatten_description(value: &Value, out: &mut String) {
    match value {
        Value::String(text) => out.push_str(text),
        Value::Object(component) => {
            if let Some(Value::String(text)) = component.get("text") {
                out.push_str(text);
            }
            if let Some(Value::Array(extra)) = component.get("extra") {
                for child in extra {
                    flatten_description(child, out);
                }
            }
        }
        Value::Array(parts) => {
            for part in parts {
                flatten_description(part, out);
            }
        }
        _ => {}
    }
}
