use thiserror::Error;

use crate::types::ViewerId;

/// Problems that keep holosync from activating at all
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StartupError {
    /// No adapter exists for the host's internal revision
    #[error("Server revision {revision} is not supported (supported: {supported})")]
    UnsupportedRevision { revision: String, supported: String },

    /// The host does not expose something the adapter needs
    #[error("The server does not provide the required capability: {capability}")]
    MissingCapability { capability: &'static str },

    /// Registering a custom carrier entity type with the host failed
    #[error("Could not register the custom {kind} entity: {reason}")]
    EntityRegistrationFailed { kind: &'static str, reason: String },
}

impl StartupError {
    /// The banner shown to server operators when activation is refused
    pub fn operator_message(&self) -> String {
        let hint = match self {
            StartupError::UnsupportedRevision { .. } => {
                "Please check that you are using a supported server version, or update holosync."
            }
            StartupError::MissingCapability { .. } => {
                "Your server software is missing a feature holosync needs. Try a different server build."
            }
            StartupError::EntityRegistrationFailed { .. } => {
                "This is usually caused by another plugin or an incompatible server build."
            }
        };
        let rule = "*".repeat(56);
        format!(
            "\n{}\n  holosync could not start and has been disabled.\n\n  {}\n  {}\n{}\n",
            rule, self, hint, rule
        )
    }
}

/// A viewer connection refused a payload
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendError {
    /// The viewer is no longer connected
    #[error("{viewer} is not connected")]
    Disconnected { viewer: ViewerId },

    /// The connection rejected the payload
    #[error("Could not send {length} bytes to {viewer}: {reason}")]
    Rejected {
        viewer: ViewerId,
        length: usize,
        reason: String,
    },
}
