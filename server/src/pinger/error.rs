use thiserror::Error;

use holosync_shared::SerdeErr;

/// Why one status ping failed. Failures only ever affect their own target.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PingError {
    /// The TCP connection could not be opened
    #[error("Could not connect to {address}: {reason}")]
    Connect { address: String, reason: String },

    /// The server did not answer within the configured timeout
    #[error("{address} did not answer within {timeout_ms} ms")]
    Timeout { address: String, timeout_ms: u128 },

    /// The answer was not a valid status response
    #[error("Invalid status response: {0}")]
    Protocol(#[from] SerdeErr),

    /// The declared response length is larger than any real status response
    #[error("Status response of {length} bytes exceeds the limit of {max}")]
    ResponseTooLarge { length: usize, max: usize },

    /// The status JSON could not be understood
    #[error("Invalid status JSON: {reason}")]
    InvalidJson { reason: String },

    /// The connection failed after it was opened
    #[error("I/O error while pinging {address}: {reason}")]
    Io { address: String, reason: String },
}
