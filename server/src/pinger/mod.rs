//! Remote server status: a minimal status-protocol client and a tracker
//! that feeds the server-status placeholders.

mod client;
mod error;
mod status;
mod tracker;

pub use client::{fetch_status, MAX_RESPONSE_LENGTH};
pub use error::PingError;
pub use status::ServerStatus;
pub use tracker::{StatusTracker, STATUS_PLACEHOLDER_REFRESH_SECONDS};
