use thiserror::Error;

use super::CarrierState;

/// Errors raised by carrier bookkeeping
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CarrierError {
    /// No carrier with this id is tracked
    #[error("Carrier {entity_id} not found")]
    NotFound { entity_id: String },

    /// A carrier with this id is already tracked
    #[error("Carrier {entity_id} is already tracked")]
    AlreadyTracked { entity_id: String },

    /// Only mount carriers can have a passenger
    #[error("Carrier {entity_id} is a {kind} carrier and cannot carry a passenger")]
    NotAMount { entity_id: String, kind: &'static str },

    /// A carrier cannot ride itself
    #[error("Carrier {entity_id} cannot be its own passenger")]
    SelfMount { entity_id: String },

    /// The lifecycle state machine does not allow this transition
    #[error("Carrier {entity_id} cannot move from {from:?} to {to:?}")]
    InvalidTransition {
        entity_id: String,
        from: CarrierState,
        to: CarrierState,
    },
}
