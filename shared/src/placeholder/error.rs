use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaceholderError {
    /// The replacer returned an error; the previous value stays visible
    #[error("The placeholder {token} registered by {owner} generated an error while updating: {reason}")]
    ReplacerFailed {
        token: String,
        owner: String,
        reason: String,
    },

    /// The replacer panicked; the previous value stays visible
    #[error("The placeholder {token} registered by {owner} panicked while updating")]
    ReplacerPanicked { token: String, owner: String },

    /// Tokens are unique across every owner
    #[error("The placeholder {token} is already registered by {owner}")]
    AlreadyRegistered { token: String, owner: String },

    /// Empty tokens would match every line
    #[error("\"{token}\" is not a valid placeholder token")]
    InvalidToken { token: String },
}
