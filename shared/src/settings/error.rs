use thiserror::Error;

/// A configuration value that could not be used as written.
///
/// `Settings::load` never returns these; each one is logged as a warning and
/// the affected value falls back to a safe default.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Server entry has no `name:address` separator
    #[error("The server info \"{entry}\" is not valid. There should be a name and an address, separated by a colon.")]
    MalformedServerEntry { entry: String },

    /// Server entry name or host is empty
    #[error("The server info \"{entry}\" has an empty name or address.")]
    EmptyServerField { entry: String },

    /// Port is not a number in 0..=65535
    #[error("Invalid port number in the server info \"{entry}\".")]
    InvalidPort { entry: String },

    /// Not an `&`-style color code
    #[error("\"{value}\" is not a valid chat color, light gray (&7) will be used.")]
    InvalidColor { value: String },

    /// strftime pattern chrono cannot format
    #[error("Time format \"{format}\" is not valid, using the default.")]
    InvalidTimeFormat { format: String },

    /// Numeric value outside its allowed range
    #[error("{key} = {value} is out of range, {used} will be used.")]
    OutOfRange {
        key: &'static str,
        value: String,
        used: String,
    },

    /// Neither `UTC`/`GMT` nor a `+HH:MM` offset
    #[error("Time zone \"{zone}\" is not valid, using UTC.")]
    InvalidTimeZone { zone: String },
}
