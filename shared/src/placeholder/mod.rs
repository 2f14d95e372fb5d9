mod builtin;
mod error;
mod resolver;
mod registry;

pub use builtin::{time_placeholder, BUILTIN_OWNER, TIME_TOKEN};
pub use error::PlaceholderError;
pub use resolver::{
    tenths_from_seconds, Placeholder, Replacer, ReplacerResult, NULL_REPLACEMENT,
};
pub use registry::{PlaceholderRegistry, HOST_TICKS_PER_TENTH};
