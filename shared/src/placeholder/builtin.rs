use crate::settings::TimeSettings;

use super::resolver::{Placeholder, Replacer};

/// Owner name used for placeholders holosync registers itself
pub const BUILTIN_OWNER: &str = "holosync";

pub const TIME_TOKEN: &str = "{time}";

/// `{time}`: the current time in the configured format and zone
pub fn time_placeholder(time: TimeSettings) -> Placeholder {
    Placeholder::new(
        BUILTIN_OWNER,
        TIME_TOKEN,
        0.9,
        Replacer::global(move || Ok(Some(time.render_now()))),
    )
}
