mod adapter;
mod color;
mod component;

pub use adapter::{replace_text, DefaultTextAdapter, TextAdapter};
pub use color::{translate_legacy_codes, ChatColor, ChatFormat};
pub use component::{TextComponent, TextStyle};

/// The client-side formatting prefix character
pub const SECTION_SIGN: char = '§';
