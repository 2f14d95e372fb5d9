use serde::Serialize;

/// The sixteen legacy chat colors, keyed by their `&`/`§` code character
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatColor {
    Black,
    DarkBlue,
    DarkGreen,
    DarkAqua,
    DarkRed,
    DarkPurple,
    Gold,
    Gray,
    DarkGray,
    Blue,
    Green,
    Aqua,
    Red,
    LightPurple,
    Yellow,
    White,
}

impl ChatColor {
    pub const ALL: [ChatColor; 16] = [
        ChatColor::Black,
        ChatColor::DarkBlue,
        ChatColor::DarkGreen,
        ChatColor::DarkAqua,
        ChatColor::DarkRed,
        ChatColor::DarkPurple,
        ChatColor::Gold,
        ChatColor::Gray,
        ChatColor::DarkGray,
        ChatColor::Blue,
        ChatColor::Green,
        ChatColor::Aqua,
        ChatColor::Red,
        ChatColor::LightPurple,
        ChatColor::Yellow,
        ChatColor::White,
    ];

    pub fn code(self) -> char {
        match self {
            ChatColor::Black => '0',
            ChatColor::DarkBlue => '1',
            ChatColor::DarkGreen => '2',
            ChatColor::DarkAqua => '3',
            ChatColor::DarkRed => '4',
            ChatColor::DarkPurple => '5',
            ChatColor::Gold => '6',
            ChatColor::Gray => '7',
            ChatColor::DarkGray => '8',
            ChatColor::Blue => '9',
            ChatColor::Green => 'a',
            ChatColor::Aqua => 'b',
            ChatColor::Red => 'c',
            ChatColor::LightPurple => 'd',
            ChatColor::Yellow => 'e',
            ChatColor::White => 'f',
        }
    }

    pub fn from_code(code: char) -> Option<Self> {
        let code = code.to_ascii_lowercase();
        Self::ALL.into_iter().find(|color| color.code() == code)
    }

    /// Parse a configured color such as `&7` or `§7`
    pub fn from_legacy(value: &str) -> Option<Self> {
        let mut chars = value.trim().chars();
        let (Some(prefix), Some(code), None) = (chars.next(), chars.next(), chars.next()) else {
            return None;
        };
        if prefix != '&' && prefix != super::SECTION_SIGN {
            return None;
        }
        Self::from_code(code)
    }

    pub fn to_legacy(self) -> String {
        format!("{}{}", super::SECTION_SIGN, self.code())
    }
}

/// Formatting codes that may follow a color in legacy text
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ChatFormat {
    Obfuscated,
    Bold,
    Strikethrough,
    Underlined,
    Italic,
    Reset,
}

impl ChatFormat {
    pub fn from_code(code: char) -> Option<Self> {
        match code.to_ascii_lowercase() {
            'k' => Some(ChatFormat::Obfuscated),
            'l' => Some(ChatFormat::Bold),
            'm' => Some(ChatFormat::Strikethrough),
            'n' => Some(ChatFormat::Underlined),
            'o' => Some(ChatFormat::Italic),
            'r' => Some(ChatFormat::Reset),
            _ => None,
        }
    }
}

/// Rewrites every `&` that starts a valid color or format code into `§`,
/// the form the client renders inside plain text. Other `&`s are kept.
pub fn translate_legacy_codes(input: &str) -> String {
    let mut output = String::with_capacity(input.len() + 1);
    let mut chars = input.chars().peekable();
    while let Some(current) = chars.next() {
        let is_code = chars.peek().is_some_and(|&next| {
            ChatColor::from_code(next).is_some() || ChatFormat::from_code(next).is_some()
        });
        if current == '&' && is_code {
            output.push(super::SECTION_SIGN);
        } else {
            output.push(current);
        }
    }
    output
}
