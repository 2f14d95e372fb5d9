use std::sync::Arc;

use serde::Serialize;

use super::{ChatColor, ChatFormat, SECTION_SIGN};

/// Formatting carried by one text span. Unset fields inherit from the parent.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct TextStyle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<ChatColor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bold: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub italic: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub underlined: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strikethrough: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub obfuscated: Option<bool>,
}

impl TextStyle {
    pub fn colored(color: ChatColor) -> Self {
        Self {
            color: Some(color),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Fill every unset field from `parent`
    pub fn inherit_from(&mut self, parent: &TextStyle) {
        self.color = self.color.or(parent.color);
        self.bold = self.bold.or(parent.bold);
        self.italic = self.italic.or(parent.italic);
        self.underlined = self.underlined.or(parent.underlined);
        self.strikethrough = self.strikethrough.or(parent.strikethrough);
        self.obfuscated = self.obfuscated.or(parent.obfuscated);
    }

    fn apply_format(&mut self, format: ChatFormat) {
        match format {
            ChatFormat::Obfuscated => self.obfuscated = Some(true),
            ChatFormat::Bold => self.bold = Some(true),
            ChatFormat::Strikethrough => self.strikethrough = Some(true),
            ChatFormat::Underlined => self.underlined = Some(true),
            ChatFormat::Italic => self.italic = Some(true),
            ChatFormat::Reset => *self = Self::default(),
        }
    }
}

/// A node of a rich text tree: a span of text, its style, and an ordered list
/// of sibling spans rendered after it.
///
/// Leaf text is reference counted, so cloning a tree copies every style but
/// shares the immutable strings.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct TextComponent {
    text: Arc<str>,
    #[serde(flatten)]
    style: TextStyle,
    #[serde(rename = "extra", skip_serializing_if = "Vec::is_empty")]
    siblings: Vec<TextComponent>,
}

impl TextComponent {
    pub fn new(text: impl Into<Arc<str>>) -> Self {
        Self::styled(text, TextStyle::default())
    }

    pub fn styled(text: impl Into<Arc<str>>, style: TextStyle) -> Self {
        Self {
            text: text.into(),
            style,
            siblings: Vec::new(),
        }
    }

    /// Parse text containing `&` or `§` color and format codes.
    ///
    /// Text without codes becomes a single node; otherwise an empty root with
    /// one sibling per styled run. A color code resets formatting, as the
    /// client does.
    pub fn from_legacy(input: &str) -> Self {
        let mut root = TextComponent::new("");
        let mut style = TextStyle::default();
        let mut run = String::new();
        let mut saw_code = false;

        let mut chars = input.chars().peekable();
        while let Some(current) = chars.next() {
            if current == '&' || current == SECTION_SIGN {
                if let Some(&code) = chars.peek() {
                    let color = ChatColor::from_code(code);
                    let format = ChatFormat::from_code(code);
                    if color.is_some() || format.is_some() {
                        chars.next();
                        saw_code = true;
                        if !run.is_empty() {
                            root.siblings
                                .push(TextComponent::styled(std::mem::take(&mut run), style.clone()));
                        }
                        if let Some(color) = color {
                            style = TextStyle::colored(color);
                        } else if let Some(format) = format {
                            style.apply_format(format);
                        }
                        continue;
                    }
                }
            }
            run.push(current);
        }

        if !saw_code {
            return TextComponent::new(run);
        }
        if !run.is_empty() {
            root.siblings.push(TextComponent::styled(run, style));
        }
        root
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn style(&self) -> &TextStyle {
        &self.style
    }

    pub fn style_mut(&mut self) -> &mut TextStyle {
        &mut self.style
    }

    pub fn siblings(&self) -> &[TextComponent] {
        &self.siblings
    }

    /// Append a sibling, which inherits any style it does not set itself
    pub fn push_sibling(&mut self, mut sibling: TextComponent) {
        sibling.style.inherit_from(&self.style);
        self.siblings.push(sibling);
    }

    /// Same text and style, no siblings. The text is shared, not copied.
    pub fn without_siblings(&self) -> Self {
        Self {
            text: Arc::clone(&self.text),
            style: self.style.clone(),
            siblings: Vec::new(),
        }
    }

    pub fn shares_text_with(&self, other: &TextComponent) -> bool {
        Arc::ptr_eq(&self.text, &other.text)
    }

    /// Visit every span of text in render order
    pub fn for_each_text<'c>(&'c self, visitor: &mut dyn FnMut(&'c str)) {
        visitor(&self.text);
        for sibling in &self.siblings {
            sibling.for_each_text(visitor);
        }
    }

    /// Concatenated text with all formatting dropped
    pub fn plain_text(&self) -> String {
        let mut output = String::new();
        self.for_each_text(&mut |text| output.push_str(text));
        output
    }

    /// Render in the JSON chat format used by custom-name metadata
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl From<&str> for TextComponent {
    fn from(text: &str) -> Self {
        TextComponent::from_legacy(text)
    }
}
