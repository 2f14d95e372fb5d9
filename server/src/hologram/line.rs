use holosync_shared::{
    replace_text, DefaultTextAdapter, ItemStack, LineId, Position, Settings, TextComponent,
};

use crate::sync::{CarrierHandle, RenderState};

/// Height of a text line, in blocks
pub const TEXT_LINE_HEIGHT: f64 = 0.23;
/// Height of an item line, in blocks
pub const ITEM_LINE_HEIGHT: f64 = 0.7;

/// What a hologram line displays
#[derive(Clone, Debug, PartialEq)]
pub enum LineContent {
    Text(TextComponent),
    Item(ItemStack),
}

impl LineContent {
    pub fn text(template: impl Into<TextComponent>) -> Self {
        LineContent::Text(template.into())
    }

    pub fn height(&self) -> f64 {
        match self {
            LineContent::Text(_) => TEXT_LINE_HEIGHT,
            LineContent::Item(_) => ITEM_LINE_HEIGHT,
        }
    }

    /// What the carrier shows; a text line gets the transparency symbol in
    /// its configured color
    pub(crate) fn render_state(&self, settings: &Settings) -> RenderState {
        match self {
            LineContent::Text(template) if !settings.transparency_symbol.is_empty() => {
                RenderState::Text(replace_text(
                    &DefaultTextAdapter,
                    template,
                    &settings.transparency_symbol,
                    &settings.transparency_text(),
                ))
            }
            LineContent::Text(template) => RenderState::Text(template.clone()),
            LineContent::Item(item) => RenderState::Item(item.clone()),
        }
    }

    pub(crate) fn same_kind(&self, other: &LineContent) -> bool {
        matches!(
            (self, other),
            (LineContent::Text(_), LineContent::Text(_)) | (LineContent::Item(_), LineContent::Item(_))
        )
    }
}

/// Carriers currently rendering a line. Item lines ride an invisible mount.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct LineCarriers {
    pub(crate) main: CarrierHandle,
    pub(crate) mount: Option<CarrierHandle>,
    pub(crate) position: Position,
    pub(crate) content: LineContent,
}

impl LineCarriers {
    pub(crate) fn handles(&self) -> impl Iterator<Item = CarrierHandle> + '_ {
        // passenger before mount
        std::iter::once(self.main).chain(self.mount)
    }

    pub(crate) fn uses(&self, handle: &CarrierHandle) -> bool {
        self.handles().any(|own| own == *handle)
    }
}

#[derive(Clone, Debug)]
pub struct HologramLine {
    id: LineId,
    content: LineContent,
    position: Position,
    pub(crate) carriers: Option<LineCarriers>,
}

impl HologramLine {
    pub(crate) fn new(id: LineId, content: LineContent) -> Self {
        Self {
            id,
            content,
            position: Position::default(),
            carriers: None,
        }
    }

    pub fn id(&self) -> LineId {
        self.id
    }

    pub fn content(&self) -> &LineContent {
        &self.content
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn height(&self) -> f64 {
        self.content.height()
    }

    /// True while carriers for this line exist
    pub fn is_spawned(&self) -> bool {
        self.carriers.is_some()
    }

    /// The carrier that shows the line's content
    pub fn carrier(&self) -> Option<CarrierHandle> {
        self.carriers.as_ref().map(|carriers| carriers.main)
    }

    pub(crate) fn set_content(&mut self, content: LineContent) {
        self.content = content;
    }

    pub(crate) fn set_position(&mut self, position: Position) {
        self.position = position;
    }
}
