use holosync_shared::{CarrierKind, ItemStack, TextComponent};

/// What a carrier should show, before placeholders are resolved
#[derive(Clone, Debug, PartialEq)]
pub enum RenderState {
    /// A text template; registered placeholder tokens are resolved per viewer
    Text(TextComponent),
    Item(ItemStack),
    /// Mounts show nothing themselves
    Mount,
}

impl RenderState {
    pub fn text(template: impl Into<TextComponent>) -> Self {
        RenderState::Text(template.into())
    }

    /// Convenience for `&`-coded text
    pub fn legacy_text(template: &str) -> Self {
        RenderState::Text(TextComponent::from_legacy(template))
    }

    pub fn kind(&self) -> CarrierKind {
        match self {
            RenderState::Text(_) => CarrierKind::Text,
            RenderState::Item(_) => CarrierKind::Item,
            RenderState::Mount => CarrierKind::Mount,
        }
    }

    pub(crate) fn name(&self) -> &'static str {
        self.kind().name()
    }
}

/// What one viewer was last sent for a carrier
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum ResolvedRender {
    Text(TextComponent),
    Item(ItemStack),
    Mount,
}

impl ResolvedRender {
    pub(crate) fn name(&self) -> Option<&TextComponent> {
        match self {
            ResolvedRender::Text(text) => Some(text),
            _ => None,
        }
    }

    pub(crate) fn item(&self) -> Option<&ItemStack> {
        match self {
            ResolvedRender::Item(item) => Some(item),
            _ => None,
        }
    }
}
