use super::TextComponent;

/// Primitive operations on a host's rich text tree.
///
/// Substitution is written once against this trait; each host revision only
/// has to say how its own text nodes are read, cloned and linked.
pub trait TextAdapter: Send + Sync {
    fn text<'c>(&self, component: &'c TextComponent) -> &'c str;

    fn siblings<'c>(&self, component: &'c TextComponent) -> &'c [TextComponent];

    /// Attach `sibling` after the existing siblings of `component`, letting it
    /// inherit the parent's formatting
    fn add_sibling(&self, component: &mut TextComponent, sibling: TextComponent);

    /// A copy of `component` with new text and no siblings
    fn clone_with_text(&self, component: &TextComponent, text: &str) -> TextComponent;
}

/// Adapter for the built-in [`TextComponent`] tree
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultTextAdapter;

impl TextAdapter for DefaultTextAdapter {
    fn text<'c>(&self, component: &'c TextComponent) -> &'c str {
        component.text()
    }

    fn siblings<'c>(&self, component: &'c TextComponent) -> &'c [TextComponent] {
        component.siblings()
    }

    fn add_sibling(&self, component: &mut TextComponent, sibling: TextComponent) {
        component.push_sibling(sibling);
    }

    fn clone_with_text(&self, component: &TextComponent, text: &str) -> TextComponent {
        TextComponent::styled(text, component.style().clone())
    }
}

/// Replace every occurrence of `target` in the tree with `replacement`.
///
/// Sibling order and formatting are preserved. Spans that do not contain the
/// target keep sharing their text with the input; a node without siblings and
/// without a match is returned as a plain clone.
pub fn replace_text(
    adapter: &dyn TextAdapter,
    component: &TextComponent,
    target: &str,
    replacement: &str,
) -> TextComponent {
    let siblings = adapter.siblings(component);

    if siblings.is_empty() {
        return replace_if_needed(adapter, component, target, replacement);
    }

    let mut root = replace_if_needed(adapter, component, target, replacement);
    for sibling in siblings {
        let replaced = replace_text(adapter, sibling, target, replacement);
        adapter.add_sibling(&mut root, replaced);
    }
    root
}

fn replace_if_needed(
    adapter: &dyn TextAdapter,
    component: &TextComponent,
    target: &str,
    replacement: &str,
) -> TextComponent {
    let text = adapter.text(component);
    if text.contains(target) {
        adapter.clone_with_text(component, &text.replace(target, replacement))
    } else {
        component.without_siblings()
    }
}
