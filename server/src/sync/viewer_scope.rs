use std::collections::{BTreeMap, BTreeSet};

use holosync_shared::ViewerId;

use super::render::{RenderState, ResolvedRender};

/// Per-carrier record of which viewers have it spawned client-side, and what
/// each of them was last sent.
pub(crate) struct ViewerScope {
    pub(crate) render: RenderState,
    sent: BTreeMap<ViewerId, ResolvedRender>,
    // last state that failed to encode for a viewer, so it is not retried
    // (and logged) every pass
    failed: BTreeMap<ViewerId, ResolvedRender>,
}

impl ViewerScope {
    pub(crate) fn new(render: RenderState) -> Self {
        Self {
            render,
            sent: BTreeMap::new(),
            failed: BTreeMap::new(),
        }
    }

    pub(crate) fn has(&self, viewer: &ViewerId) -> bool {
        self.sent.contains_key(viewer)
    }

    pub(crate) fn viewers(&self) -> Vec<ViewerId> {
        self.sent.keys().copied().collect()
    }

    pub(crate) fn last_sent(&self, viewer: &ViewerId) -> Option<&ResolvedRender> {
        self.sent.get(viewer)
    }

    pub(crate) fn include(&mut self, viewer: ViewerId, sent: ResolvedRender) {
        self.failed.remove(&viewer);
        self.sent.insert(viewer, sent);
    }

    pub(crate) fn exclude(&mut self, viewer: &ViewerId) -> bool {
        self.failed.remove(viewer);
        self.sent.remove(viewer).is_some()
    }

    /// Viewers that have the carrier but are no longer in range
    pub(crate) fn leaving(&self, in_range: &BTreeSet<ViewerId>) -> Vec<ViewerId> {
        self.sent
            .keys()
            .filter(|viewer| !in_range.contains(viewer))
            .copied()
            .collect()
    }

    pub(crate) fn already_failed(&self, viewer: &ViewerId, resolved: &ResolvedRender) -> bool {
        self.failed.get(viewer) == Some(resolved)
    }

    pub(crate) fn mark_failed(&mut self, viewer: ViewerId, resolved: ResolvedRender) {
        self.failed.insert(viewer, resolved);
    }

    pub(crate) fn clear(&mut self) -> Vec<ViewerId> {
        self.failed.clear();
        std::mem::take(&mut self.sent).into_keys().collect()
    }
}
