use std::{
    collections::HashMap,
    error::Error,
    panic::{catch_unwind, AssertUnwindSafe},
};

use log::warn;

use crate::types::{Tick, ViewerId};

use super::error::PlaceholderError;

/// Text returned when a replacer produces nothing
pub const NULL_REPLACEMENT: &str = "null";

pub type ReplacerResult = Result<Option<String>, Box<dyn Error + Send + Sync>>;

/// The computation behind a placeholder
pub enum Replacer {
    /// One value shared by every viewer
    Global(Box<dyn FnMut() -> ReplacerResult + Send>),
    /// A value computed separately for each viewer
    PerViewer(Box<dyn FnMut(ViewerId) -> ReplacerResult + Send>),
}

impl Replacer {
    pub fn global(replacer: impl FnMut() -> ReplacerResult + Send + 'static) -> Self {
        Replacer::Global(Box::new(replacer))
    }

    pub fn per_viewer(replacer: impl FnMut(ViewerId) -> ReplacerResult + Send + 'static) -> Self {
        Replacer::PerViewer(Box::new(replacer))
    }

    pub fn is_per_viewer(&self) -> bool {
        matches!(self, Replacer::PerViewer(_))
    }
}

/// Converts a refresh rate in seconds to tenths of a second, never below 1
pub fn tenths_from_seconds(refresh_seconds: f64) -> u32 {
    if refresh_seconds <= 0.1 {
        return 1;
    }
    ((refresh_seconds * 10.0) as u32).max(1)
}

struct CachedReplacement {
    value: String,
    last_update_tick: Tick,
}

impl CachedReplacement {
    fn new() -> Self {
        Self {
            value: String::new(),
            last_update_tick: 0,
        }
    }

    fn is_due(&self, current_tick: Tick, tenths_to_refresh: u32) -> bool {
        current_tick.wrapping_sub(self.last_update_tick) >= tenths_to_refresh
    }
}

/// A named text substitution, recomputed at most once per refresh interval.
///
/// Ticks given to a placeholder are measured in tenths of a second.
pub struct Placeholder {
    owner: String,
    token: String,
    tenths_to_refresh: u32,
    replacer: Replacer,
    global: CachedReplacement,
    viewers: HashMap<ViewerId, CachedReplacement>,
}

impl Placeholder {
    pub fn new(
        owner: impl Into<String>,
        token: impl Into<String>,
        refresh_seconds: f64,
        replacer: Replacer,
    ) -> Self {
        Self::with_tenths(owner, token, tenths_from_seconds(refresh_seconds), replacer)
    }

    pub fn with_tenths(
        owner: impl Into<String>,
        token: impl Into<String>,
        tenths_to_refresh: u32,
        replacer: Replacer,
    ) -> Self {
        Self {
            owner: owner.into(),
            token: token.into(),
            tenths_to_refresh: tenths_to_refresh.max(1),
            replacer,
            global: CachedReplacement::new(),
            viewers: HashMap::new(),
        }
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn tenths_to_refresh(&self) -> u32 {
        self.tenths_to_refresh
    }

    pub fn set_tenths_to_refresh(&mut self, tenths_to_refresh: u32) {
        self.tenths_to_refresh = tenths_to_refresh.max(1);
    }

    pub fn is_per_viewer(&self) -> bool {
        self.replacer.is_per_viewer()
    }

    /// The last successfully computed value for `viewer`, recomputing first
    /// if a full refresh interval has passed since the last attempt.
    ///
    /// Per-viewer placeholders read without a viewer return the shared
    /// cache, which stays empty.
    pub fn current_replacement(&mut self, current_tick: Tick, viewer: Option<ViewerId>) -> &str {
        let tenths = self.tenths_to_refresh;
        let Self {
            owner,
            token,
            replacer,
            global,
            viewers,
            ..
        } = self;

        let (cache, outcome) = match (replacer, viewer) {
            (Replacer::PerViewer(compute), Some(viewer)) => {
                let cache = viewers.entry(viewer).or_insert_with(CachedReplacement::new);
                if !cache.is_due(current_tick, tenths) {
                    return &cache.value;
                }
                cache.last_update_tick = current_tick;
                let outcome = catch_unwind(AssertUnwindSafe(|| compute(viewer)));
                (cache, outcome)
            }
            (Replacer::PerViewer(_), None) => return &global.value,
            (Replacer::Global(compute), _) => {
                if !global.is_due(current_tick, tenths) {
                    return &global.value;
                }
                global.last_update_tick = current_tick;
                let outcome = catch_unwind(AssertUnwindSafe(|| compute()));
                (global, outcome)
            }
        };

        let failure = match outcome {
            Ok(Ok(value)) => {
                cache.value = value.unwrap_or_else(|| NULL_REPLACEMENT.to_string());
                None
            }
            Ok(Err(error)) => Some(PlaceholderError::ReplacerFailed {
                token: token.clone(),
                owner: owner.clone(),
                reason: error.to_string(),
            }),
            Err(_) => Some(PlaceholderError::ReplacerPanicked {
                token: token.clone(),
                owner: owner.clone(),
            }),
        };
        if let Some(failure) = failure {
            warn!("{}. Please contact the author of {}", failure, owner);
        }
        &cache.value
    }

    /// Drops the cached value of a viewer that left
    pub fn forget_viewer(&mut self, viewer: &ViewerId) {
        self.viewers.remove(viewer);
    }
}
