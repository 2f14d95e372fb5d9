use std::collections::HashMap;

use log::{debug, info};

use crate::{
    text::{replace_text, TextAdapter, TextComponent},
    types::{Tick, ViewerId},
};

use super::{error::PlaceholderError, resolver::Placeholder};

/// Host ticks per tenth of a second (20 ticks per second)
pub const HOST_TICKS_PER_TENTH: Tick = 2;

/// Every registered placeholder, keyed by its case-sensitive token
#[derive(Default)]
pub struct PlaceholderRegistry {
    placeholders: HashMap<String, Placeholder>,
    // longest first, so `{online: lobby2}` wins over `{online: lobby}`
    tokens: Vec<String>,
}

impl PlaceholderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, placeholder: Placeholder) -> Result<(), PlaceholderError> {
        let token = placeholder.token().to_string();
        if token.is_empty() {
            return Err(PlaceholderError::InvalidToken { token });
        }
        if let Some(existing) = self.placeholders.get(&token) {
            return Err(PlaceholderError::AlreadyRegistered {
                token,
                owner: existing.owner().to_string(),
            });
        }
        info!(
            "PlaceholderRegistry: {} registered {}",
            placeholder.owner(),
            token
        );
        self.placeholders.insert(token.clone(), placeholder);
        self.tokens.push(token);
        self.tokens
            .sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        Ok(())
    }

    /// Removes `token` only if `owner` registered it
    pub fn unregister(&mut self, owner: &str, token: &str) -> bool {
        let owned = self
            .placeholders
            .get(token)
            .is_some_and(|placeholder| placeholder.owner() == owner);
        if owned {
            self.placeholders.remove(token);
            self.tokens.retain(|existing| existing != token);
        }
        owned
    }

    /// Removes every placeholder `owner` registered; returns how many
    pub fn unregister_all(&mut self, owner: &str) -> usize {
        let before = self.placeholders.len();
        self.placeholders
            .retain(|_, placeholder| placeholder.owner() != owner);
        let placeholders = &self.placeholders;
        self.tokens.retain(|token| placeholders.contains_key(token));
        before - self.placeholders.len()
    }

    pub fn is_registered(&self, token: &str) -> bool {
        self.placeholders.contains_key(token)
    }

    pub fn tokens_of(&self, owner: &str) -> Vec<&str> {
        self.tokens
            .iter()
            .filter(|token| {
                self.placeholders
                    .get(token.as_str())
                    .is_some_and(|placeholder| placeholder.owner() == owner)
            })
            .map(String::as_str)
            .collect()
    }

    pub fn get_mut(&mut self, token: &str) -> Option<&mut Placeholder> {
        self.placeholders.get_mut(token)
    }

    pub fn len(&self) -> usize {
        self.placeholders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placeholders.is_empty()
    }

    /// Registered tokens that appear anywhere in `template`
    pub fn tokens_in(&self, template: &TextComponent) -> Vec<String> {
        let mut found = Vec::new();
        template.for_each_text(&mut |text| {
            for token in &self.tokens {
                if text.contains(token.as_str()) && !found.contains(token) {
                    found.push(token.clone());
                }
            }
        });
        found
    }

    pub fn contains_placeholders(&self, template: &TextComponent) -> bool {
        !self.tokens_in(template).is_empty()
    }

    /// Substitutes every registered token in `template` with the value cached
    /// for `viewer` at `current_tick` (in tenths).
    pub fn resolve(
        &mut self,
        adapter: &dyn TextAdapter,
        template: &TextComponent,
        current_tick: Tick,
        viewer: Option<ViewerId>,
    ) -> TextComponent {
        let mut resolved = template.clone();
        for token in self.tokens_in(template) {
            let Some(placeholder) = self.placeholders.get_mut(&token) else {
                continue;
            };
            let replacement = placeholder.current_replacement(current_tick, viewer);
            resolved = replace_text(adapter, &resolved, &token, replacement);
        }
        resolved
    }

    /// Converts the host tick counter to the tenths placeholders run on
    pub fn tenth_of(host_tick: Tick) -> Tick {
        host_tick / HOST_TICKS_PER_TENTH
    }

    pub fn forget_viewer(&mut self, viewer: &ViewerId) {
        debug!("PlaceholderRegistry: dropping caches of {}", viewer);
        for placeholder in self.placeholders.values_mut() {
            placeholder.forget_viewer(viewer);
        }
    }
}
