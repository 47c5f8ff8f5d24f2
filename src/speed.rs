//! Speed overrides.
//!
//! Gameplay code (status effects, vehicles, cutscenes) can take over a
//! walker's movement speed by pushing a [`SpeedProvider`]. The most recently
//! pushed provider wins; removing it hands control back to whatever was
//! pushed before it, or to the walk/run speed when the stack is empty.

use std::sync::Arc;

use bevy::prelude::*;

/// A dynamic source of movement speed.
///
/// Evaluated at most once per fixed step, and only while it is the top of
/// its walker's [`SpeedOverrides`] stack.
pub trait SpeedProvider: Send + Sync + 'static {
    /// Current speed in units/second.
    fn speed(&self) -> f32;
}

impl<F> SpeedProvider for F
where
    F: Fn() -> f32 + Send + Sync + 'static,
{
    fn speed(&self) -> f32 {
        self()
    }
}

/// A provider that always returns the same speed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedSpeed(pub f32);

impl SpeedProvider for FixedSpeed {
    fn speed(&self) -> f32 {
        self.0
    }
}

/// Handle returned by [`SpeedOverrides::push`], used to remove the entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub struct SpeedOverrideId(u64);

/// Ordered stack of speed providers; the last pushed one is in effect.
#[derive(Component, Default)]
pub struct SpeedOverrides {
    entries: Vec<(SpeedOverrideId, Arc<dyn SpeedProvider>)>,
    next_id: u64,
}

impl SpeedOverrides {
    /// Create an empty stack.
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a provider on top of the stack.
    pub fn push(&mut self, provider: impl SpeedProvider) -> SpeedOverrideId {
        self.push_shared(Arc::new(provider))
    }

    /// Push a provider that is shared with other walkers or systems.
    pub fn push_shared(&mut self, provider: Arc<dyn SpeedProvider>) -> SpeedOverrideId {
        let id = SpeedOverrideId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, provider));
        id
    }

    /// Remove a provider wherever it sits in the stack.
    ///
    /// Returns `false` if the id was already removed. The relative order of
    /// the remaining entries is unchanged.
    pub fn remove(&mut self, id: SpeedOverrideId) -> bool {
        match self.entries.iter().position(|(entry, _)| *entry == id) {
            Some(index) => {
                self.entries.remove(index);
                true
            }
            None => false,
        }
    }

    /// Whether `id` is still on the stack.
    pub fn contains(&self, id: SpeedOverrideId) -> bool {
        self.entries.iter().any(|(entry, _)| *entry == id)
    }

    /// Evaluate the top provider, if any.
    pub fn top_speed(&self) -> Option<f32> {
        self.entries.last().map(|(_, provider)| provider.speed())
    }

    /// Speed for this step: the top override, or `base` when empty.
    pub fn resolve(&self, base: f32) -> f32 {
        self.top_speed().unwrap_or(base)
    }

    /// Remove every provider.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of providers on the stack.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the stack is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for SpeedOverrides {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpeedOverrides")
            .field(
                "entries",
                &self.entries.iter().map(|(id, _)| *id).collect::<Vec<_>>(),
            )
            .finish()
    }
}
