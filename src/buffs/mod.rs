//! Buffs and their numeric modifiers.
//!
//! A buff is a stackable, timed bundle of modifiers attached to a unit.
//! Its modifiers never apply themselves; the resolver folds matching
//! modifiers into effective parameter values on demand
//! (see [`resolver`]).

mod modifier;
mod resolver;

pub use modifier::{ModifierConfig, ModifierOp, ModifierTarget, StatKind};
pub use resolver::{effect_param, skill_param, stat, ParamQuery};

use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Unique identifier for a buff definition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BuffId(pub u32);

impl BuffId {
    /// Create a new buff ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for BuffId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Buff({})", self.0)
    }
}

/// Immutable buff definition.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BuffConfig {
    /// Unique identifier.
    pub id: BuffId,
    /// Human-readable name (for logs).
    pub name: String,
    /// Stack cap; re-application above the cap only refreshes duration.
    pub max_stacks: u32,
    /// Lifetime in seconds. Zero means permanent.
    pub duration: f32,
    /// Modifiers contributed while the buff is active.
    pub modifiers: Vec<ModifierConfig>,
    /// The buff's own tags.
    pub tags: Vec<String>,
}

impl BuffConfig {
    /// Create a permanent single-stack buff with no modifiers.
    pub fn new(id: BuffId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            max_stacks: 1,
            duration: 0.0,
            modifiers: Vec::new(),
            tags: Vec::new(),
        }
    }

    /// Set the stack cap (builder pattern).
    #[must_use]
    pub fn with_max_stacks(mut self, max_stacks: u32) -> Self {
        self.max_stacks = max_stacks.max(1);
        self
    }

    /// Set the duration (builder pattern).
    #[must_use]
    pub fn with_duration(mut self, duration: f32) -> Self {
        self.duration = duration;
        self
    }

    /// Append a modifier (builder pattern).
    #[must_use]
    pub fn with_modifier(mut self, modifier: ModifierConfig) -> Self {
        self.modifiers.push(modifier);
        self
    }

    /// Add a tag (builder pattern).
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Wrap in an `Arc` for attaching to units.
    #[must_use]
    pub fn build(self) -> Arc<BuffConfig> {
        Arc::new(self)
    }
}

/// A buff attached to a unit: shared definition plus live stack count and
/// remaining duration.
#[derive(Clone, Debug)]
pub struct BuffInstance {
    /// Shared definition.
    pub config: Arc<BuffConfig>,
    /// Current stack count; linearly scales modifier contributions.
    pub stacks: u32,
    /// Seconds left. Ignored for permanent buffs.
    pub remaining: f32,
}

impl BuffInstance {
    /// Attach a definition with an initial stack count.
    #[must_use]
    pub fn new(config: Arc<BuffConfig>, stacks: u32) -> Self {
        let remaining = config.duration;
        let stacks = stacks.clamp(1, config.max_stacks);
        Self {
            config,
            stacks,
            remaining,
        }
    }

    /// Add stacks up to the cap and refresh the duration.
    pub fn add_stacks(&mut self, stacks: u32) {
        self.stacks = (self.stacks + stacks).min(self.config.max_stacks);
        self.remaining = self.config.duration;
    }

    /// Whether the buff expires over time.
    #[must_use]
    pub fn is_timed(&self) -> bool {
        self.config.duration > 0.0
    }

    /// Advance the lifetime; returns `true` when the buff has expired.
    pub fn tick(&mut self, dt: f32) -> bool {
        if !self.is_timed() {
            return false;
        }
        self.remaining -= dt;
        self.remaining <= 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stacks_clamped_to_cap() {
        let config = BuffConfig::new(BuffId::new(1), "Might").with_max_stacks(3).build();
        let mut inst = BuffInstance::new(config, 1);

        inst.add_stacks(1);
        assert_eq!(inst.stacks, 2);
        inst.add_stacks(5);
        assert_eq!(inst.stacks, 3);
    }

    #[test]
    fn test_refresh_on_stack() {
        let config = BuffConfig::new(BuffId::new(1), "Might")
            .with_max_stacks(2)
            .with_duration(10.0)
            .build();
        let mut inst = BuffInstance::new(config, 1);

        assert!(!inst.tick(6.0));
        assert!((inst.remaining - 4.0).abs() < 1e-6);

        inst.add_stacks(1);
        assert!((inst.remaining - 10.0).abs() < 1e-6);
    }

    #[test]
    fn test_expiry() {
        let config = BuffConfig::new(BuffId::new(1), "Brief").with_duration(1.0).build();
        let mut inst = BuffInstance::new(config, 1);

        assert!(!inst.tick(0.5));
        assert!(inst.tick(0.5));
    }

    #[test]
    fn test_permanent_never_expires() {
        let config = BuffConfig::new(BuffId::new(1), "Aura").build();
        let mut inst = BuffInstance::new(config, 1);
        assert!(!inst.tick(1e9));
    }

    #[test]
    fn test_config_serialization() {
        let config = BuffConfig::new(BuffId::new(2), "Haste")
            .with_duration(5.0)
            .with_tag("speed");
        let json = serde_json::to_string(&config).unwrap();
        let back: BuffConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, config.id);
        assert_eq!(back.tags, config.tags);
    }
}
