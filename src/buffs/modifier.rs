//! Modifier configuration.
//!
//! A modifier is a (target, operation, value) rule contributed by a buff.
//! Modifiers aim at a stat, a skill parameter or an effect parameter;
//! matching is exact on both the target kind and the stat/parameter key.

use serde::{Deserialize, Serialize};

use crate::condition::Condition;

/// Built-in unit stats a modifier can aim at.
///
/// The core only folds stat modifiers on request (`buffs::stat`); stat
/// consumers live outside the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatKind {
    MaxHealth,
    AttackPower,
    Armor,
    MoveSpeed,
}

/// What a modifier applies to.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ModifierTarget {
    /// A unit stat.
    Stat(StatKind),
    /// A named skill parameter ("cooldown", "cost", "cast_time", ...).
    SkillParam(String),
    /// A named effect parameter ("damage", "healing", "distance", ...).
    EffectParam(String),
}

/// How a matching modifier's value enters the fold.
///
/// The fold is ordered and non-commutative: all Add contributions sum,
/// all Multiply contributions sum, and the result is
/// `(base + add_sum) * (1 + multiply_sum)` - unless any Override matched,
/// which replaces the entire result with its own value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModifierOp {
    Add,
    Multiply,
    Override,
}

/// One modifier rule.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ModifierConfig {
    /// What this modifier applies to.
    pub target: ModifierTarget,
    /// How the value enters the fold.
    pub op: ModifierOp,
    /// Configured value, scaled by the owning buff's stack count.
    pub value: f32,
    /// Optional gate, evaluated against the caster.
    pub condition: Option<Condition>,
    /// Tags the skill/effect must carry for the modifier to match.
    pub required_tags: Vec<String>,
    /// Tags that disqualify the skill/effect.
    pub blocked_tags: Vec<String>,
}

impl ModifierConfig {
    /// Create an unconditional modifier.
    pub fn new(target: ModifierTarget, op: ModifierOp, value: f32) -> Self {
        Self {
            target,
            op,
            value,
            condition: None,
            required_tags: Vec::new(),
            blocked_tags: Vec::new(),
        }
    }

    /// Shorthand for an effect-parameter modifier.
    pub fn effect_param(key: impl Into<String>, op: ModifierOp, value: f32) -> Self {
        Self::new(ModifierTarget::EffectParam(key.into()), op, value)
    }

    /// Shorthand for a skill-parameter modifier.
    pub fn skill_param(key: impl Into<String>, op: ModifierOp, value: f32) -> Self {
        Self::new(ModifierTarget::SkillParam(key.into()), op, value)
    }

    /// Shorthand for a stat modifier.
    pub fn stat(stat: StatKind, op: ModifierOp, value: f32) -> Self {
        Self::new(ModifierTarget::Stat(stat), op, value)
    }

    /// Set the condition (builder pattern).
    #[must_use]
    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }

    /// Require a tag on the skill/effect (builder pattern).
    #[must_use]
    pub fn requiring_tag(mut self, tag: impl Into<String>) -> Self {
        self.required_tags.push(tag.into());
        self
    }

    /// Block a tag on the skill/effect (builder pattern).
    #[must_use]
    pub fn blocking_tag(mut self, tag: impl Into<String>) -> Self {
        self.blocked_tags.push(tag.into());
        self
    }
}
