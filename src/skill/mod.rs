//! Skill configuration.
//!
//! A skill is immutable author-time data: cost, timings, a targeting
//! reference and an ordered list of steps. Steps bind a trigger and a
//! delay to a list of effects; the cast engine schedules them as pending
//! work when the matching trigger fires.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::condition::Condition;
use crate::core::ResourceKind;
use crate::effects::EffectConfig;
use crate::targeting::TargetingConfig;

/// Unique identifier for a skill definition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SkillId(pub u32);

impl SkillId {
    /// Create a new skill ID.
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

impl std::fmt::Display for SkillId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Skill({})", self.0)
    }
}

/// When a step's effects run relative to the cast.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StepTrigger {
    /// Scheduled when the cast is accepted.
    CastStart,
    /// Scheduled relative to the end of the cast time.
    CastComplete,
    /// Scheduled when a damage effect of this skill lands.
    OnHit,
    /// Scheduled when a projectile of this skill strikes.
    OnProjectileHit,
}

/// One sub-unit of a skill: a trigger, a delay, an optional gate and the
/// effects to apply.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StepConfig {
    /// What fires this step.
    pub trigger: StepTrigger,
    /// Seconds between the trigger and execution.
    pub delay: f32,
    /// Gate evaluated per target at execution time. `None` always passes.
    pub condition: Option<Condition>,
    /// Effects applied, in order, to every target in the step's list.
    pub effects: Vec<EffectConfig>,
}

impl StepConfig {
    /// Create a step with no delay and no condition.
    pub fn new(trigger: StepTrigger, effects: impl IntoIterator<Item = EffectConfig>) -> Self {
        Self {
            trigger,
            delay: 0.0,
            condition: None,
            effects: effects.into_iter().collect(),
        }
    }

    /// Set the delay (builder pattern).
    #[must_use]
    pub fn with_delay(mut self, delay: f32) -> Self {
        self.delay = delay;
        self
    }

    /// Set the condition (builder pattern).
    #[must_use]
    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }
}

/// Resource cost of a cast.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResourceCost {
    pub kind: ResourceKind,
    pub cost: f32,
}

/// Immutable skill definition.
///
/// Never mutated at runtime; casts hold it behind an `Arc` so pending
/// steps and projectiles can outlive the call that scheduled them.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SkillConfig {
    /// Unique identifier (cooldowns are keyed by it).
    pub id: SkillId,
    /// Human-readable name (for logs).
    pub name: String,
    /// Cost deducted when a cast is accepted. `None` casts for free.
    pub resource: Option<ResourceCost>,
    /// Seconds before the skill can be cast again.
    pub cooldown: f32,
    /// Seconds between cast start and cast completion.
    pub cast_time: f32,
    /// Post-cast recovery before the caster may start another cast.
    pub recovery: f32,
    /// How the cast selects its shared target list.
    pub targeting: TargetingConfig,
    /// Ordered steps executed over the life of the cast.
    pub steps: Vec<StepConfig>,
    /// The skill's own tags, matched by buff modifiers.
    pub tags: Vec<String>,
}

impl SkillConfig {
    /// Create an instant, free skill with no steps.
    pub fn new(id: SkillId, name: impl Into<String>, targeting: TargetingConfig) -> Self {
        Self {
            id,
            name: name.into(),
            resource: None,
            cooldown: 0.0,
            cast_time: 0.0,
            recovery: 0.0,
            targeting,
            steps: Vec::new(),
            tags: Vec::new(),
        }
    }

    /// Set the resource cost (builder pattern).
    #[must_use]
    pub fn with_cost(mut self, kind: ResourceKind, cost: f32) -> Self {
        self.resource = Some(ResourceCost { kind, cost });
        self
    }

    /// Set the cooldown (builder pattern).
    #[must_use]
    pub fn with_cooldown(mut self, cooldown: f32) -> Self {
        self.cooldown = cooldown;
        self
    }

    /// Set the cast time (builder pattern).
    #[must_use]
    pub fn with_cast_time(mut self, cast_time: f32) -> Self {
        self.cast_time = cast_time;
        self
    }

    /// Set the post-cast recovery (builder pattern).
    #[must_use]
    pub fn with_recovery(mut self, recovery: f32) -> Self {
        self.recovery = recovery;
        self
    }

    /// Append a step (builder pattern).
    #[must_use]
    pub fn with_step(mut self, step: StepConfig) -> Self {
        self.steps.push(step);
        self
    }

    /// Add a tag (builder pattern).
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Wrap in an `Arc` for handing to the engine.
    #[must_use]
    pub fn build(self) -> Arc<SkillConfig> {
        Arc::new(self)
    }

    /// Indices of steps bound to a trigger, in authored order.
    pub fn steps_for(&self, trigger: StepTrigger) -> impl Iterator<Item = usize> + '_ {
        self.steps
            .iter()
            .enumerate()
            .filter(move |(_, s)| s.trigger == trigger)
            .map(|(i, _)| i)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::EffectKind;

    #[test]
    fn test_builder() {
        let skill = SkillConfig::new(
            SkillId::new(1),
            "Fireball",
            TargetingConfig::single(20.0),
        )
        .with_cost(ResourceKind::Mana, 25.0)
        .with_cooldown(4.0)
        .with_cast_time(1.5)
        .with_tag("fire")
        .with_step(StepConfig::new(
            StepTrigger::CastComplete,
            [EffectConfig::new(EffectKind::Damage { amount: 40.0 })],
        ));

        assert_eq!(skill.id, SkillId::new(1));
        assert_eq!(skill.resource.unwrap().cost, 25.0);
        assert_eq!(skill.steps.len(), 1);
        assert_eq!(skill.tags, vec!["fire".to_string()]);
    }

    #[test]
    fn test_steps_for_preserves_order() {
        let skill = SkillConfig::new(SkillId::new(2), "Combo", TargetingConfig::self_only())
            .with_step(StepConfig::new(StepTrigger::CastStart, []))
            .with_step(StepConfig::new(StepTrigger::CastComplete, []))
            .with_step(StepConfig::new(StepTrigger::CastStart, []).with_delay(0.5));

        let starts: Vec<usize> = skill.steps_for(StepTrigger::CastStart).collect();
        assert_eq!(starts, vec![0, 2]);
        let completes: Vec<usize> = skill.steps_for(StepTrigger::CastComplete).collect();
        assert_eq!(completes, vec![1]);
        assert_eq!(skill.steps_for(StepTrigger::OnHit).count(), 0);
    }

    #[test]
    fn test_serialization() {
        let skill = SkillConfig::new(SkillId::new(3), "Zap", TargetingConfig::single(10.0))
            .with_cooldown(1.0);
        let json = serde_json::to_string(&skill).unwrap();
        let back: SkillConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, skill.id);
        assert_eq!(back.cooldown, skill.cooldown);
    }
}
