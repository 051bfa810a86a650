//! Effect configuration.
//!
//! An effect is the leaf of the skill data model: one typed action
//! applied to one target (or to a re-targeted set when the effect
//! carries its own targeting). Numeric parameters pass through the
//! modifier resolver before dispatch; the key each parameter resolves
//! under is fixed per kind.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::buffs::{BuffConfig, BuffId};
use crate::condition::Condition;
use crate::core::ResourceKind;
use crate::skill::SkillConfig;
use crate::targeting::TargetingConfig;

/// How a Move effect picks its direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveKind {
    /// Away from the caster, along the caster-to-target axis.
    Knockback,
    /// Toward the caster, along the same axis.
    Pull,
    /// Along the caster's facing.
    Dash,
}

/// The typed action an effect performs.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum EffectKind {
    /// Reduce target health. Resolves under the `"damage"` key.
    Damage { amount: f32 },
    /// Restore target health. Resolves under the `"healing"` key.
    Heal { amount: f32 },
    /// Attach (or stack) a buff on the target.
    ApplyBuff { buff: Arc<BuffConfig>, stacks: u32 },
    /// Strip every instance of a buff from the target.
    RemoveBuff { buff: BuffId },
    /// Launch a pooled projectile at the target. `speed` resolves under
    /// the `"speed"` key; flight ends at `max_range`.
    Projectile { speed: f32, max_range: f32 },
    /// Instantaneous position offset. `distance` resolves under the
    /// `"distance"` key.
    Move { kind: MoveKind, distance: f32 },
    /// Restore (positive) or spend (negative) from the target's pool,
    /// gated on resource kind. Resolves under the `"amount"` key.
    Resource { kind: ResourceKind, amount: f32 },
    /// Spawn a unit at the target's position (caster's when the target
    /// has none), on the caster's team.
    Summon { health: f32, tags: Vec<String> },
    /// Recursively invoke the cast entry point for the same caster.
    TriggerSkill { skill: Arc<SkillConfig> },
}

impl EffectKind {
    /// The modifier-resolver key of this kind's primary parameter.
    #[must_use]
    pub fn param_key(&self) -> &'static str {
        match self {
            EffectKind::Damage { .. } => "damage",
            EffectKind::Heal { .. } => "healing",
            EffectKind::Projectile { .. } => "speed",
            EffectKind::Move { .. } => "distance",
            EffectKind::Resource { .. } => "amount",
            EffectKind::ApplyBuff { .. }
            | EffectKind::RemoveBuff { .. }
            | EffectKind::Summon { .. }
            | EffectKind::TriggerSkill { .. } => "",
        }
    }
}

/// One configured effect: action, optional gate, optional re-targeting.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EffectConfig {
    /// The action performed.
    pub kind: EffectKind,
    /// Gate evaluated against the target before dispatch.
    pub condition: Option<Condition>,
    /// When set, targets are re-resolved through this config and the
    /// effect applies to each result instead of the given target.
    pub targeting: Option<TargetingConfig>,
    /// The effect's own tags, matched by buff modifiers together with
    /// the skill's tags.
    pub tags: Vec<String>,
}

impl EffectConfig {
    /// Create an unconditioned effect with no override targeting.
    #[must_use]
    pub fn new(kind: EffectKind) -> Self {
        Self {
            kind,
            condition: None,
            targeting: None,
            tags: Vec::new(),
        }
    }

    /// Set the condition (builder pattern).
    #[must_use]
    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }

    /// Set override targeting (builder pattern).
    #[must_use]
    pub fn with_targeting(mut self, targeting: TargetingConfig) -> Self {
        self.targeting = Some(targeting);
        self
    }

    /// Add a tag (builder pattern).
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::ConditionEntry;

    #[test]
    fn test_param_keys() {
        assert_eq!(EffectKind::Damage { amount: 1.0 }.param_key(), "damage");
        assert_eq!(EffectKind::Heal { amount: 1.0 }.param_key(), "healing");
        assert_eq!(
            EffectKind::Move {
                kind: MoveKind::Knockback,
                distance: 2.0
            }
            .param_key(),
            "distance"
        );
        assert_eq!(EffectKind::RemoveBuff { buff: BuffId::new(1) }.param_key(), "");
    }

    #[test]
    fn test_builder() {
        let effect = EffectConfig::new(EffectKind::Damage { amount: 25.0 })
            .with_condition(Condition::all([ConditionEntry::Always]))
            .with_tag("fire");

        assert!(effect.condition.is_some());
        assert_eq!(effect.tags, vec!["fire".to_string()]);
        assert!(effect.targeting.is_none());
    }

    #[test]
    fn test_serialization() {
        let effect = EffectConfig::new(EffectKind::Resource {
            kind: ResourceKind::Mana,
            amount: -10.0,
        })
        .with_tag("drain");

        let json = serde_json::to_string(&effect).unwrap();
        let back: EffectConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.tags, effect.tags);
        match back.kind {
            EffectKind::Resource { kind, amount } => {
                assert_eq!(kind, ResourceKind::Mana);
                assert_eq!(amount, -10.0);
            }
            _ => panic!("wrong kind"),
        }
    }
}
