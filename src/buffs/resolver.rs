//! Modifier resolution.
//!
//! Computes an effective numeric parameter by folding every matching
//! modifier on the caster's active buffs. The fold order is fixed:
//!
//! ```text
//! result = (base + sum(Add)) * (1 + sum(Multiply))
//! ```
//!
//! If any Override matches, the additive/multiplicative accumulation is
//! discarded and the result is the override's raw value. When several
//! Overrides match, the last one in buff-application order wins; no
//! authored priority exists, the iteration order is the order buffs were
//! applied. No clamping or rounding happens here - callers apply domain
//! clamps (health bounds, non-negative cooldowns) downstream.

use crate::condition;
use crate::core::{EntityId, GameRng};
use crate::world::World;

use super::modifier::{ModifierOp, ModifierTarget, StatKind};

/// What a resolution call is asking for.
#[derive(Clone, Copy, Debug)]
pub enum ParamQuery<'a> {
    /// A unit stat.
    Stat(StatKind),
    /// A skill parameter by key.
    Skill(&'a str),
    /// An effect parameter by key.
    Effect(&'a str),
}

impl ParamQuery<'_> {
    fn matches(&self, target: &ModifierTarget) -> bool {
        match (self, target) {
            (ParamQuery::Stat(stat), ModifierTarget::Stat(t)) => stat == t,
            (ParamQuery::Skill(key), ModifierTarget::SkillParam(t)) => *key == t.as_str(),
            (ParamQuery::Effect(key), ModifierTarget::EffectParam(t)) => *key == t.as_str(),
            _ => false,
        }
    }
}

/// Resolve an effective skill parameter ("cooldown", "cost", ...).
pub fn skill_param(
    world: &World,
    rng: &mut GameRng,
    caster: EntityId,
    key: &str,
    base: f32,
    skill_tags: &[String],
) -> f32 {
    resolve(world, rng, caster, ParamQuery::Skill(key), base, skill_tags, &[])
}

/// Resolve an effective effect parameter.
///
/// `skill_tags` and `effect_tags` together form the tag set modifiers
/// match their required/blocked tags against.
pub fn effect_param(
    world: &World,
    rng: &mut GameRng,
    caster: EntityId,
    key: &str,
    base: f32,
    skill_tags: &[String],
    effect_tags: &[String],
) -> f32 {
    resolve(
        world,
        rng,
        caster,
        ParamQuery::Effect(key),
        base,
        skill_tags,
        effect_tags,
    )
}

/// Resolve an effective unit stat.
pub fn stat(world: &World, rng: &mut GameRng, caster: EntityId, stat: StatKind, base: f32) -> f32 {
    resolve(world, rng, caster, ParamQuery::Stat(stat), base, &[], &[])
}

fn resolve(
    world: &World,
    rng: &mut GameRng,
    caster: EntityId,
    query: ParamQuery,
    base: f32,
    skill_tags: &[String],
    effect_tags: &[String],
) -> f32 {
    // Fast path: no active buffs, no allocation, base unchanged.
    let Some(unit) = world.unit(caster) else {
        return base;
    };
    if unit.buffs.is_empty() {
        return base;
    }

    let mut add_sum = 0.0f32;
    let mut multiply_sum = 0.0f32;
    let mut override_value: Option<f32> = None;

    for buff in &unit.buffs {
        for modifier in &buff.config.modifiers {
            if !query.matches(&modifier.target) {
                continue;
            }
            if !tags_allow(&modifier.required_tags, &modifier.blocked_tags, skill_tags, effect_tags)
            {
                continue;
            }
            if !condition::evaluate(modifier.condition.as_ref(), world, caster, None, rng) {
                continue;
            }

            let contribution = modifier.value * buff.stacks as f32;
            match modifier.op {
                ModifierOp::Add => add_sum += contribution,
                ModifierOp::Multiply => multiply_sum += contribution,
                // Last match in application order wins.
                ModifierOp::Override => override_value = Some(modifier.value),
            }
        }
    }

    match override_value {
        Some(value) => value,
        None => (base + add_sum) * (1.0 + multiply_sum),
    }
}

fn tags_allow(
    required: &[String],
    blocked: &[String],
    skill_tags: &[String],
    effect_tags: &[String],
) -> bool {
    let has = |tag: &String| skill_tags.contains(tag) || effect_tags.contains(tag);
    required.iter().all(has) && !blocked.iter().any(has)
}
