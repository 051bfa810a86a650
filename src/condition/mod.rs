//! Condition trees.
//!
//! Conditions gate steps, effects and buff modifiers. A tree is one
//! operator (ALL or ANY) over a list of typed entries; no condition or an
//! empty entry list is vacuously true. Evaluation never fails: an entry
//! whose subject cannot be resolved simply evaluates to false.

use serde::{Deserialize, Serialize};

use crate::buffs::BuffId;
use crate::core::{EntityId, GameRng};
use crate::world::{resolve, ResolvedTarget, World};

/// How the entries of a condition combine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConditionOp {
    /// Every entry must hold. Short-circuits on the first false entry.
    #[default]
    All,
    /// At least one entry must hold. Short-circuits on the first true entry.
    Any,
}

/// Which unit an entry inspects.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConditionSubject {
    /// The unit the effect is being applied to.
    #[default]
    Target,
    /// The casting unit, re-resolved fresh on every evaluation.
    Caster,
}

/// A single predicate inside a condition tree.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ConditionEntry {
    /// Always true.
    Always,

    /// True with the configured probability (uniform draw <= probability).
    Chance { probability: f32 },

    /// Subject carries the tag.
    HasTag {
        subject: ConditionSubject,
        tag: String,
    },

    /// Subject has at least one stack of the buff.
    HasBuff {
        subject: ConditionSubject,
        buff: BuffId,
    },

    /// Subject's health percentage is at or below the bound (inclusive).
    HealthPercentBelow {
        subject: ConditionSubject,
        percent: f32,
    },

    /// Subject's health percentage is at or above the bound (inclusive).
    HealthPercentAbove {
        subject: ConditionSubject,
        percent: f32,
    },

    /// Subject is alive. Units without a health capability count as alive.
    IsAlive { subject: ConditionSubject },

    /// Subject is dead.
    IsDead { subject: ConditionSubject },
}

/// A boolean tree evaluated against a caster/target pair.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    /// Combining operator.
    pub op: ConditionOp,
    /// Entries; empty is vacuously true under either operator.
    pub entries: Vec<ConditionEntry>,
}

impl Condition {
    /// Create an ALL condition.
    pub fn all(entries: impl IntoIterator<Item = ConditionEntry>) -> Self {
        Self {
            op: ConditionOp::All,
            entries: entries.into_iter().collect(),
        }
    }

    /// Create an ANY condition.
    pub fn any(entries: impl IntoIterator<Item = ConditionEntry>) -> Self {
        Self {
            op: ConditionOp::Any,
            entries: entries.into_iter().collect(),
        }
    }

    /// Append an entry (builder pattern).
    #[must_use]
    pub fn with(mut self, entry: ConditionEntry) -> Self {
        self.entries.push(entry);
        self
    }
}

/// Evaluate a condition against a subject pair.
///
/// `None` means "no condition configured" and passes. The `target` is the
/// already-resolved unit the effect is aimed at; entries with a `Caster`
/// subject re-resolve the caster entity on every evaluation.
pub fn evaluate(
    condition: Option<&Condition>,
    world: &World,
    caster: EntityId,
    target: Option<&ResolvedTarget>,
    rng: &mut GameRng,
) -> bool {
    let Some(condition) = condition else {
        return true;
    };
    if condition.entries.is_empty() {
        return true;
    }
    match condition.op {
        ConditionOp::All => condition
            .entries
            .iter()
            .all(|e| evaluate_entry(e, world, caster, target, rng)),
        ConditionOp::Any => condition
            .entries
            .iter()
            .any(|e| evaluate_entry(e, world, caster, target, rng)),
    }
}

fn evaluate_entry(
    entry: &ConditionEntry,
    world: &World,
    caster: EntityId,
    target: Option<&ResolvedTarget>,
    rng: &mut GameRng,
) -> bool {
    match entry {
        ConditionEntry::Always => true,

        ConditionEntry::Chance { probability } => rng.chance(*probability),

        ConditionEntry::HasTag { subject, tag } => {
            with_subject(*subject, world, caster, target, |s| s.tags.contains(tag))
        }

        ConditionEntry::HasBuff { subject, buff } => {
            with_subject(*subject, world, caster, target, |s| {
                world.buff_stacks(s.entity, *buff) > 0
            })
        }

        ConditionEntry::HealthPercentBelow { subject, percent } => {
            with_subject(*subject, world, caster, target, |s| {
                s.health
                    .map(|h| h.percent() <= *percent)
                    .unwrap_or(false)
            })
        }

        ConditionEntry::HealthPercentAbove { subject, percent } => {
            with_subject(*subject, world, caster, target, |s| {
                s.health
                    .map(|h| h.percent() >= *percent)
                    .unwrap_or(false)
            })
        }

        ConditionEntry::IsAlive { subject } => {
            with_subject(*subject, world, caster, target, |s| s.alive)
        }

        ConditionEntry::IsDead { subject } => {
            with_subject(*subject, world, caster, target, |s| !s.alive)
        }
    }
}

/// Run a predicate against the resolved subject; unresolvable subjects
/// evaluate false.
fn with_subject(
    subject: ConditionSubject,
    world: &World,
    caster: EntityId,
    target: Option<&ResolvedTarget>,
    check: impl FnOnce(&ResolvedTarget) -> bool,
) -> bool {
    match subject {
        ConditionSubject::Target => target.map(check).unwrap_or(false),
        ConditionSubject::Caster => resolve(world, caster).map(|s| check(&s)).unwrap_or(false),
    }
}
