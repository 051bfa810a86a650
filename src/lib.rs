//! # skillcast
//!
//! A real-time, data-driven combat-skill execution engine: declarative
//! skill/effect/targeting configuration turned into timed, targeted,
//! resource-gated game actions inside a per-frame update loop, with no
//! blocking calls.
//!
//! ## Design Principles
//!
//! 1. **Configuration Over Convention**: skills, effects, targeting,
//!    buffs and conditions are immutable author-time data; the engine
//!    interprets, never hardcodes.
//!
//! 2. **Frame-Stepped Cooperation**: one logical thread, no locks.
//!    Waiting means a pending step sits in a time-ordered queue until a
//!    later `tick` observes its timestamp.
//!
//! 3. **Deterministic**: a seeded RNG, FIFO tie-breaking for equal
//!    timestamps and id-ordered candidate ranking make runs repeatable.
//!
//! ## Modules
//!
//! - `core`: entity ids, teams, RNG, frame clock, list pooling
//! - `world`: unit store with capability slots, spatial queries, target
//!   resolution
//! - `skill`: skill and step configuration
//! - `condition`: boolean condition trees and their evaluator
//! - `buffs`: buff definitions, stacking instances, modifier resolution
//! - `targeting`: targeting configuration and the geometric engine
//! - `effects`: effect configuration, dispatch, pooled projectiles
//! - `cast`: the cast controller, step scheduler and event queue

pub mod buffs;
pub mod cast;
pub mod condition;
pub mod core;
pub mod effects;
pub mod skill;
pub mod targeting;
pub mod world;

// Re-export commonly used types
pub use crate::core::{EntityId, GameRng, ResourceKind, Team};

pub use crate::world::{ResolvedTarget, Unit, World};

pub use crate::skill::{ResourceCost, SkillConfig, SkillId, StepConfig, StepTrigger};

pub use crate::condition::{Condition, ConditionEntry, ConditionOp, ConditionSubject};

pub use crate::buffs::{
    BuffConfig, BuffId, BuffInstance, ModifierConfig, ModifierOp, ModifierTarget, StatKind,
};

pub use crate::targeting::{
    OriginMode, SortPolicy, TargetingConfig, TargetingMode, TeamFilter,
};

pub use crate::effects::{EffectConfig, EffectKind, MoveKind};

pub use crate::cast::{CastEngine, CastInput, CastRejection, EngineEvent};
