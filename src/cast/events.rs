//! Engine events.
//!
//! Notifications are an explicit drained queue rather than callbacks:
//! the engine appends in emission order and the host consumes the batch
//! after each tick (animation, UI, AI reaction).

use crate::core::EntityId;
use crate::skill::SkillId;

/// A notification raised by the cast engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineEvent {
    /// A cast was accepted.
    CastStarted { caster: EntityId, skill: SkillId },
    /// A cast finished its cast time (immediately for instant casts).
    CastCompleted { caster: EntityId, skill: SkillId },
}
