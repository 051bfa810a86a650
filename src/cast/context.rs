//! Cast context.
//!
//! One cast produces one context, passed through targeting, condition
//! evaluation, effect dispatch and projectile flight. It is a cheap
//! clone (ids, an `Arc`, two optional vectors) so pending steps and
//! projectiles can each carry their own copy.

use std::sync::Arc;

use glam::Vec3;

use crate::core::EntityId;
use crate::skill::SkillConfig;

/// Everything one cast carries through the pipeline.
#[derive(Clone, Debug)]
pub struct CastContext {
    /// The resolved unit root doing the cast.
    pub caster: EntityId,
    /// The entity the cast was requested on (may be a non-root part).
    pub source: EntityId,
    /// The skill being cast.
    pub skill: Arc<SkillConfig>,
    /// Where the player aimed, for aim-point origin targeting.
    pub aim_point: Option<Vec3>,
    /// The aim direction, for directional shapes and projectiles.
    pub aim_dir: Option<Vec3>,
}

/// Optional inputs to a cast request.
#[derive(Clone, Copy, Debug, Default)]
pub struct CastInput {
    /// Explicit target, honored by Single/Chain targeting when valid.
    pub target: Option<EntityId>,
    /// Aim point for aim-origin targeting.
    pub aim_point: Option<Vec3>,
    /// Aim direction for cones, lines and projectiles.
    pub aim_dir: Option<Vec3>,
}

impl CastInput {
    /// No explicit target or aim.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Aim at a specific entity.
    #[must_use]
    pub fn at(target: EntityId) -> Self {
        Self {
            target: Some(target),
            ..Self::default()
        }
    }

    /// Set the aim point (builder pattern).
    #[must_use]
    pub fn with_aim_point(mut self, point: Vec3) -> Self {
        self.aim_point = Some(point);
        self
    }

    /// Set the aim direction (builder pattern).
    #[must_use]
    pub fn with_aim_dir(mut self, dir: Vec3) -> Self {
        self.aim_dir = Some(dir.normalize_or_zero());
        self
    }
}
