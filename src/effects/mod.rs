//! Effects: configuration, dispatch and the projectile subsystem.
//!
//! Effect configs are author-time data; dispatch lives on the engine
//! (see [`crate::cast::CastEngine::execute_effect`]) so recursive
//! effects (trigger-skill, projectile hits) can re-enter the cast path.

mod dispatcher;
mod effect;
mod projectile;

pub use effect::{EffectConfig, EffectKind, MoveKind};
pub use projectile::{ProjectileHit, ProjectileId, ProjectilePool};
