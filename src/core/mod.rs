//! Core primitives: ids, teams, RNG, frame clock, list pooling.

mod entity;
mod pool;
mod rng;
mod time;

pub use entity::{EntityId, ResourceKind, Team};
pub use pool::{ListHandle, TargetList, TargetListPool};
pub use rng::GameRng;
pub use time::FrameClock;
