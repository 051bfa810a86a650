//! The cast controller: context, events, scheduler and engine.

mod context;
mod engine;
mod events;

pub use context::{CastContext, CastInput};
pub use engine::{CastEngine, CastRejection};
pub use events::EngineEvent;
