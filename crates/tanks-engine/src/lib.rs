//! The authoritative tick loop, entity model, physics, collision, AI, and
//! terrain generation for the tank arena simulation.

pub mod ai;
pub mod collision;
pub mod entities;
pub mod pool;
pub mod spatial;
pub mod terrain;
pub mod tick;

pub use entities::GameState;
pub use tick::{step, StepReport, TickScheduler};
