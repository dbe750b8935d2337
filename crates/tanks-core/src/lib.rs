//! Math primitives, identifiers, configuration, and runtime utilities shared
//! across the tank arena server.

pub mod bounds;
pub mod config;
pub mod error;
pub mod id;
pub mod runtime;
pub mod vector;

pub use bounds::Bounds;
pub use error::{GameError, GameResult};
pub use id::Id;
pub use vector::Vector2;
