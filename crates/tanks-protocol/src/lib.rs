//! Wire format between the tick simulation and connected clients,
//! spec.md §4.8/§6.

pub mod inbound;
pub mod outbound;
pub mod protocol;
pub mod quantize;
pub mod snapshot;

pub use inbound::ClientEvent;
pub use outbound::ServerEvent;
pub use protocol::{Protocol, ProtocolError};
pub use snapshot::{GameStateMessage, SnapshotCache};
