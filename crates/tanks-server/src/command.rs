//! Commands flowing from connection tasks into the single tick task, the
//! queue half of spec.md §5's "channels between tick thread and I/O tasks,
//! no shared mutable state other than through queues."

use tanks_engine::entities::TankId;
use tanks_protocol::ClientEvent;
use tokio::sync::{mpsc::UnboundedSender, oneshot};

use crate::arena::HealthSnapshot;

pub enum EngineCommand {
    /// A socket has completed its WebSocket handshake. `requested_id` is the
    /// `tankId` query parameter the client supplied to resume a prior
    /// session; `None` (or an id the arena doesn't recognize) gets a freshly
    /// minted id back over `reply`, which the client is expected to persist
    /// and present on future reconnects.
    Connect {
        requested_id: Option<TankId>,
        sender: UnboundedSender<String>,
        reply: oneshot::Sender<TankId>,
    },
    Disconnect {
        tank_id: TankId,
    },
    Client {
        tank_id: TankId,
        event: ClientEvent,
    },
    /// Serves `GET /health` without giving the HTTP layer a handle into the
    /// tick task's owned state.
    Health {
        reply: oneshot::Sender<HealthSnapshot>,
    },
}
