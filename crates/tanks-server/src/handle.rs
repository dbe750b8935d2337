//! A cheaply-cloneable front door to the arena task, the same role the
//! teacher's `RoomHandle` (`crates/hosting/src/handle.rs`) plays for a
//! `Room` — except there is exactly one arena per process (spec.md's "no
//! horizontal sharding"), so this wraps a single command sender rather than
//! a `HashMap` of per-room handles.

use tokio::sync::{mpsc::UnboundedSender, oneshot};

use crate::arena::HealthSnapshot;
use crate::command::EngineCommand;

#[derive(Clone)]
pub struct ArenaHandle {
    commands: UnboundedSender<EngineCommand>,
}

impl ArenaHandle {
    pub fn new(commands: UnboundedSender<EngineCommand>) -> Self {
        Self { commands }
    }

    pub fn send(&self, command: EngineCommand) -> anyhow::Result<()> {
        self.commands.send(command).map_err(|_| anyhow::anyhow!("arena task is no longer running"))
    }

    pub async fn health(&self) -> anyhow::Result<HealthSnapshot> {
        let (reply, rx) = oneshot::channel();
        self.send(EngineCommand::Health { reply })?;
        rx.await.map_err(|_| anyhow::anyhow!("arena dropped the health reply"))
    }
}
