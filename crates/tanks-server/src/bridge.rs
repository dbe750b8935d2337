//! The WebSocket message pump, grounded on the teacher's
//! `Casino::bridge` (`crates/hosting/src/casino.rs`): a `tokio::select!
//! { biased; ... }` loop between the socket's inbound stream and the
//! arena's outbound channel for this client, spawned once per connection.

use actix_ws::{Message, MessageStream, Session};
use futures::StreamExt;
use tanks_engine::entities::TankId;
use tanks_protocol::protocol::Protocol;
use tokio::sync::mpsc::unbounded_channel;
use tokio::sync::oneshot;

use crate::command::EngineCommand;
use crate::handle::ArenaHandle;

pub async fn bridge(arena: ArenaHandle, mut session: Session, mut stream: MessageStream, requested_id: Option<TankId>) {
    let (tx, mut rx) = unbounded_channel::<String>();
    let (reply, reply_rx) = oneshot::channel();

    if arena.send(EngineCommand::Connect { requested_id, sender: tx, reply }).is_err() {
        log::error!("[bridge] arena command queue is closed");
        return;
    }
    let tank_id = match reply_rx.await {
        Ok(id) => id,
        Err(_) => {
            log::error!("[bridge] arena dropped the connect reply");
            return;
        }
    };
    log::debug!("[bridge {}] connected", tank_id);

    'sesh: loop {
        tokio::select! {
            biased;
            msg = rx.recv() => match msg {
                Some(text) => if session.text(text).await.is_err() { break 'sesh },
                None => break 'sesh,
            },
            msg = stream.next() => match msg {
                Some(Ok(Message::Text(text))) => match Protocol::decode(&text) {
                    Ok(event) => {
                        if arena.send(EngineCommand::Client { tank_id, event }).is_err() {
                            break 'sesh;
                        }
                    }
                    Err(e) => log::debug!("[bridge {}] malformed message: {}", tank_id, e),
                },
                Some(Ok(Message::Close(_))) => break 'sesh,
                Some(Err(_)) => break 'sesh,
                None => break 'sesh,
                _ => continue 'sesh,
            },
        }
    }

    let _ = arena.send(EngineCommand::Disconnect { tank_id });
    log::debug!("[bridge {}] disconnected", tank_id);
}
