//! Per-client send channels and unicast/broadcast, direct structural copy of
//! the teacher's `gameroom::Table` (`crates/gameroom/src/table.rs`),
//! generalized from a fixed `Vec<Option<_>>` of poker seats to a dynamic
//! `HashMap` keyed by tank id, since players join and leave the arena at any
//! time rather than only at table creation.

use std::collections::{HashMap, HashSet};

use tanks_engine::entities::TankId;
use tokio::sync::mpsc::UnboundedSender;

#[derive(Default)]
pub struct Table {
    senders: HashMap<TankId, UnboundedSender<String>>,
    disconnected: HashSet<TankId>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers (or re-registers, on reconnect) a client's outgoing channel.
    pub fn sit(&mut self, tank_id: TankId, sender: UnboundedSender<String>) {
        self.senders.insert(tank_id, sender);
        self.disconnected.remove(&tank_id);
    }

    /// Removes a client entirely, e.g. on `playerLeft`.
    pub fn leave(&mut self, tank_id: TankId) {
        self.senders.remove(&tank_id);
        self.disconnected.remove(&tank_id);
    }

    pub fn disconnect(&mut self, tank_id: TankId) {
        self.disconnected.insert(tank_id);
    }

    pub fn is_disconnected(&self, tank_id: TankId) -> bool {
        self.disconnected.contains(&tank_id)
    }

    pub fn connected_count(&self) -> usize {
        self.senders.keys().filter(|id| !self.disconnected.contains(id)).count()
    }

    fn sender(&self, tank_id: TankId) -> Option<&UnboundedSender<String>> {
        self.senders.get(&tank_id).filter(|_| !self.disconnected.contains(&tank_id))
    }

    /// Sends a message to a single client.
    pub fn unicast(&self, tank_id: TankId, message: &str) {
        log::debug!("[table] unicast to {}", tank_id);
        match self.sender(tank_id).map(|inbox| inbox.send(message.to_string())) {
            Some(Ok(())) => {}
            Some(Err(e)) => log::warn!("[table] unicast to {} failed: {:?}", tank_id, e),
            None => log::warn!("[table] unicast to {}: no such client", tank_id),
        }
    }

    /// Sends a message to every connected client.
    pub fn broadcast(&self, message: &str) {
        log::debug!("[table] broadcast ({} bytes)", message.len());
        for (tank_id, inbox) in &self.senders {
            if self.disconnected.contains(tank_id) {
                continue;
            }
            if let Err(e) = inbox.send(message.to_string()) {
                log::warn!("[table] broadcast to {} failed: {:?}", tank_id, e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_table_has_no_connections() {
        let table = Table::new();
        assert_eq!(table.connected_count(), 0);
    }

    #[test]
    fn sit_then_disconnect_drops_from_connected_count() {
        let mut table = Table::new();
        let tank_id = TankId::new();
        let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
        table.sit(tank_id, tx);
        assert_eq!(table.connected_count(), 1);
        assert!(!table.is_disconnected(tank_id));
        table.disconnect(tank_id);
        assert!(table.is_disconnected(tank_id));
        assert_eq!(table.connected_count(), 0);
    }

    #[test]
    fn reconnect_clears_disconnected_flag() {
        let mut table = Table::new();
        let tank_id = TankId::new();
        let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
        table.sit(tank_id, tx.clone());
        table.disconnect(tank_id);
        table.sit(tank_id, tx);
        assert!(!table.is_disconnected(tank_id));
    }
}
