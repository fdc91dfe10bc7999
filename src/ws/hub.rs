//! Connection registry, rooms and fan-out of server frames

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::RwLock;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, error, warn};

use crate::ws::protocol::{ConnectionId, ServerMsg};

/// Outbound frames buffered per connection before frames are dropped
pub const OUTBOUND_BUFFER: usize = 256;

/// Serialized JSON text frame, shared between recipients
pub type Frame = Arc<str>;

/// Delivery primitives the simulation needs from the network layer
pub trait Transport: Send + Sync {
    /// Subscribe a connection to room broadcasts
    fn join_room(&self, room: &str, connection_id: ConnectionId);
    fn emit_all(&self, msg: &ServerMsg);
    fn emit_room(&self, room: &str, msg: &ServerMsg);
    fn emit_to(&self, connection_id: ConnectionId, msg: &ServerMsg);
    /// Number of live connections
    fn connection_count(&self) -> usize;
}

/// Registry of live WebSocket connections
pub struct ConnectionHub {
    connections: DashMap<ConnectionId, mpsc::Sender<Frame>>,
    rooms: RwLock<HashMap<String, HashSet<ConnectionId>>>,
}

impl ConnectionHub {
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
            rooms: RwLock::new(HashMap::new()),
        }
    }

    /// Register a connection and return the receiving end of its outbound queue
    pub fn register(&self, connection_id: ConnectionId) -> mpsc::Receiver<Frame> {
        let (tx, rx) = mpsc::channel(OUTBOUND_BUFFER);
        self.connections.insert(connection_id, tx);
        rx
    }

    /// Forget a connection and its room memberships
    pub fn unregister(&self, connection_id: ConnectionId) {
        self.connections.remove(&connection_id);

        let mut rooms = self.rooms.write();
        rooms.retain(|_, members| {
            members.remove(&connection_id);
            !members.is_empty()
        });
    }

    fn encode(msg: &ServerMsg) -> Option<Frame> {
        match serde_json::to_string(msg) {
            Ok(json) => Some(Arc::from(json)),
            Err(e) => {
                error!(error = %e, "Failed to encode server message");
                None
            }
        }
    }

    fn deliver(&self, connection_id: ConnectionId, frame: &Frame) {
        let Some(tx) = self.connections.get(&connection_id) else {
            return;
        };

        match tx.try_send(frame.clone()) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                warn!(connection_id = %connection_id, "Outbound queue full, dropping frame");
            }
            Err(TrySendError::Closed(_)) => {
                debug!(connection_id = %connection_id, "Outbound queue closed");
            }
        }
    }
}

impl Default for ConnectionHub {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for ConnectionHub {
    fn join_room(&self, room: &str, connection_id: ConnectionId) {
        if !self.connections.contains_key(&connection_id) {
            return;
        }
        self.rooms
            .write()
            .entry(room.to_string())
            .or_default()
            .insert(connection_id);
    }

    fn emit_all(&self, msg: &ServerMsg) {
        let Some(frame) = Self::encode(msg) else {
            return;
        };
        let ids: Vec<ConnectionId> = self.connections.iter().map(|c| *c.key()).collect();
        for id in ids {
            self.deliver(id, &frame);
        }
    }

    fn emit_room(&self, room: &str, msg: &ServerMsg) {
        let members: Vec<ConnectionId> = match self.rooms.read().get(room) {
            Some(members) => members.iter().copied().collect(),
            None => return,
        };
        let Some(frame) = Self::encode(msg) else {
            return;
        };
        for id in members {
            self.deliver(id, &frame);
        }
    }

    fn emit_to(&self, connection_id: ConnectionId, msg: &ServerMsg) {
        if let Some(frame) = Self::encode(msg) {
            self.deliver(connection_id, &frame);
        }
    }

    fn connection_count(&self) -> usize {
        self.connections.len()
    }
}

/// In-memory transport that records every emitted message
#[cfg(test)]
pub(crate) mod testing {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use parking_lot::Mutex;

    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    pub(crate) enum Audience {
        All,
        Room(String),
        Connection(ConnectionId),
    }

    #[derive(Default)]
    pub(crate) struct RecordingTransport {
        sent: Mutex<Vec<(Audience, ServerMsg)>>,
        pub(crate) joined: Mutex<Vec<(String, ConnectionId)>>,
        connections: AtomicUsize,
    }

    impl RecordingTransport {
        /// Drain everything emitted so far
        pub(crate) fn take(&self) -> Vec<(Audience, ServerMsg)> {
            std::mem::take(&mut *self.sent.lock())
        }

        pub(crate) fn set_connections(&self, count: usize) {
            self.connections.store(count, Ordering::Relaxed);
        }
    }

    impl Transport for RecordingTransport {
        fn join_room(&self, room: &str, connection_id: ConnectionId) {
            self.joined.lock().push((room.to_string(), connection_id));
        }

        fn emit_all(&self, msg: &ServerMsg) {
            self.sent.lock().push((Audience::All, msg.clone()));
        }

        fn emit_room(&self, room: &str, msg: &ServerMsg) {
            self.sent
                .lock()
                .push((Audience::Room(room.to_string()), msg.clone()));
        }

        fn emit_to(&self, connection_id: ConnectionId, msg: &ServerMsg) {
            self.sent
                .lock()
                .push((Audience::Connection(connection_id), msg.clone()));
        }

        fn connection_count(&self) -> usize {
            self.connections.load(Ordering::Relaxed)
        }
    }
}
