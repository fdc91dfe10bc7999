//! Per-room lobby membership

use std::collections::HashMap;

use crate::ws::protocol::{ConnectionId, LobbyMember};

/// Ordered member lists by room name
#[derive(Debug, Default)]
pub struct Lobby {
    rooms: HashMap<String, Vec<LobbyMember>>,
}

impl Lobby {
    /// Add or replace this connection's entry in `room`.
    /// A rejoining connection moves to the end of the list.
    pub fn join(&mut self, room: &str, connection_id: ConnectionId, nickname: String) -> &[LobbyMember] {
        let members = self.rooms.entry(room.to_string()).or_default();
        members.retain(|m| m.connection_id != connection_id);
        members.push(LobbyMember {
            connection_id,
            nickname,
        });
        members
    }

    /// Drop the connection from every room it belonged to and return the
    /// updated member list of each affected room. Rooms left empty are forgotten.
    pub fn leave_all(&mut self, connection_id: ConnectionId) -> Vec<(String, Vec<LobbyMember>)> {
        let mut affected = Vec::new();
        self.rooms.retain(|room, members| {
            let before = members.len();
            members.retain(|m| m.connection_id != connection_id);
            if members.len() != before {
                affected.push((room.clone(), members.clone()));
            }
            !members.is_empty()
        });
        affected
    }

    #[cfg(test)]
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    #[cfg(test)]
    pub fn members(&self, room: &str) -> &[LobbyMember] {
        self.rooms.get(room).map(Vec::as_slice).unwrap_or(&[])
    }
}
