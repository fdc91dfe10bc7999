//! Per-connection intent handling

use tracing::{debug, info};

use crate::ws::hub::Transport;
use crate::ws::protocol::{
    ChatMessage, ChatPayload, ClientMsg, ConnectionId, GameStartPayload, JoinLobbyPayload,
    Movement, ServerMsg,
};

use super::entity::{Controller, EntityId, Player};
use super::world::World;

pub const DEFAULT_ROOM: &str = "default";
pub const DEFAULT_NICKNAME: &str = "Player";
pub const MAX_NICKNAME_CHARS: usize = 10;
pub const MAX_CHAT_CHARS: usize = 140;

/// Trim and truncate to `max_chars`, empty input yields `None`
pub fn sanitize(input: Option<&str>, max_chars: usize) -> Option<String> {
    let trimmed: String = input?.trim().chars().take(max_chars).collect();
    (!trimmed.is_empty()).then_some(trimmed)
}

pub fn sanitize_nickname(input: Option<&str>) -> String {
    sanitize(input, MAX_NICKNAME_CHARS).unwrap_or_else(|| DEFAULT_NICKNAME.to_string())
}

/// State owned by one live connection
#[derive(Debug)]
pub struct Session {
    pub connection_id: ConnectionId,
    /// Player this connection controls, if any. May point at a player that
    /// has since been eliminated.
    player: Option<EntityId>,
}

impl Session {
    pub fn new(connection_id: ConnectionId) -> Self {
        Self {
            connection_id,
            player: None,
        }
    }

    pub fn handle(&mut self, msg: ClientMsg, world: &mut World, transport: &dyn Transport) {
        match msg {
            ClientMsg::JoinLobby(payload) => self.join_lobby(payload, world, transport),
            ClientMsg::GameStart(payload) => self.start_match(payload, world, transport),
            ClientMsg::Movement(movement) => self.set_movement(movement, world),
            ClientMsg::Shoot => self.shoot(world),
            ClientMsg::ChatMessage(payload) => Self::chat(payload, transport),
            ClientMsg::SpectateMode(enabled) => self.set_spectating(enabled, world),
        }
    }

    /// Controlled player, only while it is alive and not spectating
    fn active_player<'w>(&self, world: &'w mut World) -> Option<&'w mut Player> {
        let id = self.player?;
        world
            .players
            .get_mut(&id)
            .filter(|player| player.accepts_intents())
    }

    fn join_lobby(&mut self, payload: JoinLobbyPayload, world: &mut World, transport: &dyn Transport) {
        let room = payload
            .room
            .as_deref()
            .map(str::trim)
            .filter(|room| !room.is_empty())
            .unwrap_or(DEFAULT_ROOM)
            .to_string();
        let nickname = sanitize_nickname(payload.nickname.as_deref());

        transport.join_room(&room, self.connection_id);
        let members = world
            .lobby
            .join(&room, self.connection_id, nickname)
            .to_vec();

        debug!(connection_id = %self.connection_id, room = %room, members = members.len(), "Joined lobby");
        transport.emit_room(&room, &ServerMsg::PlayersUpdate(members));
    }

    fn start_match(&mut self, payload: GameStartPayload, world: &mut World, transport: &dyn Transport) {
        let nickname = sanitize_nickname(payload.nickname.as_deref());

        // Repeated start signals replace the previous player
        if let Some(previous) = self.player.take() {
            world.remove_player(previous);
        }

        let controller = Controller::Human {
            connection_id: self.connection_id,
        };
        let player_id = world.spawn_player(controller, nickname.clone());
        self.player = Some(player_id);
        world.player_names.push(nickname.clone());

        info!(
            connection_id = %self.connection_id,
            player_id,
            nickname = %nickname,
            joined = world.player_names.len(),
            "Player started match"
        );
        transport.emit_all(&ServerMsg::JoiningList(vec![nickname]));
    }

    fn set_movement(&mut self, movement: Movement, world: &mut World) {
        if let Some(player) = self.active_player(world) {
            player.movement = movement;
        }
    }

    fn shoot(&mut self, world: &mut World) {
        let Some(player_id) = self.active_player(world).map(|p| p.id) else {
            return;
        };
        world.shoot(player_id);
    }

    fn chat(payload: ChatPayload, transport: &dyn Transport) {
        let Some(message) = sanitize(payload.message.as_deref(), MAX_CHAT_CHARS) else {
            return;
        };
        let nickname = sanitize_nickname(payload.nickname.as_deref());

        transport.emit_all(&ServerMsg::ChatMessage(ChatMessage { nickname, message }));
    }

    fn set_spectating(&mut self, enabled: bool, world: &mut World) {
        let Some(player) = self.player.and_then(|id| world.players.get_mut(&id)) else {
            return;
        };
        player.spectating = enabled;
        player.movement = Movement::default();
    }

    /// Tear down the session. Safe to call for a session that never
    /// controlled a player.
    pub fn disconnect(&mut self, world: &mut World, transport: &dyn Transport) {
        // Voluntary leave, no elimination broadcast
        if let Some(player_id) = self.player.take() {
            world.remove_player(player_id);
        }

        for (room, members) in world.lobby.leave_all(self.connection_id) {
            transport.emit_room(&room, &ServerMsg::PlayersUpdate(members));
        }

        transport.emit_all(&ServerMsg::UpdatedUserlist(transport.connection_count()));
    }
}
