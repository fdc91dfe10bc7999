//! WebSocket protocol message definitions
//! These are the wire types for client-server communication.
//!
//! Every frame is a JSON object `{"event": <name>, "data": <payload>}`.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::game::physics::Rect;
use crate::game::EntityId;

/// Unique identifier of a live transport connection
pub type ConnectionId = Uuid;

/// Inbound frame errors
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("malformed frame: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unknown event: {0}")]
    UnknownEvent(String),
}

/// Requested movement directions, replaced wholesale on every update
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Movement {
    #[serde(deserialize_with = "truthy")]
    pub forward: bool,
    #[serde(deserialize_with = "truthy")]
    pub back: bool,
    #[serde(deserialize_with = "truthy")]
    pub left: bool,
    #[serde(deserialize_with = "truthy")]
    pub right: bool,
}

impl Movement {
    pub fn is_idle(&self) -> bool {
        !(self.forward || self.back || self.left || self.right)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct JoinLobbyPayload {
    pub room: Option<String>,
    pub nickname: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GameStartPayload {
    pub nickname: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ChatPayload {
    pub nickname: Option<String>,
    pub message: Option<String>,
}

/// Messages sent from client to server
#[derive(Debug, Clone, PartialEq)]
pub enum ClientMsg {
    /// `join-lobby`
    JoinLobby(JoinLobbyPayload),
    /// `game-start`
    GameStart(GameStartPayload),
    /// `movement`
    Movement(Movement),
    /// `shoot`
    Shoot,
    /// `chat-message`
    ChatMessage(ChatPayload),
    /// `spectate-mode`
    SpectateMode(bool),
}

#[derive(Deserialize)]
struct RawFrame {
    event: String,
    #[serde(default)]
    data: serde_json::Value,
}

impl ClientMsg {
    /// Parse an inbound text frame. Absent or null payloads fall back to
    /// their defaults instead of failing.
    pub fn parse(text: &str) -> Result<Self, ProtocolError> {
        let RawFrame { event, data } = serde_json::from_str(text)?;

        let msg = match event.as_str() {
            "join-lobby" => Self::JoinLobby(payload_or_default(data)?),
            "game-start" => Self::GameStart(payload_or_default(data)?),
            "movement" => Self::Movement(payload_or_default(data)?),
            "shoot" => Self::Shoot,
            "chat-message" => Self::ChatMessage(payload_or_default(data)?),
            "spectate-mode" => Self::SpectateMode(is_truthy(&data)),
            _ => return Err(ProtocolError::UnknownEvent(event)),
        };

        Ok(msg)
    }
}

/// Loose boolean reading of a JSON value: null, false, 0, NaN and "" are false
fn is_truthy(value: &serde_json::Value) -> bool {
    use serde_json::Value;

    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn truthy<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(is_truthy(&value))
}

fn payload_or_default<T>(data: serde_json::Value) -> Result<T, ProtocolError>
where
    T: Default + for<'de> Deserialize<'de>,
{
    let payload: Option<T> = serde_json::from_value(data)?;
    Ok(payload.unwrap_or_default())
}

/// Messages sent from server to client
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "data")]
pub enum ServerMsg {
    /// Full world state, once per tick
    #[serde(rename = "state")]
    State(WorldSnapshot),

    /// Whole seconds since the world was created
    #[serde(rename = "match-timer")]
    MatchTimer(u64),

    /// Sent only to the eliminated connection
    #[serde(rename = "dead")]
    Dead,

    /// Elimination announcement carrying the eliminated nickname
    #[serde(rename = "updatedPlayerList")]
    UpdatedPlayerList(String),

    /// Join announcement
    #[serde(rename = "joiningList")]
    JoiningList(Vec<String>),

    /// Live connection count
    #[serde(rename = "updatedUserlist")]
    UpdatedUserlist(usize),

    /// Lobby membership of one room
    #[serde(rename = "players-update")]
    PlayersUpdate(Vec<LobbyMember>),

    #[serde(rename = "chat-message")]
    ChatMessage(ChatMessage),
}

/// Lobby member entry, at most one per connection per room
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LobbyMember {
    pub connection_id: ConnectionId,
    pub nickname: String,
}

/// Sanitized chat line relayed to everyone
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub nickname: String,
    pub message: String,
}

/// Every entity collection, keyed by id
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WorldSnapshot {
    pub players: HashMap<EntityId, PlayerView>,
    pub bullets: HashMap<EntityId, BulletView>,
    pub walls: HashMap<EntityId, WallView>,
}

/// Public attributes of a player
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerView {
    pub id: EntityId,
    #[serde(flatten)]
    pub rect: Rect,
    /// Absent for bots
    #[serde(skip_serializing_if = "Option::is_none")]
    pub socket_id: Option<ConnectionId>,
    pub nickname: String,
    pub health: i32,
    pub max_health: i32,
    pub point: u32,
    pub spectating: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulletView {
    pub id: EntityId,
    #[serde(flatten)]
    pub rect: Rect,
    pub player_id: EntityId,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WallView {
    pub id: EntityId,
    #[serde(flatten)]
    pub rect: Rect,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_every_client_event() {
        assert_eq!(
            ClientMsg::parse(r#"{"event":"join-lobby","data":{"room":"r1","nickname":"ann"}}"#)
                .unwrap(),
            ClientMsg::JoinLobby(JoinLobbyPayload {
                room: Some("r1".into()),
                nickname: Some("ann".into()),
            })
        );
        assert_eq!(
            ClientMsg::parse(r#"{"event":"movement","data":{"forward":true}}"#).unwrap(),
            ClientMsg::Movement(Movement {
                forward: true,
                ..Movement::default()
            })
        );
        assert_eq!(ClientMsg::parse(r#"{"event":"shoot"}"#).unwrap(), ClientMsg::Shoot);
        assert_eq!(
            ClientMsg::parse(r#"{"event":"spectate-mode","data":true}"#).unwrap(),
            ClientMsg::SpectateMode(true)
        );
        assert_eq!(
            ClientMsg::parse(r#"{"event":"chat-message","data":{"nickname":"a","message":"hi"}}"#)
                .unwrap(),
            ClientMsg::ChatMessage(ChatPayload {
                nickname: Some("a".into()),
                message: Some("hi".into()),
            })
        );
    }

    #[test]
    fn missing_payloads_default() {
        assert_eq!(
            ClientMsg::parse(r#"{"event":"join-lobby"}"#).unwrap(),
            ClientMsg::JoinLobby(JoinLobbyPayload::default())
        );
        assert_eq!(
            ClientMsg::parse(r#"{"event":"game-start","data":null}"#).unwrap(),
            ClientMsg::GameStart(GameStartPayload::default())
        );
        assert_eq!(
            ClientMsg::parse(r#"{"event":"spectate-mode"}"#).unwrap(),
            ClientMsg::SpectateMode(false)
        );
    }

    #[test]
    fn loosely_typed_flags_are_read_as_booleans() {
        assert_eq!(
            ClientMsg::parse(r#"{"event":"movement","data":{"forward":null,"left":true}}"#).unwrap(),
            ClientMsg::Movement(Movement {
                left: true,
                ..Movement::default()
            })
        );
        assert_eq!(
            ClientMsg::parse(r#"{"event":"movement","data":{"back":1,"right":"yes","forward":0}}"#)
                .unwrap(),
            ClientMsg::Movement(Movement {
                back: true,
                right: true,
                ..Movement::default()
            })
        );
        assert_eq!(
            ClientMsg::parse(r#"{"event":"spectate-mode","data":1}"#).unwrap(),
            ClientMsg::SpectateMode(true)
        );
        assert_eq!(
            ClientMsg::parse(r#"{"event":"spectate-mode","data":""}"#).unwrap(),
            ClientMsg::SpectateMode(false)
        );
        assert_eq!(
            ClientMsg::parse(r#"{"event":"spectate-mode","data":null}"#).unwrap(),
            ClientMsg::SpectateMode(false)
        );
    }

    #[test]
    fn rejects_unknown_and_malformed_frames() {
        assert!(matches!(
            ClientMsg::parse(r#"{"event":"teleport"}"#),
            Err(ProtocolError::UnknownEvent(e)) if e == "teleport"
        ));
        assert!(matches!(
            ClientMsg::parse("not json"),
            Err(ProtocolError::Json(_))
        ));
    }

    #[test]
    fn server_frames_use_event_envelope() {
        assert_eq!(serde_json::to_value(ServerMsg::Dead).unwrap(), json!({"event": "dead"}));
        assert_eq!(
            serde_json::to_value(ServerMsg::UpdatedUserlist(3)).unwrap(),
            json!({"event": "updatedUserlist", "data": 3})
        );
        assert_eq!(
            serde_json::to_value(ServerMsg::JoiningList(vec!["ann".into()])).unwrap(),
            json!({"event": "joiningList", "data": ["ann"]})
        );
    }

    #[test]
    fn snapshot_keys_entities_by_id() {
        let mut snapshot = WorldSnapshot::default();
        snapshot.bullets.insert(
            7,
            BulletView {
                id: 7,
                rect: Rect::new(1.0, 2.0, 15.0, 15.0),
                player_id: 3,
            },
        );

        let value = serde_json::to_value(ServerMsg::State(snapshot)).unwrap();
        assert_eq!(value["event"], "state");
        assert_eq!(value["data"]["bullets"]["7"]["playerId"], 3);
        assert_eq!(value["data"]["bullets"]["7"]["width"], 15.0);
        assert_eq!(value["data"]["bullets"]["7"]["angle"], 0.0);
    }

    #[test]
    fn bot_view_omits_socket_id() {
        let view = PlayerView {
            id: 1,
            rect: Rect::new(0.0, 0.0, 80.0, 80.0),
            socket_id: None,
            nickname: "bot".into(),
            health: 10,
            max_health: 10,
            point: 0,
            spectating: false,
        };
        let value = serde_json::to_value(view).unwrap();
        assert!(value.get("socketId").is_none());
        assert_eq!(value["maxHealth"], 10);
    }
}
