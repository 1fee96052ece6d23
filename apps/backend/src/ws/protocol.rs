use serde::{Deserialize, Serialize};

use crate::entities::games::GameStatus;
use crate::repos::players::Player;

/// Kind of a realtime event. Serialized as the `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    PlayerJoined,
    PlayerLeft,
    RolesDistributed,
    GameDeleted,
    InitialState,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::PlayerJoined => "player_joined",
            EventType::PlayerLeft => "player_left",
            EventType::RolesDistributed => "roles_distributed",
            EventType::GameDeleted => "game_deleted",
            EventType::InitialState => "initial_state",
        }
    }
}

/// What every subscriber receives: `{ "type", "game_id", "payload" }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireEvent {
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub game_id: String,
    pub payload: serde_json::Value,
}

impl WireEvent {
    pub fn new(event_type: EventType, game_id: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            event_type,
            game_id: game_id.into(),
            payload,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerLeftPayload {
    pub player_id: i64,
}

/// Snapshot pushed to a connection right after it registers.
#[derive(Debug, Clone, Serialize)]
pub struct InitialStatePayload {
    pub game_id: String,
    pub status: GameStatus,
    pub players: Vec<Player>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn wire_event_shape() {
        let event = WireEvent::new(
            EventType::PlayerLeft,
            "K7Q2MX",
            serde_json::to_value(PlayerLeftPayload { player_id: 4 }).unwrap(),
        );
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(
            value,
            json!({"type": "player_left", "game_id": "K7Q2MX", "payload": {"player_id": 4}})
        );
    }

    #[test]
    fn null_payload_is_kept() {
        let event = WireEvent::new(EventType::RolesDistributed, "K7Q2MX", serde_json::Value::Null);
        let text = serde_json::to_string(&event).unwrap();
        assert_eq!(
            text,
            r#"{"type":"roles_distributed","game_id":"K7Q2MX","payload":null}"#
        );
    }

    #[test]
    fn as_str_matches_serde() {
        for t in [
            EventType::PlayerJoined,
            EventType::PlayerLeft,
            EventType::RolesDistributed,
            EventType::GameDeleted,
            EventType::InitialState,
        ] {
            let encoded = serde_json::to_value(t).unwrap();
            assert_eq!(encoded, serde_json::Value::String(t.as_str().to_string()));
        }
    }
}
