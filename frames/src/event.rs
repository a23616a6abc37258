use serde::{Deserialize, Deserializer, Serialize};

use crate::{CodecError, RoomId, Shape, UserId};

/// Events sent by a client over the room transport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ClientEvent {
    JoinRoom {
        #[serde(deserialize_with = "room_id")]
        room_id: RoomId,
    },
    LeaveRoom {
        #[serde(deserialize_with = "room_id")]
        room_id: RoomId,
    },
    Chat {
        #[serde(deserialize_with = "room_id")]
        room_id: RoomId,
        message: String,
    },
    Stroke {
        #[serde(deserialize_with = "room_id")]
        room_id: RoomId,
        data: Shape,
    },
    UpdateStroke {
        #[serde(deserialize_with = "room_id")]
        room_id: RoomId,
        index: usize,
        data: Shape,
    },
    DeleteStroke {
        #[serde(deserialize_with = "room_id")]
        room_id: RoomId,
        stroke_index: usize,
    },
    Undo {
        #[serde(deserialize_with = "room_id")]
        room_id: RoomId,
        stroke_history: Vec<Shape>,
    },
}

impl ClientEvent {
    #[must_use]
    pub fn room_id(&self) -> &str {
        match self {
            Self::JoinRoom { room_id }
            | Self::LeaveRoom { room_id }
            | Self::Chat { room_id, .. }
            | Self::Stroke { room_id, .. }
            | Self::UpdateStroke { room_id, .. }
            | Self::DeleteStroke { room_id, .. }
            | Self::Undo { room_id, .. } => room_id,
        }
    }

    /// The `type` tag, for logging.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::JoinRoom { .. } => "join_room",
            Self::LeaveRoom { .. } => "leave_room",
            Self::Chat { .. } => "chat",
            Self::Stroke { .. } => "stroke",
            Self::UpdateStroke { .. } => "update_stroke",
            Self::DeleteStroke { .. } => "delete_stroke",
            Self::Undo { .. } => "undo",
        }
    }
}

/// Events fanned out by the server to room members.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ServerEvent {
    Chat {
        #[serde(deserialize_with = "room_id")]
        room_id: RoomId,
        message: String,
        user_id: UserId,
    },
    ActiveCount {
        #[serde(deserialize_with = "room_id")]
        room_id: RoomId,
        active_count: usize,
    },
    Stroke {
        #[serde(deserialize_with = "room_id")]
        room_id: RoomId,
        data: Shape,
        user_id: UserId,
    },
    UpdateStroke {
        #[serde(deserialize_with = "room_id")]
        room_id: RoomId,
        index: usize,
        data: Shape,
        user_id: UserId,
    },
    DeleteStroke {
        #[serde(deserialize_with = "room_id")]
        room_id: RoomId,
        stroke_index: usize,
        user_id: UserId,
    },
    /// Full replacement list, not a diff.
    Undo {
        #[serde(deserialize_with = "room_id")]
        room_id: RoomId,
        data: Vec<Shape>,
        user_id: UserId,
    },
}

impl ServerEvent {
    #[must_use]
    pub fn room_id(&self) -> &str {
        match self {
            Self::Chat { room_id, .. }
            | Self::ActiveCount { room_id, .. }
            | Self::Stroke { room_id, .. }
            | Self::UpdateStroke { room_id, .. }
            | Self::DeleteStroke { room_id, .. }
            | Self::Undo { room_id, .. } => room_id,
        }
    }
}

/// Accept `"roomId": "12"` and `"roomId": 12` alike.
fn room_id<'de, D>(deserializer: D) -> Result<RoomId, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
    })
}

/// Decode one inbound client text frame.
///
/// # Errors
///
/// Returns [`CodecError::Malformed`] for invalid JSON or an unknown `type`.
pub fn decode_client_event(text: &str) -> Result<ClientEvent, CodecError> {
    Ok(serde_json::from_str(text)?)
}

/// Decode one server text frame.
///
/// # Errors
///
/// Returns [`CodecError::Malformed`] for invalid JSON or an unknown `type`.
pub fn decode_server_event(text: &str) -> Result<ServerEvent, CodecError> {
    Ok(serde_json::from_str(text)?)
}

/// Encode a client event as JSON text.
///
/// # Errors
///
/// Returns [`CodecError::Malformed`] if serialization fails.
pub fn encode_client_event(event: &ClientEvent) -> Result<String, CodecError> {
    Ok(serde_json::to_string(event)?)
}

/// Encode a server event as JSON text.
///
/// # Errors
///
/// Returns [`CodecError::Malformed`] if serialization fails.
pub fn encode_server_event(event: &ServerEvent) -> Result<String, CodecError> {
    Ok(serde_json::to_string(event)?)
}
