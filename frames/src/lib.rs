//! Shared wire model for realtime drawing rooms.
//!
//! This crate owns the JSON representation used by both `server` and
//! `canvas`: the [`Shape`] primitive that every stroke event carries, and the
//! typed [`ClientEvent`] / [`ServerEvent`] envelopes discriminated by `type`.
//!
//! Field names on the wire are camelCase (`roomId`, `endX`, `strokeIndex`) and
//! event tags are snake_case (`update_stroke`), so payloads stay compatible
//! with browser clients that build them by hand.

mod event;
mod shape;

pub use event::{ClientEvent, ServerEvent, decode_client_event, decode_server_event, encode_client_event, encode_server_event};
pub use shape::{Shape, ShapeKind, UnknownShapeKind};

/// Opaque room identifier.
pub type RoomId = String;

/// Opaque authenticated user identifier.
pub type UserId = String;

/// Error returned by the JSON codec helpers.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The text was not valid JSON or did not match any known event shape.
    #[error("malformed event: {0}")]
    Malformed(#[from] serde_json::Error),
}

#[cfg(test)]
#[path = "lib_test.rs"]
mod tests;
