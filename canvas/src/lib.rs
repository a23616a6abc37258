//! Canvas engine for realtime drawing rooms.
//!
//! This crate is compiled to WebAssembly and runs in the browser. It owns the
//! client side of a room: translating raw DOM input into shape edits,
//! keeping the local shape list and its undo history, reconciling it with
//! peer broadcasts, and painting the scene. The host JavaScript layer only
//! wires DOM and socket events to the engine and sends the resulting
//! [`engine::Action`]s through [`session::RoomSession::outbound`].
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Top-level engine and testable [`engine::EngineCore`] |
//! | [`geometry`] | Bounds, hit testing, and resize handles for shapes |
//! | [`host`] | `wasm_bindgen` boundary: DOM events and socket frames in, frames out |
//! | [`history`] | Snapshot list behind local undo |
//! | [`camera`] | Pan/zoom camera and coordinate conversions |
//! | [`input`] | Input event types and the gesture state machine |
//! | [`render`] | Scene building and 2D canvas painting |
//! | [`session`] | Inbound event queue and outbound wire mapping for one room |
//! | [`consts`] | Shared numeric constants (zoom limits, minimum sizes, etc.) |

pub mod camera;
pub mod consts;
pub mod engine;
pub mod geometry;
pub mod history;
pub mod host;
pub mod input;
pub mod render;
pub mod session;
