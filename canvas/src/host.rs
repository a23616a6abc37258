//! JavaScript boundary: the one type the page script talks to.
//!
//! [`CanvasHost`] owns an [`Engine`] and a [`RoomSession`] and exposes them
//! through `wasm_bindgen` with plain arguments: numbers and flags for DOM
//! events, strings for socket frames. Every input handler returns the wire
//! frames the page should send, already encoded. Redraws and cursor changes
//! are handled here, so the page never sees an [`Action`].
//!
//! The mapping helpers are plain functions so they are tested natively.

#[cfg(test)]
#[path = "host_test.rs"]
mod host_test;

use frames::{ClientEvent, Shape, encode_client_event};
use log::warn;
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;
use web_sys::HtmlCanvasElement;

use crate::camera::Point;
use crate::engine::{Action, Engine};
use crate::input::{Button, Key, Modifiers, Tool, WheelDelta};
use crate::session::{Notice, RoomSession};

#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error("unknown tool: {0}")]
    UnknownTool(String),
    #[error("bad catch-up body: {0}")]
    CatchUp(#[source] serde_json::Error),
    #[error("failed to encode frame: {0}")]
    Encode(#[from] frames::CodecError),
}

impl From<HostError> for JsValue {
    fn from(e: HostError) -> Self {
        JsValue::from_str(&e.to_string())
    }
}

/// Body of `GET /stroke/{roomId}`.
#[derive(Debug, Deserialize)]
struct CatchUp {
    strokes: Vec<Shape>,
}

/// [`Notice`] as handed to the page.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
enum NoticeFrame<'a> {
    Chat { user_id: &'a str, message: &'a str },
    ActiveCount { active_count: usize },
}

// =============================================================
// Mapping helpers
// =============================================================

/// `PointerEvent.button` to [`Button`].
#[must_use]
pub fn map_button(button: i16) -> Button {
    match button {
        1 => Button::Middle,
        2 => Button::Secondary,
        _ => Button::Primary,
    }
}

#[must_use]
pub fn map_modifiers(shift: bool, ctrl: bool, alt: bool, meta: bool) -> Modifiers {
    Modifiers { shift, ctrl, alt, meta }
}

/// Toolbar name to [`Tool`]. Accepts the wire spelling of each shape kind.
///
/// # Errors
///
/// [`HostError::UnknownTool`] for any other name.
pub fn parse_tool(name: &str) -> Result<Tool, HostError> {
    match name {
        "select" => Ok(Tool::Select),
        "pen" => Ok(Tool::Pen),
        "rectangle" => Ok(Tool::Rectangle),
        "circle" => Ok(Tool::Circle),
        "arrow" => Ok(Tool::Arrow),
        other => Err(HostError::UnknownTool(other.to_owned())),
    }
}

/// Parse a catch-up response into the ordered shape list.
///
/// # Errors
///
/// [`HostError::CatchUp`] if the body is not `{"strokes": [...]}`.
pub fn parse_catch_up(body: &str) -> Result<Vec<Shape>, HostError> {
    serde_json::from_str::<CatchUp>(body).map(|c| c.strokes).map_err(HostError::CatchUp)
}

/// Encode outbound events as text frames.
///
/// # Errors
///
/// [`HostError::Encode`] if any event fails to serialize.
pub fn encode_frames(events: &[ClientEvent]) -> Result<Vec<String>, HostError> {
    events.iter().map(|e| encode_client_event(e).map_err(HostError::from)).collect()
}

/// Encode a notice for the page as JSON.
///
/// # Errors
///
/// Returns the serializer error.
pub fn encode_notice(notice: &Notice) -> Result<String, serde_json::Error> {
    let frame = match notice {
        Notice::Chat { user_id, message } => NoticeFrame::Chat { user_id, message },
        Notice::ActiveCount(active_count) => NoticeFrame::ActiveCount { active_count: *active_count },
    };
    serde_json::to_string(&frame)
}

// =============================================================
// CanvasHost
// =============================================================

#[wasm_bindgen]
pub struct CanvasHost {
    canvas: HtmlCanvasElement,
    engine: Engine,
    session: RoomSession,
}

#[wasm_bindgen]
impl CanvasHost {
    #[wasm_bindgen(constructor)]
    #[must_use]
    pub fn new(canvas: HtmlCanvasElement, room_id: String) -> Self {
        let engine = Engine::new(canvas.clone());
        Self { canvas, engine, session: RoomSession::new(room_id) }
    }

    // --- Socket ---

    /// The socket opened. Returns the `join_room` frame to send.
    ///
    /// # Errors
    ///
    /// Fails only if the frame cannot be encoded.
    pub fn socket_open(&mut self) -> Result<String, JsValue> {
        let join = self.session.on_open();
        Ok(encode_client_event(&join).map_err(HostError::from)?)
    }

    pub fn socket_close(&mut self) {
        self.session.on_close();
    }

    /// Queue one inbound text frame. Applied on the next [`Self::tick`].
    pub fn socket_message(&mut self, text: &str) -> bool {
        self.session.receive_text(text)
    }

    /// Apply queued remote events and redraw if anything changed.
    ///
    /// # Errors
    ///
    /// Propagates canvas draw failures.
    pub fn tick(&mut self) -> Result<(), JsValue> {
        let actions = self.session.drain(&mut self.engine.core);
        self.handle(&actions)?;
        Ok(())
    }

    /// Chat and presence updates since the last call, one JSON object each.
    pub fn take_notices(&mut self) -> Vec<String> {
        let mut frames = Vec::new();
        for notice in self.session.take_notices() {
            match encode_notice(&notice) {
                Ok(text) => frames.push(text),
                Err(e) => warn!("host: dropping notice {notice:?}: {e}"),
            }
        }
        frames
    }

    /// Chat frame for the joined room, or `None` while disconnected.
    ///
    /// # Errors
    ///
    /// Fails only if the frame cannot be encoded.
    pub fn chat(&self, message: String) -> Result<Option<String>, JsValue> {
        match self.session.chat(message) {
            Some(event) => Ok(Some(encode_client_event(&event).map_err(HostError::from)?)),
            None => Ok(None),
        }
    }

    // --- Data / settings ---

    /// Replace the canvas with a catch-up body from the REST endpoint.
    ///
    /// # Errors
    ///
    /// Fails on a malformed body or a draw failure.
    pub fn load_strokes(&mut self, body: &str) -> Result<(), JsValue> {
        let shapes = parse_catch_up(body)?;
        self.engine.load_snapshot(shapes);
        self.engine.render()
    }

    /// # Errors
    ///
    /// Fails on an unknown tool name or a draw failure.
    pub fn set_tool(&mut self, name: &str) -> Result<(), JsValue> {
        self.engine.set_tool(parse_tool(name)?);
        self.engine.render()
    }

    pub fn set_style(&mut self, color: String, size: f64) {
        self.engine.set_style(color, size);
    }

    /// # Errors
    ///
    /// Propagates canvas draw failures.
    pub fn set_viewport(&mut self, width_css: f64, height_css: f64, dpr: f64) -> Result<(), JsValue> {
        self.engine.set_viewport(width_css, height_css, dpr);
        self.engine.render()
    }

    // --- Input ---

    /// # Errors
    ///
    /// Propagates draw and encode failures.
    #[allow(clippy::too_many_arguments, clippy::fn_params_excessive_bools)]
    pub fn pointer_down(
        &mut self,
        x: f64,
        y: f64,
        button: i16,
        shift: bool,
        ctrl: bool,
        alt: bool,
        meta: bool,
    ) -> Result<Vec<String>, JsValue> {
        let actions =
            self.engine.on_pointer_down(Point::new(x, y), map_button(button), map_modifiers(shift, ctrl, alt, meta));
        self.handle(&actions)
    }

    /// # Errors
    ///
    /// Propagates draw and encode failures.
    #[allow(clippy::fn_params_excessive_bools)]
    pub fn pointer_move(&mut self, x: f64, y: f64, shift: bool, ctrl: bool, alt: bool, meta: bool) -> Result<Vec<String>, JsValue> {
        let actions = self.engine.on_pointer_move(Point::new(x, y), map_modifiers(shift, ctrl, alt, meta));
        self.handle(&actions)
    }

    /// # Errors
    ///
    /// Propagates draw and encode failures.
    #[allow(clippy::too_many_arguments, clippy::fn_params_excessive_bools)]
    pub fn pointer_up(
        &mut self,
        x: f64,
        y: f64,
        button: i16,
        shift: bool,
        ctrl: bool,
        alt: bool,
        meta: bool,
    ) -> Result<Vec<String>, JsValue> {
        let actions =
            self.engine.on_pointer_up(Point::new(x, y), map_button(button), map_modifiers(shift, ctrl, alt, meta));
        self.handle(&actions)
    }

    /// # Errors
    ///
    /// Propagates draw failures.
    pub fn wheel(&mut self, x: f64, y: f64, dx: f64, dy: f64) -> Result<(), JsValue> {
        let actions = self.engine.on_wheel(Point::new(x, y), WheelDelta { dx, dy }, Modifiers::default());
        self.handle(&actions)?;
        Ok(())
    }

    /// # Errors
    ///
    /// Propagates draw and encode failures.
    #[allow(clippy::fn_params_excessive_bools)]
    pub fn key_down(&mut self, key: String, shift: bool, ctrl: bool, alt: bool, meta: bool) -> Result<Vec<String>, JsValue> {
        let actions = self.engine.on_key_down(Key(key), map_modifiers(shift, ctrl, alt, meta));
        self.handle(&actions)
    }

    /// Index of the selected shape, if any.
    #[must_use]
    pub fn selection(&self) -> Option<usize> {
        self.engine.selection()
    }
}

impl CanvasHost {
    /// Apply the side effects of `actions` and return the frames to send.
    fn handle(&mut self, actions: &[Action]) -> Result<Vec<String>, JsValue> {
        for action in actions {
            if let Action::SetCursor(cursor) = action {
                self.canvas.style().set_property("cursor", cursor)?;
            }
        }
        if actions.contains(&Action::RenderNeeded) {
            self.engine.render()?;
        }
        Ok(encode_frames(&self.session.outbound(actions))?)
    }
}
