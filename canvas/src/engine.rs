//! The canvas engine: gesture handling, local shape list, and remote reconciliation.
//!
//! [`EngineCore`] holds all state and logic and never touches the browser,
//! so the whole interaction model is unit-tested natively. [`Engine`] wraps
//! it with the canvas element and paints through [`crate::render`].
//!
//! Shapes are addressed by list index, the same positional identity the
//! server uses. Local edits are applied optimistically and reported to the
//! host as [`Action`]s; the host forwards them to the room session.

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use frames::{ServerEvent, Shape};
use log::debug;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::camera::{Camera, Point};
use crate::consts::{HANDLE_HIT_SLOP_PX, ZOOM_STEP};
use crate::geometry;
use crate::history::History;
use crate::input::{Button, InputState, Key, Modifiers, Tool, UiState, WheelDelta};
use crate::render::{self, Overlay};

/// Actions returned from input handlers for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// A new shape was appended locally.
    StrokeCreated(Shape),
    /// The shape at `index` was replaced locally.
    StrokeUpdated { index: usize, shape: Shape },
    /// The shape at `index` was removed locally.
    StrokeDeleted { index: usize },
    /// Local undo replaced the list with this snapshot.
    Undone(Vec<Shape>),
    SelectionChanged(Option<usize>),
    SetCursor(&'static str),
    RenderNeeded,
}

/// Core engine state — all logic that doesn't depend on the canvas element.
///
/// Separated from `Engine` so it can be tested without WASM/browser dependencies.
#[derive(Default)]
pub struct EngineCore {
    pub shapes: Vec<Shape>,
    pub history: History,
    pub camera: Camera,
    pub ui: UiState,
    pub input: InputState,
    /// Live preview for the gesture in progress.
    pub preview: Option<Overlay>,
}

impl EngineCore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Data inputs ---

    /// Replace everything with a catch-up list from the server.
    pub fn load_snapshot(&mut self, shapes: Vec<Shape>) {
        self.history.reset(shapes.clone());
        self.shapes = shapes;
        self.ui.selected = None;
        self.cancel_gesture();
    }

    /// Reconcile a server broadcast with local state.
    ///
    /// Only a remote `stroke` enters local history. Updates, deletes, and
    /// undos from peers mutate the list in place. Out-of-range indices are
    /// ignored.
    pub fn apply_remote(&mut self, event: &ServerEvent) -> Vec<Action> {
        match event {
            ServerEvent::Stroke { data, .. } => {
                self.shapes.push(data.clone());
                self.history.record(&self.shapes);
                vec![Action::RenderNeeded]
            }
            ServerEvent::UpdateStroke { index, data, .. } => {
                let Some(slot) = self.shapes.get_mut(*index) else {
                    return Vec::new();
                };
                *slot = data.clone();
                vec![Action::RenderNeeded]
            }
            ServerEvent::DeleteStroke { stroke_index, .. } => self.apply_remote_delete(*stroke_index),
            ServerEvent::Undo { data, .. } => {
                self.shapes.clone_from(data);
                let mut actions = self.clamp_to_list();
                actions.push(Action::RenderNeeded);
                actions
            }
            ServerEvent::Chat { .. } | ServerEvent::ActiveCount { .. } => Vec::new(),
        }
    }

    fn apply_remote_delete(&mut self, index: usize) -> Vec<Action> {
        if index >= self.shapes.len() {
            return Vec::new();
        }
        self.shapes.remove(index);

        let mut actions = Vec::new();
        match self.ui.selected {
            Some(sel) if sel == index => {
                self.ui.selected = None;
                actions.push(Action::SelectionChanged(None));
            }
            Some(sel) if sel > index => {
                self.ui.selected = Some(sel - 1);
                actions.push(Action::SelectionChanged(Some(sel - 1)));
            }
            _ => {}
        }
        match self.input.target() {
            Some(target) if target == index => self.cancel_gesture(),
            Some(target) if target > index => {
                self.input.retarget(target - 1);
                if let Some(Overlay::InPlace { index: shown, .. }) = &mut self.preview {
                    *shown = target - 1;
                }
            }
            _ => {}
        }
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Drop selection and gestures that point past the end of the list.
    fn clamp_to_list(&mut self) -> Vec<Action> {
        let len = self.shapes.len();
        let mut actions = Vec::new();
        if self.ui.selected.is_some_and(|sel| sel >= len) {
            self.ui.selected = None;
            actions.push(Action::SelectionChanged(None));
        }
        if self.input.target().is_some_and(|target| target >= len) {
            self.cancel_gesture();
        }
        actions
    }

    // --- Tool / style ---

    /// Set the active tool. Any selection or gesture is dropped.
    pub fn set_tool(&mut self, tool: Tool) {
        self.ui.tool = tool;
        self.ui.selected = None;
        self.cancel_gesture();
    }

    /// Style applied to shapes drawn from now on.
    pub fn set_style(&mut self, color: impl Into<String>, size: f64) {
        self.ui.color = color.into();
        self.ui.size = size;
    }

    // --- Queries ---

    #[must_use]
    pub fn selection(&self) -> Option<usize> {
        self.ui.selected
    }

    #[must_use]
    pub fn camera(&self) -> Camera {
        self.camera
    }

    #[must_use]
    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    #[must_use]
    pub fn shape(&self, index: usize) -> Option<&Shape> {
        self.shapes.get(index)
    }

    // --- Input events ---

    pub fn on_pointer_down(&mut self, screen_pt: Point, button: Button, modifiers: Modifiers) -> Vec<Action> {
        if button == Button::Middle || (button == Button::Primary && modifiers.alt) {
            self.cancel_gesture();
            self.input = InputState::Panning { last_screen: screen_pt };
            return vec![Action::SetCursor("grabbing")];
        }
        if button != Button::Primary {
            return Vec::new();
        }

        let world = self.camera.screen_to_world(screen_pt);
        let tool = self.ui.tool;
        match tool {
            Tool::Select => self.begin_select(world),
            Tool::Pen => {
                self.input = InputState::Drawing { tool, start: world };
                Vec::new()
            }
            Tool::Rectangle | Tool::Circle | Tool::Arrow => {
                self.input = InputState::Drawing { tool, start: world };
                self.preview = self.draft(tool, world, world).map(Overlay::Draft);
                vec![Action::RenderNeeded]
            }
        }
    }

    /// Select-tool pointer-down: handles of the current selection win over
    /// shapes, and shapes are tested topmost first.
    fn begin_select(&mut self, world: Point) -> Vec<Action> {
        if let Some(index) = self.ui.selected {
            if let Some(shape) = self.shapes.get(index) {
                let slop = self.camera.screen_dist_to_world(HANDLE_HIT_SLOP_PX);
                if let Some(handle) = geometry::hit_handle(world, &geometry::resize_handles(shape), slop) {
                    self.input = InputState::Resizing { index, handle, original: shape.clone() };
                    return vec![Action::SetCursor("crosshair")];
                }
            }
        }

        let hit = self.shapes.iter().rposition(|shape| geometry::contains_point(world, shape));
        let mut actions = Vec::new();
        if hit != self.ui.selected {
            self.ui.selected = hit;
            actions.push(Action::SelectionChanged(hit));
            actions.push(Action::RenderNeeded);
        }
        if let Some(index) = hit {
            let original = self.shapes[index].clone();
            self.input = InputState::Dragging { index, start: world, original };
            actions.push(Action::SetCursor("move"));
        }
        actions
    }

    pub fn on_pointer_move(&mut self, screen_pt: Point, _modifiers: Modifiers) -> Vec<Action> {
        let world = self.camera.screen_to_world(screen_pt);
        match self.input.clone() {
            InputState::Idle => Vec::new(),
            InputState::Panning { last_screen } => {
                self.camera.pan_by(screen_pt.x - last_screen.x, screen_pt.y - last_screen.y);
                self.input = InputState::Panning { last_screen: screen_pt };
                vec![Action::RenderNeeded]
            }
            InputState::Drawing { tool: Tool::Pen, .. } => {
                let point = Shape::pen(world.x, world.y, self.ui.color.clone(), self.ui.size);
                self.shapes.push(point.clone());
                self.history.record(&self.shapes);
                vec![Action::StrokeCreated(point), Action::RenderNeeded]
            }
            InputState::Drawing { tool, start } => {
                self.preview = self.draft(tool, start, world).map(Overlay::Draft);
                vec![Action::RenderNeeded]
            }
            InputState::Dragging { index, start, original } => {
                let shape = geometry::translate(&original, world.x - start.x, world.y - start.y);
                self.preview = Some(Overlay::InPlace { index, shape });
                vec![Action::RenderNeeded]
            }
            InputState::Resizing { index, handle, original } => match self.resized(index, handle, world, &original) {
                // A rejected drag keeps the last valid preview on screen.
                Some(shape) => {
                    self.preview = Some(Overlay::InPlace { index, shape });
                    vec![Action::RenderNeeded]
                }
                None => Vec::new(),
            },
        }
    }

    pub fn on_pointer_up(&mut self, screen_pt: Point, _button: Button, _modifiers: Modifiers) -> Vec<Action> {
        let world = self.camera.screen_to_world(screen_pt);
        let had_preview = self.preview.take().is_some();
        let redraw = if had_preview { vec![Action::RenderNeeded] } else { Vec::new() };

        match std::mem::take(&mut self.input) {
            InputState::Idle | InputState::Drawing { tool: Tool::Pen | Tool::Select, .. } => redraw,
            InputState::Panning { .. } => vec![Action::SetCursor("default")],
            InputState::Drawing { tool, start } => {
                if start == world {
                    return redraw;
                }
                let Some(shape) = self.draft(tool, start, world) else {
                    return redraw;
                };
                self.shapes.push(shape.clone());
                self.history.record(&self.shapes);
                vec![Action::StrokeCreated(shape), Action::RenderNeeded]
            }
            InputState::Dragging { index, start, original } => {
                let (dx, dy) = (world.x - start.x, world.y - start.y);
                if dx.abs() < f64::EPSILON && dy.abs() < f64::EPSILON {
                    return redraw;
                }
                let shape = geometry::translate(&original, dx, dy);
                self.commit(index, shape).unwrap_or(redraw)
            }
            InputState::Resizing { index, handle, original } => match self.resized(index, handle, world, &original) {
                Some(shape) if shape != original => self.commit(index, shape).unwrap_or(redraw),
                _ => redraw,
            },
        }
    }

    pub fn on_wheel(&mut self, screen_pt: Point, delta: WheelDelta, _modifiers: Modifiers) -> Vec<Action> {
        let factor = if delta.dy < 0.0 {
            ZOOM_STEP
        } else if delta.dy > 0.0 {
            1.0 / ZOOM_STEP
        } else {
            return Vec::new();
        };
        if self.camera.zoom_at(screen_pt, factor) { vec![Action::RenderNeeded] } else { Vec::new() }
    }

    pub fn on_key_down(&mut self, key: Key, modifiers: Modifiers) -> Vec<Action> {
        match key.0.as_str() {
            "Delete" | "Backspace" => self.delete_selected(),
            "z" | "Z" if modifiers.command() => self.undo(),
            "Escape" => {
                let had_preview = self.preview.is_some();
                self.cancel_gesture();
                let mut actions = Vec::new();
                if self.ui.selected.take().is_some() {
                    actions.push(Action::SelectionChanged(None));
                }
                if had_preview || !actions.is_empty() {
                    actions.push(Action::RenderNeeded);
                }
                actions
            }
            _ => Vec::new(),
        }
    }

    /// Step back one history snapshot and replace the list with it.
    pub fn undo(&mut self) -> Vec<Action> {
        let Some(snapshot) = self.history.rewind() else {
            return Vec::new();
        };
        self.shapes = snapshot.to_vec();
        let mut actions = vec![Action::Undone(self.shapes.clone())];
        actions.extend(self.clamp_to_list());
        actions.push(Action::RenderNeeded);
        actions
    }

    fn delete_selected(&mut self) -> Vec<Action> {
        let Some(index) = self.ui.selected.filter(|&i| i < self.shapes.len()) else {
            return Vec::new();
        };
        self.shapes.remove(index);
        self.history.record(&self.shapes);
        self.ui.selected = None;
        self.cancel_gesture();
        vec![Action::StrokeDeleted { index }, Action::SelectionChanged(None), Action::RenderNeeded]
    }

    // --- Helpers ---

    fn cancel_gesture(&mut self) {
        self.input = InputState::Idle;
        self.preview = None;
    }

    /// A two-point shape for `tool` in the current style.
    fn draft(&self, tool: Tool, start: Point, end: Point) -> Option<Shape> {
        let kind = tool.shape_kind()?;
        Some(Shape::spanning(kind, start.x, start.y, end.x, end.y, self.ui.color.clone(), self.ui.size))
    }

    /// Resize result for the shape at `index`, or `None` when the drag is
    /// rejected or the shape is gone.
    fn resized(&self, index: usize, handle: usize, world: Point, original: &Shape) -> Option<Shape> {
        let current = self.shapes.get(index)?;
        match geometry::apply_handle_drag(current, handle, world, original) {
            Ok(shape) => Some(shape),
            Err(e) => {
                debug!("resize of shape {index} rejected: {e}");
                None
            }
        }
    }

    /// Write `shape` at `index` and record it. `None` if the index is gone.
    fn commit(&mut self, index: usize, shape: Shape) -> Option<Vec<Action>> {
        let slot = self.shapes.get_mut(index)?;
        *slot = shape.clone();
        self.history.record(&self.shapes);
        Some(vec![Action::StrokeUpdated { index, shape }, Action::RenderNeeded])
    }
}

/// The full canvas engine. Wraps `EngineCore` and owns the browser canvas element.
pub struct Engine {
    canvas: HtmlCanvasElement,
    pub core: EngineCore,
    viewport_width: f64,
    viewport_height: f64,
    dpr: f64,
}

impl Engine {
    /// Create a new engine bound to the given canvas element.
    #[must_use]
    pub fn new(canvas: HtmlCanvasElement) -> Self {
        let viewport_width = f64::from(canvas.width());
        let viewport_height = f64::from(canvas.height());
        Self { canvas, core: EngineCore::new(), viewport_width, viewport_height, dpr: 1.0 }
    }

    // --- Delegated data inputs ---

    pub fn load_snapshot(&mut self, shapes: Vec<Shape>) {
        self.core.load_snapshot(shapes);
    }

    pub fn apply_remote(&mut self, event: &ServerEvent) -> Vec<Action> {
        self.core.apply_remote(event)
    }

    pub fn set_tool(&mut self, tool: Tool) {
        self.core.set_tool(tool);
    }

    pub fn set_style(&mut self, color: impl Into<String>, size: f64) {
        self.core.set_style(color, size);
    }

    // --- Viewport ---

    /// Update viewport dimensions and device pixel ratio, resizing the backing store.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn set_viewport(&mut self, width_css: f64, height_css: f64, dpr: f64) {
        self.viewport_width = width_css;
        self.viewport_height = height_css;
        self.dpr = dpr;
        self.canvas.set_width((width_css * dpr).round() as u32);
        self.canvas.set_height((height_css * dpr).round() as u32);
    }

    // --- Input events ---

    pub fn on_pointer_down(&mut self, screen_pt: Point, button: Button, modifiers: Modifiers) -> Vec<Action> {
        self.core.on_pointer_down(screen_pt, button, modifiers)
    }

    pub fn on_pointer_move(&mut self, screen_pt: Point, modifiers: Modifiers) -> Vec<Action> {
        self.core.on_pointer_move(screen_pt, modifiers)
    }

    pub fn on_pointer_up(&mut self, screen_pt: Point, button: Button, modifiers: Modifiers) -> Vec<Action> {
        self.core.on_pointer_up(screen_pt, button, modifiers)
    }

    pub fn on_wheel(&mut self, screen_pt: Point, delta: WheelDelta, modifiers: Modifiers) -> Vec<Action> {
        self.core.on_wheel(screen_pt, delta, modifiers)
    }

    pub fn on_key_down(&mut self, key: Key, modifiers: Modifiers) -> Vec<Action> {
        self.core.on_key_down(key, modifiers)
    }

    pub fn undo(&mut self) -> Vec<Action> {
        self.core.undo()
    }

    // --- Render ---

    /// Draw the current state to the canvas.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the 2D context is unavailable or any draw call fails.
    pub fn render(&self) -> Result<(), JsValue> {
        let ctx = self
            .canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("canvas has no 2d context"))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(JsValue::from)?;
        let core = &self.core;
        let ops = render::build_scene(&core.shapes, core.preview.as_ref(), core.ui.selected, &core.camera);
        render::paint(&ctx, &ops, self.viewport_width, self.viewport_height, self.dpr)
    }

    // --- Delegated queries ---

    #[must_use]
    pub fn selection(&self) -> Option<usize> {
        self.core.selection()
    }

    #[must_use]
    pub fn camera(&self) -> Camera {
        self.core.camera()
    }

    #[must_use]
    pub fn shape(&self, index: usize) -> Option<&Shape> {
        self.core.shape(index)
    }
}
