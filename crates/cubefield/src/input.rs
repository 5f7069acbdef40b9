//! Raw keyboard and mouse state, as delivered by the windowing layer.
//!
//! The [`RawInput`] resource is the boundary between the platform and the
//! simulation. Whatever owns the window writes into it between frames, either
//! directly through the setters or by forwarding winit events to
//! [`RawInput::handle_window_event`]. The `InputSystem` then folds this
//! snapshot into per-entity `Input` components at the start of each frame.
//!
//! ```text
//! winit WindowEvent ──► RawInput (resource) ──► InputSystem ──► Input (component)
//!                       "is W down right now?"                  "was W pressed
//!                                                                this frame?"
//! ```
//!
//! Only the keys in [`TRACKED_KEYS`] are polled by the input system. Others
//! are still recorded here.

use std::collections::HashSet;

use winit::event::{ElementState, MouseScrollDelta, WindowEvent};
use winit::keyboard::PhysicalKey;

pub use winit::event::MouseButton;
pub use winit::keyboard::KeyCode;

use crate::math::Vec2;

/// Keys whose state is folded into `Input` components every frame.
pub const TRACKED_KEYS: [KeyCode; 24] = [
    KeyCode::KeyW,
    KeyCode::KeyA,
    KeyCode::KeyS,
    KeyCode::KeyD,
    KeyCode::Space,
    KeyCode::ShiftLeft,
    KeyCode::ControlLeft,
    KeyCode::ArrowUp,
    KeyCode::ArrowDown,
    KeyCode::ArrowLeft,
    KeyCode::ArrowRight,
    KeyCode::Escape,
    KeyCode::Enter,
    KeyCode::Tab,
    KeyCode::KeyQ,
    KeyCode::KeyE,
    KeyCode::KeyR,
    KeyCode::KeyF,
    KeyCode::KeyG,
    KeyCode::Digit1,
    KeyCode::Digit2,
    KeyCode::Digit3,
    KeyCode::Digit4,
    KeyCode::Digit5,
];

/// Mouse button slots: left, right, middle.
pub const MOUSE_BUTTON_COUNT: usize = 3;

/// Pixels per "line" when a trackpad reports pixel scroll deltas.
const PIXELS_PER_SCROLL_LINE: f32 = 20.0;

fn button_slot(button: MouseButton) -> Option<usize> {
    match button {
        MouseButton::Left => Some(0),
        MouseButton::Right => Some(1),
        MouseButton::Middle => Some(2),
        _ => None,
    }
}

/// Current device state. Levels, not edges: "is this key down right now".
#[derive(Debug, Clone, Default)]
pub struct RawInput {
    keys_down: HashSet<KeyCode>,
    cursor: Vec2,
    /// Scroll accumulated since the input system last drained it.
    scroll: Vec2,
    mouse_buttons: [bool; MOUSE_BUTTON_COUNT],
}

impl RawInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_key(&mut self, key: KeyCode, down: bool) {
        if down {
            self.keys_down.insert(key);
        } else {
            self.keys_down.remove(&key);
        }
    }

    pub fn is_key_down(&self, key: KeyCode) -> bool {
        self.keys_down.contains(&key)
    }

    /// Cursor position in window pixels, origin top-left.
    pub fn set_cursor(&mut self, position: Vec2) {
        self.cursor = position;
    }

    pub fn cursor(&self) -> Vec2 {
        self.cursor
    }

    pub fn add_scroll(&mut self, delta: Vec2) {
        self.scroll += delta;
    }

    /// Return the accumulated scroll and reset it to zero.
    pub fn take_scroll(&mut self) -> Vec2 {
        std::mem::take(&mut self.scroll)
    }

    pub fn set_mouse_button(&mut self, button: MouseButton, down: bool) {
        if let Some(slot) = button_slot(button) {
            self.mouse_buttons[slot] = down;
        }
    }

    pub fn is_mouse_button_down(&self, button: MouseButton) -> bool {
        button_slot(button).is_some_and(|slot| self.mouse_buttons[slot])
    }

    /// Left, right, middle.
    pub fn mouse_buttons(&self) -> [bool; MOUSE_BUTTON_COUNT] {
        self.mouse_buttons
    }

    /// Release every key and button, e.g. when the window loses focus.
    pub fn release_all(&mut self) {
        self.keys_down.clear();
        self.mouse_buttons = [false; MOUSE_BUTTON_COUNT];
    }

    /// Fold one winit window event into the snapshot. Events that don't carry
    /// input are ignored.
    pub fn handle_window_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(key_code) = event.physical_key {
                    self.set_key(key_code, event.state == ElementState::Pressed);
                }
            }

            WindowEvent::MouseInput { button, state, .. } => {
                self.set_mouse_button(*button, *state == ElementState::Pressed);
            }

            WindowEvent::CursorMoved { position, .. } => {
                self.set_cursor(Vec2::new(position.x as f32, position.y as f32));
            }

            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(x, y) => Vec2::new(*x, *y),
                    MouseScrollDelta::PixelDelta(p) => {
                        Vec2::new(p.x as f32, p.y as f32) / PIXELS_PER_SCROLL_LINE
                    }
                };
                self.add_scroll(lines);
            }

            WindowEvent::Focused(false) => self.release_all(),

            _ => {}
        }
    }
}
