use std::collections::HashMap;

use crate::input::{KeyCode, MOUSE_BUTTON_COUNT};
use crate::math::Vec2;

/// Per-key edge state.
///
/// ```text
/// raw:    up   down  down  down  up
/// state:  Rel  Pres  Held  Held  Rel
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum KeyState {
    #[default]
    Released,
    /// Went down this frame.
    Pressed,
    /// Down for more than one frame.
    Held,
}

/// Input as seen by one entity: key edges, mouse movement and buttons.
///
/// Written by the `InputSystem`; read by gameplay systems.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Input {
    keys: HashMap<KeyCode, KeyState>,
    pub mouse_position: Vec2,
    /// Cursor movement since last frame. Y grows upward.
    pub mouse_delta: Vec2,
    pub scroll_delta: Vec2,
    /// Left, right, middle.
    pub mouse_buttons: [bool; MOUSE_BUTTON_COUNT],
}

impl Input {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key_state(&self, key: KeyCode) -> KeyState {
        self.keys.get(&key).copied().unwrap_or_default()
    }

    /// Went down this frame.
    pub fn is_key_pressed(&self, key: KeyCode) -> bool {
        self.keys.get(&key) == Some(&KeyState::Pressed)
    }

    /// Down, whether new this frame or not.
    pub fn is_key_held(&self, key: KeyCode) -> bool {
        matches!(
            self.keys.get(&key),
            Some(KeyState::Pressed | KeyState::Held)
        )
    }

    /// Seen before and currently up. Keys never reported are neither.
    pub fn is_key_released(&self, key: KeyCode) -> bool {
        self.keys.get(&key) == Some(&KeyState::Released)
    }

    pub fn is_right_mouse_down(&self) -> bool {
        self.mouse_buttons[1]
    }

    /// Feed this frame's raw level for `key`.
    pub fn update_key(&mut self, key: KeyCode, down: bool) {
        let state = self.keys.entry(key).or_default();
        *state = match (down, *state) {
            (true, KeyState::Released) => KeyState::Pressed,
            (true, _) => KeyState::Held,
            (false, _) => KeyState::Released,
        };
    }

    /// Turn this frame's `Pressed` keys into `Held` and zero the per-frame
    /// deltas.
    pub fn end_frame(&mut self) {
        for state in self.keys.values_mut() {
            if *state == KeyState::Pressed {
                *state = KeyState::Held;
            }
        }
        self.mouse_delta = Vec2::ZERO;
        self.scroll_delta = Vec2::ZERO;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_then_hold_then_release() {
        let mut input = Input::new();
        assert!(!input.is_key_released(KeyCode::KeyW));

        input.update_key(KeyCode::KeyW, true);
        assert!(input.is_key_pressed(KeyCode::KeyW));
        assert!(input.is_key_held(KeyCode::KeyW));

        input.update_key(KeyCode::KeyW, true);
        assert_eq!(input.key_state(KeyCode::KeyW), KeyState::Held);
        assert!(!input.is_key_pressed(KeyCode::KeyW));

        input.update_key(KeyCode::KeyW, false);
        assert!(input.is_key_released(KeyCode::KeyW));
        assert!(!input.is_key_held(KeyCode::KeyW));
    }

    #[test]
    fn end_frame_promotes_and_zeroes() {
        let mut input = Input::new();
        input.update_key(KeyCode::Space, true);
        input.mouse_delta = Vec2::new(3.0, -1.0);
        input.scroll_delta = Vec2::new(0.0, 1.0);
        input.end_frame();
        assert_eq!(input.key_state(KeyCode::Space), KeyState::Held);
        assert_eq!(input.mouse_delta, Vec2::ZERO);
        assert_eq!(input.scroll_delta, Vec2::ZERO);
    }
}
