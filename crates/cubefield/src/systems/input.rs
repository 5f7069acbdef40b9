use crate::components::Input;
use crate::ecs::{ComponentMask, System, World};
use crate::input::{RawInput, TRACKED_KEYS};
use crate::math::Vec2;

/// Folds the [`RawInput`] snapshot into every [`Input`] component.
///
/// Edges from the previous frame are retired in `pre_update`, so `Pressed`
/// stays visible to every system that runs after this one in the same frame.
#[derive(Debug)]
pub struct InputSystem {
    first_mouse: bool,
    last_cursor: Vec2,
}

impl InputSystem {
    pub fn new() -> Self {
        Self {
            first_mouse: true,
            last_cursor: Vec2::ZERO,
        }
    }
}

impl Default for InputSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for InputSystem {
    fn required_components(&self) -> ComponentMask {
        ComponentMask::of::<(Input,)>()
    }

    fn priority(&self) -> i32 {
        -100
    }

    fn pre_update(&mut self, world: &mut World, _dt: f32) {
        for entity in world.entities_matching(self.required_components()) {
            if let Some(input) = world.get_mut::<Input>(entity) {
                input.end_frame();
            }
        }
    }

    fn update(&mut self, world: &mut World, _dt: f32) {
        let Some(raw) = world.get_resource_mut::<RawInput>() else {
            return;
        };
        let cursor = raw.cursor();
        let scroll = raw.take_scroll();
        let buttons = raw.mouse_buttons();
        let keys = TRACKED_KEYS.map(|key| (key, raw.is_key_down(key)));

        if self.first_mouse {
            self.last_cursor = cursor;
            self.first_mouse = false;
        }
        // Window Y grows downward; report upward motion as positive.
        let delta = Vec2::new(cursor.x - self.last_cursor.x, self.last_cursor.y - cursor.y);
        self.last_cursor = cursor;

        for entity in world.entities_matching(self.required_components()) {
            let Some(input) = world.get_mut::<Input>(entity) else {
                continue;
            };
            for &(key, down) in &keys {
                input.update_key(key, down);
            }
            input.mouse_position = cursor;
            input.mouse_delta = delta;
            input.scroll_delta = scroll;
            input.mouse_buttons = buttons;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::KeyState;
    use crate::input::{KeyCode, MouseButton};

    fn setup() -> (World, crate::ecs::Entity) {
        let mut world = World::new();
        world.insert_resource(RawInput::new());
        world.add_system(InputSystem::new());
        let e = world.create_entity();
        world.add_component(e, Input::new());
        (world, e)
    }

    #[test]
    fn key_edges_across_frames() {
        let (mut world, e) = setup();

        world.resource_mut::<RawInput>().set_key(KeyCode::Space, true);
        world.update(0.016);
        assert_eq!(world.get::<Input>(e).unwrap().key_state(KeyCode::Space), KeyState::Pressed);

        world.update(0.016);
        assert_eq!(world.get::<Input>(e).unwrap().key_state(KeyCode::Space), KeyState::Held);

        world.resource_mut::<RawInput>().set_key(KeyCode::Space, false);
        world.update(0.016);
        assert!(world.get::<Input>(e).unwrap().is_key_released(KeyCode::Space));
    }

    #[test]
    fn first_mouse_frame_has_no_delta() {
        let (mut world, e) = setup();
        world.resource_mut::<RawInput>().set_cursor(Vec2::new(400.0, 300.0));
        world.update(0.016);
        let input = world.get::<Input>(e).unwrap();
        assert_eq!(input.mouse_delta, Vec2::ZERO);
        assert_eq!(input.mouse_position, Vec2::new(400.0, 300.0));

        world.resource_mut::<RawInput>().set_cursor(Vec2::new(410.0, 290.0));
        world.update(0.016);
        assert_eq!(world.get::<Input>(e).unwrap().mouse_delta, Vec2::new(10.0, 10.0));

        // No movement: delta resets.
        world.update(0.016);
        assert_eq!(world.get::<Input>(e).unwrap().mouse_delta, Vec2::ZERO);
    }

    #[test]
    fn scroll_and_buttons_copied_once() {
        let (mut world, e) = setup();
        {
            let raw = world.resource_mut::<RawInput>();
            raw.add_scroll(Vec2::new(0.0, 2.0));
            raw.set_mouse_button(MouseButton::Right, true);
        }
        world.update(0.016);
        let input = world.get::<Input>(e).unwrap();
        assert_eq!(input.scroll_delta, Vec2::new(0.0, 2.0));
        assert!(input.is_right_mouse_down());

        world.update(0.016);
        let input = world.get::<Input>(e).unwrap();
        assert_eq!(input.scroll_delta, Vec2::ZERO);
        assert!(input.is_right_mouse_down());
    }

    #[test]
    fn missing_raw_input_still_retires_edges() {
        let (mut world, e) = setup();
        world.get_mut::<Input>(e).unwrap().update_key(KeyCode::KeyW, true);
        world.resource_remove::<RawInput>();
        world.update(0.016);
        assert_eq!(world.get::<Input>(e).unwrap().key_state(KeyCode::KeyW), KeyState::Held);
    }
}
