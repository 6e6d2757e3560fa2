//! Keyboard and mouse state collected from window events.

use std::collections::HashMap;

use winit::{
    event::{ElementState, MouseButton, WindowEvent},
    keyboard::{KeyCode, PhysicalKey},
};

/// Latest known state of keys, mouse buttons and the cursor.
///
/// The caller feeds window events through [`handle_window_event`](Self::handle_window_event)
/// or sets state directly. Keys and buttons that were never reported read
/// as released.
#[derive(Debug, Default, Clone)]
pub struct InputManager {
    keys: HashMap<KeyCode, bool>,
    mouse: HashMap<MouseButton, bool>,
    prev_mouse_pos: (f32, f32),
    last_mouse_pos: (f32, f32),
}

impl InputManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_key_state(&mut self, key: KeyCode, pressed: bool) {
        self.keys.insert(key, pressed);
    }

    pub fn key_state(&self, key: KeyCode) -> bool {
        self.keys.get(&key).copied().unwrap_or(false)
    }

    pub fn set_mouse_state(&mut self, button: MouseButton, pressed: bool) {
        self.mouse.insert(button, pressed);
    }

    pub fn mouse_state(&self, button: MouseButton) -> bool {
        self.mouse.get(&button).copied().unwrap_or(false)
    }

    pub fn set_mouse_pos(&mut self, x: f32, y: f32) {
        self.prev_mouse_pos = self.last_mouse_pos;
        self.last_mouse_pos = (x, y);
    }

    pub fn mouse_pos(&self) -> (f32, f32) {
        self.last_mouse_pos
    }

    /// Movement since the last call. Consumes the delta.
    pub fn mouse_delta_pos(&mut self) -> (f32, f32) {
        let delta = (
            self.last_mouse_pos.0 - self.prev_mouse_pos.0,
            self.last_mouse_pos.1 - self.prev_mouse_pos.1,
        );
        self.prev_mouse_pos = self.last_mouse_pos;
        delta
    }

    /// Releases everything, e.g. when the window loses focus and key-up
    /// events would never arrive.
    pub fn clear(&mut self) {
        self.keys.clear();
        self.mouse.clear();
        self.prev_mouse_pos = self.last_mouse_pos;
    }

    /// Returns true if the event changed the input state.
    pub fn handle_window_event(&mut self, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::KeyboardInput { event, .. } => match event.physical_key {
                PhysicalKey::Code(code) => {
                    self.set_key_state(code, event.state == ElementState::Pressed);
                    true
                }
                PhysicalKey::Unidentified(_) => false,
            },
            WindowEvent::MouseInput { state, button, .. } => {
                self.set_mouse_state(*button, *state == ElementState::Pressed);
                true
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.set_mouse_pos(position.x as f32, position.y as f32);
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_keys_read_released() {
        let input = InputManager::new();
        assert!(!input.key_state(KeyCode::KeyQ));
        assert!(!input.mouse_state(MouseButton::Middle));
    }

    #[test]
    fn key_and_button_state_round_trip() {
        let mut input = InputManager::new();
        input.set_key_state(KeyCode::KeyW, true);
        input.set_mouse_state(MouseButton::Left, true);
        assert!(input.key_state(KeyCode::KeyW));
        assert!(input.mouse_state(MouseButton::Left));
        input.set_key_state(KeyCode::KeyW, false);
        assert!(!input.key_state(KeyCode::KeyW));
    }

    #[test]
    fn mouse_delta_is_consumed() {
        let mut input = InputManager::new();
        input.set_mouse_pos(10.0, 20.0);
        input.set_mouse_pos(15.0, 18.0);
        assert_eq!(input.mouse_pos(), (15.0, 18.0));
        assert_eq!(input.mouse_delta_pos(), (5.0, -2.0));
        assert_eq!(input.mouse_delta_pos(), (0.0, 0.0));
    }

    #[test]
    fn clear_releases_everything() {
        let mut input = InputManager::new();
        input.set_key_state(KeyCode::KeyD, true);
        input.set_mouse_state(MouseButton::Right, true);
        input.set_mouse_pos(3.0, 4.0);
        input.clear();
        assert!(!input.key_state(KeyCode::KeyD));
        assert!(!input.mouse_state(MouseButton::Right));
        assert_eq!(input.mouse_delta_pos(), (0.0, 0.0));
    }
}
