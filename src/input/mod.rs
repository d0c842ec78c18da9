//! # Input Module
//!
//! Polls macroquad for key and pointer state and turns it into discrete
//! [`PlayerInput`] events plus a held-key [`InputIntent`] for the frame.

pub mod commands;

pub use commands::*;

use crate::InputIntent;
use macroquad::prelude::*;
use serde::{Deserialize, Serialize};

/// Discrete player inputs, one per key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerInput {
    /// Space: starts the game from the title screen, jumps while playing
    Jump,
    /// Escape
    TogglePause,
    /// E, melee attack
    Attack,
    /// Right mouse button held (`true`) or released (`false`)
    PointerLock(bool),
    /// Q, leaves the game from the pause panel
    Quit,
}

/// Maps a pressed key to its input, if it has one.
pub fn key_to_input(key: KeyCode) -> Option<PlayerInput> {
    match key {
        KeyCode::Space => Some(PlayerInput::Jump),
        KeyCode::Escape => Some(PlayerInput::TogglePause),
        KeyCode::E => Some(PlayerInput::Attack),
        KeyCode::Q => Some(PlayerInput::Quit),
        _ => None,
    }
}

/// Keys polled for discrete events each frame.
const EVENT_KEYS: [KeyCode; 4] = [KeyCode::Space, KeyCode::Escape, KeyCode::E, KeyCode::Q];

/// Reads input from the window.
pub struct InputHandler {
    /// Accept arrow keys alongside WASD
    pub arrow_keys_enabled: bool,
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl InputHandler {
    /// Creates a new input handler.
    ///
    /// # Examples
    ///
    /// ```
    /// use undercroft::InputHandler;
    ///
    /// let input_handler = InputHandler::new();
    /// assert!(input_handler.arrow_keys_enabled);
    /// ```
    pub fn new() -> Self {
        Self {
            arrow_keys_enabled: true,
        }
    }

    /// Discrete inputs pressed or released this frame, in a fixed order.
    pub fn poll_events(&self) -> Vec<PlayerInput> {
        let mut inputs: Vec<PlayerInput> = EVENT_KEYS
            .iter()
            .filter(|&&key| is_key_pressed(key))
            .filter_map(|&key| key_to_input(key))
            .collect();

        if is_mouse_button_pressed(MouseButton::Right) {
            inputs.push(PlayerInput::PointerLock(true));
        }
        if is_mouse_button_released(MouseButton::Right) {
            inputs.push(PlayerInput::PointerLock(false));
        }
        inputs
    }

    /// Movement keys held this frame and pointer velocity over the last `dt` seconds.
    ///
    /// The session fills in whether the pointer is locked.
    pub fn held_intent(&self, dt: f32) -> InputIntent {
        let held = |primary: KeyCode, arrow: KeyCode| {
            is_key_down(primary) || (self.arrow_keys_enabled && is_key_down(arrow))
        };
        let mut intent = InputIntent::from_keys(
            held(KeyCode::W, KeyCode::Up),
            held(KeyCode::S, KeyCode::Down),
            held(KeyCode::A, KeyCode::Left),
            held(KeyCode::D, KeyCode::Right),
        );
        // macroquad reports previous minus current, with y growing downward
        let delta = mouse_delta_position();
        if dt > 0.0 {
            intent.look_delta = (-delta.x / dt, delta.y / dt);
        }
        intent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_mapping() {
        assert_eq!(key_to_input(KeyCode::Space), Some(PlayerInput::Jump));
        assert_eq!(key_to_input(KeyCode::Escape), Some(PlayerInput::TogglePause));
        assert_eq!(key_to_input(KeyCode::E), Some(PlayerInput::Attack));
        assert_eq!(key_to_input(KeyCode::W), None);
    }

    #[test]
    fn test_every_event_key_maps() {
        for key in EVENT_KEYS {
            assert!(key_to_input(key).is_some());
        }
    }
}
