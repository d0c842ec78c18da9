//! # Key Names
//!
//! Symbolic key names, as used in settings files and replay scripts.

use super::PlayerInput;
use crate::{UndercroftError, UndercroftResult};

/// Parses a symbolic key event such as `"space"` or `"right mouse down"`.
///
/// Names are case-insensitive and surrounding whitespace is ignored.
///
/// # Examples
///
/// ```
/// use undercroft::{parse_key_name, PlayerInput};
///
/// assert_eq!(parse_key_name("Escape"), Some(PlayerInput::TogglePause));
/// assert_eq!(parse_key_name("right mouse up"), Some(PlayerInput::PointerLock(false)));
/// ```
pub fn parse_key_name(name: &str) -> Option<PlayerInput> {
    match name.trim().to_lowercase().as_str() {
        "space" => Some(PlayerInput::Jump),
        "escape" | "esc" => Some(PlayerInput::TogglePause),
        "e" => Some(PlayerInput::Attack),
        "q" => Some(PlayerInput::Quit),
        "right mouse down" => Some(PlayerInput::PointerLock(true)),
        "right mouse up" => Some(PlayerInput::PointerLock(false)),
        _ => None,
    }
}

/// Symbolic name of an input, the inverse of [`parse_key_name`].
pub fn key_name(input: PlayerInput) -> &'static str {
    match input {
        PlayerInput::Jump => "space",
        PlayerInput::TogglePause => "escape",
        PlayerInput::Attack => "e",
        PlayerInput::Quit => "q",
        PlayerInput::PointerLock(true) => "right mouse down",
        PlayerInput::PointerLock(false) => "right mouse up",
    }
}

/// Parses a script of key names, one per line. Blank lines and `#` comments are skipped.
pub fn parse_key_script(script: &str) -> UndercroftResult<Vec<PlayerInput>> {
    script
        .lines()
        .enumerate()
        .map(|(n, line)| (n + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
        .map(|(n, line)| {
            parse_key_name(line).ok_or_else(|| {
                UndercroftError::InputHandler(format!("line {}: unknown key '{}'", n, line))
            })
        })
        .collect()
}
