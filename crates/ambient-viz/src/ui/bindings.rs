//! Keyboard bindings and input handling.
//!
//! Centralizes all keyboard shortcuts and key mapping logic.

use nannou::prelude::*;

/// Actions that can be triggered by key presses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    TogglePlay,
    NextTrack,
    PreviousTrack,
    ToggleHud,
}

/// Parse a key into an action
pub fn parse_key(key: Key) -> Option<Action> {
    match key {
        Key::Q => Some(Action::Quit),
        Key::Space => Some(Action::TogglePlay),
        Key::Right => Some(Action::NextTrack),
        Key::Left => Some(Action::PreviousTrack),
        Key::H => Some(Action::ToggleHud),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bound_keys() {
        assert_eq!(parse_key(Key::Space), Some(Action::TogglePlay));
        assert_eq!(parse_key(Key::Left), Some(Action::PreviousTrack));
        assert_eq!(parse_key(Key::Right), Some(Action::NextTrack));
        assert_eq!(parse_key(Key::H), Some(Action::ToggleHud));
        assert_eq!(parse_key(Key::Q), Some(Action::Quit));
        assert_eq!(parse_key(Key::Z), None);
    }
}
