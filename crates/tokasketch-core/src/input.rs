//! Pointer and modifier state shared with the host event loop.
//!
//! The host translates its native events into [`PointerEvent`]s; the store
//! consumes [`InputState::is_pointer_down`] as its explicit interaction
//! flag (validation is suppressed while the user is pressing).

use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Modifier keys sampled at event time.
///
/// Alt freezes horizontal movement and Meta freezes vertical movement on
/// drags; Shift multi-selects, requests curve controls, and locks aspect
/// ratio on corner resizes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

/// Unified pointer event, already mapped into local shape coordinates by
/// the viewport collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PointerEvent {
    Down { position: Point, button: MouseButton },
    Up { position: Point, button: MouseButton },
    Move { position: Point },
    Scroll { position: Point, delta: Vec2 },
}

/// Tracks pointer state across events.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    /// Current pointer position in local coordinates.
    pub position: Point,
    pressed: HashSet<MouseButton>,
    /// Current modifier keys.
    pub modifiers: Modifiers,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process a pointer event.
    pub fn handle(&mut self, event: &PointerEvent) {
        match event {
            PointerEvent::Down { position, button } => {
                self.position = *position;
                self.pressed.insert(*button);
            }
            PointerEvent::Up { position, button } => {
                self.position = *position;
                self.pressed.remove(button);
            }
            PointerEvent::Move { position } | PointerEvent::Scroll { position, .. } => {
                self.position = *position;
            }
        }
    }

    pub fn set_modifiers(&mut self, modifiers: Modifiers) {
        self.modifiers = modifiers;
    }

    /// True while any button is held; the store treats this as "the user is
    /// actively interacting" and holds off validation and snapshots.
    pub fn is_pointer_down(&self) -> bool {
        !self.pressed.is_empty()
    }

    pub fn is_button_down(&self, button: MouseButton) -> bool {
        self.pressed.contains(&button)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pointer_down_up() {
        let mut input = InputState::new();
        assert!(!input.is_pointer_down());

        input.handle(&PointerEvent::Down {
            position: Point::new(10.0, 10.0),
            button: MouseButton::Left,
        });
        assert!(input.is_pointer_down());
        assert!(input.is_button_down(MouseButton::Left));

        input.handle(&PointerEvent::Up {
            position: Point::new(12.0, 10.0),
            button: MouseButton::Left,
        });
        assert!(!input.is_pointer_down());
        assert_eq!(input.position, Point::new(12.0, 10.0));
    }

    #[test]
    fn test_move_updates_position_only() {
        let mut input = InputState::new();
        input.handle(&PointerEvent::Move {
            position: Point::new(5.0, 7.0),
        });
        assert_eq!(input.position, Point::new(5.0, 7.0));
        assert!(!input.is_pointer_down());
    }
}
