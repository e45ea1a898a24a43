//! Keyboard Module - Key event model
//!
//! The event shape every other module speaks:
//! - `Key` - which key (Tab, Enter, Space, characters, ...)
//! - `Modifiers` - shift/ctrl/alt/meta as bitflags
//! - `KeyState` - press, auto-repeat or release
//! - `KeyboardEvent` - the three together
//!
//! Tab is the "advance focus" key; Shift reverses the direction.
//!
//! # Example
//!
//! ```ignore
//! use focus_visible::state::keyboard::{Key, KeyboardEvent, Modifiers};
//!
//! let back_tab = KeyboardEvent::with_modifiers(Key::Tab, Modifiers::SHIFT);
//! assert!(back_tab.is_advance_key());
//! ```

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::types::TraversalDirection;

// =============================================================================
// TYPES
// =============================================================================

bitflags! {
    /// Keyboard modifier state
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0001;
        const CTRL  = 0b0010;
        const ALT   = 0b0100;
        const META  = 0b1000;
    }
}

/// A key, as far as focus handling cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Tab,
    Enter,
    Space,
    Escape,
    Backspace,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Char(char),
    /// Anything the engine has no use for.
    Other,
}

/// Key event state (press, repeat, release)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum KeyState {
    #[default]
    Press,
    Repeat,
    Release,
}

/// Keyboard event
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyboardEvent {
    pub key: Key,
    pub modifiers: Modifiers,
    pub state: KeyState,
}

impl KeyboardEvent {
    /// Create a simple key press event
    pub fn new(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::empty(),
            state: KeyState::Press,
        }
    }

    /// Create a key press with modifiers
    pub fn with_modifiers(key: Key, modifiers: Modifiers) -> Self {
        Self {
            key,
            modifiers,
            state: KeyState::Press,
        }
    }

    /// Create a key release
    pub fn release(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::empty(),
            state: KeyState::Release,
        }
    }

    /// Press or auto-repeat; what a platform calls key-down.
    pub fn is_key_down(&self) -> bool {
        self.state != KeyState::Release
    }

    /// Tab key-down, with or without Shift.
    pub fn is_advance_key(&self) -> bool {
        self.key == Key::Tab && self.is_key_down()
    }

    /// Which way an advance key moves focus.
    pub fn direction(&self) -> TraversalDirection {
        if self.modifiers.contains(Modifiers::SHIFT) {
            TraversalDirection::Previous
        } else {
            TraversalDirection::Next
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tab_is_advance_key() {
        assert!(KeyboardEvent::new(Key::Tab).is_advance_key());
        assert!(!KeyboardEvent::new(Key::Enter).is_advance_key());
        assert!(!KeyboardEvent::release(Key::Tab).is_advance_key());
    }

    #[test]
    fn test_repeat_counts_as_key_down() {
        let event = KeyboardEvent {
            key: Key::Tab,
            modifiers: Modifiers::empty(),
            state: KeyState::Repeat,
        };
        assert!(event.is_advance_key());
    }

    #[test]
    fn test_shift_reverses_direction() {
        assert_eq!(KeyboardEvent::new(Key::Tab).direction(), TraversalDirection::Next);
        let back = KeyboardEvent::with_modifiers(Key::Tab, Modifiers::SHIFT | Modifiers::CTRL);
        assert_eq!(back.direction(), TraversalDirection::Previous);
    }
}
