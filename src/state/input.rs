//! Input Module - Event conversion and polling
//!
//! Bridges crossterm's event system with our keyboard and mouse models so a
//! terminal application can feed a [`Window`](crate::pipeline::Window).
//!
//! # API
//!
//! - `convert_mouse_event` - Convert crossterm MouseEvent to our MouseEvent
//! - `convert_key_event` - Convert crossterm KeyEvent to our KeyboardEvent
//! - `poll_event` - Non-blocking event check with timeout
//! - `read_event` - Blocking event read
//! - `enable_mouse` / `disable_mouse` - Control mouse capture
//!
//! # Example
//!
//! ```ignore
//! use focus_visible::state::input::poll_event;
//! use std::time::Duration;
//!
//! loop {
//!     if let Ok(Some(event)) = poll_event(Duration::from_millis(16)) {
//!         window.pump(event);
//!     }
//!     window.tasks().run_due();
//! }
//! ```

use crossterm::event::{
    poll, read, DisableMouseCapture, EnableMouseCapture, Event as CrosstermEvent, KeyCode,
    KeyEvent as CrosstermKeyEvent, KeyEventKind, KeyModifiers,
    MouseButton as CrosstermMouseButton, MouseEvent as CrosstermMouseEvent, MouseEventKind,
};
use crossterm::execute;
use std::io::stdout;
use std::time::Duration;

use super::keyboard::{Key, KeyState, KeyboardEvent, Modifiers};
use super::mouse::{MouseAction, MouseButton, MouseEvent};

// =============================================================================
// INPUT EVENT ENUM
// =============================================================================

/// Unified event type for our framework
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    /// Mouse event (click, drag, move, etc.)
    Mouse(MouseEvent),
    /// Keyboard event (key press, release, etc.)
    Key(KeyboardEvent),
    /// No event or unhandled event type
    None,
}

impl InputEvent {
    pub fn as_key(&self) -> Option<&KeyboardEvent> {
        match self {
            Self::Key(key) => Some(key),
            _ => None,
        }
    }

    pub fn as_mouse(&self) -> Option<&MouseEvent> {
        match self {
            Self::Mouse(mouse) => Some(mouse),
            _ => None,
        }
    }
}

impl From<KeyboardEvent> for InputEvent {
    fn from(event: KeyboardEvent) -> Self {
        Self::Key(event)
    }
}

impl From<MouseEvent> for InputEvent {
    fn from(event: MouseEvent) -> Self {
        Self::Mouse(event)
    }
}

// =============================================================================
// MOUSE EVENT CONVERSION
// =============================================================================

/// Convert crossterm MouseEvent to our MouseEvent
pub fn convert_mouse_event(event: CrosstermMouseEvent) -> MouseEvent {
    let (action, button) = match event.kind {
        MouseEventKind::Down(btn) => (MouseAction::Down, convert_mouse_button(btn)),
        MouseEventKind::Up(btn) => (MouseAction::Up, convert_mouse_button(btn)),
        MouseEventKind::Drag(btn) => (MouseAction::Drag, convert_mouse_button(btn)),
        MouseEventKind::Moved => (MouseAction::Move, MouseButton::None),
        MouseEventKind::ScrollUp
        | MouseEventKind::ScrollDown
        | MouseEventKind::ScrollLeft
        | MouseEventKind::ScrollRight => (MouseAction::Scroll, MouseButton::None),
    };

    MouseEvent {
        action,
        button,
        x: event.column,
        y: event.row,
        modifiers: convert_modifiers(event.modifiers),
    }
}

/// Convert crossterm MouseButton to our MouseButton
fn convert_mouse_button(btn: CrosstermMouseButton) -> MouseButton {
    match btn {
        CrosstermMouseButton::Left => MouseButton::Left,
        CrosstermMouseButton::Right => MouseButton::Right,
        CrosstermMouseButton::Middle => MouseButton::Middle,
    }
}

// =============================================================================
// KEY EVENT CONVERSION
// =============================================================================

/// Convert crossterm KeyEvent to our KeyboardEvent
///
/// Terminals report Shift+Tab as `BackTab`; it becomes Tab with Shift held.
pub fn convert_key_event(event: CrosstermKeyEvent) -> KeyboardEvent {
    let mut modifiers = convert_modifiers(event.modifiers);

    let key = match event.code {
        KeyCode::Tab => Key::Tab,
        KeyCode::BackTab => {
            modifiers |= Modifiers::SHIFT;
            Key::Tab
        }
        KeyCode::Enter => Key::Enter,
        KeyCode::Char(' ') => Key::Space,
        KeyCode::Char(c) => Key::Char(c),
        KeyCode::Esc => Key::Escape,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Up => Key::ArrowUp,
        KeyCode::Down => Key::ArrowDown,
        KeyCode::Left => Key::ArrowLeft,
        KeyCode::Right => Key::ArrowRight,
        _ => Key::Other,
    };

    let state = match event.kind {
        KeyEventKind::Press => KeyState::Press,
        KeyEventKind::Repeat => KeyState::Repeat,
        KeyEventKind::Release => KeyState::Release,
    };

    KeyboardEvent {
        key,
        modifiers,
        state,
    }
}

// =============================================================================
// MODIFIER CONVERSION
// =============================================================================

/// Convert crossterm KeyModifiers to our Modifiers
fn convert_modifiers(mods: KeyModifiers) -> Modifiers {
    let mut out = Modifiers::empty();
    out.set(Modifiers::SHIFT, mods.contains(KeyModifiers::SHIFT));
    out.set(Modifiers::CTRL, mods.contains(KeyModifiers::CONTROL));
    out.set(Modifiers::ALT, mods.contains(KeyModifiers::ALT));
    out.set(
        Modifiers::META,
        mods.intersects(KeyModifiers::META | KeyModifiers::SUPER),
    );
    out
}

/// Convert any crossterm event.
pub fn convert_event(event: CrosstermEvent) -> InputEvent {
    match event {
        CrosstermEvent::Mouse(mouse) => InputEvent::Mouse(convert_mouse_event(mouse)),
        CrosstermEvent::Key(key) => InputEvent::Key(convert_key_event(key)),
        _ => InputEvent::None,
    }
}

// =============================================================================
// EVENT POLLING
// =============================================================================

/// Poll for an event with timeout.
/// Returns None if no event within timeout.
pub fn poll_event(timeout: Duration) -> std::io::Result<Option<InputEvent>> {
    if poll(timeout)? {
        Ok(Some(read_event()?))
    } else {
        Ok(None)
    }
}

/// Read the next event (blocking).
pub fn read_event() -> std::io::Result<InputEvent> {
    Ok(convert_event(read()?))
}

// =============================================================================
// MOUSE CAPTURE
// =============================================================================

/// Enable mouse capture.
pub fn enable_mouse() -> std::io::Result<()> {
    execute!(stdout(), EnableMouseCapture)
}

/// Disable mouse capture.
pub fn disable_mouse() -> std::io::Result<()> {
    execute!(stdout(), DisableMouseCapture)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_mouse_down() {
        let crossterm_event = CrosstermMouseEvent {
            kind: MouseEventKind::Down(CrosstermMouseButton::Left),
            column: 10,
            row: 5,
            modifiers: KeyModifiers::empty(),
        };

        let event = convert_mouse_event(crossterm_event);

        assert_eq!(event.action, MouseAction::Down);
        assert_eq!(event.button, MouseButton::Left);
        assert_eq!(event.x, 10);
        assert_eq!(event.y, 5);
        assert!(event.modifiers.is_empty());
    }

    #[test]
    fn test_convert_drag_right_button() {
        let crossterm_event = CrosstermMouseEvent {
            kind: MouseEventKind::Drag(CrosstermMouseButton::Right),
            column: 1,
            row: 2,
            modifiers: KeyModifiers::CONTROL,
        };

        let event = convert_mouse_event(crossterm_event);

        assert_eq!(event.action, MouseAction::Drag);
        assert_eq!(event.button, MouseButton::Right);
        assert!(event.modifiers.contains(Modifiers::CTRL));
    }

    #[test]
    fn test_convert_scroll() {
        let crossterm_event = CrosstermMouseEvent {
            kind: MouseEventKind::ScrollDown,
            column: 0,
            row: 0,
            modifiers: KeyModifiers::empty(),
        };
        let event = convert_mouse_event(crossterm_event);
        assert_eq!(event.action, MouseAction::Scroll);
        assert_eq!(event.button, MouseButton::None);
    }

    #[test]
    fn test_convert_tab() {
        let event = convert_key_event(CrosstermKeyEvent::new(KeyCode::Tab, KeyModifiers::empty()));
        assert_eq!(event.key, Key::Tab);
        assert!(event.is_advance_key());
        assert!(!event.modifiers.contains(Modifiers::SHIFT));
    }

    #[test]
    fn test_convert_back_tab_adds_shift() {
        let event = convert_key_event(CrosstermKeyEvent::new(
            KeyCode::BackTab,
            KeyModifiers::empty(),
        ));
        assert_eq!(event.key, Key::Tab);
        assert!(event.modifiers.contains(Modifiers::SHIFT));
    }

    #[test]
    fn test_convert_space_and_enter() {
        let space = convert_key_event(CrosstermKeyEvent::new(
            KeyCode::Char(' '),
            KeyModifiers::empty(),
        ));
        assert_eq!(space.key, Key::Space);

        let enter = convert_key_event(CrosstermKeyEvent::new(KeyCode::Enter, KeyModifiers::empty()));
        assert_eq!(enter.key, Key::Enter);
        assert_eq!(enter.state, KeyState::Press);
    }

    #[test]
    fn test_convert_release_kind() {
        let mut raw = CrosstermKeyEvent::new(KeyCode::Tab, KeyModifiers::empty());
        raw.kind = KeyEventKind::Release;
        let event = convert_key_event(raw);
        assert_eq!(event.state, KeyState::Release);
        assert!(!event.is_advance_key());
    }

    #[test]
    fn test_convert_unhandled_event() {
        assert_eq!(convert_event(CrosstermEvent::FocusGained), InputEvent::None);
        assert_eq!(convert_event(CrosstermEvent::Resize(80, 24)), InputEvent::None);
    }
}
