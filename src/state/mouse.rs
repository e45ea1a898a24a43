//! Mouse Module - Pointer event model and press tracking
//!
//! Event types for pointer input plus the per-control press tracker.
//!
//! # PointerTracker
//!
//! One tracker per control. It follows a press from button-down to release
//! and never asks for input focus:
//!
//! ```text
//! Idle --down inside--> Pressed{inside} --drag--> Pressed{inside'} --up--> Idle
//! ```
//!
//! Hover is tracked alongside, independent of the press state machine.
//! The tracker is pure: it returns [`PointerSignal`]s and the owning control
//! carries out the side effects (dropping focus, firing the action).
//!
//! # Example
//!
//! ```ignore
//! use focus_visible::state::mouse::{MouseButton, MouseEvent, PointerTracker};
//! use focus_visible::Rect;
//!
//! let mut tracker = PointerTracker::new(Rect::new(0, 0, 10, 1), false);
//! tracker.handle(&MouseEvent::down(MouseButton::Left, 3, 0));
//! let response = tracker.handle(&MouseEvent::up(MouseButton::Left, 3, 0));
//! assert!(response.clicked());
//! ```

use super::keyboard::Modifiers;
use crate::types::Rect;

// =============================================================================
// TYPES
// =============================================================================

/// Mouse action type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseAction {
    Down,
    Up,
    Move,
    Drag,
    Scroll,
}

/// Mouse button
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
    #[default]
    None,
}

/// Mouse event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseEvent {
    /// Action type (down, up, move, drag, scroll)
    pub action: MouseAction,
    /// Button involved
    pub button: MouseButton,
    /// X coordinate (0-indexed)
    pub x: u16,
    /// Y coordinate (0-indexed)
    pub y: u16,
    /// Modifier keys state
    pub modifiers: Modifiers,
}

impl MouseEvent {
    /// Create a new mouse event
    pub fn new(action: MouseAction, button: MouseButton, x: u16, y: u16) -> Self {
        Self {
            action,
            button,
            x,
            y,
            modifiers: Modifiers::empty(),
        }
    }

    /// Create a mouse down event
    pub fn down(button: MouseButton, x: u16, y: u16) -> Self {
        Self::new(MouseAction::Down, button, x, y)
    }

    /// Create a mouse up event
    pub fn up(button: MouseButton, x: u16, y: u16) -> Self {
        Self::new(MouseAction::Up, button, x, y)
    }

    /// Create a drag event
    pub fn drag(button: MouseButton, x: u16, y: u16) -> Self {
        Self::new(MouseAction::Drag, button, x, y)
    }

    /// Create a mouse move event
    pub fn move_to(x: u16, y: u16) -> Self {
        Self::new(MouseAction::Move, MouseButton::None, x, y)
    }

    /// Button-down of any button.
    pub fn is_button_down(&self) -> bool {
        self.action == MouseAction::Down
    }

    /// Drag or release; the events a press transaction consumes.
    pub fn is_tracking_event(&self) -> bool {
        matches!(self.action, MouseAction::Drag | MouseAction::Up)
    }
}

// =============================================================================
// PRESS STATE
// =============================================================================

/// Presentation flags owned by the tracker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PressState {
    pub is_pressed: bool,
    pub is_hovered: bool,
}

/// Something the owning control has to act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerSignal {
    /// A press started inside the control. Drop window focus, hide focus visuals.
    PointerDown,
    /// Trigger-on-press: fire the action on the next tick.
    FireOnPress,
    /// Released inside after a press that did not fire on press.
    Click,
    PressChanged(bool),
    HoverChanged(bool),
}

/// Result of feeding one event to a tracker.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PointerResponse {
    pub signals: Vec<PointerSignal>,
    /// A press transaction is open; the host routes drag/release here only.
    pub capture: bool,
}

impl PointerResponse {
    pub fn clicked(&self) -> bool {
        self.signals.contains(&PointerSignal::Click)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Pressed { button: MouseButton },
}

// =============================================================================
// POINTER TRACKER
// =============================================================================

/// Press/drag/release and hover state machine for one control.
#[derive(Debug, Clone)]
pub struct PointerTracker {
    bounds: Rect,
    trigger_on_press: bool,
    phase: Phase,
    state: PressState,
}

impl PointerTracker {
    pub fn new(bounds: Rect, trigger_on_press: bool) -> Self {
        Self {
            bounds,
            trigger_on_press,
            phase: Phase::Idle,
            state: PressState::default(),
        }
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn set_bounds(&mut self, bounds: Rect) {
        self.bounds = bounds;
    }

    pub fn state(&self) -> PressState {
        self.state
    }

    /// True between button-down and release.
    pub fn is_tracking(&self) -> bool {
        matches!(self.phase, Phase::Pressed { .. })
    }

    /// Button that opened the current press, if any.
    pub fn tracked_button(&self) -> Option<MouseButton> {
        match self.phase {
            Phase::Pressed { button } => Some(button),
            Phase::Idle => None,
        }
    }

    /// Feed one pointer event.
    pub fn handle(&mut self, event: &MouseEvent) -> PointerResponse {
        let mut signals = Vec::new();
        let inside = self.bounds.contains(event.x, event.y);

        match (self.phase, event.action) {
            (Phase::Idle, MouseAction::Down) if inside => {
                signals.push(PointerSignal::PointerDown);
                self.set_pressed(true, &mut signals);
                if self.trigger_on_press {
                    signals.push(PointerSignal::FireOnPress);
                }
                self.phase = Phase::Pressed {
                    button: event.button,
                };
            }
            (Phase::Pressed { .. }, MouseAction::Drag) => {
                self.set_pressed(inside, &mut signals);
            }
            (Phase::Pressed { .. }, MouseAction::Up) => {
                self.set_pressed(inside, &mut signals);
                if !self.trigger_on_press && inside {
                    signals.push(PointerSignal::Click);
                }
                self.set_pressed(false, &mut signals);
                self.set_hovered(inside, &mut signals);
                self.phase = Phase::Idle;
            }
            (Phase::Idle, MouseAction::Move) => {
                self.set_hovered(inside, &mut signals);
            }
            // Other buttons going down mid-press, stray releases, scrolls.
            _ => {}
        }

        PointerResponse {
            signals,
            capture: self.is_tracking(),
        }
    }

    /// The pointer is no longer over the control without a move saying so
    /// (bounds changed, pointer position unknown).
    pub fn exit(&mut self) -> PointerResponse {
        let mut signals = Vec::new();
        self.set_hovered(false, &mut signals);
        PointerResponse {
            signals,
            capture: self.is_tracking(),
        }
    }

    /// Abandon any open press without firing. Used when the control unmounts.
    pub fn reset(&mut self) -> PointerResponse {
        let mut signals = Vec::new();
        self.phase = Phase::Idle;
        self.set_pressed(false, &mut signals);
        self.set_hovered(false, &mut signals);
        PointerResponse {
            signals,
            capture: false,
        }
    }

    fn set_pressed(&mut self, pressed: bool, signals: &mut Vec<PointerSignal>) {
        if self.state.is_pressed != pressed {
            self.state.is_pressed = pressed;
            signals.push(PointerSignal::PressChanged(pressed));
        }
    }

    fn set_hovered(&mut self, hovered: bool, signals: &mut Vec<PointerSignal>) {
        if self.state.is_hovered != hovered {
            self.state.is_hovered = hovered;
            signals.push(PointerSignal::HoverChanged(hovered));
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
