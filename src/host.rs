//! Host Capabilities - What the engine needs from a UI runtime
//!
//! The engine never touches a concrete toolkit. A host provides:
//!
//! - [`FocusHost`] - read and move input focus (first responder, key-view loop)
//! - [`EventTap`] - install a monitor that sees raw input before dispatch
//!
//! and drives every control through [`Responder`]:
//! focus gained/lost, key-down while focused, pointer events.
//!
//! [`Window`](crate::pipeline::Window) is the in-crate host.

use std::rc::Rc;

use crate::error::Result;
use crate::state::input::InputEvent;
use crate::state::keyboard::KeyboardEvent;
use crate::state::mouse::MouseEvent;
use crate::state::tasks::TaskQueue;
use crate::types::{ControlId, Disposition, Rect, TraversalDirection};

// =============================================================================
// FOCUS HOST
// =============================================================================

/// Input-focus operations a host window provides.
pub trait FocusHost {
    /// Control currently holding input focus.
    fn first_responder(&self) -> Option<ControlId>;

    /// Move focus to `target`, or to nobody. Returns false if the target is
    /// unknown or refuses focus; focus is then unchanged.
    fn make_first_responder(&self, target: Option<ControlId>) -> bool;

    /// Step the key-view loop from `from` (or from the start when `None`).
    fn select_key_view(&self, from: Option<ControlId>, direction: TraversalDirection);
}

/// Why a control became the focus target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusCause {
    /// The event being handled was an advance key.
    KeyTraversal(TraversalDirection),
    /// The event being handled was a pointer event.
    Pointer,
    /// Anything else: direct calls, restored focus, no current event.
    Programmatic,
}

impl FocusCause {
    /// Attribute a focus change to the event the host is processing.
    pub fn from_current_event(event: Option<&InputEvent>) -> Self {
        match event {
            Some(InputEvent::Key(key)) if key.is_advance_key() => {
                Self::KeyTraversal(key.direction())
            }
            Some(InputEvent::Mouse(_)) => Self::Pointer,
            _ => Self::Programmatic,
        }
    }

    pub fn traversal_direction(self) -> Option<TraversalDirection> {
        match self {
            Self::KeyTraversal(direction) => Some(direction),
            _ => None,
        }
    }
}

// =============================================================================
// RESPONDER
// =============================================================================

/// A control as seen by the host.
pub trait Responder {
    fn id(&self) -> ControlId;

    /// Hit region for pointer events.
    fn bounds(&self) -> Rect;

    /// Key-view loop position; ties keep registration order.
    fn tab_index(&self) -> i32 {
        0
    }

    fn accepts_first_responder(&self) -> bool {
        true
    }

    /// Whether the control is currently part of the key-view loop.
    fn can_become_key_view(&self) -> bool;

    fn focus_gained(&self, cause: FocusCause);

    fn focus_lost(&self);

    /// Key-down while this control holds focus. Return true if handled;
    /// unhandled keys fall through to the host (Tab traversal and so on).
    fn key_down(&self, event: &KeyboardEvent) -> bool;

    /// Pointer event routed to this control. Return true while a press
    /// transaction is open, so the host routes drag/release here only.
    fn pointer_event(&self, event: &MouseEvent) -> bool;
}

// =============================================================================
// EVENT TAP
// =============================================================================

/// A raw-input monitor. Sees each event before normal dispatch together with
/// the window it belongs to.
pub type EventMonitor = Rc<dyn Fn(&InputEvent, Option<&Rc<dyn FocusHost>>) -> Disposition>;

/// Handle to an installed monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MonitorToken(pub u64);

/// Host-side registry of raw-input monitors.
pub trait EventTap {
    fn install_monitor(&self, monitor: EventMonitor) -> Result<MonitorToken>;

    fn remove_monitor(&self, token: MonitorToken);

    /// Queue the host drains after each dispatch. Work a monitor defers goes
    /// here so it runs in the same pass.
    fn task_queue(&self) -> TaskQueue;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::keyboard::{Key, Modifiers};
    use crate::state::mouse::MouseButton;

    #[test]
    fn test_cause_from_tab() {
        let event = InputEvent::Key(KeyboardEvent::with_modifiers(Key::Tab, Modifiers::SHIFT));
        assert_eq!(
            FocusCause::from_current_event(Some(&event)),
            FocusCause::KeyTraversal(TraversalDirection::Previous)
        );
    }

    #[test]
    fn test_cause_from_other_events() {
        let enter = InputEvent::Key(KeyboardEvent::new(Key::Enter));
        assert_eq!(
            FocusCause::from_current_event(Some(&enter)),
            FocusCause::Programmatic
        );

        let click = InputEvent::Mouse(MouseEvent::down(MouseButton::Left, 0, 0));
        assert_eq!(FocusCause::from_current_event(Some(&click)), FocusCause::Pointer);
        assert_eq!(FocusCause::from_current_event(None), FocusCause::Programmatic);
    }
}
