//! Focus System - Per-control focus state and key traversal
//!
//! Each control owns a [`FocusTraversalCoordinator`]. It turns host focus
//! callbacks into a [`FocusState`]:
//! - `has_input_focus` mirrors the host's first responder
//! - `shows_focus_visual` is on only when focus arrived by Tab, or a key was
//!   pressed while focused
//!
//! `shows_focus_visual` implies `has_input_focus`. Both drop on focus loss;
//! the visual also drops on any pointer-down.
//!
//! While focused, Tab/Shift+Tab leave through [`move_focus_out`], which keeps
//! focus on the control when the key-view loop has nowhere else to go.
//!
//! A [`ClearFocusRequest`] lets outside code strip focus when the host would
//! not move it on its own (a click on empty space, for instance).

use std::cell::Cell;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::trace;

use super::keyboard::{Key, KeyboardEvent};
use super::tasks::TaskQueue;
use crate::host::{FocusCause, FocusHost};
use crate::types::{ControlId, TraversalDirection};

// =============================================================================
// TYPES
// =============================================================================

/// Focus flags of one control.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FocusState {
    pub has_input_focus: bool,
    pub shows_focus_visual: bool,
}

/// Token asking a control to give up focus. Only inequality matters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClearFocusRequest(u64);

static NEXT_CLEAR_REQUEST: AtomicU64 = AtomicU64::new(0);

impl ClearFocusRequest {
    /// A token different from every token handed out before.
    pub fn new() -> Self {
        Self(NEXT_CLEAR_REQUEST.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for ClearFocusRequest {
    fn default() -> Self {
        Self::new()
    }
}

/// Something the owning control has to act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusSignal {
    /// A key was used on this control; focus visuals stay on.
    KeyboardInteraction,
    /// Focus arrived by Tab in this direction.
    TraversedIn(TraversalDirection),
    /// An activation key was pressed; fire the action.
    Activate,
    /// Focus left the control.
    FocusOut,
}

/// Result of a key-down routed to a focused control.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyResponse {
    pub signals: Vec<FocusSignal>,
    /// Leave the control in this direction via [`move_focus_out`].
    pub traverse: Option<TraversalDirection>,
}

impl KeyResponse {
    pub fn handled(&self) -> bool {
        !self.signals.is_empty()
    }
}

// =============================================================================
// COORDINATOR
// =============================================================================

/// Focus state machine for one control.
pub struct FocusTraversalCoordinator {
    id: ControlId,
    state: FocusState,
    activation_keys: Vec<Key>,
    // Shared with pending resign tasks so they can tell they were superseded.
    last_clear: Rc<Cell<ClearFocusRequest>>,
    host: Weak<dyn FocusHost>,
    tasks: TaskQueue,
}

impl FocusTraversalCoordinator {
    pub fn new(
        id: ControlId,
        activation_keys: Vec<Key>,
        host: Weak<dyn FocusHost>,
        tasks: TaskQueue,
    ) -> Self {
        Self {
            id,
            state: FocusState::default(),
            activation_keys,
            last_clear: Rc::new(Cell::new(ClearFocusRequest::new())),
            host,
            tasks,
        }
    }

    pub fn id(&self) -> ControlId {
        self.id
    }

    pub fn state(&self) -> FocusState {
        self.state
    }

    pub fn set_activation_keys(&mut self, keys: Vec<Key>) {
        self.activation_keys = keys;
    }

    pub fn last_clear_request(&self) -> ClearFocusRequest {
        self.last_clear.get()
    }

    /// The host made this control first responder.
    pub fn focus_gained(&mut self, cause: FocusCause) -> Vec<FocusSignal> {
        self.state.has_input_focus = true;

        let mut signals = Vec::new();
        if let Some(direction) = cause.traversal_direction() {
            self.state.shows_focus_visual = true;
            signals.push(FocusSignal::KeyboardInteraction);
            signals.push(FocusSignal::TraversedIn(direction));
        }
        trace!(id = ?self.id, ?cause, state = ?self.state, "Focus gained");
        signals
    }

    /// The host took first responder away from this control.
    pub fn focus_lost(&mut self) -> Vec<FocusSignal> {
        self.state = FocusState::default();
        trace!(id = ?self.id, "Focus lost");
        vec![FocusSignal::FocusOut]
    }

    /// Key-down while this control holds focus.
    pub fn key_down(&mut self, event: &KeyboardEvent) -> KeyResponse {
        if !self.state.has_input_focus || !event.is_key_down() {
            return KeyResponse::default();
        }

        if event.key == Key::Tab {
            self.note_keyboard_interaction();
            return KeyResponse {
                signals: vec![FocusSignal::KeyboardInteraction],
                traverse: Some(event.direction()),
            };
        }

        if self.activation_keys.contains(&event.key) {
            self.note_keyboard_interaction();
            return KeyResponse {
                signals: vec![FocusSignal::KeyboardInteraction, FocusSignal::Activate],
                traverse: None,
            };
        }

        KeyResponse::default()
    }

    /// A key was used while focused: show the focus visual again.
    pub fn note_keyboard_interaction(&mut self) {
        self.state.shows_focus_visual = self.state.has_input_focus;
    }

    /// A pointer went down somewhere: hide the focus visual.
    pub fn note_pointer_down(&mut self) {
        self.state.shows_focus_visual = false;
    }

    /// Ask this control to resign focus if `token` is new. The resign runs on
    /// the next tick and only if this control is still first responder and no
    /// newer token arrived in between.
    pub fn request_clear(&mut self, token: ClearFocusRequest) {
        if self.last_clear.get() == token {
            return;
        }
        self.last_clear.set(token);

        let id = self.id;
        let host = self.host.clone();
        let latest = self.last_clear.clone();
        self.tasks.defer(move || {
            if latest.get() != token {
                return;
            }
            let Some(host) = host.upgrade() else {
                return;
            };
            if host.first_responder() == Some(id) {
                trace!(?id, "Resigning focus on clear request");
                host.make_first_responder(None);
            }
        });
    }
}

impl std::fmt::Debug for FocusTraversalCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FocusTraversalCoordinator")
            .field("id", &self.id)
            .field("state", &self.state)
            .field("activation_keys", &self.activation_keys)
            .finish()
    }
}

// =============================================================================
// TRAVERSAL
// =============================================================================

/// Move focus off `id` in `direction`. If afterwards nobody has focus, focus
/// did not change, or it came back to `id`, focus is put back on `id`.
/// Returns true when it wrapped back.
///
/// Must be called with no borrow of the control held: the host calls back
/// into the control while moving focus.
pub fn move_focus_out(host: &dyn FocusHost, id: ControlId, direction: TraversalDirection) -> bool {
    let before = host.first_responder();
    host.select_key_view(Some(id), direction);
    let after = host.first_responder();

    if after.is_none() || after == before || after == Some(id) {
        trace!(?id, ?direction, "No other key view, keeping focus");
        host.make_first_responder(Some(id));
        return true;
    }
    false
}

// =============================================================================
// TESTS
// =============================================================================
