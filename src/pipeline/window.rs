//! Window - The in-crate host
//!
//! Implements [`FocusHost`] and [`EventTap`] over a set of registered
//! [`Responder`]s and routes [`InputEvent`]s to them.
//!
//! # Dispatch
//!
//! ```text
//! event → press transaction? → monitors → key: first responder → Tab traversal
//!                                         mouse: hit test / hover broadcast
//! ```
//!
//! - **Monitors** see every event first; a swallowed event stops there.
//! - **Keys** go to the first responder. Unhandled Tab steps the key-view loop.
//! - **Button-down** goes to the topmost control under the pointer. If the
//!   control opens a press transaction, drag/release events go to it alone and
//!   everything else is held until the release, then replayed in order.
//! - **Moves** go to every control for hover tracking.
//!
//! The last dispatched event stays as the "current event" and is what focus
//! changes are attributed to, including ones made from deferred tasks.
//!
//! Borrows of window state are never held across a call into a responder
//! or monitor; they may call straight back into the window.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::{Rc, Weak};

use tracing::{debug, trace};

use crate::error::{FocusError, Result};
use crate::host::{EventMonitor, EventTap, FocusCause, FocusHost, MonitorToken, Responder};
use crate::state::input::InputEvent;
use crate::state::keyboard::KeyboardEvent;
use crate::state::mouse::{MouseAction, MouseEvent};
use crate::state::tasks::TaskQueue;
use crate::types::{ControlId, Disposition, TraversalDirection};

// =============================================================================
// STATE
// =============================================================================

struct ResponderEntry {
    id: ControlId,
    seq: u64,
    responder: Weak<dyn Responder>,
}

#[derive(Default)]
struct WindowState {
    responders: Vec<ResponderEntry>,
    next_seq: u64,
    first_responder: Option<ControlId>,
    monitors: Vec<(MonitorToken, EventMonitor)>,
    next_token: u64,
    current_event: Option<InputEvent>,
    capture: Option<ControlId>,
    held: VecDeque<InputEvent>,
    pointer: Option<(u16, u16)>,
}

// =============================================================================
// WINDOW
// =============================================================================

/// A window of focusable controls.
pub struct Window {
    me: Weak<Window>,
    state: RefCell<WindowState>,
    tasks: TaskQueue,
    headless: Cell<bool>,
}

impl Window {
    pub fn new() -> Rc<Self> {
        Self::with_tasks(TaskQueue::new())
    }

    /// A window sharing an existing task queue.
    pub fn with_tasks(tasks: TaskQueue) -> Rc<Self> {
        Rc::new_cyclic(|me| Self {
            me: me.clone(),
            state: RefCell::new(WindowState::default()),
            tasks,
            headless: Cell::new(false),
        })
    }

    /// A window with no event source: monitors cannot be installed.
    pub fn headless() -> Rc<Self> {
        let window = Self::new();
        window.headless.set(true);
        window
    }

    pub fn tasks(&self) -> TaskQueue {
        self.tasks.clone()
    }

    // -------------------------------------------------------------------------
    // Responders
    // -------------------------------------------------------------------------

    /// Add a control. Later registrations are on top for hit testing.
    pub fn register<R: Responder + 'static>(&self, responder: &Rc<R>) {
        let id = responder.id();
        let responder: Rc<dyn Responder> = responder.clone();
        let mut state = self.state.borrow_mut();
        if state.responders.iter().any(|e| e.id == id) {
            return;
        }
        let seq = state.next_seq;
        state.next_seq += 1;
        state.responders.push(ResponderEntry {
            id,
            seq,
            responder: Rc::downgrade(&responder),
        });
        debug!(?id, count = state.responders.len(), "Responder registered");
    }

    /// Remove a control. Drops focus and any press transaction it held.
    pub fn unregister(&self, id: ControlId) {
        let (removed, was_first, was_capture) = {
            let mut state = self.state.borrow_mut();
            let Some(index) = state.responders.iter().position(|e| e.id == id) else {
                return;
            };
            let removed = state.responders.remove(index);
            let was_first = state.first_responder == Some(id);
            if was_first {
                state.first_responder = None;
            }
            let was_capture = state.capture == Some(id);
            if was_capture {
                state.capture = None;
            }
            (removed, was_first, was_capture)
        };
        debug!(?id, "Responder unregistered");

        if was_first {
            if let Some(responder) = removed.responder.upgrade() {
                responder.focus_lost();
            }
        }
        if was_capture {
            self.replay_held();
        }
    }

    pub fn responder_count(&self) -> usize {
        self.state.borrow().responders.len()
    }

    fn responder(&self, id: ControlId) -> Option<Rc<dyn Responder>> {
        let state = self.state.borrow();
        state
            .responders
            .iter()
            .find(|e| e.id == id)
            .and_then(|e| e.responder.upgrade())
    }

    /// Live responders in registration order.
    fn live_responders(&self) -> Vec<(u64, Rc<dyn Responder>)> {
        let state = self.state.borrow();
        state
            .responders
            .iter()
            .filter_map(|e| e.responder.upgrade().map(|r| (e.seq, r)))
            .collect()
    }

    /// Topmost control whose bounds contain the point.
    pub fn hit_test(&self, x: u16, y: u16) -> Option<ControlId> {
        self.live_responders()
            .into_iter()
            .rev()
            .find(|(_, r)| r.bounds().contains(x, y))
            .map(|(_, r)| r.id())
    }

    // -------------------------------------------------------------------------
    // Key-view loop
    // -------------------------------------------------------------------------

    /// Controls that can take focus by Tab, sorted by tab index (ties keep
    /// registration order).
    pub fn key_view_loop(&self) -> Vec<ControlId> {
        let mut views: Vec<(i32, u64, ControlId)> = self
            .live_responders()
            .into_iter()
            .filter(|(_, r)| r.can_become_key_view())
            .map(|(seq, r)| (r.tab_index(), seq, r.id()))
            .collect();
        views.sort();
        views.into_iter().map(|(_, _, id)| id).collect()
    }

    /// Move focus to the next key view.
    pub fn focus_next(&self) {
        self.select_key_view(self.first_responder(), TraversalDirection::Next);
    }

    /// Move focus to the previous key view.
    pub fn focus_previous(&self) {
        self.select_key_view(self.first_responder(), TraversalDirection::Previous);
    }

    /// Focus a specific control.
    pub fn focus(&self, id: ControlId) -> bool {
        self.make_first_responder(Some(id))
    }

    /// Clear focus (no control focused).
    pub fn blur(&self) {
        self.make_first_responder(None);
    }

    pub fn has_focus(&self) -> bool {
        self.first_responder().is_some()
    }

    // -------------------------------------------------------------------------
    // Dispatch
    // -------------------------------------------------------------------------

    /// The event focus changes are attributed to.
    pub fn current_event(&self) -> Option<InputEvent> {
        self.state.borrow().current_event
    }

    /// Last pointer position seen, held events included.
    pub fn pointer_position(&self) -> Option<(u16, u16)> {
        self.state.borrow().pointer
    }

    /// Whether a press transaction is open.
    pub fn is_tracking_pointer(&self) -> bool {
        self.state.borrow().capture.is_some()
    }

    /// Events waiting for the open press transaction to end.
    pub fn held_events(&self) -> usize {
        self.state.borrow().held.len()
    }

    /// Dispatch one event. Returns true if a monitor or control consumed it.
    /// Deferred work is left queued; see [`pump`](Self::pump).
    pub fn dispatch(&self, event: InputEvent) -> bool {
        let capture = {
            let mut state = self.state.borrow_mut();
            if let Some(mouse) = event.as_mouse() {
                state.pointer = Some((mouse.x, mouse.y));
            }
            state.capture
        };
        if let Some(id) = capture {
            return match event {
                InputEvent::Mouse(mouse) if mouse.is_tracking_event() => {
                    self.state.borrow_mut().current_event = Some(event);
                    self.route_captured(id, &mouse)
                }
                _ => {
                    trace!(?event, "Holding event during press transaction");
                    self.state.borrow_mut().held.push_back(event);
                    false
                }
            };
        }

        self.state.borrow_mut().current_event = Some(event);

        if self.run_monitors(&event) == Disposition::Swallow {
            trace!(?event, "Event swallowed by monitor");
            return true;
        }

        match event {
            InputEvent::Key(key) => self.dispatch_key(&key),
            InputEvent::Mouse(mouse) => self.dispatch_mouse(&mouse),
            InputEvent::None => false,
        }
    }

    /// Dispatch one event, then run the next-tick work it queued.
    pub fn pump(&self, event: InputEvent) -> bool {
        let handled = self.dispatch(event);
        self.tasks.run_until_idle();
        handled
    }

    fn run_monitors(&self, event: &InputEvent) -> Disposition {
        let monitors: Vec<EventMonitor> = self
            .state
            .borrow()
            .monitors
            .iter()
            .map(|(_, monitor)| monitor.clone())
            .collect();
        if monitors.is_empty() {
            return Disposition::Forward;
        }

        let host: Option<Rc<dyn FocusHost>> = self.me.upgrade().map(|w| w as Rc<dyn FocusHost>);
        for monitor in monitors {
            if monitor(event, host.as_ref()) == Disposition::Swallow {
                return Disposition::Swallow;
            }
        }
        Disposition::Forward
    }

    fn dispatch_key(&self, key: &KeyboardEvent) -> bool {
        if !key.is_key_down() {
            return false;
        }

        if let Some(responder) = self.first_responder().and_then(|id| self.responder(id)) {
            if responder.key_down(key) {
                return true;
            }
        }

        // Default traversal for Tab the focused control did not take.
        if key.is_advance_key() {
            self.select_key_view(self.first_responder(), key.direction());
            return true;
        }
        false
    }

    fn dispatch_mouse(&self, mouse: &MouseEvent) -> bool {
        match mouse.action {
            MouseAction::Down => {
                let Some(responder) = self
                    .hit_test(mouse.x, mouse.y)
                    .and_then(|id| self.responder(id))
                else {
                    return false;
                };
                if responder.pointer_event(mouse) {
                    let id = responder.id();
                    trace!(?id, "Press transaction started");
                    self.state.borrow_mut().capture = Some(id);
                }
                true
            }
            MouseAction::Move => {
                for (_, responder) in self.live_responders() {
                    responder.pointer_event(mouse);
                }
                false
            }
            // Stray drag/release with no open press, scrolls.
            MouseAction::Up | MouseAction::Drag | MouseAction::Scroll => false,
        }
    }

    fn route_captured(&self, id: ControlId, mouse: &MouseEvent) -> bool {
        let still_tracking = match self.responder(id) {
            Some(responder) => responder.pointer_event(mouse),
            None => false,
        };
        if !still_tracking {
            trace!(?id, "Press transaction ended");
            self.state.borrow_mut().capture = None;
            self.replay_held();
        }
        true
    }

    fn replay_held(&self) {
        loop {
            if self.is_tracking_pointer() {
                // A replayed press opened a new transaction; the rest waits.
                return;
            }
            let next = self.state.borrow_mut().held.pop_front();
            match next {
                Some(event) => {
                    self.dispatch(event);
                }
                None => return,
            }
        }
    }
}

// =============================================================================
// FOCUS HOST
// =============================================================================

impl FocusHost for Window {
    fn first_responder(&self) -> Option<ControlId> {
        self.state.borrow().first_responder
    }

    fn make_first_responder(&self, target: Option<ControlId>) -> bool {
        let current = self.first_responder();
        if current == target {
            return true;
        }

        let incoming = match target {
            Some(id) => match self.responder(id) {
                Some(responder) if responder.accepts_first_responder() => Some(responder),
                _ => return false,
            },
            None => None,
        };
        let outgoing = current.and_then(|id| self.responder(id));
        let cause = FocusCause::from_current_event(self.current_event().as_ref());

        self.state.borrow_mut().first_responder = target;
        debug!(from = ?current, to = ?target, ?cause, "First responder changed");

        if let Some(outgoing) = outgoing {
            outgoing.focus_lost();
        }
        if let Some(incoming) = incoming {
            incoming.focus_gained(cause);
        }
        true
    }

    fn select_key_view(&self, from: Option<ControlId>, direction: TraversalDirection) {
        let order = self.key_view_loop();
        if order.is_empty() {
            trace!(?direction, "Key-view loop is empty");
            return;
        }

        let start = from.or_else(|| self.first_responder());
        let position = start.and_then(|id| order.iter().position(|&v| v == id));
        let len = order.len();
        let next = match (position, direction) {
            (None, TraversalDirection::Next) => 0,
            (None, TraversalDirection::Previous) => len - 1,
            (Some(pos), TraversalDirection::Next) => (pos + 1) % len,
            (Some(pos), TraversalDirection::Previous) => (pos + len - 1) % len,
        };

        self.make_first_responder(Some(order[next]));
    }
}

// =============================================================================
// EVENT TAP
// =============================================================================

impl EventTap for Window {
    fn install_monitor(&self, monitor: EventMonitor) -> Result<MonitorToken> {
        if self.headless.get() {
            return Err(FocusError::NoEventSource);
        }
        let mut state = self.state.borrow_mut();
        let token = MonitorToken(state.next_token);
        state.next_token += 1;
        state.monitors.push((token, monitor));
        Ok(token)
    }

    fn remove_monitor(&self, token: MonitorToken) {
        self.state
            .borrow_mut()
            .monitors
            .retain(|(installed, _)| *installed != token);
    }

    fn task_queue(&self) -> TaskQueue {
        self.tasks.clone()
    }
}

impl Window {
    pub fn monitor_count(&self) -> usize {
        self.state.borrow().monitors.len()
    }
}

// =============================================================================
// TESTS
// =============================================================================
