//! Button Primitive - A focusable, pressable control.
//!
//! Ties the state machines together for one control:
//! - [`FocusTraversalCoordinator`] for focus flags and Tab handling
//! - [`PointerTracker`] for press/hover
//! - the shared [`ModeController`] for keyboard-mode gating
//!
//! # Behavior
//!
//! - Joins the key-view loop only in keyboard mode (unless
//!   `keyboard_mode_only` is off), so a first Tab after pointer use reaches it.
//! - Shows the focus visual only when focused by keyboard.
//! - Any pointer-down hides the visual and asks the button to give up focus on
//!   the next tick. A press on the button itself releases focus right away.
//! - Space/Enter while focused: pressed for `press_feedback`, action fires once.
//!
//! # Example
//!
//! ```ignore
//! use focus_visible::pipeline::Window;
//! use focus_visible::primitives::{FocusableControl, ButtonProps};
//! use focus_visible::state::ModeController;
//!
//! let window = Window::new();
//! let mode = ModeController::new(&window);
//!
//! let save = FocusableControl::mount(
//!     &window,
//!     &mode,
//!     ButtonProps::new(Rect::new(0, 0, 10, 1)).on_press(|| println!("saved")),
//! );
//!
//! // Presentation reads the flags.
//! let ring = save.focused_visually();
//! ```

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use spark_signals::{signal, Signal};
use tracing::{debug, trace};

use super::types::{ActionCallback, BlurCallback, ButtonProps, Cleanup};
use crate::config::ControlConfig;
use crate::host::{FocusCause, FocusHost, Responder};
use crate::pipeline::Window;
use crate::state::focus::{
    move_focus_out, ClearFocusRequest, FocusSignal, FocusState, FocusTraversalCoordinator,
};
use crate::state::keyboard::KeyboardEvent;
use crate::state::mode::{ModeController, ModeTransition};
use crate::state::mouse::{MouseEvent, PointerSignal, PointerTracker};
use crate::types::{ControlId, InteractionMode, Rect};

// =============================================================================
// CONTROL STATE
// =============================================================================

struct ControlInner {
    id: ControlId,
    me: Weak<ControlInner>,
    bounds: Cell<Rect>,
    tab_index: Cell<i32>,
    config: ControlConfig,

    focus: RefCell<FocusTraversalCoordinator>,
    pointer: RefCell<PointerTracker>,

    focused_visually: Signal<bool>,
    pressed: Signal<bool>,
    hovered: Signal<bool>,

    mode: ModeController,
    window: Weak<Window>,
    on_press: Option<ActionCallback>,
    on_focus_out: Option<BlurCallback>,
}

impl ControlInner {
    /// Push coordinator state out to the visual signal.
    fn sync_focus_visual(&self) {
        let visible = self.focus.borrow().state().shows_focus_visual;
        if self.focused_visually.get() != visible {
            self.focused_visually.set(visible);
        }
    }

    fn fire_action(&self) {
        if let Some(action) = &self.on_press {
            trace!(id = ?self.id, "Action fired");
            action();
        }
    }

    fn mode_changed(&self, transition: ModeTransition) {
        if transition.to != InteractionMode::Pointer {
            return;
        }
        {
            let mut focus = self.focus.borrow_mut();
            focus.note_pointer_down();
            focus.request_clear(ClearFocusRequest::new());
        }
        self.sync_focus_visual();
    }

    fn apply_focus_signals(&self, signals: &[FocusSignal]) {
        self.sync_focus_visual();
        for signal in signals {
            match signal {
                FocusSignal::Activate => self.activate(),
                FocusSignal::FocusOut => {
                    if let Some(callback) = &self.on_focus_out {
                        callback();
                    }
                }
                FocusSignal::KeyboardInteraction | FocusSignal::TraversedIn(_) => {}
            }
        }
    }

    /// Keyboard activation: pressed feedback around a single action.
    fn activate(&self) {
        self.pressed.set(true);
        self.fire_action();

        let me = self.me.clone();
        self.mode
            .tasks()
            .defer_after(self.config.press_feedback(), move || {
                if let Some(control) = me.upgrade() {
                    control.pressed.set(false);
                }
            });
    }

    fn apply_pointer_signal(&self, signal: PointerSignal) {
        match signal {
            PointerSignal::PointerDown => {
                if let Some(window) = self.window.upgrade() {
                    window.make_first_responder(None);
                }
                self.focus.borrow_mut().note_pointer_down();
                self.sync_focus_visual();
            }
            PointerSignal::FireOnPress => {
                let me = self.me.clone();
                self.mode.tasks().defer(move || {
                    if let Some(control) = me.upgrade() {
                        control.fire_action();
                    }
                });
            }
            PointerSignal::Click => self.fire_action(),
            PointerSignal::PressChanged(pressed) => {
                self.pressed.set(pressed);
            }
            PointerSignal::HoverChanged(hovered) => {
                self.hovered.set(hovered);
            }
        }
    }
}

impl Responder for ControlInner {
    fn id(&self) -> ControlId {
        self.id
    }

    fn bounds(&self) -> Rect {
        self.bounds.get()
    }

    fn tab_index(&self) -> i32 {
        self.tab_index.get()
    }

    fn can_become_key_view(&self) -> bool {
        !self.config.keyboard_mode_only || self.mode.is_keyboard_mode()
    }

    fn focus_gained(&self, cause: FocusCause) {
        let signals = self.focus.borrow_mut().focus_gained(cause);
        self.apply_focus_signals(&signals);
    }

    fn focus_lost(&self) {
        let signals = self.focus.borrow_mut().focus_lost();
        self.apply_focus_signals(&signals);
    }

    fn key_down(&self, event: &KeyboardEvent) -> bool {
        let response = self.focus.borrow_mut().key_down(event);
        self.apply_focus_signals(&response.signals);

        if let Some(direction) = response.traverse {
            // The window calls back into focus_lost/focus_gained here.
            if let Some(window) = self.window.upgrade() {
                move_focus_out(window.as_ref(), self.id, direction);
            }
        }
        response.handled()
    }

    fn pointer_event(&self, event: &MouseEvent) -> bool {
        let response = self.pointer.borrow_mut().handle(event);
        for signal in response.signals {
            self.apply_pointer_signal(signal);
        }
        response.capture
    }
}

// =============================================================================
// FOCUSABLE CONTROL
// =============================================================================

/// Handle to a mounted button. Unmounts on drop.
pub struct FocusableControl {
    inner: Rc<ControlInner>,
    unsubscribe: Option<Cleanup>,
}

impl FocusableControl {
    /// Create a button and mount it in `window`.
    pub fn mount(window: &Rc<Window>, mode: &ModeController, props: ButtonProps) -> Self {
        let id = ControlId::next();
        let host: Rc<dyn FocusHost> = window.clone();
        let tasks = mode.tasks().clone();
        let ButtonProps {
            bounds,
            tab_index,
            on_press,
            on_focus_out,
            config,
        } = props;

        let inner = Rc::new_cyclic(|me| ControlInner {
            id,
            me: me.clone(),
            bounds: Cell::new(bounds),
            tab_index: Cell::new(tab_index),
            focus: RefCell::new(FocusTraversalCoordinator::new(
                id,
                config.activation_keys.clone(),
                Rc::downgrade(&host),
                tasks,
            )),
            pointer: RefCell::new(PointerTracker::new(bounds, config.trigger_on_press)),
            config,
            focused_visually: signal(false),
            pressed: signal(false),
            hovered: signal(false),
            mode: mode.clone(),
            window: Rc::downgrade(window),
            on_press,
            on_focus_out,
        });

        mode.retain();
        window.register(&inner);

        let weak = Rc::downgrade(&inner);
        let unsubscribe = mode.subscribe(move |transition| {
            if let Some(control) = weak.upgrade() {
                control.mode_changed(transition);
            }
        });

        debug!(?id, ?bounds, tab_index, "Button mounted");
        Self {
            inner,
            unsubscribe: Some(unsubscribe),
        }
    }

    /// Unmount now instead of on drop.
    pub fn unmount(self) {
        drop(self);
    }

    fn teardown(&mut self) {
        let Some(unsubscribe) = self.unsubscribe.take() else {
            return;
        };
        unsubscribe();
        if let Some(window) = self.inner.window.upgrade() {
            window.unregister(self.inner.id);
        }
        self.inner.mode.release();

        // Presentation may still hold the flag signals.
        let response = self.inner.pointer.borrow_mut().reset();
        for signal in response.signals {
            self.inner.apply_pointer_signal(signal);
        }
        debug!(id = ?self.inner.id, "Button unmounted");
    }

    pub fn id(&self) -> ControlId {
        self.inner.id
    }

    pub fn bounds(&self) -> Rect {
        self.inner.bounds.get()
    }

    /// Move the hit region. Hover is re-checked against the last known
    /// pointer position.
    pub fn set_bounds(&self, bounds: Rect) {
        self.inner.bounds.set(bounds);
        let pointer = self.inner.window.upgrade().and_then(|w| w.pointer_position());
        let response = {
            let mut tracker = self.inner.pointer.borrow_mut();
            tracker.set_bounds(bounds);
            match pointer {
                Some((x, y)) => tracker.handle(&MouseEvent::move_to(x, y)),
                None => tracker.exit(),
            }
        };
        for signal in response.signals {
            self.inner.apply_pointer_signal(signal);
        }
    }

    pub fn set_tab_index(&self, tab_index: i32) {
        self.inner.tab_index.set(tab_index);
    }

    // -------------------------------------------------------------------------
    // Flags
    // -------------------------------------------------------------------------

    pub fn focus_state(&self) -> FocusState {
        self.inner.focus.borrow().state()
    }

    pub fn is_focused_visually(&self) -> bool {
        self.inner.focused_visually.get()
    }

    pub fn is_pressed(&self) -> bool {
        self.inner.pressed.get()
    }

    pub fn is_hovered(&self) -> bool {
        self.inner.hovered.get()
    }

    /// Reactive focus-ring flag.
    pub fn focused_visually(&self) -> Signal<bool> {
        self.inner.focused_visually.clone()
    }

    pub fn pressed(&self) -> Signal<bool> {
        self.inner.pressed.clone()
    }

    pub fn hovered(&self) -> Signal<bool> {
        self.inner.hovered.clone()
    }

    /// Ask the button to give up focus on the next tick.
    pub fn request_clear_focus(&self, token: ClearFocusRequest) {
        self.inner.focus.borrow_mut().request_clear(token);
    }
}

impl Drop for FocusableControl {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl std::fmt::Debug for FocusableControl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FocusableControl")
            .field("id", &self.inner.id)
            .field("bounds", &self.inner.bounds.get())
            .field("focus", &self.focus_state())
            .field("pressed", &self.is_pressed())
            .field("hovered", &self.is_hovered())
            .finish()
    }
}

// =============================================================================
// TESTS
// =============================================================================
