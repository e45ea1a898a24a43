//! Mode Controller - Shared keyboard/pointer mode and monitor lifecycle
//!
//! One controller is shared by every control in a window. It owns:
//! - the interaction mode flag (starts as `Pointer`)
//! - a retain count; the input monitor is installed while it is above zero
//! - the listeners that hear about every mode write, synchronously
//!
//! The controller is an `Rc` handle; clone it into each control at
//! construction. Controls call `retain` on mount and `release` on unmount,
//! exactly once each.
//!
//! # Example
//!
//! ```ignore
//! let mode = ModeController::new(&window);
//! mode.retain(); // installs the classifier monitor
//! let unsubscribe = mode.subscribe(|t| println!("{:?} -> {:?}", t.from, t.to));
//! mode.release(); // removes it again
//! unsubscribe();
//! ```

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use spark_signals::{signal, Signal};
use tracing::{debug, info, warn};

use super::classifier::InputClassifier;
use super::input::InputEvent;
use super::tasks::TaskQueue;
use crate::host::{EventMonitor, EventTap, FocusHost, MonitorToken};
use crate::types::InteractionMode;

// =============================================================================
// TYPES
// =============================================================================

/// One write of the mode flag. `from == to` when the value did not change
/// (a pointer-down while already in pointer mode, for instance).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeTransition {
    pub from: InteractionMode,
    pub to: InteractionMode,
}

impl ModeTransition {
    pub fn changed(&self) -> bool {
        self.from != self.to
    }
}

/// Mode listener. Runs synchronously inside `set_mode`.
pub type ModeListener = Rc<dyn Fn(ModeTransition)>;

struct ModeInner {
    mode: Signal<InteractionMode>,
    ref_count: Cell<usize>,
    monitor: Cell<Option<MonitorToken>>,
    listeners: RefCell<Vec<(usize, ModeListener)>>,
    next_listener_id: Cell<usize>,
    // Weak: an installed monitor must not keep its host alive.
    tap: Weak<dyn EventTap>,
    tasks: TaskQueue,
}

// =============================================================================
// MODE CONTROLLER
// =============================================================================

/// Shared interaction-mode context.
#[derive(Clone)]
pub struct ModeController {
    inner: Rc<ModeInner>,
}

impl ModeController {
    /// Create a controller whose monitor goes into `tap`. Deferred work is
    /// scheduled on the tap's own task queue.
    pub fn new<T: EventTap + 'static>(tap: &Rc<T>) -> Self {
        let tasks = tap.task_queue();
        let tap: Rc<dyn EventTap> = tap.clone();
        Self {
            inner: Rc::new(ModeInner {
                mode: signal(InteractionMode::Pointer),
                ref_count: Cell::new(0),
                monitor: Cell::new(None),
                listeners: RefCell::new(Vec::new()),
                next_listener_id: Cell::new(0),
                tap: Rc::downgrade(&tap),
                tasks,
            }),
        }
    }

    // -------------------------------------------------------------------------
    // Mode flag
    // -------------------------------------------------------------------------

    pub fn current_mode(&self) -> InteractionMode {
        self.inner.mode.get()
    }

    pub fn is_keyboard_mode(&self) -> bool {
        self.current_mode().is_keyboard()
    }

    /// Reactive handle to the mode flag for presentation code.
    pub fn mode_signal(&self) -> Signal<InteractionMode> {
        self.inner.mode.clone()
    }

    /// Store `mode` and notify every listener before returning.
    pub fn set_mode(&self, mode: InteractionMode) {
        let from = self.current_mode();
        if from != mode {
            self.inner.mode.set(mode);
            info!(?from, to = ?mode, "Interaction mode changed");
        }

        // Snapshot so listeners may subscribe/unsubscribe while being notified.
        let listeners: Vec<ModeListener> = self
            .inner
            .listeners
            .borrow()
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();

        let transition = ModeTransition { from, to: mode };
        for listener in listeners {
            listener(transition);
        }
    }

    /// Subscribe to mode writes. Returns an unsubscribe function.
    pub fn subscribe<F>(&self, listener: F) -> Box<dyn FnOnce()>
    where
        F: Fn(ModeTransition) + 'static,
    {
        let id = self.inner.next_listener_id.get();
        self.inner.next_listener_id.set(id + 1);
        self.inner
            .listeners
            .borrow_mut()
            .push((id, Rc::new(listener)));

        let inner = Rc::downgrade(&self.inner);
        Box::new(move || {
            if let Some(inner) = inner.upgrade() {
                inner
                    .listeners
                    .borrow_mut()
                    .retain(|(listener_id, _)| *listener_id != id);
            }
        })
    }

    pub fn listener_count(&self) -> usize {
        self.inner.listeners.borrow().len()
    }

    // -------------------------------------------------------------------------
    // Monitor lifecycle
    // -------------------------------------------------------------------------

    /// A control mounted. Installs the monitor on the first retain.
    pub fn retain(&self) {
        let count = self.inner.ref_count.get() + 1;
        self.inner.ref_count.set(count);
        debug!(count, "Mode controller retained");

        // Also retries an install that failed on an earlier retain.
        if self.inner.monitor.get().is_none() {
            self.install();
        }
    }

    /// A control unmounted. Removes the monitor on the last release.
    /// Releasing at zero is a caller bug and is ignored.
    pub fn release(&self) {
        let count = self.inner.ref_count.get();
        if count == 0 {
            debug!("Mode controller released with no retains, ignoring");
            return;
        }

        let count = count - 1;
        self.inner.ref_count.set(count);
        debug!(count, "Mode controller released");

        if count == 0 {
            self.uninstall();
        }
    }

    pub fn retain_count(&self) -> usize {
        self.inner.ref_count.get()
    }

    /// Whether the input monitor is installed.
    pub fn is_monitoring(&self) -> bool {
        self.inner.monitor.get().is_some()
    }

    /// Queue the controller schedules deferred work on.
    pub fn tasks(&self) -> &TaskQueue {
        &self.inner.tasks
    }

    fn install(&self) {
        let Some(tap) = self.inner.tap.upgrade() else {
            warn!("Event tap is gone, keyboard mode detection disabled");
            return;
        };

        let classifier = InputClassifier::new(self.clone());
        let monitor: EventMonitor =
            Rc::new(move |event: &InputEvent, window: Option<&Rc<dyn FocusHost>>| {
                classifier.classify(event, window)
            });

        match tap.install_monitor(monitor) {
            Ok(token) => {
                debug!(?token, "Input monitor installed");
                self.inner.monitor.set(Some(token));
            }
            Err(e) => {
                warn!(%e, "Failed to install input monitor, keyboard mode detection disabled");
            }
        }
    }

    fn uninstall(&self) {
        let Some(token) = self.inner.monitor.take() else {
            return;
        };
        if let Some(tap) = self.inner.tap.upgrade() {
            tap.remove_monitor(token);
        }
        debug!(?token, "Input monitor removed");
    }
}

impl std::fmt::Debug for ModeController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModeController")
            .field("mode", &self.current_mode())
            .field("ref_count", &self.retain_count())
            .field("monitoring", &self.is_monitoring())
            .finish()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{FocusError, Result};

    #[derive(Default)]
    struct FakeTap {
        installed: RefCell<Vec<MonitorToken>>,
        installs: Cell<u64>,
        headless: Cell<bool>,
        tasks: TaskQueue,
    }

    impl EventTap for FakeTap {
        fn install_monitor(&self, _monitor: EventMonitor) -> Result<MonitorToken> {
            if self.headless.get() {
                return Err(FocusError::NoEventSource);
            }
            let token = MonitorToken(self.installs.get());
            self.installs.set(self.installs.get() + 1);
            self.installed.borrow_mut().push(token);
            Ok(token)
        }

        fn remove_monitor(&self, token: MonitorToken) {
            self.installed.borrow_mut().retain(|t| *t != token);
        }

        fn task_queue(&self) -> TaskQueue {
            self.tasks.clone()
        }
    }

    fn setup() -> (Rc<FakeTap>, ModeController) {
        let tap = Rc::new(FakeTap::default());
        let mode = ModeController::new(&tap);
        (tap, mode)
    }

    #[test]
    fn test_schedules_on_the_tap_queue() {
        let (tap, mode) = setup();
        mode.tasks().defer(|| {});
        assert_eq!(tap.tasks.pending(), 1);
    }

    #[test]
    fn test_initial_mode_is_pointer() {
        let (_tap, mode) = setup();
        assert_eq!(mode.current_mode(), InteractionMode::Pointer);
        assert_eq!(mode.mode_signal().get(), InteractionMode::Pointer);
        assert!(!mode.is_monitoring());
    }

    #[test]
    fn test_monitor_installed_once_for_many_retains() {
        let (tap, mode) = setup();

        mode.retain();
        mode.retain();
        mode.retain();
        assert_eq!(tap.installs.get(), 1);
        assert_eq!(tap.installed.borrow().len(), 1);
        assert_eq!(mode.retain_count(), 3);

        mode.release();
        mode.release();
        assert!(mode.is_monitoring());

        mode.release();
        assert!(!mode.is_monitoring());
        assert!(tap.installed.borrow().is_empty());
    }

    #[test]
    fn test_release_never_underflows() {
        let (tap, mode) = setup();
        mode.release();
        assert_eq!(mode.retain_count(), 0);

        mode.retain();
        mode.release();
        mode.release();
        assert_eq!(mode.retain_count(), 0);
        assert!(!mode.is_monitoring());

        // A fresh retain still installs.
        mode.retain();
        assert!(mode.is_monitoring());
        assert_eq!(tap.installs.get(), 2);
    }

    #[test]
    fn test_headless_install_fails_quietly_and_retries() {
        let (tap, mode) = setup();
        tap.headless.set(true);

        mode.retain();
        assert_eq!(mode.retain_count(), 1);
        assert!(!mode.is_monitoring());

        tap.headless.set(false);
        mode.retain();
        assert!(mode.is_monitoring());

        mode.release();
        mode.release();
        assert!(!mode.is_monitoring());
    }

    #[test]
    fn test_listeners_hear_every_write() {
        let (_tap, mode) = setup();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let s = seen.clone();
        let unsubscribe = mode.subscribe(move |t| s.borrow_mut().push(t));

        mode.set_mode(InteractionMode::Keyboard);
        mode.set_mode(InteractionMode::Pointer);
        mode.set_mode(InteractionMode::Pointer);

        let seen_now = seen.borrow().clone();
        assert_eq!(seen_now.len(), 3);
        assert!(seen_now[0].changed());
        assert_eq!(seen_now[0].to, InteractionMode::Keyboard);
        assert!(!seen_now[2].changed());

        unsubscribe();
        mode.set_mode(InteractionMode::Keyboard);
        assert_eq!(seen.borrow().len(), 3);
        assert_eq!(mode.listener_count(), 0);
    }

    #[test]
    fn test_listener_sees_new_value_synchronously() {
        let (_tap, mode) = setup();
        let observed = Rc::new(Cell::new(InteractionMode::Pointer));

        let (o, m) = (observed.clone(), mode.clone());
        let _unsubscribe = mode.subscribe(move |_| o.set(m.current_mode()));

        mode.set_mode(InteractionMode::Keyboard);
        assert_eq!(observed.get(), InteractionMode::Keyboard);
    }

    #[test]
    fn test_listener_may_unsubscribe_itself() {
        let (_tap, mode) = setup();
        let slot: Rc<RefCell<Option<Box<dyn FnOnce()>>>> = Rc::new(RefCell::new(None));

        let s = slot.clone();
        let unsubscribe = mode.subscribe(move |_| {
            if let Some(unsubscribe) = s.borrow_mut().take() {
                unsubscribe();
            }
        });
        *slot.borrow_mut() = Some(unsubscribe);

        mode.set_mode(InteractionMode::Keyboard);
        assert_eq!(mode.listener_count(), 0);
    }
}
