//! Input Classifier - Decides keyboard vs pointer intent from raw events
//!
//! Runs as the input monitor a [`ModeController`] installs, so it sees every
//! event before normal dispatch, on the UI thread:
//!
//! | Event | Mode | Effect | Event |
//! |---|---|---|---|
//! | button-down (any) | any | mode = Pointer | forwarded |
//! | Tab key-down | Pointer | mode = Keyboard, one advance next tick | swallowed |
//! | Tab key-down | Keyboard | none | forwarded |
//! | anything else | any | none | forwarded |
//!
//! The first Tab after pointer use is swallowed because controls only join
//! the key-view loop once keyboard mode is on. Letting the host traverse right
//! away would find nothing to focus. The deferred advance runs after the
//! current dispatch, when the loop is up to date, so the key press moves
//! focus exactly once.

use std::rc::Rc;

use tracing::{debug, trace};

use super::input::InputEvent;
use super::mode::ModeController;
use crate::host::FocusHost;
use crate::types::{Disposition, InteractionMode};

/// Classifies raw events and drives the shared mode flag.
#[derive(Clone, Debug)]
pub struct InputClassifier {
    mode: ModeController,
}

impl InputClassifier {
    pub fn new(mode: ModeController) -> Self {
        Self { mode }
    }

    /// Classify one event. `window` is the host the event belongs to; it is
    /// needed only for the deferred advance after a first Tab.
    pub fn classify(&self, event: &InputEvent, window: Option<&Rc<dyn FocusHost>>) -> Disposition {
        match event {
            InputEvent::Mouse(mouse) if mouse.is_button_down() => {
                // Listeners run before the event moves on.
                self.mode.set_mode(InteractionMode::Pointer);
                Disposition::Forward
            }
            InputEvent::Key(key) if key.is_advance_key() => {
                if self.mode.is_keyboard_mode() {
                    return Disposition::Forward;
                }

                self.mode.set_mode(InteractionMode::Keyboard);

                let direction = key.direction();
                match window {
                    Some(window) => {
                        let window = Rc::downgrade(window);
                        self.mode.tasks().defer(move || {
                            // The window may have closed since the key press.
                            if let Some(window) = window.upgrade() {
                                trace!(?direction, "Advancing focus after first Tab");
                                window.select_key_view(None, direction);
                            }
                        });
                    }
                    None => debug!("First Tab without a window, dropping it"),
                }

                Disposition::Swallow
            }
            _ => Disposition::Forward,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::host::{EventMonitor, EventTap, MonitorToken};
    use crate::state::keyboard::{Key, KeyboardEvent, Modifiers};
    use crate::state::mouse::{MouseButton, MouseEvent};
    use crate::state::tasks::TaskQueue;
    use crate::types::{ControlId, TraversalDirection};
    use std::cell::RefCell;

    #[derive(Default)]
    struct NullTap {
        tasks: TaskQueue,
    }

    impl EventTap for NullTap {
        fn install_monitor(&self, _monitor: EventMonitor) -> Result<MonitorToken> {
            Ok(MonitorToken(0))
        }
        fn remove_monitor(&self, _token: MonitorToken) {}
        fn task_queue(&self) -> TaskQueue {
            self.tasks.clone()
        }
    }

    #[derive(Default)]
    struct RecordingHost {
        advances: RefCell<Vec<(Option<ControlId>, TraversalDirection)>>,
    }

    impl FocusHost for RecordingHost {
        fn first_responder(&self) -> Option<ControlId> {
            None
        }
        fn make_first_responder(&self, _target: Option<ControlId>) -> bool {
            true
        }
        fn select_key_view(&self, from: Option<ControlId>, direction: TraversalDirection) {
            self.advances.borrow_mut().push((from, direction));
        }
    }

    fn setup() -> (ModeController, InputClassifier, Rc<RecordingHost>, Rc<dyn FocusHost>) {
        let tap = Rc::new(NullTap::default());
        let mode = ModeController::new(&tap);
        let classifier = InputClassifier::new(mode.clone());
        let host = Rc::new(RecordingHost::default());
        let window: Rc<dyn FocusHost> = host.clone();
        (mode, classifier, host, window)
    }

    fn tab() -> InputEvent {
        InputEvent::Key(KeyboardEvent::new(Key::Tab))
    }

    #[test]
    fn test_pointer_down_sets_pointer_mode_and_forwards() {
        let (mode, classifier, _host, window) = setup();
        mode.set_mode(InteractionMode::Keyboard);

        for button in [MouseButton::Left, MouseButton::Right, MouseButton::Middle] {
            mode.set_mode(InteractionMode::Keyboard);
            let event = InputEvent::Mouse(MouseEvent::down(button, 4, 4));
            assert_eq!(classifier.classify(&event, Some(&window)), Disposition::Forward);
            assert_eq!(mode.current_mode(), InteractionMode::Pointer);
        }
    }

    #[test]
    fn test_first_tab_is_swallowed_and_advances_once() {
        let (mode, classifier, host, window) = setup();

        assert_eq!(classifier.classify(&tab(), Some(&window)), Disposition::Swallow);
        assert_eq!(mode.current_mode(), InteractionMode::Keyboard);

        // Nothing moves until the dispatch pass is over.
        assert!(host.advances.borrow().is_empty());
        assert_eq!(mode.tasks().pending(), 1);

        mode.tasks().run_until_idle();
        assert_eq!(*host.advances.borrow(), vec![(None, TraversalDirection::Next)]);
    }

    #[test]
    fn test_first_shift_tab_advances_backward() {
        let (_mode, classifier, host, window) = setup();
        let back_tab = InputEvent::Key(KeyboardEvent::with_modifiers(Key::Tab, Modifiers::SHIFT));

        classifier.classify(&back_tab, Some(&window));
        classifier.mode.tasks().run_until_idle();

        assert_eq!(
            *host.advances.borrow(),
            vec![(None, TraversalDirection::Previous)]
        );
    }

    #[test]
    fn test_second_tab_is_forwarded_without_extra_advance() {
        let (mode, classifier, host, window) = setup();

        classifier.classify(&tab(), Some(&window));
        assert_eq!(classifier.classify(&tab(), Some(&window)), Disposition::Forward);

        mode.tasks().run_until_idle();
        assert_eq!(host.advances.borrow().len(), 1);
    }

    #[test]
    fn test_other_keys_are_forwarded() {
        let (mode, classifier, _host, window) = setup();
        let enter = InputEvent::Key(KeyboardEvent::new(Key::Enter));
        let tab_up = InputEvent::Key(KeyboardEvent::release(Key::Tab));

        assert_eq!(classifier.classify(&enter, Some(&window)), Disposition::Forward);
        assert_eq!(classifier.classify(&tab_up, Some(&window)), Disposition::Forward);
        assert_eq!(mode.current_mode(), InteractionMode::Pointer);
        assert_eq!(mode.tasks().pending(), 0);
    }

    #[test]
    fn test_first_tab_without_window_is_dropped() {
        let (mode, classifier, _host, _window) = setup();

        assert_eq!(classifier.classify(&tab(), None), Disposition::Swallow);
        assert_eq!(mode.current_mode(), InteractionMode::Keyboard);
        assert_eq!(mode.tasks().pending(), 0);
    }

    #[test]
    fn test_deferred_advance_after_window_closed_is_noop() {
        let (mode, classifier, host, window) = setup();

        classifier.classify(&tab(), Some(&window));
        drop(window);
        drop(host);

        assert_eq!(mode.tasks().run_until_idle(), 1);
    }
}
