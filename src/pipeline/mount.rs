//! Mount API - Terminal event loop for a [`Window`].
//!
//! Connects crossterm input to a window: enables mouse capture, feeds every
//! event through [`Window::pump`], and runs delayed tasks as they come due.
//! Ctrl+C stops the loop.
//!
//! # Example
//!
//! ```ignore
//! use focus_visible::pipeline::{mount, Window};
//!
//! let window = Window::new();
//! // ... mount controls ...
//!
//! let handle = mount::mount(window)?;
//!
//! // Option 1: Run blocking event loop
//! mount::run(&handle)?;
//!
//! // Option 2: Tick manually in your own loop
//! while mount::tick(&handle)? {
//!     // Your logic here
//! }
//!
//! handle.unmount();
//! ```

use std::io;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use super::window::Window;
use crate::state::input::{self, InputEvent};
use crate::state::keyboard::{Key, Modifiers};

/// Longest a single poll blocks (~60fps).
const FRAME: Duration = Duration::from_millis(16);

// =============================================================================
// Mount Handle
// =============================================================================

/// Handle returned by [`mount`]. Disables mouse capture when dropped.
pub struct MountHandle {
    window: Rc<Window>,
    running: Arc<AtomicBool>,
    mouse_enabled: bool,
}

impl MountHandle {
    /// Stop and restore the terminal.
    pub fn unmount(self) {
        self.stop();
    }

    pub fn window(&self) -> &Rc<Window> {
        &self.window
    }

    /// Check if still running.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Stop the loop (sets running to false).
    /// Use this to trigger graceful shutdown from custom code.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    /// Route one event. Ctrl+C stops instead of dispatching.
    pub fn handle_event(&self, event: InputEvent) -> bool {
        if is_quit_key(&event) {
            info!("Ctrl+C, stopping");
            self.stop();
            return true;
        }
        self.window.pump(event)
    }
}

impl Drop for MountHandle {
    fn drop(&mut self) {
        self.stop();
        if self.mouse_enabled {
            // Best effort
            let _ = input::disable_mouse();
        }
    }
}

fn is_quit_key(event: &InputEvent) -> bool {
    matches!(
        event.as_key(),
        Some(key) if key.is_key_down()
            && key.key == Key::Char('c')
            && key.modifiers.contains(Modifiers::CTRL)
    )
}

// =============================================================================
// Mount Function
// =============================================================================

/// Attach `window` to the terminal. Enables mouse capture.
pub fn mount(window: Rc<Window>) -> io::Result<MountHandle> {
    input::enable_mouse()?;
    debug!("Mouse capture enabled");

    Ok(MountHandle {
        window,
        running: Arc::new(AtomicBool::new(true)),
        mouse_enabled: true,
    })
}

/// Drive `window` without touching the terminal. For tests and for hosts
/// that read input themselves.
pub fn detached(window: Rc<Window>) -> MountHandle {
    MountHandle {
        window,
        running: Arc::new(AtomicBool::new(true)),
        mouse_enabled: false,
    }
}

/// Unmount and clean up.
pub fn unmount(handle: MountHandle) {
    handle.unmount();
}

// =============================================================================
// Event Loop
// =============================================================================

/// Run the event loop once.
///
/// Waits for input at most until the next delayed task is due (capped at one
/// frame), dispatches it, then runs whatever became due.
///
/// * `Ok(true)` - Continue running
/// * `Ok(false)` - Stop requested (Ctrl+C pressed or `handle.stop()` called)
/// * `Err(e)` - I/O error while polling
pub fn tick(handle: &MountHandle) -> io::Result<bool> {
    if !handle.is_running() {
        return Ok(false);
    }

    let tasks = handle.window.tasks();
    let timeout = tasks
        .next_deadline()
        .map(|deadline| deadline.saturating_duration_since(Instant::now()).min(FRAME))
        .unwrap_or(FRAME);

    if let Some(event) = input::poll_event(timeout)? {
        handle.handle_event(event);
    }
    tasks.run_due();

    Ok(handle.is_running())
}

/// Run the event loop (blocking until stopped).
pub fn run(handle: &MountHandle) -> io::Result<()> {
    while tick(handle)? {}
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::keyboard::KeyboardEvent;

    #[test]
    fn test_ctrl_c_stops() {
        let handle = detached(Window::new());
        assert!(handle.is_running());

        let plain_c = InputEvent::Key(KeyboardEvent::new(Key::Char('c')));
        handle.handle_event(plain_c);
        assert!(handle.is_running());

        let ctrl_c = InputEvent::Key(KeyboardEvent::with_modifiers(Key::Char('c'), Modifiers::CTRL));
        assert!(handle.handle_event(ctrl_c));
        assert!(!handle.is_running());
    }

    #[test]
    fn test_tick_after_stop_returns_false() {
        let handle = detached(Window::new());
        handle.stop();
        assert!(!tick(&handle).unwrap());
    }

    #[test]
    fn test_unmount_stops() {
        let handle = detached(Window::new());
        let running = handle.running.clone();
        assert!(running.load(Ordering::SeqCst));

        unmount(handle);
        assert!(!running.load(Ordering::SeqCst));
    }

    #[test]
    fn test_events_reach_window() {
        let window = Window::new();
        let handle = detached(window.clone());
        handle.handle_event(InputEvent::Key(KeyboardEvent::new(Key::Enter)));
        assert!(matches!(window.current_event(), Some(InputEvent::Key(_))));
    }
}
