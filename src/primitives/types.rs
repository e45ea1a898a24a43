//! Primitive types - Props and callbacks.

use std::rc::Rc;

use crate::config::ControlConfig;
use crate::types::Rect;

// =============================================================================
// Callback Types
// =============================================================================

/// Unsubscribe / cleanup function.
pub type Cleanup = Box<dyn FnOnce()>;

/// Control action (click, keyboard activation).
///
/// `Rc<dyn Fn>` so it can be cloned into deferred tasks.
pub type ActionCallback = Rc<dyn Fn()>;

/// Blur callback (called when the control loses focus).
pub type BlurCallback = Rc<dyn Fn()>;

// =============================================================================
// Button Props
// =============================================================================

/// Properties for a focusable button.
#[derive(Clone, Default)]
pub struct ButtonProps {
    /// Hit region.
    pub bounds: Rect,
    /// Key-view loop position.
    pub tab_index: i32,
    pub on_press: Option<ActionCallback>,
    pub on_focus_out: Option<BlurCallback>,
    pub config: ControlConfig,
}

impl ButtonProps {
    pub fn new(bounds: Rect) -> Self {
        Self {
            bounds,
            ..Default::default()
        }
    }

    pub fn on_press(mut self, action: impl Fn() + 'static) -> Self {
        self.on_press = Some(Rc::new(action));
        self
    }

    pub fn on_focus_out(mut self, callback: impl Fn() + 'static) -> Self {
        self.on_focus_out = Some(Rc::new(callback));
        self
    }

    pub fn tab_index(mut self, tab_index: i32) -> Self {
        self.tab_index = tab_index;
        self
    }

    pub fn config(mut self, config: ControlConfig) -> Self {
        self.config = config;
        self
    }
}

impl std::fmt::Debug for ButtonProps {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ButtonProps")
            .field("bounds", &self.bounds)
            .field("tab_index", &self.tab_index)
            .field("on_press", &self.on_press.is_some())
            .field("config", &self.config)
            .finish()
    }
}
