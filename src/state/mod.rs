//! State Module - Interaction state machines
//!
//! - **Mode** - Shared keyboard/pointer flag and monitor lifecycle
//! - **Classifier** - Raw-event monitor that drives the mode flag
//! - **Focus** - Per-control focus flags, Tab traversal, clear requests
//! - **Mouse** - Press/hover tracking
//! - **Keyboard** - Key event types
//! - **Input** - crossterm bridge
//! - **Tasks** - Next-tick and delayed work

pub mod classifier;
pub mod focus;
pub mod input;
pub mod keyboard;
pub mod mode;
pub mod mouse;
pub mod tasks;

pub use classifier::InputClassifier;
pub use focus::{
    move_focus_out, ClearFocusRequest, FocusSignal, FocusState, FocusTraversalCoordinator,
    KeyResponse,
};
pub use input::InputEvent;
pub use keyboard::{Key, KeyState, KeyboardEvent, Modifiers};
pub use mode::{ModeController, ModeListener, ModeTransition};
pub use mouse::{
    MouseAction, MouseButton, MouseEvent, PointerResponse, PointerSignal, PointerTracker,
    PressState,
};
pub use tasks::TaskQueue;
