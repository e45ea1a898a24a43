//! # focus-visible
//!
//! Keyboard-modality focus engine for Rust UIs.
//!
//! Built on [spark-signals](https://github.com/RLabs-Inc/spark-signals) for the
//! observable flags.
//!
//! ## What it does
//!
//! Controls show a focus ring only when the user is driving the UI with the
//! keyboard. A shared mode flag flips to `Keyboard` on the first Tab and back
//! to `Pointer` on any button press. Controls join the Tab loop only in
//! keyboard mode, and a click anywhere strips the ring and, on the next tick,
//! focus itself.
//!
//! ```text
//! input event → InputClassifier (monitor) → ModeController → controls
//!             → Window dispatch → FocusTraversalCoordinator / PointerTracker
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Core types (ControlId, InteractionMode, Rect, ...)
//! - [`host`] - Capability traits a UI runtime implements
//! - [`state`] - Mode controller, classifier, focus and pointer state machines
//! - [`pipeline`] - In-crate window host and terminal event loop
//! - [`primitives`] - The focusable button
//! - [`config`] - TOML-loadable control configuration

pub mod config;
pub mod error;
pub mod host;
pub mod pipeline;
pub mod primitives;
pub mod state;
pub mod types;

// Re-export commonly used items
pub use types::*;

pub use config::ControlConfig;
pub use error::{FocusError, Result};
pub use host::{EventMonitor, EventTap, FocusCause, FocusHost, MonitorToken, Responder};

pub use pipeline::{MountHandle, Window};

pub use primitives::{ButtonProps, FocusableControl};

pub use state::{
    // Mode
    InputClassifier, ModeController, ModeTransition,
    // Focus
    move_focus_out, ClearFocusRequest, FocusState, FocusTraversalCoordinator,
    // Events
    InputEvent, Key, KeyboardEvent, Modifiers, MouseAction, MouseButton, MouseEvent,
    PointerTracker, PressState,
    // Scheduling
    TaskQueue,
};
