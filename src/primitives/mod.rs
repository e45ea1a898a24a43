//! Primitives - Control building blocks.
//!
//! - [`button`] - Focusable, pressable control with keyboard-only focus visuals
//!
//! # Architecture
//!
//! A primitive is a handle around an `Rc`'d state object that the window sees
//! as a [`Responder`](crate::host::Responder). Mounting:
//! 1. Retains the shared mode controller
//! 2. Registers the responder with the window
//! 3. Subscribes to mode transitions
//!
//! Dropping the handle undoes all three, exactly once.

mod button;
mod types;

pub use button::FocusableControl;
pub use types::*;
