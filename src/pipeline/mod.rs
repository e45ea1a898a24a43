//! Pipeline - Hosting controls
//!
//! ```text
//! crossterm event → mount::tick → Window::pump → monitors → responders → tasks
//! ```
//!
//! - [`window`] - The in-crate host: responder registry, key-view loop,
//!   monitors, pointer press transactions
//! - [`mount`] - Terminal event loop driving a window

pub mod mount;
pub mod window;

// Re-exports
pub use mount::{detached, mount, run, tick, unmount, MountHandle};
pub use window::Window;
