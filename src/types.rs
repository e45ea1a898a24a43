//! Core types shared by every module.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

// =============================================================================
// CONTROL IDENTITY
// =============================================================================

/// Identity of a control registered with a host window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ControlId(pub u64);

static NEXT_CONTROL_ID: AtomicU64 = AtomicU64::new(1);

impl ControlId {
    /// Allocate a process-unique id.
    pub fn next() -> Self {
        Self(NEXT_CONTROL_ID.fetch_add(1, Ordering::Relaxed))
    }
}

// =============================================================================
// INTERACTION MODE
// =============================================================================

/// How the user is currently driving the UI.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum InteractionMode {
    /// Tab traversal: focus rings shown, controls join the key-view loop.
    Keyboard,
    /// Mouse-first: no focus rings, clicks never grant focus.
    #[default]
    Pointer,
}

impl InteractionMode {
    pub fn is_keyboard(self) -> bool {
        self == Self::Keyboard
    }
}

/// Direction of a key-view loop step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraversalDirection {
    Previous,
    Next,
}

/// What an event monitor wants done with the event it saw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Hand the event on to normal dispatch.
    Forward,
    /// Drop the event; nothing else sees it.
    Swallow,
}

// =============================================================================
// GEOMETRY
// =============================================================================

/// Hit region of a control, in cells.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rect {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

impl Rect {
    pub fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
        Self { x, y, width, height }
    }

    /// Half-open containment: the right and bottom edges are outside.
    pub fn contains(&self, x: u16, y: u16) -> bool {
        let (x, y) = (x as u32, y as u32);
        let (left, top) = (self.x as u32, self.y as u32);
        x >= left
            && y >= top
            && x < left + self.width as u32
            && y < top + self.height as u32
    }
}
