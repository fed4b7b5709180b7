// src/placement.rs

//! Screen placement for new canvas windows.
//!
//! Each allocation returns the current cursor and moves it diagonally by a
//! fixed step, so successive windows cascade instead of stacking exactly.

use crate::config::CONFIG;
use crate::geometry::Posn;
use once_cell::sync::Lazy;
use std::sync::Mutex;

/// Process-wide placement cursor used by `Canvas`. Starts at the configured
/// window origin.
pub static WINDOW_PLACEMENT: Lazy<Mutex<WindowPlacer>> = Lazy::new(|| {
    Mutex::new(WindowPlacer::new(
        Posn::new(CONFIG.window.origin_x, CONFIG.window.origin_y),
        CONFIG.window.placement_step,
    ))
});

/// Hands out cascading window positions.
#[derive(Debug, Clone)]
pub struct WindowPlacer {
    next: Posn,
    step: i32,
}

impl WindowPlacer {
    pub fn new(origin: Posn, step: i32) -> Self {
        Self { next: origin, step }
    }

    /// Returns the position for the next window and advances the cursor.
    pub fn allocate(&mut self) -> Posn {
        let current = self.next;
        self.next = current.offset(self.step, self.step);
        current
    }
}

/// Allocates from the process-wide cursor.
pub fn next_window_position() -> Posn {
    match WINDOW_PLACEMENT.lock() {
        Ok(mut placer) => placer.allocate(),
        Err(poisoned) => poisoned.into_inner().allocate(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positions_cascade_by_the_step() {
        let mut placer = WindowPlacer::new(Posn::new(0, 0), 10);
        assert_eq!(placer.allocate(), Posn::new(0, 0));
        assert_eq!(placer.allocate(), Posn::new(10, 10));
        assert_eq!(placer.allocate(), Posn::new(20, 20));
    }

    #[test]
    fn global_cursor_never_repeats_a_position() {
        let a = next_window_position();
        let b = next_window_position();
        assert_ne!(a, b);
        assert_eq!(b.x - a.x, b.y - a.y);
    }
}
