// src/display/driver.rs
//! DisplayDriver trait - minimal RISC interface for platform-specific window primitives.
//!
//! This trait defines the minimal set of operations a window toolkit must
//! provide. All common logic (scaling, dialog layout, listener dispatch) lives
//! in DisplayManager.
//!
//! ## Threading Model
//! - A driver is created and used on the display thread only, so it need
//!   not be `Send`. Callers hand over a `DriverFactory` instead.
//!
//! ## Lifecycle
//! 1. `new()` - Pure initialization (connect to the display server)
//! 2. `handle_request(Init)` - Create window, report its size
//! 3. Request/response loop - All operations via messages
//! 4. `Drop` - Cleanup (no explicit shutdown message)

use crate::display::messages::{DisplayError, DriverRequest, DriverResponse};
use anyhow::Result;

/// Minimal platform-specific display driver interface.
pub trait DisplayDriver {
    /// Pure initialization only - no window creation.
    fn new() -> Result<Self>
    where
        Self: Sized;

    /// Handle a request from DisplayManager, returning a response.
    ///
    /// ## Request/Response Pairs
    /// - `Init` → `InitComplete`
    /// - `PollEvents` → `Events`
    /// - `Present(frame)` → `PresentComplete(frame)`
    /// - `SetTitle(s)` → `TitleSet`
    /// - `SetVisible(b)` → `VisibilitySet`
    /// - `OpenDialog(spec)` → `DialogOpened`
    /// - `CloseDialog` → `DialogClosed`
    fn handle_request(&mut self, request: DriverRequest) -> Result<DriverResponse, DisplayError>;
}

/// Builds a driver on the display thread.
pub type DriverFactory = Box<dyn FnOnce() -> Result<Box<dyn DisplayDriver>> + Send>;

/// Factory for any driver type that can build itself.
pub fn factory_for<D: DisplayDriver + 'static>() -> DriverFactory {
    Box::new(|| Ok(Box::new(D::new()?) as Box<dyn DisplayDriver>))
}
