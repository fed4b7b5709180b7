// src/display/mod.rs
//! Message-based display system with Strategy Pattern.
//!
//! - DisplayDriver: Platform-specific primitives (X11, headless, mock)
//! - DisplayManager: Display thread; listeners, dialogs, presentation
//! - Messages: Request/Response protocol for communication

pub mod driver;
pub mod drivers;
pub mod listeners;
pub mod manager;
pub mod messages;

pub use driver::{factory_for, DisplayDriver, DriverFactory};
pub use drivers::{native_factory, DialogPolicy, HeadlessDisplayDriver, MockDisplayDriver, MockHandle};
pub use listeners::{DialogOutcome, KeyPress, MouseClick, WindowEvent};
pub use manager::{DisplayCommand, DisplayHandle, DisplayManager, DisplaySender};
pub use messages::{DisplayError, DisplayEvent, DriverConfig, DriverRequest, DriverResponse, Frame};

#[cfg(test)]
mod tests;
