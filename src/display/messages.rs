// src/display/messages.rs
//! Message types for communication between DisplayManager and DisplayDriver.
//!
//! All communication happens via ownership transfer - no shared state.
//! Frames travel to the driver in `Present` and come back in
//! `PresentComplete`, or inside `PresentationFailed` on error.

use crate::geometry::Rect;
use crate::keys::{KeySymbol, Modifiers};
use std::fmt;

/// Window parameters handed to the driver at `Init`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverConfig {
    pub title: String,
    pub width_px: u32,
    pub height_px: u32,
    /// Screen position of the window's top-left corner.
    pub x: i32,
    pub y: i32,
}

/// A block of `0x00RRGGBB` pixels, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub pixels: Box<[u32]>,
    pub width_px: u32,
    pub height_px: u32,
}

/// A pre-rendered modal dialog. The driver only shows `frame` and reports
/// clicks inside `button` as `DialogAcknowledged`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogSpec {
    pub title: String,
    pub message: String,
    pub frame: Frame,
    pub button: Rect,
}

/// Requests sent from DisplayManager to DisplayDriver.
#[derive(Debug, Clone)]
pub enum DriverRequest {
    /// Create the (unmapped) window. Responds with `InitComplete`.
    Init(DriverConfig),

    /// Request pending native events. Responds with `Events`.
    PollEvents,

    /// Show the frame in the main window, scaled already to window size.
    /// Responds with `PresentComplete`, returning the frame.
    Present(Frame),

    /// Set the window title.
    SetTitle(String),

    /// Map or unmap the main window.
    SetVisible(bool),

    /// Show a dialog next to the main window. At most one is open at a time.
    OpenDialog(DialogSpec),

    /// Tear down the open dialog, if any.
    CloseDialog,
}

/// Responses sent from DisplayDriver to DisplayManager.
#[derive(Debug)]
pub enum DriverResponse {
    /// Initialization complete with the actual window size.
    InitComplete {
        width_px: u32,
        height_px: u32,
        scale_factor: f64,
    },

    /// Native events that occurred.
    Events(Vec<DisplayEvent>),

    /// Frame presentation complete, frame returned for reuse.
    PresentComplete(Frame),

    TitleSet,

    VisibilitySet,

    DialogOpened,

    DialogClosed,
}

/// Platform-agnostic display events.
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayEvent {
    /// Key press in the main window.
    Key {
        symbol: KeySymbol,
        modifiers: Modifiers,
        text: Option<String>,
    },

    /// Mouse button press in the main window. `button` is 0-based
    /// (0 = left, 1 = middle, 2 = right, 3/4 = wheel).
    MouseButtonPress {
        button: u8,
        x: i32,
        y: i32,
        modifiers: Modifiers,
    },

    /// Main window resized.
    Resize { width_px: u32, height_px: u32 },

    /// Main window contents need repainting.
    Exposed,

    /// User asked to close the main window.
    CloseRequested,

    /// The open dialog's button was activated.
    DialogAcknowledged,

    /// The open dialog was closed without activating its button.
    DialogDismissed,
}

/// Errors returned by a DisplayDriver.
#[derive(Debug)]
pub enum DisplayError {
    /// `Present` failed; the frame is handed back so it is not lost.
    PresentationFailed(Frame, String),
    /// Any other driver failure.
    Driver(anyhow::Error),
}

impl fmt::Display for DisplayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayError::PresentationFailed(frame, reason) => write!(
                f,
                "failed to present {}x{} frame: {}",
                frame.width_px, frame.height_px, reason
            ),
            DisplayError::Driver(e) => write!(f, "display driver error: {:#}", e),
        }
    }
}

impl std::error::Error for DisplayError {}

impl From<anyhow::Error> for DisplayError {
    fn from(err: anyhow::Error) -> Self {
        DisplayError::Driver(err)
    }
}
