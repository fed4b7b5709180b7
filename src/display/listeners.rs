// src/display/listeners.rs

//! Input events delivered to canvas listeners, and the listener types.
//!
//! Listeners run on the display thread, in registration order. They should
//! hand work off (e.g. over a channel) rather than block.

use crate::keys::{key_event_name, KeySymbol, Modifiers};

/// A key pressed in a canvas window.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyPress {
    pub symbol: KeySymbol,
    pub modifiers: Modifiers,
    /// Text the key produced, if any.
    pub text: Option<String>,
}

impl KeyPress {
    /// Canonical key name, as handed to `World::on_key_event`.
    pub fn name(&self) -> String {
        key_event_name(self.symbol)
    }
}

/// A mouse press in a canvas window, in window pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseClick {
    /// 0 = left, 1 = middle, 2 = right, higher = wheel and extra buttons.
    pub button: u8,
    pub x: i32,
    pub y: i32,
    /// Window size at the time of the press.
    pub window_width: u32,
    pub window_height: u32,
}

/// Window-level notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowEvent {
    /// The user closed the window. It has already been hidden.
    Closing,
}

/// How a modal dialog ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogOutcome {
    /// The dialog's button was activated.
    Acknowledged,
    /// The dialog or its parent window was closed first.
    Cancelled,
}

impl DialogOutcome {
    pub fn is_acknowledged(self) -> bool {
        self == DialogOutcome::Acknowledged
    }
}

pub type KeyListener = Box<dyn FnMut(&KeyPress) + Send>;
pub type MouseListener = Box<dyn FnMut(&MouseClick) + Send>;
pub type WindowListener = Box<dyn FnMut(WindowEvent) + Send>;
