// src/keys.rs

//! Key symbols reported by display drivers and the canonical names handed to
//! `World::on_key_event`.
//!
//! A key with a well-known identity is reported by its uppercase symbolic
//! name (`"ENTER"`, `"SPACE"`, `"LEFT"`, ...). Any other key is reported as
//! the character it typed. The mapping is total: `key_event_name` never
//! fails and always yields the same string for the same symbol.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Represents a keyboard modifier.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct Modifiers: u8 {
        const SHIFT = 1 << 0;
        const CONTROL = 1 << 1;
        const ALT = 1 << 2;
        const SUPER = 1 << 3;
        const CAPS_LOCK = 1 << 4;
        const NUM_LOCK = 1 << 5;
    }
}

/// Represents a key symbol, identified by the physical key rather than the
/// character it produced (shift+comma is still `Comma`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum KeySymbol {
    /// A key without a symbolic name; carries the typed character.
    Char(char),

    // Function keys
    F1,
    F2,
    F3,
    F4,
    F5,
    F6,
    F7,
    F8,
    F9,
    F10,
    F11,
    F12,
    F13,
    F14,
    F15,
    F16,
    F17,
    F18,
    F19,
    F20,
    F21,
    F22,
    F23,
    F24,

    // Modifier and lock keys
    Shift,
    Control,
    Alt,
    AltGraph,
    Meta,
    Super,
    CapsLock,
    NumLock,
    ScrollLock,

    // Navigation keys
    Left,
    Right,
    Up,
    Down,
    PageUp,
    PageDown,
    Home,
    End,
    Begin,
    Insert,
    Delete,

    // Editing and control keys
    Enter,
    Backspace,
    Tab,
    Escape,
    Space,
    PrintScreen,
    Pause,
    Cancel,
    Clear,
    Help,
    Undo,
    Again,
    Copy,
    Cut,
    Paste,
    Find,
    Stop,
    Menu,

    // Punctuation keys
    Comma,
    Period,
    Slash,
    BackSlash,
    Semicolon,
    Equals,
    Minus,
    Quote,
    BackQuote,
    OpenBracket,
    CloseBracket,

    // Keypad keys
    Keypad0,
    Keypad1,
    Keypad2,
    Keypad3,
    Keypad4,
    Keypad5,
    Keypad6,
    Keypad7,
    Keypad8,
    Keypad9,
    KeypadEnter,
    KeypadPlus,
    KeypadMinus,
    KeypadMultiply,
    KeypadDivide,
    KeypadDecimal,
    KeypadSeparator,
    KeypadEquals,
    KeypadUp,
    KeypadDown,
    KeypadLeft,
    KeypadRight,

    // Input method keys
    Kana,
    Kanji,
    Hiragana,
    Katakana,
    Convert,
    NonConvert,
    ModeChange,

    /// Unidentified key.
    #[default]
    Unknown,
}

impl KeySymbol {
    /// The canonical symbolic name of this key, or `None` for `Char` keys.
    pub fn canonical_name(&self) -> Option<&'static str> {
        KEY_NAMES
            .iter()
            .find(|(symbol, _)| symbol == self)
            .map(|(_, name)| *name)
    }
}

/// Canonical names, one row per named symbol. Static data: extend here, not
/// in the lookup code.
static KEY_NAMES: &[(KeySymbol, &str)] = &[
    (KeySymbol::F1, "F1"),
    (KeySymbol::F2, "F2"),
    (KeySymbol::F3, "F3"),
    (KeySymbol::F4, "F4"),
    (KeySymbol::F5, "F5"),
    (KeySymbol::F6, "F6"),
    (KeySymbol::F7, "F7"),
    (KeySymbol::F8, "F8"),
    (KeySymbol::F9, "F9"),
    (KeySymbol::F10, "F10"),
    (KeySymbol::F11, "F11"),
    (KeySymbol::F12, "F12"),
    (KeySymbol::F13, "F13"),
    (KeySymbol::F14, "F14"),
    (KeySymbol::F15, "F15"),
    (KeySymbol::F16, "F16"),
    (KeySymbol::F17, "F17"),
    (KeySymbol::F18, "F18"),
    (KeySymbol::F19, "F19"),
    (KeySymbol::F20, "F20"),
    (KeySymbol::F21, "F21"),
    (KeySymbol::F22, "F22"),
    (KeySymbol::F23, "F23"),
    (KeySymbol::F24, "F24"),
    (KeySymbol::Shift, "SHIFT"),
    (KeySymbol::Control, "CONTROL"),
    (KeySymbol::Alt, "ALT"),
    (KeySymbol::AltGraph, "ALT_GRAPH"),
    (KeySymbol::Meta, "META"),
    (KeySymbol::Super, "WINDOWS"),
    (KeySymbol::CapsLock, "CAPS_LOCK"),
    (KeySymbol::NumLock, "NUM_LOCK"),
    (KeySymbol::ScrollLock, "SCROLL_LOCK"),
    (KeySymbol::Left, "LEFT"),
    (KeySymbol::Right, "RIGHT"),
    (KeySymbol::Up, "UP"),
    (KeySymbol::Down, "DOWN"),
    (KeySymbol::PageUp, "PAGE_UP"),
    (KeySymbol::PageDown, "PAGE_DOWN"),
    (KeySymbol::Home, "HOME"),
    (KeySymbol::End, "END"),
    (KeySymbol::Begin, "BEGIN"),
    (KeySymbol::Insert, "INSERT"),
    (KeySymbol::Delete, "DELETE"),
    (KeySymbol::Enter, "ENTER"),
    (KeySymbol::Backspace, "BACK_SPACE"),
    (KeySymbol::Tab, "TAB"),
    (KeySymbol::Escape, "ESCAPE"),
    (KeySymbol::Space, "SPACE"),
    (KeySymbol::PrintScreen, "PRINTSCREEN"),
    (KeySymbol::Pause, "PAUSE"),
    (KeySymbol::Cancel, "CANCEL"),
    (KeySymbol::Clear, "CLEAR"),
    (KeySymbol::Help, "HELP"),
    (KeySymbol::Undo, "UNDO"),
    (KeySymbol::Again, "AGAIN"),
    (KeySymbol::Copy, "COPY"),
    (KeySymbol::Cut, "CUT"),
    (KeySymbol::Paste, "PASTE"),
    (KeySymbol::Find, "FIND"),
    (KeySymbol::Stop, "STOP"),
    (KeySymbol::Menu, "CONTEXT_MENU"),
    (KeySymbol::Comma, "COMMA"),
    (KeySymbol::Period, "PERIOD"),
    (KeySymbol::Slash, "SLASH"),
    (KeySymbol::BackSlash, "BACK_SLASH"),
    (KeySymbol::Semicolon, "SEMICOLON"),
    (KeySymbol::Equals, "EQUALS"),
    (KeySymbol::Minus, "MINUS"),
    (KeySymbol::Quote, "QUOTE"),
    (KeySymbol::BackQuote, "BACK_QUOTE"),
    (KeySymbol::OpenBracket, "OPEN_BRACKET"),
    (KeySymbol::CloseBracket, "CLOSE_BRACKET"),
    (KeySymbol::Keypad0, "NUMPAD0"),
    (KeySymbol::Keypad1, "NUMPAD1"),
    (KeySymbol::Keypad2, "NUMPAD2"),
    (KeySymbol::Keypad3, "NUMPAD3"),
    (KeySymbol::Keypad4, "NUMPAD4"),
    (KeySymbol::Keypad5, "NUMPAD5"),
    (KeySymbol::Keypad6, "NUMPAD6"),
    (KeySymbol::Keypad7, "NUMPAD7"),
    (KeySymbol::Keypad8, "NUMPAD8"),
    (KeySymbol::Keypad9, "NUMPAD9"),
    (KeySymbol::KeypadEnter, "ENTER"),
    (KeySymbol::KeypadPlus, "ADD"),
    (KeySymbol::KeypadMinus, "SUBTRACT"),
    (KeySymbol::KeypadMultiply, "MULTIPLY"),
    (KeySymbol::KeypadDivide, "DIVIDE"),
    (KeySymbol::KeypadDecimal, "DECIMAL"),
    (KeySymbol::KeypadSeparator, "SEPARATOR"),
    (KeySymbol::KeypadEquals, "EQUALS"),
    (KeySymbol::KeypadUp, "KP_UP"),
    (KeySymbol::KeypadDown, "KP_DOWN"),
    (KeySymbol::KeypadLeft, "KP_LEFT"),
    (KeySymbol::KeypadRight, "KP_RIGHT"),
    (KeySymbol::Kana, "KANA"),
    (KeySymbol::Kanji, "KANJI"),
    (KeySymbol::Hiragana, "HIRAGANA"),
    (KeySymbol::Katakana, "KATAKANA"),
    (KeySymbol::Convert, "CONVERT"),
    (KeySymbol::NonConvert, "NONCONVERT"),
    (KeySymbol::ModeChange, "MODECHANGE"),
    (KeySymbol::Unknown, "UNDEFINED"),
];

/// The name reported to `World::on_key_event` for a key press.
pub fn key_event_name(symbol: KeySymbol) -> String {
    match symbol.canonical_name() {
        Some(name) => name.to_string(),
        None => match symbol {
            KeySymbol::Char(ch) => ch.to_string(),
            // Every non-Char symbol has a row in KEY_NAMES.
            other => format!("{:?}", other).to_uppercase(),
        },
    }
}
