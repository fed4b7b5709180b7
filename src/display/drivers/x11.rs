//! Xlib DisplayDriver.
//!
//! One top-level window shows presented frames via `XPutImage`. Dialogs get
//! their own transient window showing the pre-rendered dialog frame; a
//! left click inside the button rectangle, Return or Space acknowledges,
//! Escape or the window manager's close button dismisses.

use crate::display::driver::DisplayDriver;
use crate::display::messages::{
    DialogSpec, DisplayError, DisplayEvent, DriverConfig, DriverRequest, DriverResponse, Frame,
};
use crate::keys::{KeySymbol, Modifiers};
use anyhow::{anyhow, Context, Result};
use log::{debug, info, trace, warn};
use std::ffi::CString;
use std::os::raw::{c_char, c_int, c_uint};
use std::ptr;
use x11::{keysym, xlib};

/// Buffer size for text obtained from `XLookupString`.
const KEY_TEXT_BUFFER_SIZE: usize = 32;

struct DialogWindow {
    window: xlib::Window,
    spec: DialogSpec,
}

pub struct X11DisplayDriver {
    display: *mut xlib::Display,
    screen: c_int,
    visual: *mut xlib::Visual,
    depth: c_int,
    wm_delete_window: xlib::Atom,
    window: xlib::Window,
    gc: xlib::GC,
    width_px: u32,
    height_px: u32,
    dialog: Option<DialogWindow>,
}

impl DisplayDriver for X11DisplayDriver {
    fn new() -> Result<Self> {
        info!("X11DisplayDriver::new() - Opening X11 display");

        // SAFETY: plain Xlib calls on a display pointer checked for null.
        unsafe {
            let display = xlib::XOpenDisplay(ptr::null());
            if display.is_null() {
                return Err(anyhow!("Failed to open X11 display. Is DISPLAY set?"));
            }
            let screen = xlib::XDefaultScreen(display);
            let wm_delete_window =
                xlib::XInternAtom(display, b"WM_DELETE_WINDOW\0".as_ptr() as *const c_char, 0);

            Ok(Self {
                display,
                screen,
                visual: xlib::XDefaultVisual(display, screen),
                depth: xlib::XDefaultDepth(display, screen),
                wm_delete_window,
                window: 0,
                gc: ptr::null_mut(),
                width_px: 0,
                height_px: 0,
                dialog: None,
            })
        }
    }

    fn handle_request(&mut self, request: DriverRequest) -> Result<DriverResponse, DisplayError> {
        match request {
            DriverRequest::Init(config) => Ok(self.handle_init(config)?),
            DriverRequest::PollEvents => Ok(self.handle_poll_events()),
            DriverRequest::Present(frame) => self.handle_present(frame),
            DriverRequest::SetTitle(title) => {
                self.store_name(self.window, &title)?;
                Ok(DriverResponse::TitleSet)
            }
            DriverRequest::SetVisible(visible) => Ok(self.handle_set_visible(visible)),
            DriverRequest::OpenDialog(spec) => Ok(self.handle_open_dialog(spec)?),
            DriverRequest::CloseDialog => {
                self.destroy_dialog();
                Ok(DriverResponse::DialogClosed)
            }
        }
    }
}

impl X11DisplayDriver {
    fn handle_init(&mut self, config: DriverConfig) -> Result<DriverResponse> {
        info!(
            "X11DisplayDriver: Creating window '{}' {}x{} at ({}, {})",
            config.title, config.width_px, config.height_px, config.x, config.y
        );
        let window = self.create_window(config.x, config.y, config.width_px, config.height_px)?;
        // SAFETY: `window` was just created on `self.display`.
        unsafe {
            self.gc = xlib::XCreateGC(self.display, window, 0, ptr::null_mut());
        }
        self.window = window;
        self.width_px = config.width_px;
        self.height_px = config.height_px;
        self.store_name(window, &config.title)?;

        Ok(DriverResponse::InitComplete {
            width_px: self.width_px,
            height_px: self.height_px,
            scale_factor: 1.0,
        })
    }

    fn create_window(&self, x: i32, y: i32, width: u32, height: u32) -> Result<xlib::Window> {
        // SAFETY: `self.display` is a live connection for the driver's lifetime.
        unsafe {
            let root = xlib::XRootWindow(self.display, self.screen);
            let window = xlib::XCreateSimpleWindow(
                self.display,
                root,
                x,
                y,
                width.max(1),
                height.max(1),
                1,
                xlib::XBlackPixel(self.display, self.screen),
                xlib::XWhitePixel(self.display, self.screen),
            );
            if window == 0 {
                return Err(anyhow!("Failed to create X11 window"));
            }
            xlib::XSelectInput(
                self.display,
                window,
                xlib::ExposureMask
                    | xlib::KeyPressMask
                    | xlib::ButtonPressMask
                    | xlib::StructureNotifyMask,
            );
            let mut protocols = [self.wm_delete_window];
            xlib::XSetWMProtocols(self.display, window, protocols.as_mut_ptr(), 1);
            Ok(window)
        }
    }

    fn store_name(&self, window: xlib::Window, title: &str) -> Result<()> {
        if window == 0 {
            return Ok(());
        }
        let c_title = CString::new(title).context("Window title contains a NUL byte")?;
        // SAFETY: `c_title` outlives the call.
        unsafe {
            xlib::XStoreName(self.display, window, c_title.as_ptr());
            xlib::XFlush(self.display);
        }
        Ok(())
    }

    fn handle_set_visible(&mut self, visible: bool) -> DriverResponse {
        // SAFETY: mapping state changes on our own window.
        unsafe {
            if visible {
                xlib::XMapRaised(self.display, self.window);
            } else {
                xlib::XUnmapWindow(self.display, self.window);
            }
            xlib::XFlush(self.display);
        }
        DriverResponse::VisibilitySet
    }

    fn handle_poll_events(&mut self) -> DriverResponse {
        let mut events = Vec::new();
        // SAFETY: XNextEvent fills the zeroed event; the union is read by its type tag.
        unsafe {
            while xlib::XPending(self.display) > 0 {
                let mut event: xlib::XEvent = std::mem::zeroed();
                xlib::XNextEvent(self.display, &mut event);
                let target = event.any.window;
                let for_dialog = self.dialog.as_ref().is_some_and(|d| d.window == target);
                let converted = if for_dialog {
                    self.convert_dialog_event(&mut event)
                } else if target == self.window {
                    self.convert_event(&mut event)
                } else {
                    None
                };
                if let Some(display_event) = converted {
                    events.push(display_event);
                }
            }
        }
        DriverResponse::Events(events)
    }

    /// # Safety
    /// `event` must have been filled in by `XNextEvent` for the main window.
    unsafe fn convert_event(&mut self, event: &mut xlib::XEvent) -> Option<DisplayEvent> {
        match event.get_type() {
            xlib::KeyPress => {
                let (keysym, text) = lookup_key(&mut event.key);
                Some(DisplayEvent::Key {
                    symbol: xkeysym_to_keysymbol(keysym, text.as_deref()),
                    modifiers: extract_modifiers(event.key.state),
                    text,
                })
            }
            xlib::ButtonPress => {
                let button_event = event.button;
                Some(DisplayEvent::MouseButtonPress {
                    button: button_event.button.saturating_sub(1) as u8,
                    x: button_event.x,
                    y: button_event.y,
                    modifiers: extract_modifiers(button_event.state),
                })
            }
            xlib::ConfigureNotify => {
                let configure = event.configure;
                let (width_px, height_px) = (configure.width as u32, configure.height as u32);
                if (width_px, height_px) == (self.width_px, self.height_px) {
                    return None;
                }
                self.width_px = width_px;
                self.height_px = height_px;
                Some(DisplayEvent::Resize {
                    width_px,
                    height_px,
                })
            }
            xlib::Expose if event.expose.count == 0 => Some(DisplayEvent::Exposed),
            xlib::ClientMessage if self.is_delete_request(event) => {
                Some(DisplayEvent::CloseRequested)
            }
            _ => None,
        }
    }

    /// # Safety
    /// `event` must have been filled in by `XNextEvent` for the dialog window.
    unsafe fn convert_dialog_event(&mut self, event: &mut xlib::XEvent) -> Option<DisplayEvent> {
        match event.get_type() {
            xlib::Expose if event.expose.count == 0 => {
                self.paint_dialog();
                None
            }
            xlib::ButtonPress => {
                let button_event = event.button;
                let on_button = self.dialog.as_ref().is_some_and(|dialog| {
                    dialog.spec.button.contains(button_event.x, button_event.y)
                });
                (button_event.button == xlib::Button1 && on_button)
                    .then_some(DisplayEvent::DialogAcknowledged)
            }
            xlib::KeyPress => {
                let (keysym, _) = lookup_key(&mut event.key);
                match keysym as c_uint {
                    keysym::XK_Return | keysym::XK_KP_Enter | keysym::XK_space => {
                        Some(DisplayEvent::DialogAcknowledged)
                    }
                    keysym::XK_Escape => Some(DisplayEvent::DialogDismissed),
                    _ => None,
                }
            }
            xlib::ClientMessage if self.is_delete_request(event) => {
                Some(DisplayEvent::DialogDismissed)
            }
            _ => None,
        }
    }

    unsafe fn is_delete_request(&self, event: &xlib::XEvent) -> bool {
        event.client_message.data.as_longs()[0] as xlib::Atom == self.wm_delete_window
    }

    fn handle_present(&mut self, frame: Frame) -> Result<DriverResponse, DisplayError> {
        trace!("X11DisplayDriver: Presenting {}x{}", frame.width_px, frame.height_px);
        match self.put_frame(self.window, &frame) {
            Ok(()) => Ok(DriverResponse::PresentComplete(frame)),
            Err(reason) => Err(DisplayError::PresentationFailed(frame, reason)),
        }
    }

    fn put_frame(&self, window: xlib::Window, frame: &Frame) -> Result<(), String> {
        if window == 0 {
            return Err("window not created".to_string());
        }
        // SAFETY: the image borrows `frame.pixels` only until XDestroyImage,
        // and its data pointer is cleared first so Xlib does not free it.
        unsafe {
            let image = xlib::XCreateImage(
                self.display,
                self.visual,
                self.depth as c_uint,
                xlib::ZPixmap,
                0,
                frame.pixels.as_ptr() as *mut c_char,
                frame.width_px,
                frame.height_px,
                32,
                0,
            );
            if image.is_null() {
                return Err("Failed to create XImage".to_string());
            }
            xlib::XPutImage(
                self.display,
                window,
                self.gc,
                image,
                0,
                0,
                0,
                0,
                frame.width_px,
                frame.height_px,
            );
            (*image).data = ptr::null_mut();
            xlib::XDestroyImage(image);
            xlib::XFlush(self.display);
        }
        Ok(())
    }

    fn handle_open_dialog(&mut self, spec: DialogSpec) -> Result<DriverResponse> {
        self.destroy_dialog();
        let (x, y) = self.dialog_origin();
        let window = self.create_window(x, y, spec.frame.width_px, spec.frame.height_px)?;
        // SAFETY: both windows live on `self.display`.
        unsafe {
            xlib::XSetTransientForHint(self.display, window, self.window);
        }
        self.store_name(window, &spec.title)?;
        debug!("X11DisplayDriver: Opening dialog '{}'", spec.message);
        // SAFETY: mapping the window just created.
        unsafe {
            xlib::XMapRaised(self.display, window);
            xlib::XFlush(self.display);
        }
        self.dialog = Some(DialogWindow { window, spec });
        Ok(DriverResponse::DialogOpened)
    }

    /// Places the dialog against the right edge of the main window.
    fn dialog_origin(&self) -> (i32, i32) {
        let mut x = 0;
        let mut y = 0;
        let mut child: xlib::Window = 0;
        // SAFETY: out-pointers are valid locals.
        unsafe {
            let root = xlib::XRootWindow(self.display, self.screen);
            xlib::XTranslateCoordinates(self.display, self.window, root, 0, 0, &mut x, &mut y, &mut child);
        }
        (x + self.width_px as i32, y)
    }

    fn paint_dialog(&self) {
        if let Some(dialog) = &self.dialog {
            if let Err(reason) = self.put_frame(dialog.window, &dialog.spec.frame) {
                warn!("X11DisplayDriver: could not paint dialog: {}", reason);
            }
        }
    }

    fn destroy_dialog(&mut self) {
        if let Some(dialog) = self.dialog.take() {
            // SAFETY: the dialog window belongs to this connection.
            unsafe {
                xlib::XDestroyWindow(self.display, dialog.window);
                xlib::XFlush(self.display);
            }
        }
    }
}

/// Resolves the keysym and typed text of a key event.
///
/// # Safety
/// `key` must come from a `KeyPress` event.
unsafe fn lookup_key(key: &mut xlib::XKeyEvent) -> (xlib::KeySym, Option<String>) {
    let mut buffer = [0 as c_char; KEY_TEXT_BUFFER_SIZE];
    let mut keysym: xlib::KeySym = 0;
    let count = xlib::XLookupString(
        key,
        buffer.as_mut_ptr(),
        buffer.len() as c_int,
        &mut keysym,
        ptr::null_mut(),
    );
    let text = (count > 0).then(|| {
        let bytes: Vec<u8> = buffer[..count as usize].iter().map(|&b| b as u8).collect();
        String::from_utf8_lossy(&bytes).into_owned()
    });
    (keysym, text)
}

fn extract_modifiers(state: c_uint) -> Modifiers {
    let mut modifiers = Modifiers::empty();
    if state & xlib::ShiftMask != 0 {
        modifiers |= Modifiers::SHIFT;
    }
    if state & xlib::ControlMask != 0 {
        modifiers |= Modifiers::CONTROL;
    }
    if state & xlib::Mod1Mask != 0 {
        modifiers |= Modifiers::ALT;
    }
    if state & xlib::Mod4Mask != 0 {
        modifiers |= Modifiers::SUPER;
    }
    if state & xlib::LockMask != 0 {
        modifiers |= Modifiers::CAPS_LOCK;
    }
    if state & xlib::Mod2Mask != 0 {
        modifiers |= Modifiers::NUM_LOCK;
    }
    modifiers
}

/// Translates an X11 keysym (plus the text it typed) into a `KeySymbol`.
/// Named keys win over text; anything else becomes `Char` if it typed a
/// single printable character, and `Unknown` otherwise.
fn xkeysym_to_keysymbol(keysym: xlib::KeySym, text: Option<&str>) -> KeySymbol {
    let named = match keysym as c_uint {
        keysym::XK_Shift_L | keysym::XK_Shift_R => Some(KeySymbol::Shift),
        keysym::XK_Control_L | keysym::XK_Control_R => Some(KeySymbol::Control),
        keysym::XK_Alt_L | keysym::XK_Alt_R => Some(KeySymbol::Alt),
        keysym::XK_ISO_Level3_Shift => Some(KeySymbol::AltGraph),
        keysym::XK_Meta_L | keysym::XK_Meta_R => Some(KeySymbol::Meta),
        keysym::XK_Super_L | keysym::XK_Super_R => Some(KeySymbol::Super),
        keysym::XK_Caps_Lock => Some(KeySymbol::CapsLock),
        keysym::XK_Num_Lock => Some(KeySymbol::NumLock),
        keysym::XK_Scroll_Lock => Some(KeySymbol::ScrollLock),

        keysym::XK_Left => Some(KeySymbol::Left),
        keysym::XK_Right => Some(KeySymbol::Right),
        keysym::XK_Up => Some(KeySymbol::Up),
        keysym::XK_Down => Some(KeySymbol::Down),
        keysym::XK_Page_Up => Some(KeySymbol::PageUp),
        keysym::XK_Page_Down => Some(KeySymbol::PageDown),
        keysym::XK_Home => Some(KeySymbol::Home),
        keysym::XK_End => Some(KeySymbol::End),
        keysym::XK_Begin => Some(KeySymbol::Begin),
        keysym::XK_Insert => Some(KeySymbol::Insert),
        keysym::XK_Delete => Some(KeySymbol::Delete),

        keysym::XK_Return => Some(KeySymbol::Enter),
        keysym::XK_BackSpace => Some(KeySymbol::Backspace),
        keysym::XK_Tab | keysym::XK_ISO_Left_Tab => Some(KeySymbol::Tab),
        keysym::XK_Escape => Some(KeySymbol::Escape),
        keysym::XK_space => Some(KeySymbol::Space),
        keysym::XK_Print => Some(KeySymbol::PrintScreen),
        keysym::XK_Pause => Some(KeySymbol::Pause),
        keysym::XK_Cancel => Some(KeySymbol::Cancel),
        keysym::XK_Clear => Some(KeySymbol::Clear),
        keysym::XK_Help => Some(KeySymbol::Help),
        keysym::XK_Undo => Some(KeySymbol::Undo),
        keysym::XK_Redo => Some(KeySymbol::Again),
        keysym::XK_Find => Some(KeySymbol::Find),
        keysym::XK_Menu => Some(KeySymbol::Menu),

        keysym::XK_comma | keysym::XK_less => Some(KeySymbol::Comma),
        keysym::XK_period | keysym::XK_greater => Some(KeySymbol::Period),
        keysym::XK_slash | keysym::XK_question => Some(KeySymbol::Slash),
        keysym::XK_backslash | keysym::XK_bar => Some(KeySymbol::BackSlash),
        keysym::XK_semicolon | keysym::XK_colon => Some(KeySymbol::Semicolon),
        keysym::XK_equal | keysym::XK_plus => Some(KeySymbol::Equals),
        keysym::XK_minus | keysym::XK_underscore => Some(KeySymbol::Minus),
        keysym::XK_apostrophe | keysym::XK_quotedbl => Some(KeySymbol::Quote),
        keysym::XK_grave | keysym::XK_asciitilde => Some(KeySymbol::BackQuote),
        keysym::XK_bracketleft | keysym::XK_braceleft => Some(KeySymbol::OpenBracket),
        keysym::XK_bracketright | keysym::XK_braceright => Some(KeySymbol::CloseBracket),

        keysym::XK_KP_0 | keysym::XK_KP_Insert => Some(KeySymbol::Keypad0),
        keysym::XK_KP_1 => Some(KeySymbol::Keypad1),
        keysym::XK_KP_2 => Some(KeySymbol::Keypad2),
        keysym::XK_KP_3 => Some(KeySymbol::Keypad3),
        keysym::XK_KP_4 => Some(KeySymbol::Keypad4),
        keysym::XK_KP_5 => Some(KeySymbol::Keypad5),
        keysym::XK_KP_6 => Some(KeySymbol::Keypad6),
        keysym::XK_KP_7 => Some(KeySymbol::Keypad7),
        keysym::XK_KP_8 => Some(KeySymbol::Keypad8),
        keysym::XK_KP_9 => Some(KeySymbol::Keypad9),
        keysym::XK_KP_Enter => Some(KeySymbol::KeypadEnter),
        keysym::XK_KP_Add => Some(KeySymbol::KeypadPlus),
        keysym::XK_KP_Subtract => Some(KeySymbol::KeypadMinus),
        keysym::XK_KP_Multiply => Some(KeySymbol::KeypadMultiply),
        keysym::XK_KP_Divide => Some(KeySymbol::KeypadDivide),
        keysym::XK_KP_Decimal | keysym::XK_KP_Delete => Some(KeySymbol::KeypadDecimal),
        keysym::XK_KP_Separator => Some(KeySymbol::KeypadSeparator),
        keysym::XK_KP_Equal => Some(KeySymbol::KeypadEquals),
        keysym::XK_KP_Up => Some(KeySymbol::KeypadUp),
        keysym::XK_KP_Down => Some(KeySymbol::KeypadDown),
        keysym::XK_KP_Left => Some(KeySymbol::KeypadLeft),
        keysym::XK_KP_Right => Some(KeySymbol::KeypadRight),

        keysym::XK_Kanji => Some(KeySymbol::Kanji),
        keysym::XK_Hiragana => Some(KeySymbol::Hiragana),
        keysym::XK_Katakana => Some(KeySymbol::Katakana),
        keysym::XK_Henkan => Some(KeySymbol::Convert),
        keysym::XK_Muhenkan => Some(KeySymbol::NonConvert),
        keysym::XK_Mode_switch => Some(KeySymbol::ModeChange),

        keysym::XK_F1 => Some(KeySymbol::F1),
        keysym::XK_F2 => Some(KeySymbol::F2),
        keysym::XK_F3 => Some(KeySymbol::F3),
        keysym::XK_F4 => Some(KeySymbol::F4),
        keysym::XK_F5 => Some(KeySymbol::F5),
        keysym::XK_F6 => Some(KeySymbol::F6),
        keysym::XK_F7 => Some(KeySymbol::F7),
        keysym::XK_F8 => Some(KeySymbol::F8),
        keysym::XK_F9 => Some(KeySymbol::F9),
        keysym::XK_F10 => Some(KeySymbol::F10),
        keysym::XK_F11 => Some(KeySymbol::F11),
        keysym::XK_F12 => Some(KeySymbol::F12),
        keysym::XK_F13 => Some(KeySymbol::F13),
        keysym::XK_F14 => Some(KeySymbol::F14),
        keysym::XK_F15 => Some(KeySymbol::F15),
        keysym::XK_F16 => Some(KeySymbol::F16),
        keysym::XK_F17 => Some(KeySymbol::F17),
        keysym::XK_F18 => Some(KeySymbol::F18),
        keysym::XK_F19 => Some(KeySymbol::F19),
        keysym::XK_F20 => Some(KeySymbol::F20),
        keysym::XK_F21 => Some(KeySymbol::F21),
        keysym::XK_F22 => Some(KeySymbol::F22),
        keysym::XK_F23 => Some(KeySymbol::F23),
        keysym::XK_F24 => Some(KeySymbol::F24),
        _ => None,
    };
    if let Some(symbol) = named {
        return symbol;
    }

    let mut chars = text.unwrap_or("").chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) if !ch.is_control() => KeySymbol::Char(ch),
        _ => match char::from_u32(keysym as u32) {
            Some(ch) if keysym < 0x100 && !ch.is_control() => KeySymbol::Char(ch),
            _ => KeySymbol::Unknown,
        },
    }
}

impl Drop for X11DisplayDriver {
    fn drop(&mut self) {
        info!("X11DisplayDriver::drop() - Cleaning up");
        self.destroy_dialog();
        // SAFETY: each resource is released once, guarded by its null/zero check.
        unsafe {
            if !self.gc.is_null() {
                xlib::XFreeGC(self.display, self.gc);
            }
            if self.window != 0 {
                xlib::XDestroyWindow(self.display, self.window);
            }
            if !self.display.is_null() {
                xlib::XCloseDisplay(self.display);
            }
        }
    }
}
