// src/canvas.rs

//! `Canvas`: an off-screen buffer plus the window that shows it.
//!
//! Drawing is synchronous: a draw call has fully updated the buffer when it
//! returns. Showing the result is asynchronous: the call asks the display
//! thread to present the buffer, which it does on its next pass.
//!
//! The window is created lazily on first use, at the next cascading screen
//! position. A headless canvas never creates one; its `pause` writes a
//! screenshot instead of opening a dialog.

use crate::color::{Color, Rgb};
use crate::config::CONFIG;
use crate::display::{
    native_factory, DialogOutcome, DisplayCommand, DisplayHandle, DisplaySender, DriverConfig,
    DriverFactory, KeyPress, MouseClick, WindowEvent,
};
use crate::error::WorldError;
use crate::geometry::Posn;
use crate::handoff::hand_off;
use crate::placement::next_window_position;
use crate::raster::{Raster, SharedRaster};
use crate::screenshot::write_screenshot;
use log::{debug, error, info, trace, warn};
use std::fmt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

enum DisplaySlot {
    /// Not started yet. `None` means the native backend.
    Pending(Option<DriverFactory>),
    Running(DisplayHandle),
    Failed(String),
}

struct CanvasShared {
    width: u32,
    height: u32,
    title: Mutex<String>,
    raster: SharedRaster,
    headless: AtomicBool,
    screenshot_dir: Mutex<PathBuf>,
    display: Mutex<DisplaySlot>,
}

/// A drawing surface with an optional on-screen window.
///
/// Cloning is cheap; clones share the buffer and the window.
#[derive(Clone)]
pub struct Canvas {
    shared: Arc<CanvasShared>,
}

impl fmt::Debug for Canvas {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Canvas")
            .field("title", &self.title())
            .field("width", &self.shared.width)
            .field("height", &self.shared.height)
            .field("headless", &self.is_headless())
            .finish()
    }
}

impl Canvas {
    /// A canvas titled with the configured default title.
    pub fn new(width: u32, height: u32) -> Self {
        Self::with_title(width, height, &CONFIG.window.default_title)
    }

    pub fn with_title(width: u32, height: u32, title: &str) -> Self {
        Self::build(width, height, title, None)
    }

    /// A canvas whose window is driven by `factory` instead of the native
    /// backend.
    pub fn with_driver(width: u32, height: u32, title: &str, factory: DriverFactory) -> Self {
        Self::build(width, height, title, Some(factory))
    }

    /// A canvas that never opens a window.
    pub fn headless(width: u32, height: u32) -> Self {
        let canvas = Self::new(width, height);
        canvas.set_headless_mode();
        canvas
    }

    fn build(width: u32, height: u32, title: &str, factory: Option<DriverFactory>) -> Self {
        info!("Canvas: creating '{}' {}x{}", title, width, height);
        Self {
            shared: Arc::new(CanvasShared {
                width,
                height,
                title: Mutex::new(title.to_string()),
                raster: SharedRaster::new(width, height, CONFIG.canvas.background.to_pixel()),
                headless: AtomicBool::new(CONFIG.canvas.headless),
                screenshot_dir: Mutex::new(CONFIG.screenshot.directory.clone()),
                display: Mutex::new(DisplaySlot::Pending(factory)),
            }),
        }
    }

    // --- Drawing ---

    /// Outlines the circle of `radius` around `center`. Does not request a
    /// redraw; the outline shows up with the next one.
    pub fn draw_circle(&self, center: Posn, radius: i32, color: Color) -> bool {
        let pixel = color.to_pixel();
        self.shared
            .raster
            .with(|r| r.draw_ellipse(center.x, center.y, radius, radius, pixel));
        true
    }

    /// Fills the disk of `radius` around `center`.
    pub fn draw_disk(&self, center: Posn, radius: i32, color: Color) -> bool {
        self.draw_oval(center, radius, radius, color)
    }

    /// Fills the ellipse with radii `radius_x`, `radius_y` around `center`.
    pub fn draw_oval(&self, center: Posn, radius_x: i32, radius_y: i32, color: Color) -> bool {
        let pixel = color.to_pixel();
        self.shared
            .raster
            .with(|r| r.fill_ellipse(center.x, center.y, radius_x, radius_y, pixel));
        self.update();
        true
    }

    pub fn draw_line(&self, start: Posn, end: Posn, color: Color) -> bool {
        let pixel = color.to_pixel();
        self.shared
            .raster
            .with(|r| r.draw_line(start.x, start.y, end.x, end.y, pixel));
        self.update();
        true
    }

    /// Fills the `width` x `height` rectangle whose top-left corner is
    /// `top_left`.
    pub fn draw_rect(&self, top_left: Posn, width: i32, height: i32, color: Color) -> bool {
        let pixel = color.to_pixel();
        self.shared
            .raster
            .with(|r| r.fill_rect(top_left.x, top_left.y, width, height, pixel));
        self.update();
        true
    }

    /// Draws `text` with its baseline starting at `position`, always in the
    /// configured text colour.
    pub fn draw_string(&self, position: Posn, text: &str) -> bool {
        let pixel = CONFIG.canvas.text_color.to_pixel();
        self.shared
            .raster
            .with(|r| r.draw_text(position.x, position.y, text, pixel));
        self.update();
        true
    }

    fn update(&self) {
        if let Some(display) = self.display() {
            display.send(DisplayCommand::Redraw);
        }
    }

    // --- Window ---

    /// Makes the window visible and repaints it. No-op when headless.
    pub fn show(&self) -> bool {
        if let Some(display) = self.display() {
            display.send(DisplayCommand::Show);
        }
        true
    }

    /// Hides the window.
    pub fn close(&self) -> bool {
        if let Some(display) = self.display() {
            display.send(DisplayCommand::Hide);
        }
        true
    }

    /// `pause` with the configured message.
    pub fn pause(&self) -> bool {
        self.pause_with(&CONFIG.dialog.pause_message)
    }

    /// Blocks until the user acknowledges a dialog showing `message`.
    ///
    /// Returns false if the dialog or the window was closed instead. When
    /// headless, writes a screenshot and returns true without blocking.
    pub fn pause_with(&self, message: &str) -> bool {
        if self.is_headless() {
            if let Err(e) = self.take_screenshot() {
                warn!("Canvas: screenshot failed: {}", e);
            }
            return true;
        }
        self.dialog(message)
    }

    /// Blocks on a dialog showing `message`; true if it was acknowledged.
    /// When headless, logs the message and returns true.
    pub fn dialog(&self, message: &str) -> bool {
        if self.is_headless() {
            info!("Canvas '{}': {}", self.title(), message);
            return true;
        }
        self.dialog_outcome(message).is_acknowledged()
    }

    fn dialog_outcome(&self, message: &str) -> DialogOutcome {
        let Some(display) = self.display() else {
            warn!("Canvas: no window for dialog '{}'", message);
            return DialogOutcome::Cancelled;
        };
        let (reply, outcome) = hand_off();
        if !display.send(DisplayCommand::OpenDialog {
            message: message.to_string(),
            reply,
        }) {
            return DialogOutcome::Cancelled;
        }
        match outcome.take() {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("Canvas: dialog wait ended early: {}", e);
                DialogOutcome::Cancelled
            }
        }
    }

    pub fn title(&self) -> String {
        lock(&self.shared.title).clone()
    }

    pub fn set_title(&self, title: &str) {
        *lock(&self.shared.title) = title.to_string();
        if let Some(display) = self.display() {
            display.send(DisplayCommand::SetTitle(title.to_string()));
        }
    }

    /// Switches to headless mode: no window is created from now on and
    /// `pause` writes screenshots.
    pub fn set_headless_mode(&self) {
        self.shared.headless.store(true, Ordering::SeqCst);
    }

    pub fn is_headless(&self) -> bool {
        self.shared.headless.load(Ordering::SeqCst)
    }

    /// Creates the window now instead of on first use.
    pub fn open_window(&self) -> Result<(), WorldError> {
        if self.is_headless() {
            return Ok(());
        }
        self.display();
        match &*lock(&self.shared.display) {
            DisplaySlot::Failed(reason) => Err(WorldError::Display(reason.clone())),
            _ => Ok(()),
        }
    }

    /// Width of the window in pixels, or the logical width without one.
    pub fn width(&self) -> u32 {
        self.window_size().map_or(self.shared.width, |(w, _)| w)
    }

    /// Height of the window in pixels, or the logical height without one.
    pub fn height(&self) -> u32 {
        self.window_size().map_or(self.shared.height, |(_, h)| h)
    }

    /// Asks an already open window only; never creates one.
    fn window_size(&self) -> Option<(u32, u32)> {
        let sender = match &*lock(&self.shared.display) {
            DisplaySlot::Running(handle) => handle.sender(),
            DisplaySlot::Pending(_) | DisplaySlot::Failed(_) => return None,
        };
        sender.window_size()
    }

    pub fn logical_width(&self) -> u32 {
        self.shared.width
    }

    pub fn logical_height(&self) -> u32 {
        self.shared.height
    }

    // --- Listeners ---

    /// Registers a key listener. Returns false when there is no window.
    pub fn add_key_listener(&self, listener: impl FnMut(&KeyPress) + Send + 'static) -> bool {
        self.display()
            .is_some_and(|d| d.send(DisplayCommand::AddKeyListener(Box::new(listener))))
    }

    /// Registers a mouse listener. Returns false when there is no window.
    pub fn add_mouse_listener(&self, listener: impl FnMut(&MouseClick) + Send + 'static) -> bool {
        self.display()
            .is_some_and(|d| d.send(DisplayCommand::AddMouseListener(Box::new(listener))))
    }

    /// Registers a window listener. Returns false when there is no window.
    pub fn add_window_listener(&self, listener: impl FnMut(WindowEvent) + Send + 'static) -> bool {
        self.display()
            .is_some_and(|d| d.send(DisplayCommand::AddWindowListener(Box::new(listener))))
    }

    // --- Buffer access ---

    /// A copy of the buffer.
    pub fn snapshot(&self) -> Raster {
        self.shared.raster.snapshot()
    }

    /// The colour at `at`, or `None` outside the buffer.
    pub fn pixel(&self, at: Posn) -> Option<Rgb> {
        self.shared
            .raster
            .with(|r| r.pixel(at.x, at.y))
            .map(Rgb::from_pixel)
    }

    /// Writes the buffer to the next free screenshot file.
    pub fn take_screenshot(&self) -> Result<PathBuf, WorldError> {
        let directory = lock(&self.shared.screenshot_dir).clone();
        write_screenshot(&self.snapshot(), &directory, &CONFIG.screenshot.prefix)
    }

    /// Where headless `pause` writes screenshots from now on.
    pub fn set_screenshot_directory(&self, directory: impl Into<PathBuf>) {
        *lock(&self.shared.screenshot_dir) = directory.into();
    }

    /// The display thread's command channel, starting it if needed.
    /// `None` when headless or when the window could not be created.
    fn display(&self) -> Option<DisplaySender> {
        if self.is_headless() {
            return None;
        }
        let mut slot = lock(&self.shared.display);
        if let DisplaySlot::Pending(factory) = &mut *slot {
            let factory = factory.take().unwrap_or_else(native_factory);
            *slot = match self.start_display(factory) {
                Ok(handle) => DisplaySlot::Running(handle),
                Err(reason) => {
                    error!("Canvas: could not open a window: {}", reason);
                    DisplaySlot::Failed(reason)
                }
            };
        }
        match &*slot {
            DisplaySlot::Running(handle) => Some(handle.sender()),
            DisplaySlot::Pending(_) | DisplaySlot::Failed(_) => None,
        }
    }

    fn start_display(&self, factory: DriverFactory) -> Result<DisplayHandle, String> {
        let position = next_window_position();
        let config = DriverConfig {
            title: self.title(),
            width_px: self.shared.width,
            height_px: self.shared.height,
            x: position.x,
            y: position.y,
        };
        debug!("Canvas: opening window at {:?}", position);
        DisplayHandle::spawn(config, self.shared.raster.clone(), factory).map_err(|e| format!("{:#}", e))
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            trace!("Canvas: recovering poisoned lock");
            poisoned.into_inner()
        }
    }
}
