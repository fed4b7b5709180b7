// src/display/manager.rs
//! DisplayManager - owns a DisplayDriver on the display thread.
//!
//! Canvases talk to it through a `DisplayHandle` by sending
//! `DisplayCommand`s. The manager loop:
//!
//! 1. Drains pending commands (waiting at most one poll interval).
//! 2. Polls the driver for native events and dispatches them to listeners.
//! 3. Presents the shared raster, scaled to the window, when it is dirty.
//!
//! Dialogs are queued; only the front one is open. Closing the main window
//! hides it, cancels every queued dialog and notifies window listeners.

use crate::color::Color;
use crate::config::{DialogConfig, CONFIG};
use crate::display::driver::{DisplayDriver, DriverFactory};
use crate::display::listeners::{
    DialogOutcome, KeyListener, KeyPress, MouseClick, MouseListener, WindowEvent, WindowListener,
};
use crate::display::messages::{
    DialogSpec, DisplayError, DisplayEvent, DriverConfig, DriverRequest, DriverResponse, Frame,
};
use crate::geometry::Rect;
use crate::handoff::{hand_off, HandOffSender};
use crate::raster::{Raster, SharedRaster, GLYPH_SIZE};
use anyhow::{anyhow, Context, Result};
use log::{debug, error, info, trace, warn};
use std::collections::VecDeque;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

const DIALOG_PADDING: i32 = 16;
const DIALOG_LINE_HEIGHT: i32 = GLYPH_SIZE + 4;
const DIALOG_MIN_WIDTH: i32 = 160;
const BUTTON_HEIGHT: i32 = 24;
const BUTTON_PADDING: i32 = 12;

/// Commands a canvas sends to its display thread.
pub enum DisplayCommand {
    Show,
    Hide,
    /// The raster changed; present it on the next pass.
    Redraw,
    SetTitle(String),
    OpenDialog {
        message: String,
        reply: HandOffSender<DialogOutcome>,
    },
    /// Current window size in pixels.
    QuerySize(HandOffSender<(u32, u32)>),
    AddKeyListener(KeyListener),
    AddMouseListener(MouseListener),
    AddWindowListener(WindowListener),
    Shutdown,
}

impl DisplayCommand {
    fn label(&self) -> &'static str {
        match self {
            DisplayCommand::Show => "Show",
            DisplayCommand::Hide => "Hide",
            DisplayCommand::Redraw => "Redraw",
            DisplayCommand::SetTitle(_) => "SetTitle",
            DisplayCommand::OpenDialog { .. } => "OpenDialog",
            DisplayCommand::QuerySize(_) => "QuerySize",
            DisplayCommand::AddKeyListener(_) => "AddKeyListener",
            DisplayCommand::AddMouseListener(_) => "AddMouseListener",
            DisplayCommand::AddWindowListener(_) => "AddWindowListener",
            DisplayCommand::Shutdown => "Shutdown",
        }
    }
}

/// Cloneable command channel to a display thread.
#[derive(Clone)]
pub struct DisplaySender {
    tx: Sender<DisplayCommand>,
}

impl DisplaySender {
    /// Queues a command. Returns false if the display thread is gone.
    pub fn send(&self, command: DisplayCommand) -> bool {
        let label = command.label();
        match self.tx.send(command) {
            Ok(()) => true,
            Err(_) => {
                debug!("DisplaySender: display thread gone, dropping {}", label);
                false
            }
        }
    }

    /// Current window size in pixels, or `None` if the display thread is gone.
    /// Must not be called from a listener.
    pub fn window_size(&self) -> Option<(u32, u32)> {
        let (reply, size) = hand_off();
        if !self.send(DisplayCommand::QuerySize(reply)) {
            return None;
        }
        size.take().ok()
    }
}

/// Owning handle to a running display thread. Dropping it shuts the thread
/// down and joins it.
pub struct DisplayHandle {
    sender: DisplaySender,
    thread: Option<JoinHandle<()>>,
}

impl DisplayHandle {
    /// Starts a display thread, builds the driver there and creates the
    /// window. Returns once the window exists or creation failed.
    pub fn spawn(config: DriverConfig, raster: SharedRaster, factory: DriverFactory) -> Result<Self> {
        let (tx, rx) = mpsc::channel();
        let (ready_tx, ready_rx) = hand_off::<Result<()>>();
        let dialog = CONFIG.dialog.clone();
        let poll = CONFIG.timing.poll_interval();

        let thread = thread::Builder::new()
            .name("display".to_string())
            .spawn(move || {
                let manager = match DisplayManager::start(config, raster, factory, dialog, poll) {
                    Ok(manager) => {
                        ready_tx.offer(Ok(()));
                        manager
                    }
                    Err(e) => {
                        ready_tx.offer(Err(e));
                        return;
                    }
                };
                manager.run(rx);
            })
            .context("Failed to spawn display thread")?;

        let started = ready_rx
            .take()
            .map_err(|e| anyhow!("display thread exited during startup: {}", e))
            .and_then(|started| started);
        match started {
            Ok(()) => Ok(Self {
                sender: DisplaySender { tx },
                thread: Some(thread),
            }),
            Err(e) => {
                if thread.join().is_err() {
                    error!("Display thread panicked during startup");
                }
                Err(e)
            }
        }
    }

    pub fn sender(&self) -> DisplaySender {
        self.sender.clone()
    }

    pub fn send(&self, command: DisplayCommand) -> bool {
        self.sender.send(command)
    }

    pub fn window_size(&self) -> Option<(u32, u32)> {
        self.sender.window_size()
    }
}

impl Drop for DisplayHandle {
    fn drop(&mut self) {
        let _ = self.sender.tx.send(DisplayCommand::Shutdown);
        if let Some(thread) = self.thread.take() {
            // A listener holding the last canvas clone can drop it on the
            // display thread itself.
            if thread.thread().id() == thread::current().id() {
                return;
            }
            if thread.join().is_err() {
                error!("Display thread panicked");
            }
        }
    }
}

struct PendingDialog {
    message: String,
    reply: HandOffSender<DialogOutcome>,
}

/// Display thread state. Lives entirely on the display thread.
pub struct DisplayManager {
    driver: Box<dyn DisplayDriver>,
    raster: SharedRaster,
    dialog_config: DialogConfig,
    poll: Duration,
    window_width: u32,
    window_height: u32,
    visible: bool,
    dirty: bool,
    dialogs: VecDeque<PendingDialog>,
    dialog_open: bool,
    key_listeners: Vec<KeyListener>,
    mouse_listeners: Vec<MouseListener>,
    window_listeners: Vec<WindowListener>,
}

impl DisplayManager {
    /// Builds the driver and creates the (unmapped) window.
    pub fn start(
        config: DriverConfig,
        raster: SharedRaster,
        factory: DriverFactory,
        dialog_config: DialogConfig,
        poll: Duration,
    ) -> Result<Self> {
        info!("DisplayManager: Creating driver for '{}'...", config.title);
        let mut driver = factory().context("Failed to create display driver")?;

        info!("DisplayManager: Initializing driver...");
        let response = driver
            .handle_request(DriverRequest::Init(config))
            .map_err(|e| anyhow!("{}", e))
            .context("Failed to initialize display driver")?;

        let (window_width, window_height) = match response {
            DriverResponse::InitComplete {
                width_px,
                height_px,
                scale_factor,
            } => {
                info!(
                    "DisplayManager: Initialized - {}x{} px, scale={}",
                    width_px, height_px, scale_factor
                );
                (width_px, height_px)
            }
            other => return Err(anyhow!("Expected InitComplete response, got {:?}", other)),
        };

        Ok(Self {
            driver,
            raster,
            dialog_config,
            poll,
            window_width,
            window_height,
            visible: false,
            dirty: true,
            dialogs: VecDeque::new(),
            dialog_open: false,
            key_listeners: Vec::new(),
            mouse_listeners: Vec::new(),
            window_listeners: Vec::new(),
        })
    }

    /// Runs until `Shutdown` arrives or every handle is gone.
    pub fn run(mut self, rx: Receiver<DisplayCommand>) {
        info!("DisplayManager: Event loop started");
        'running: loop {
            match rx.recv_timeout(self.poll) {
                Ok(command) => {
                    if !self.handle_command(command) {
                        break 'running;
                    }
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break 'running,
            }
            loop {
                match rx.try_recv() {
                    Ok(command) => {
                        if !self.handle_command(command) {
                            break 'running;
                        }
                    }
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => break 'running,
                }
            }
            self.pump_events();
            self.present_if_dirty();
        }
        self.teardown();
        info!("DisplayManager: Event loop stopped");
    }

    /// Applies one command. Returns false on `Shutdown`.
    fn handle_command(&mut self, command: DisplayCommand) -> bool {
        trace!("DisplayManager: {}", command.label());
        match command {
            DisplayCommand::Show => {
                self.set_visible(true);
                self.dirty = true;
            }
            DisplayCommand::Hide => self.set_visible(false),
            DisplayCommand::Redraw => self.dirty = true,
            DisplayCommand::SetTitle(title) => {
                self.request(DriverRequest::SetTitle(title));
            }
            DisplayCommand::OpenDialog { message, reply } => {
                self.dialogs.push_back(PendingDialog { message, reply });
                self.open_front_dialog();
            }
            DisplayCommand::QuerySize(reply) => {
                reply.offer((self.window_width, self.window_height));
            }
            DisplayCommand::AddKeyListener(listener) => self.key_listeners.push(listener),
            DisplayCommand::AddMouseListener(listener) => self.mouse_listeners.push(listener),
            DisplayCommand::AddWindowListener(listener) => self.window_listeners.push(listener),
            DisplayCommand::Shutdown => return false,
        }
        true
    }

    fn request(&mut self, request: DriverRequest) -> Option<DriverResponse> {
        match self.driver.handle_request(request) {
            Ok(response) => Some(response),
            Err(e) => {
                warn!("DisplayManager: driver request failed: {}", e);
                None
            }
        }
    }

    fn set_visible(&mut self, visible: bool) {
        if self.request(DriverRequest::SetVisible(visible)).is_some() {
            self.visible = visible;
        }
    }

    fn pump_events(&mut self) {
        let events = match self.request(DriverRequest::PollEvents) {
            Some(DriverResponse::Events(events)) => events,
            Some(other) => {
                warn!("DisplayManager: Expected Events response, got {:?}", other);
                return;
            }
            None => return,
        };
        for event in events {
            self.handle_event(event);
        }
    }

    fn handle_event(&mut self, event: DisplayEvent) {
        match event {
            DisplayEvent::Key {
                symbol,
                modifiers,
                text,
            } => {
                if self.dialog_open {
                    trace!("DisplayManager: dialog open, ignoring key {:?}", symbol);
                    return;
                }
                let press = KeyPress {
                    symbol,
                    modifiers,
                    text,
                };
                debug!("DisplayManager: key {}", press.name());
                for listener in &mut self.key_listeners {
                    listener(&press);
                }
            }
            DisplayEvent::MouseButtonPress { button, x, y, .. } => {
                if self.dialog_open {
                    trace!("DisplayManager: dialog open, ignoring click");
                    return;
                }
                let click = MouseClick {
                    button,
                    x,
                    y,
                    window_width: self.window_width,
                    window_height: self.window_height,
                };
                debug!("DisplayManager: click {:?}", click);
                for listener in &mut self.mouse_listeners {
                    listener(&click);
                }
            }
            DisplayEvent::Resize {
                width_px,
                height_px,
            } => {
                debug!("DisplayManager: resized to {}x{}", width_px, height_px);
                self.window_width = width_px;
                self.window_height = height_px;
                self.dirty = true;
            }
            DisplayEvent::Exposed => self.dirty = true,
            DisplayEvent::CloseRequested => {
                info!("DisplayManager: window closed by user");
                self.set_visible(false);
                self.cancel_dialogs();
                for listener in &mut self.window_listeners {
                    listener(WindowEvent::Closing);
                }
            }
            DisplayEvent::DialogAcknowledged => self.resolve_dialog(DialogOutcome::Acknowledged),
            DisplayEvent::DialogDismissed => self.resolve_dialog(DialogOutcome::Cancelled),
        }
    }

    fn present_if_dirty(&mut self) {
        if !self.dirty || !self.visible || self.window_width == 0 || self.window_height == 0 {
            return;
        }
        self.dirty = false;
        let (width_px, height_px) = (self.window_width, self.window_height);
        let frame = Frame {
            pixels: self.raster.with(|raster| raster.scaled(width_px, height_px)),
            width_px,
            height_px,
        };
        match self.driver.handle_request(DriverRequest::Present(frame)) {
            Ok(_) => trace!("DisplayManager: presented {}x{}", width_px, height_px),
            Err(DisplayError::PresentationFailed(_, reason)) => {
                warn!("DisplayManager: present failed: {}", reason);
                self.dirty = true;
            }
            Err(e) => warn!("DisplayManager: present failed: {}", e),
        }
    }

    fn open_front_dialog(&mut self) {
        if self.dialog_open {
            return;
        }
        let Some(front) = self.dialogs.front() else {
            return;
        };
        let spec = render_dialog(&self.dialog_config, &front.message);
        debug!("DisplayManager: opening dialog '{}'", spec.message);
        match self.driver.handle_request(DriverRequest::OpenDialog(spec)) {
            Ok(_) => self.dialog_open = true,
            Err(e) => {
                warn!("DisplayManager: could not open dialog: {}", e);
                if let Some(dialog) = self.dialogs.pop_front() {
                    dialog.reply.offer(DialogOutcome::Cancelled);
                }
                self.open_front_dialog();
            }
        }
    }

    fn resolve_dialog(&mut self, outcome: DialogOutcome) {
        if !self.dialog_open {
            trace!("DisplayManager: no dialog open, ignoring {:?}", outcome);
            return;
        }
        self.request(DriverRequest::CloseDialog);
        self.dialog_open = false;
        if let Some(dialog) = self.dialogs.pop_front() {
            debug!("DisplayManager: dialog '{}' -> {:?}", dialog.message, outcome);
            dialog.reply.offer(outcome);
        }
        self.open_front_dialog();
    }

    fn cancel_dialogs(&mut self) {
        if self.dialog_open {
            self.request(DriverRequest::CloseDialog);
            self.dialog_open = false;
        }
        for dialog in self.dialogs.drain(..) {
            dialog.reply.offer(DialogOutcome::Cancelled);
        }
    }

    fn teardown(&mut self) {
        self.cancel_dialogs();
        if self.visible {
            self.set_visible(false);
        }
    }
}

/// Lays out a dialog: message lines on top, a framed button centred below.
pub fn render_dialog(config: &DialogConfig, message: &str) -> DialogSpec {
    let lines: Vec<&str> = message.lines().collect();
    let text_width = lines.iter().map(|line| Raster::text_width(line)).max().unwrap_or(0);
    let button_width = Raster::text_width(&config.button_label) + 2 * BUTTON_PADDING;
    let width = (text_width.max(button_width) + 2 * DIALOG_PADDING).max(DIALOG_MIN_WIDTH);
    let text_height = lines.len().max(1) as i32 * DIALOG_LINE_HEIGHT;
    let height = DIALOG_PADDING * 3 + text_height + BUTTON_HEIGHT;

    let mut raster = Raster::new(width as u32, height as u32, Color::LightGray.to_pixel());
    let ink = Color::Black.to_pixel();
    for (i, line) in lines.iter().enumerate() {
        let baseline = DIALOG_PADDING + (i as i32 + 1) * DIALOG_LINE_HEIGHT - 4;
        raster.draw_text(DIALOG_PADDING, baseline, line, ink);
    }

    let button = Rect::new(
        (width - button_width) / 2,
        DIALOG_PADDING * 2 + text_height,
        button_width,
        BUTTON_HEIGHT,
    );
    raster.fill_rect(button.x, button.y, button.width, button.height, Color::White.to_pixel());
    raster.stroke_rect(button, ink);
    raster.draw_text(
        button.x + BUTTON_PADDING,
        button.y + (BUTTON_HEIGHT + GLYPH_SIZE) / 2 - 1,
        &config.button_label,
        ink,
    );

    DialogSpec {
        title: config.title.clone(),
        message: message.to_string(),
        frame: Frame {
            width_px: raster.width(),
            height_px: raster.height(),
            pixels: raster.pixels().to_vec().into_boxed_slice(),
        },
        button,
    }
}
