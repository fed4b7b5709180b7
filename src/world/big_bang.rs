//! The blocking world loop.

use crate::canvas::Canvas;
use crate::display::{DriverFactory, WindowEvent};
use crate::error::WorldError;
use crate::handoff::hand_off;
use crate::world::dispatch::{Dispatcher, LoopEvent};
use crate::world::ticker::Ticker;
use crate::world::{World, INTERRUPTED_MESSAGE};
use log::*;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::time::Duration;

/// Shortest tick the loop will run at.
const MIN_TICK: Duration = Duration::from_millis(1);

/// Highest mouse button (0-based) that counts as a click.
const LAST_CLICK_BUTTON: u8 = 2;

/// How a world loop ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ending {
    /// The final world's ending message, as shown in the closing dialog.
    pub message: String,
    /// Whether the closing dialog was acknowledged rather than closed.
    pub acknowledged: bool,
}

/// A validated world-loop configuration.
pub struct BigBang {
    width: u32,
    height: u32,
    tick: Duration,
    headless: bool,
    factory: Option<DriverFactory>,
    screenshot_dir: Option<PathBuf>,
}

impl std::fmt::Debug for BigBang {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BigBang")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("tick", &self.tick)
            .field("headless", &self.headless)
            .field("custom_driver", &self.factory.is_some())
            .finish()
    }
}

impl BigBang {
    /// Checks that every argument is positive. Nothing is created on failure.
    pub fn new(width: i32, height: i32, tick_seconds: f64) -> Result<Self, WorldError> {
        if width <= 0 {
            return Err(WorldError::invalid_argument("width", 1, width));
        }
        if height <= 0 {
            return Err(WorldError::invalid_argument("height", 2, height));
        }
        // Also rejects NaN and values too large for a Duration.
        let tick = if tick_seconds > 0.0 {
            Duration::try_from_secs_f64(tick_seconds)
                .map_err(|_| WorldError::invalid_argument("tick_seconds", 3, tick_seconds))?
        } else {
            return Err(WorldError::invalid_argument("tick_seconds", 3, tick_seconds));
        };
        Ok(Self {
            width: width as u32,
            height: height as u32,
            tick: tick.max(MIN_TICK),
            headless: false,
            factory: None,
            screenshot_dir: None,
        })
    }

    /// Runs without a window: only ticks drive the world.
    pub fn headless(mut self) -> Self {
        self.headless = true;
        self
    }

    /// Uses `factory` instead of the native window backend.
    pub fn with_driver(mut self, factory: DriverFactory) -> Self {
        self.factory = Some(factory);
        self
    }

    /// Directory for screenshots written by headless `pause` calls.
    pub fn screenshot_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.screenshot_dir = Some(directory.into());
        self
    }

    pub fn tick(&self) -> Duration {
        self.tick
    }

    /// Runs `world` until it ends, then shows its ending message.
    pub fn run(self, world: Box<dyn World>) -> Result<Ending, WorldError> {
        let title = world.title();
        let canvas = match self.factory {
            Some(factory) => Canvas::with_driver(self.width, self.height, &title, factory),
            None => Canvas::with_title(self.width, self.height, &title),
        };
        if self.headless {
            canvas.set_headless_mode();
        }
        if let Some(directory) = self.screenshot_dir {
            canvas.set_screenshot_directory(directory);
        }
        canvas.open_window()?;
        info!(
            "BigBang: starting '{}' {}x{} every {:?}",
            title, self.width, self.height, self.tick
        );

        let (events_tx, events_rx) = mpsc::channel();
        let (done_tx, done_rx) = hand_off();
        let tick_pending = Arc::new(AtomicBool::new(false));

        let key_tx = events_tx.clone();
        canvas.add_key_listener(move |press| {
            let _ = key_tx.send(LoopEvent::Key(press.name()));
        });
        let click_tx = events_tx.clone();
        canvas.add_mouse_listener(move |click| {
            if click.button <= LAST_CLICK_BUTTON {
                let _ = click_tx.send(LoopEvent::Click(*click));
            }
        });
        let close_tx = events_tx.clone();
        canvas.add_window_listener(move |event| match event {
            WindowEvent::Closing => {
                let _ = close_tx.send(LoopEvent::WindowClosed);
            }
        });
        canvas.show();

        let dispatcher = Dispatcher::new(world, canvas.clone(), tick_pending.clone(), done_tx)
            .spawn(events_rx)
            .map_err(|e| WorldError::Display(format!("{:#}", e)))?;

        let tick_tx = events_tx.clone();
        let ticker = Ticker::spawn(self.tick, move || {
            // Coalesce: at most one tick waits in the queue.
            if tick_pending.swap(true, Ordering::SeqCst) {
                return true;
            }
            tick_tx.send(LoopEvent::Tick).is_ok()
        });
        let mut ticker = match ticker {
            Ok(ticker) => Some(ticker),
            Err(e) => {
                error!("BigBang: {:#}", e);
                let _ = events_tx.send(LoopEvent::Shutdown);
                None
            }
        };

        let last = match done_rx.take() {
            Ok(last) => Some(last),
            Err(e) => {
                warn!("BigBang: wait for the end of the world failed: {}", e);
                None
            }
        };
        if let Some(ticker) = ticker.as_mut() {
            ticker.stop();
        }
        let _ = events_tx.send(LoopEvent::Shutdown);
        if dispatcher.join().is_err() {
            error!("BigBang: event-dispatch thread panicked");
        }

        let message = last.map_or_else(|| INTERRUPTED_MESSAGE.to_string(), |w| w.ending_message());
        info!("BigBang: '{}' ended: {}", title, message);
        let acknowledged = canvas.dialog(&message);
        Ok(Ending {
            message,
            acknowledged,
        })
    }
}
