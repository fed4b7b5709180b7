//! The event-dispatch thread of a running world.
//!
//! It owns the current world and is the only thread that transitions or
//! draws it, so transitions never overlap. Every event produces a new world
//! which is drawn and then becomes current. After a tick, a world that is no
//! longer in progress ends the loop; closing the window ends it at once with
//! a `StableWorld`. The final world is handed to the waiting `run` call.

use crate::canvas::Canvas;
use crate::display::MouseClick;
use crate::geometry::Posn;
use crate::handoff::HandOffSender;
use crate::world::{StableWorld, World, EXTERNAL_TERMINATION_MESSAGE};
use anyhow::{Context, Result};
use log::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Receiver;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Inputs to the dispatch thread.
#[derive(Debug, Clone, PartialEq)]
pub enum LoopEvent {
    Tick,
    /// A key press, by canonical name.
    Key(String),
    Click(MouseClick),
    WindowClosed,
    /// Stop without delivering a final world.
    Shutdown,
}

/// Maps a click in window pixels to world coordinates, truncating.
pub fn scale_click(click: &MouseClick, world_width: u32, world_height: u32) -> Posn {
    fn scale(world: u32, pixel: i32, window: u32) -> i32 {
        if window == 0 {
            return pixel;
        }
        (world as i64 * pixel as i64 / window as i64) as i32
    }
    Posn::new(
        scale(world_width, click.x, click.window_width),
        scale(world_height, click.y, click.window_height),
    )
}

pub struct Dispatcher {
    world: Option<Box<dyn World>>,
    canvas: Canvas,
    world_width: u32,
    world_height: u32,
    tick_pending: Arc<AtomicBool>,
    done: HandOffSender<Box<dyn World>>,
}

impl Dispatcher {
    pub fn new(
        world: Box<dyn World>,
        canvas: Canvas,
        tick_pending: Arc<AtomicBool>,
        done: HandOffSender<Box<dyn World>>,
    ) -> Self {
        let (world_width, world_height) = (canvas.logical_width(), canvas.logical_height());
        Self {
            world: Some(world),
            canvas,
            world_width,
            world_height,
            tick_pending,
            done,
        }
    }

    /// Runs the dispatcher on its own thread. The initial world is drawn
    /// before any event is handled.
    pub fn spawn(self, events: Receiver<LoopEvent>) -> Result<JoinHandle<()>> {
        thread::Builder::new()
            .name("event-dispatch".to_string())
            .spawn(move || self.run(events))
            .context("Failed to spawn event-dispatch thread")
    }

    fn run(mut self, events: Receiver<LoopEvent>) {
        if let Some(world) = &self.world {
            world.draw(&self.canvas);
        }
        while let Ok(event) = events.recv() {
            if !self.handle(event) {
                break;
            }
        }
        debug!("Dispatcher: exiting");
    }

    /// Applies one event. Returns false once the loop is over.
    pub fn handle(&mut self, event: LoopEvent) -> bool {
        let Some(world) = self.world.take() else {
            return false;
        };
        let next = match event {
            LoopEvent::Tick => {
                self.tick_pending.store(false, Ordering::SeqCst);
                trace!("Dispatcher: tick");
                let next = self.transition(world.on_tick());
                if !next.in_progress() {
                    info!("Dispatcher: world finished: {}", next.ending_message());
                    self.finish(next);
                    return false;
                }
                next
            }
            LoopEvent::Key(name) => {
                debug!("Dispatcher: key {}", name);
                self.transition(world.on_key_event(&name))
            }
            LoopEvent::Click(click) => {
                let location = scale_click(&click, self.world_width, self.world_height);
                debug!("Dispatcher: click {:?} -> {:?}", (click.x, click.y), location);
                self.transition(world.on_click(location))
            }
            LoopEvent::WindowClosed => {
                info!("Dispatcher: window closed, terminating world");
                self.finish(Box::new(StableWorld::new(EXTERNAL_TERMINATION_MESSAGE)));
                return false;
            }
            LoopEvent::Shutdown => return false,
        };
        self.world = Some(next);
        true
    }

    fn transition(&self, next: Box<dyn World>) -> Box<dyn World> {
        next.draw(&self.canvas);
        next
    }

    fn finish(&self, last: Box<dyn World>) {
        if !self.done.offer(last) {
            debug!("Dispatcher: loop already ended, dropping final world");
        }
    }

    /// The current world, if the loop is still running.
    pub fn world(&self) -> Option<&dyn World> {
        self.world.as_deref()
    }
}
