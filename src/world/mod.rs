// src/world/mod.rs

//! Worlds: immutable simulation states advanced by ticks, keys and clicks.
//!
//! A world never changes in place. Each transition consumes the current
//! value and returns the next one, which may be the same box handed back.
//! `big_bang` runs the loop until a tick yields a world that is no longer in
//! progress, or the window is closed.

mod big_bang;
mod dispatch;
mod ticker;

#[cfg(test)]
mod tests;

pub use big_bang::{BigBang, Ending};
pub use dispatch::{scale_click, Dispatcher, LoopEvent};
pub use ticker::Ticker;

use crate::canvas::Canvas;
use crate::error::WorldError;
use crate::geometry::Posn;

/// Ending message of a world that does not override `ending_message`.
pub const DEFAULT_ENDING_MESSAGE: &str = "This is the end of the world.";

/// Ending message when the window is closed under a running world.
pub const EXTERNAL_TERMINATION_MESSAGE: &str = "The world has been terminated by the external force.";

/// Ending message when the loop's wait is cut short.
pub const INTERRUPTED_MESSAGE: &str = "The world has been interrupted.";

/// Upcasts a boxed concrete world. Implemented for every `World`, so
/// default methods can hand `self` back as `Box<dyn World>`.
pub trait IntoWorld {
    fn into_world(self: Box<Self>) -> Box<dyn World>;
}

impl<W: World> IntoWorld for W {
    fn into_world(self: Box<Self>) -> Box<dyn World> {
        self
    }
}

/// A state of an interactive simulation.
pub trait World: IntoWorld + Send + 'static {
    /// The world one tick later.
    fn on_tick(self: Box<Self>) -> Box<dyn World>;

    /// The world after the key named `key` was pressed (see
    /// [`crate::keys::key_event_name`]).
    fn on_key_event(self: Box<Self>, key: &str) -> Box<dyn World>;

    /// The world after a click at `location`, in world coordinates.
    fn on_click(self: Box<Self>, location: Posn) -> Box<dyn World> {
        let _ = location;
        self.into_world()
    }

    /// Renders this world onto `canvas`.
    fn draw(&self, canvas: &Canvas) -> bool;

    fn in_progress(&self) -> bool {
        true
    }

    fn ending_message(&self) -> String {
        DEFAULT_ENDING_MESSAGE.to_string()
    }

    /// A terminal world carrying `message`.
    fn end_of_world(&self, message: &str) -> Box<dyn World> {
        Box::new(StableWorld::new(message))
    }

    /// Window title: the type's name without its module path.
    fn title(&self) -> String {
        short_type_name(std::any::type_name::<Self>()).to_string()
    }

    /// Opens a `width` x `height` window and runs the world in it, ticking
    /// every `tick_seconds`. Blocks until the world ends and its ending
    /// message has been shown.
    fn big_bang(self, width: i32, height: i32, tick_seconds: f64) -> Result<bool, WorldError>
    where
        Self: Sized,
    {
        BigBang::new(width, height, tick_seconds)?.run(Box::new(self))?;
        Ok(true)
    }
}

/// `"a::b::Name<c::D>"` -> `"Name"`.
pub fn short_type_name(full: &str) -> &str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

/// A finished world: ignores every event and reports `message` as its
/// ending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StableWorld {
    message: String,
}

impl StableWorld {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl World for StableWorld {
    fn on_tick(self: Box<Self>) -> Box<dyn World> {
        self
    }

    fn on_key_event(self: Box<Self>, _key: &str) -> Box<dyn World> {
        self
    }

    fn draw(&self, _canvas: &Canvas) -> bool {
        true
    }

    fn in_progress(&self) -> bool {
        false
    }

    fn ending_message(&self) -> String {
        self.message.clone()
    }
}
