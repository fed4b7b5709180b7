// src/lib.rs

//! A small teaching graphics library.
//!
//! A [`Canvas`] is a fixed-size off-screen image shown in a window; shapes
//! and text drawn on it appear on the next repaint. A [`World`] is an
//! immutable simulation state: [`World::big_bang`] opens a canvas and
//! advances the world on every tick, key press and mouse click until it
//! ends, then shows its ending message.
//!
//! Set `DRAW_WORLD_HEADLESS=1` to run without a window; paused canvases
//! then write PNG screenshots instead of blocking.

pub mod canvas;
pub mod color;
pub mod config;
pub mod display;
pub mod error;
pub mod geometry;
pub mod handoff;
pub mod keys;
pub mod placement;
pub mod raster;
pub mod screenshot;
pub mod world;

#[cfg(test)]
pub(crate) mod test_support;

pub use canvas::Canvas;
pub use color::{Color, Rgb};
pub use config::{Config, CONFIG};
pub use error::WorldError;
pub use geometry::Posn;
pub use world::{BigBang, Ending, StableWorld, World};
