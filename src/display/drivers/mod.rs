// src/display/drivers/mod.rs
//! Platform-specific display driver implementations.

pub mod headless;
pub mod mock;
#[cfg(feature = "x11")]
pub mod x11;

pub use headless::HeadlessDisplayDriver;
pub use mock::{DialogPolicy, MockDisplayDriver, MockHandle};
#[cfg(feature = "x11")]
pub use x11::X11DisplayDriver;

use crate::display::driver::{factory_for, DriverFactory};

/// Factory for the windowing backend compiled into this build.
#[cfg(feature = "x11")]
pub fn native_factory() -> DriverFactory {
    factory_for::<X11DisplayDriver>()
}

/// Factory for the windowing backend compiled into this build.
#[cfg(not(feature = "x11"))]
pub fn native_factory() -> DriverFactory {
    log::warn!("No windowing backend compiled in (enable the `x11` feature); windows stay invisible");
    factory_for::<HeadlessDisplayDriver>()
}
