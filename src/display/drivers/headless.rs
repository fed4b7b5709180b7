//! Headless display driver: a window that is never shown.
//!
//! Used when no native windowing backend is compiled in. It produces no
//! input, and every dialog is acknowledged as soon as it opens, so code that
//! waits on a dialog never hangs.

use crate::display::driver::DisplayDriver;
use crate::display::messages::{DisplayError, DisplayEvent, DriverRequest, DriverResponse};
use anyhow::Result;
use log::{info, trace};

pub struct HeadlessDisplayDriver {
    width_px: u32,
    height_px: u32,
    pending: Vec<DisplayEvent>,
}

impl DisplayDriver for HeadlessDisplayDriver {
    fn new() -> Result<Self> {
        info!("HeadlessDisplayDriver::new()");
        Ok(Self {
            width_px: 0,
            height_px: 0,
            pending: Vec::new(),
        })
    }

    fn handle_request(&mut self, request: DriverRequest) -> Result<DriverResponse, DisplayError> {
        match request {
            DriverRequest::Init(config) => {
                info!(
                    "HeadlessDisplayDriver: Init '{}' {}x{}",
                    config.title, config.width_px, config.height_px
                );
                self.width_px = config.width_px;
                self.height_px = config.height_px;
                Ok(DriverResponse::InitComplete {
                    width_px: self.width_px,
                    height_px: self.height_px,
                    scale_factor: 1.0,
                })
            }
            DriverRequest::PollEvents => Ok(DriverResponse::Events(std::mem::take(&mut self.pending))),
            DriverRequest::Present(frame) => {
                trace!("HeadlessDisplayDriver: Present");
                Ok(DriverResponse::PresentComplete(frame))
            }
            DriverRequest::SetTitle(title) => {
                info!("HeadlessDisplayDriver: SetTitle '{}'", title);
                Ok(DriverResponse::TitleSet)
            }
            DriverRequest::SetVisible(visible) => {
                info!("HeadlessDisplayDriver: SetVisible {}", visible);
                Ok(DriverResponse::VisibilitySet)
            }
            DriverRequest::OpenDialog(spec) => {
                info!("HeadlessDisplayDriver: dialog '{}': {}", spec.title, spec.message);
                self.pending.push(DisplayEvent::DialogAcknowledged);
                Ok(DriverResponse::DialogOpened)
            }
            DriverRequest::CloseDialog => Ok(DriverResponse::DialogClosed),
        }
    }
}
