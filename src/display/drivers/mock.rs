// src/display/drivers/mock.rs

//! Scriptable display driver for tests and simulations.
//!
//! A `MockHandle` shares state with every driver built from it: tests push
//! input events through the handle and inspect what was presented, titled
//! and shown.

use crate::display::driver::{DisplayDriver, DriverFactory};
use crate::display::messages::{
    DisplayError, DisplayEvent, DriverConfig, DriverRequest, DriverResponse, Frame,
};
use crate::keys::{KeySymbol, Modifiers};
use anyhow::Result;
use log::trace;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

/// What the mock does when a dialog opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DialogPolicy {
    /// Queue `DialogAcknowledged` immediately.
    #[default]
    Acknowledge,
    /// Queue `DialogDismissed` immediately.
    Dismiss,
    /// Leave the dialog open until the test resolves it.
    Hold,
}

#[derive(Debug, Default)]
struct MockState {
    pending: VecDeque<DisplayEvent>,
    window_size: Option<(u32, u32)>,
    dialog_policy: DialogPolicy,
    init: Option<DriverConfig>,
    presents: usize,
    last_frame: Option<Frame>,
    titles: Vec<String>,
    visible: bool,
    dialogs: Vec<String>,
    dialog_open: bool,
}

/// Shared control surface for `MockDisplayDriver`s.
#[derive(Debug, Clone, Default)]
pub struct MockHandle {
    state: Arc<Mutex<MockState>>,
}

impl MockHandle {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// A factory producing drivers bound to this handle.
    pub fn factory(&self) -> DriverFactory {
        let handle = self.clone();
        Box::new(move || Ok(Box::new(MockDisplayDriver::with_handle(handle)) as _))
    }

    pub fn push_event(&self, event: DisplayEvent) {
        self.state().pending.push_back(event);
    }

    pub fn press_key(&self, symbol: KeySymbol) {
        let text = match symbol {
            KeySymbol::Char(ch) => Some(ch.to_string()),
            _ => None,
        };
        self.push_event(DisplayEvent::Key {
            symbol,
            modifiers: Modifiers::empty(),
            text,
        });
    }

    /// Left click at window pixel `(x, y)`.
    pub fn click(&self, x: i32, y: i32) {
        self.push_event(DisplayEvent::MouseButtonPress {
            button: 0,
            x,
            y,
            modifiers: Modifiers::empty(),
        });
    }

    pub fn close_window(&self) {
        self.push_event(DisplayEvent::CloseRequested);
    }

    pub fn acknowledge_dialog(&self) {
        self.push_event(DisplayEvent::DialogAcknowledged);
    }

    pub fn dismiss_dialog(&self) {
        self.push_event(DisplayEvent::DialogDismissed);
    }

    /// Window size reported by `Init`, or a `Resize` if already initialised.
    pub fn set_window_size(&self, width_px: u32, height_px: u32) {
        let mut state = self.state();
        state.window_size = Some((width_px, height_px));
        if state.init.is_some() {
            state
                .pending
                .push_back(DisplayEvent::Resize { width_px, height_px });
        }
    }

    pub fn set_dialog_policy(&self, policy: DialogPolicy) {
        self.state().dialog_policy = policy;
    }

    /// Config of the last `Init`, if any.
    pub fn init_config(&self) -> Option<DriverConfig> {
        self.state().init.clone()
    }

    /// Messages of every dialog opened so far, in order.
    pub fn dialogs(&self) -> Vec<String> {
        self.state().dialogs.clone()
    }

    pub fn dialog_open(&self) -> bool {
        self.state().dialog_open
    }

    pub fn present_count(&self) -> usize {
        self.state().presents
    }

    pub fn last_frame(&self) -> Option<Frame> {
        self.state().last_frame.clone()
    }

    pub fn titles(&self) -> Vec<String> {
        self.state().titles.clone()
    }

    pub fn is_visible(&self) -> bool {
        self.state().visible
    }

    /// True once every pushed event has been polled.
    pub fn drained(&self) -> bool {
        self.state().pending.is_empty()
    }
}

/// Display driver whose window exists only in a `MockHandle`.
pub struct MockDisplayDriver {
    handle: MockHandle,
}

impl MockDisplayDriver {
    pub fn with_handle(handle: MockHandle) -> Self {
        Self { handle }
    }

    pub fn handle(&self) -> &MockHandle {
        &self.handle
    }
}

impl DisplayDriver for MockDisplayDriver {
    fn new() -> Result<Self> {
        Ok(Self::with_handle(MockHandle::new()))
    }

    fn handle_request(&mut self, request: DriverRequest) -> Result<DriverResponse, DisplayError> {
        let mut state = self.handle.state();
        trace!("MockDisplayDriver: {:?}", request);
        match request {
            DriverRequest::Init(config) => {
                let (width_px, height_px) = state
                    .window_size
                    .unwrap_or((config.width_px, config.height_px));
                state.titles.push(config.title.clone());
                state.init = Some(config);
                Ok(DriverResponse::InitComplete {
                    width_px,
                    height_px,
                    scale_factor: 1.0,
                })
            }
            DriverRequest::PollEvents => {
                Ok(DriverResponse::Events(state.pending.drain(..).collect()))
            }
            DriverRequest::Present(frame) => {
                state.presents += 1;
                state.last_frame = Some(frame.clone());
                Ok(DriverResponse::PresentComplete(frame))
            }
            DriverRequest::SetTitle(title) => {
                state.titles.push(title);
                Ok(DriverResponse::TitleSet)
            }
            DriverRequest::SetVisible(visible) => {
                state.visible = visible;
                Ok(DriverResponse::VisibilitySet)
            }
            DriverRequest::OpenDialog(spec) => {
                state.dialogs.push(spec.message);
                state.dialog_open = true;
                match state.dialog_policy {
                    DialogPolicy::Acknowledge => {
                        state.pending.push_back(DisplayEvent::DialogAcknowledged)
                    }
                    DialogPolicy::Dismiss => state.pending.push_back(DisplayEvent::DialogDismissed),
                    DialogPolicy::Hold => {}
                }
                Ok(DriverResponse::DialogOpened)
            }
            DriverRequest::CloseDialog => {
                state.dialog_open = false;
                Ok(DriverResponse::DialogClosed)
            }
        }
    }
}
