//! Fixed-rate timer thread driving `World::on_tick`.
//!
//! Deadlines advance by exactly one interval per tick, so a slow tick does
//! not shift the schedule. If the thread falls more than an interval behind,
//! the missed ticks are dropped rather than fired in a burst.
//!
//! Stopping is prompt: the thread waits on a stop channel with a timeout
//! instead of sleeping, and `stop` joins it, so no tick fires after `stop`
//! returns.

use anyhow::{Context, Result};
use log::*;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

pub struct Ticker {
    stop_tx: Option<Sender<()>>,
    thread_handle: Option<JoinHandle<()>>,
}

impl Ticker {
    /// Spawns the ticker. `on_tick` runs on the ticker thread every
    /// `interval`; returning false stops the ticker.
    pub fn spawn(interval: Duration, mut on_tick: impl FnMut() -> bool + Send + 'static) -> Result<Self> {
        let (stop_tx, stop_rx) = mpsc::channel::<()>();

        let thread_handle = thread::Builder::new()
            .name("ticker".to_string())
            .spawn(move || {
                info!("Ticker: Started (interval: {:?})", interval);
                let mut deadline = Instant::now() + interval;
                loop {
                    let timeout = deadline.saturating_duration_since(Instant::now());
                    match stop_rx.recv_timeout(timeout) {
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                        Err(RecvTimeoutError::Timeout) => {}
                    }
                    if !on_tick() {
                        debug!("Ticker: receiver gone, exiting");
                        break;
                    }
                    deadline += interval;
                    let now = Instant::now();
                    if deadline < now {
                        trace!("Ticker: behind schedule, skipping missed ticks");
                        deadline = now + interval;
                    }
                }
                debug!("Ticker: Thread exiting");
            })
            .context("Failed to spawn ticker thread")?;

        Ok(Self {
            stop_tx: Some(stop_tx),
            thread_handle: Some(thread_handle),
        })
    }

    /// Stops the ticker and waits for its thread. Idempotent.
    pub fn stop(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }
        if let Some(handle) = self.thread_handle.take() {
            if let Err(e) = handle.join() {
                error!("Ticker thread panicked: {:?}", e);
            }
        }
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.stop();
    }
}
