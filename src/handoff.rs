// src/handoff.rs

//! Single-slot, one-shot hand-off between threads.
//!
//! Used for loop termination and for pause dialogs: one side blocks in
//! [`HandOffReceiver::take`] until another thread offers a value. The slot
//! holds at most one value and the first offer wins. Later offers never
//! block and never displace the first; they are dropped and reported as
//! not delivered.

use crate::error::WorldError;
use log::{debug, trace};
use std::sync::mpsc::{self, Receiver, SyncSender, TryRecvError, TrySendError};

/// Creates a connected sender/receiver pair.
pub fn hand_off<T>() -> (HandOffSender<T>, HandOffReceiver<T>) {
    let (tx, rx) = mpsc::sync_channel(1);
    (HandOffSender { tx }, HandOffReceiver { rx })
}

/// The producing side. Cloneable so several event sources can race to
/// deliver the one value.
#[derive(Debug)]
pub struct HandOffSender<T> {
    tx: SyncSender<T>,
}

impl<T> Clone for HandOffSender<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<T> HandOffSender<T> {
    /// Offers `value`. Returns `true` if it became the delivered value,
    /// `false` if the slot was already filled or the receiver is gone.
    pub fn offer(&self, value: T) -> bool {
        match self.tx.try_send(value) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                trace!("HandOff: slot already filled, dropping redundant offer");
                false
            }
            Err(TrySendError::Disconnected(_)) => {
                debug!("HandOff: receiver gone, dropping offer");
                false
            }
        }
    }
}

/// The consuming side.
#[derive(Debug)]
pub struct HandOffReceiver<T> {
    rx: Receiver<T>,
}

impl<T> HandOffReceiver<T> {
    /// Blocks until a value is offered. Consumes the receiver, so exactly one
    /// value is ever taken.
    ///
    /// Fails with `InterruptedWait` when every sender was dropped without
    /// offering anything.
    pub fn take(self) -> Result<T, WorldError> {
        self.rx.recv().map_err(|_| WorldError::InterruptedWait)
    }

    /// Non-blocking check.
    pub fn try_take(&self) -> Result<Option<T>, WorldError> {
        match self.rx.try_recv() {
            Ok(value) => Ok(Some(value)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(WorldError::InterruptedWait),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test_log::test]
    fn first_offer_wins_and_later_offers_do_not_block() {
        let (tx, rx) = hand_off();
        assert!(tx.offer("tick"));
        assert!(!tx.offer("close"));
        assert!(!tx.clone().offer("again"));
        assert_eq!(rx.take().unwrap(), "tick");
        // Receiver consumed: offers still return immediately.
        assert!(!tx.offer("late"));
    }

    #[test_log::test]
    fn take_blocks_until_another_thread_offers() {
        let (tx, rx) = hand_off();
        let producer = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            tx.offer(42)
        });
        assert_eq!(rx.take().unwrap(), 42);
        assert!(producer.join().unwrap());
    }

    #[test_log::test]
    fn racing_producers_deliver_exactly_one_value() {
        let (tx, rx) = hand_off();
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let tx = tx.clone();
                thread::spawn(move || tx.offer(i))
            })
            .collect();
        drop(tx);
        let delivered: usize = handles
            .into_iter()
            .map(|h| h.join().unwrap() as usize)
            .sum();
        assert_eq!(delivered, 1);
        assert!(rx.take().is_ok());
    }

    #[test_log::test]
    fn dropped_senders_interrupt_the_wait() {
        let (tx, rx) = hand_off::<u8>();
        drop(tx);
        assert!(matches!(rx.take(), Err(WorldError::InterruptedWait)));
    }

    #[test_log::test]
    fn try_take_reports_absence_then_the_value() {
        let (tx, rx) = hand_off::<u8>();
        assert_eq!(rx.try_take().unwrap(), None);
        tx.offer(7);
        assert_eq!(rx.try_take().unwrap(), Some(7));
    }
}
