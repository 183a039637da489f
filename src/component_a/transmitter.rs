//! transmitter.rs
//! Explicit non-blocking enqueue into a bounded queue.
//! - `try_transmit` either enqueues immediately or drops the item
//! - drops are counted against the owning stage, never retried
//! - the queue closes once every `Transmitter` clone is dropped

use log::debug;
use tokio::sync::mpsc::{self, Sender, error::TrySendError};

use crate::utils::metrics::{SharedStats, Stage};

#[derive(Debug)]
pub struct Transmitter<T> {
    tx: Sender<T>,
    stage: Stage,
    stats: SharedStats,
}

impl<T> Clone for Transmitter<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
            stage: self.stage,
            stats: self.stats.clone(),
        }
    }
}

/// Bounded single-producer/single-consumer handoff with a drop-on-full producer side.
///
/// Panics if `capacity` is zero; `Config::validate` rules that out upstream.
pub fn bounded<T>(
    capacity: usize,
    stage: Stage,
    stats: SharedStats,
) -> (Transmitter<T>, mpsc::Receiver<T>) {
    let (tx, rx) = mpsc::channel(capacity);
    (Transmitter { tx, stage, stats }, rx)
}

impl<T> Transmitter<T> {
    /// Attempts to enqueue without waiting. Returns `false` when the item was dropped.
    pub fn try_transmit(&self, item: T) -> bool {
        match self.tx.try_send(item) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                self.stats.record_drop(self.stage);
                debug!("[{:?}] queue full, item dropped", self.stage);
                false
            }
            Err(TrySendError::Closed(_)) => {
                self.stats.record_drop(self.stage);
                debug!("[{:?}] queue closed, item dropped", self.stage);
                false
            }
        }
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}
