//! generator.rs
//! Periodic event source with its own start/stop lifecycle.
//! - fixed-interval ticker (`tokio::time::interval`, missed ticks skipped)
//! - non-blocking enqueue into queue A; a full queue drops the fresh event
//! - cancellation token checked before every tick and every send
//! - `stop()` closes the output only after the loop has fully exited

use std::time::Duration;

use log::{debug, error, info, warn};
use tokio::{
    select,
    sync::mpsc,
    task::JoinHandle,
    time::{self, Instant, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;

use crate::component_a::transmitter::{self, Transmitter};
use crate::model::event::Event;
use crate::utils::metrics::{SharedStats, Stage};

pub struct Generator {
    interval: Duration,
    deadline: Duration,
    tx: Option<Transmitter<Event>>,
    rx: Option<mpsc::Receiver<Event>>,
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
    stats: SharedStats,
}

impl Generator {
    /// `buffer_size` must be non-zero.
    pub fn new(interval: Duration, deadline: Duration, buffer_size: usize, stats: SharedStats) -> Self {
        let (mut generator, rx) = Self::with_receiver(interval, deadline, buffer_size, stats);
        generator.rx = Some(rx);
        generator
    }

    /// Like `new`, but hands the output receiver to the caller up front.
    pub fn with_receiver(
        interval: Duration,
        deadline: Duration,
        buffer_size: usize,
        stats: SharedStats,
    ) -> (Self, mpsc::Receiver<Event>) {
        let (tx, rx) = transmitter::bounded(buffer_size, Stage::Generator, stats.clone());
        let generator = Self {
            interval,
            deadline,
            tx: Some(tx),
            rx: None,
            cancel: CancellationToken::new(),
            handle: None,
            stats,
        };
        (generator, rx)
    }

    /// Spawns the ticking loop on the current tokio runtime. A second call is ignored.
    pub fn start(&mut self) {
        if self.handle.is_some() {
            warn!("[Generator] start() called twice; ignoring");
            return;
        }
        let Some(tx) = self.tx.clone() else {
            warn!("[Generator] start() after stop(); ignoring");
            return;
        };

        info!(
            "[Generator] started interval={:?} deadline={:?}",
            self.interval, self.deadline
        );
        self.handle = Some(tokio::spawn(run(
            self.interval,
            self.deadline,
            tx,
            self.cancel.clone(),
            self.stats.clone(),
        )));
    }

    /// Cancels the loop, waits for it to exit, then closes the output queue.
    pub async fn stop(&mut self) {
        self.cancel.cancel();

        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                error!("[Generator] production loop ended abnormally: {}", e);
            }
        }

        // Last sender: the loop's clone is gone, so this makes the stream terminal.
        self.tx = None;
        info!("[Generator] stopped");
    }

    /// Receive side of the output queue. Handed out once; the queue has a single reader.
    pub fn events(&mut self) -> Option<mpsc::Receiver<Event>> {
        self.rx.take()
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

async fn run(
    period: Duration,
    deadline: Duration,
    tx: Transmitter<Event>,
    cancel: CancellationToken,
    stats: SharedStats,
) {
    // First event one period after start, like a plain ticker.
    let mut ticker = time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        if cancel.is_cancelled() {
            break;
        }

        select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }

        if cancel.is_cancelled() {
            break;
        }

        let event = Event::new(deadline);
        stats.record_generated();
        if !tx.try_transmit(event) {
            debug!("[Generator] dropped event, {} dropped so far", stats.dropped(Stage::Generator));
        }
    }

    debug!("[Generator] production loop exited");
}
