//! driver.rs
//! Single-worker pull → classify → forward loop between queue A and queue B.
//! - processes one event at a time; the Processor never runs concurrently with itself
//! - forwards with the same drop-on-full policy as generation
//! - closes queue B once queue A is terminal and the last pulled event is forwarded

use log::{debug, info};
use tokio::{sync::mpsc::Receiver, task::JoinHandle, time::Instant};

use crate::component_a::{processor::Processor, transmitter::Transmitter};
use crate::model::event::Event;
use crate::utils::metrics::SharedStats;

pub struct Driver {
    rx: Receiver<Event>,
    processor: Processor,
    tx: Transmitter<Event>,
    stats: SharedStats,
}

impl Driver {
    pub fn new(
        rx: Receiver<Event>,
        processor: Processor,
        tx: Transmitter<Event>,
        stats: SharedStats,
    ) -> Self {
        Self {
            rx,
            processor,
            tx,
            stats,
        }
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Runs until the upstream queue is terminal. Consumes the driver so the
    /// sink-side sender is dropped, and queue B closed, when this returns.
    pub async fn run(mut self) {
        info!(
            "[Driver] started work={:?}",
            self.processor.work_duration()
        );

        while let Some(event) = self.rx.recv().await {
            let started = Instant::now();
            let labeled = self.processor.process_with_status(event).await;
            self.stats.record_processed(labeled.status(), started.elapsed());

            if !self.tx.try_transmit(labeled) {
                debug!("[Driver] sink queue full; labeled event dropped");
            }
        }

        info!(
            "[Driver] upstream closed after {} events; closing sink queue",
            self.stats.processed()
        );
    }
}
