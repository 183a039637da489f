//! Pipeline counters and processing-latency window for operational visibility.
//!
//! Two kinds of state:
//! - **Counters:** lock-free `AtomicU64`s bumped by the stage that owns the outcome.
//! - **Latency window:** last 1000 processing latencies (µs) behind a short `parking_lot` lock.
//!
//! Drops are policy outcomes, not errors; they are only ever counted here.

use std::{
    collections::VecDeque,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use parking_lot::Mutex;
use serde::Serialize;

use crate::model::event::Status;

pub const MAX_POINTS: usize = 1_000;

/// Queue at which a drop happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Generator output (queue A).
    Generator,
    /// Driver output / delivery queue (queue B).
    Sink,
}

#[derive(Debug, Default)]
pub struct PipelineStats {
    generated: AtomicU64,
    generator_dropped: AtomicU64,
    processed: AtomicU64,
    on_time: AtomicU64,
    late: AtomicU64,
    sink_dropped: AtomicU64,
    delivered: AtomicU64,
    latency_us: Mutex<VecDeque<u64>>,
}

pub type SharedStats = Arc<PipelineStats>;

impl PipelineStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedStats {
        Arc::new(Self::new())
    }

    #[inline]
    pub fn record_generated(&self) {
        self.generated.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_drop(&self, stage: Stage) {
        match stage {
            Stage::Generator => self.generator_dropped.fetch_add(1, Ordering::Relaxed),
            Stage::Sink => self.sink_dropped.fetch_add(1, Ordering::Relaxed),
        };
    }

    /// Counts one classification and keeps its latency for the summary.
    pub fn record_processed(&self, status: Status, elapsed: Duration) {
        self.processed.fetch_add(1, Ordering::Relaxed);
        match status {
            Status::OnTime => self.on_time.fetch_add(1, Ordering::Relaxed),
            Status::Late => self.late.fetch_add(1, Ordering::Relaxed),
            Status::Unset => 0,
        };
        let us = u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX);
        push_capped_u64(&mut self.latency_us.lock(), us);
    }

    #[inline]
    pub fn record_delivered(&self) {
        self.delivered.fetch_add(1, Ordering::Relaxed);
    }

    pub fn generated(&self) -> u64 {
        self.generated.load(Ordering::Relaxed)
    }

    pub fn dropped(&self, stage: Stage) -> u64 {
        match stage {
            Stage::Generator => self.generator_dropped.load(Ordering::Relaxed),
            Stage::Sink => self.sink_dropped.load(Ordering::Relaxed),
        }
    }

    pub fn processed(&self) -> u64 {
        self.processed.load(Ordering::Relaxed)
    }

    pub fn delivered(&self) -> u64 {
        self.delivered.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        let processed = self.processed();
        let late = self.late.load(Ordering::Relaxed);

        let (avg_latency_us, max_latency_us) = {
            let window = self.latency_us.lock();
            if window.is_empty() {
                (0, 0)
            } else {
                let sum: u64 = window.iter().sum();
                (sum / window.len() as u64, window.iter().copied().max().unwrap_or(0))
            }
        };

        StatsSnapshot {
            generated: self.generated(),
            generator_dropped: self.dropped(Stage::Generator),
            processed,
            on_time: self.on_time.load(Ordering::Relaxed),
            late,
            late_rate: if processed > 0 {
                (late as f64 / processed as f64) * 100.0
            } else {
                0.0
            },
            sink_dropped: self.dropped(Stage::Sink),
            delivered: self.delivered(),
            avg_latency_us,
            max_latency_us,
        }
    }
}

/// Point-in-time copy of the counters, served as `/metrics.json`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsSnapshot {
    pub generated: u64,
    pub generator_dropped: u64,
    pub processed: u64,
    pub on_time: u64,
    pub late: u64,
    /// Percentage of processed events classified late.
    pub late_rate: f64,
    pub sink_dropped: u64,
    pub delivered: u64,
    pub avg_latency_us: u64,
    pub max_latency_us: u64,
}

/// Appends value to a bounded buffer; removes oldest if at capacity.
#[inline]
pub fn push_capped_u64(buf: &mut VecDeque<u64>, val: u64) {
    if buf.len() >= MAX_POINTS {
        buf.pop_front();
    }
    buf.push_back(val);
}
