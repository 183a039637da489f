//! Processor: simulate bounded work and classify each event against its deadline.
//!
//! Deadline race: a spawned simulated-work task runs while two local timers,
//! armed from the same start instant, race: work completion vs. the deadline.
//! First signal wins: work → `OnTime`, deadline → `Late`. Both timers live on
//! the same driver and the race polls the work signal first, so identical
//! durations always classify as `OnTime`.
//! Misses are ordinary results; `process` has no error path.

use std::time::Duration;

use tokio::{
    select,
    time::{self, Instant},
};

use crate::model::event::{Event, Status};

/// What happens to a work task that lost the race to its deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OverrunPolicy {
    /// Abort the losing task; bounds the number of live tasks under sustained lateness.
    #[default]
    Abort,
    /// Let it run to completion and discard its result.
    Detach,
}

#[derive(Debug, Clone)]
pub struct Processor {
    work_duration: Duration,
    overrun: OverrunPolicy,
}

impl Processor {
    pub fn new(work_duration: Duration) -> Self {
        Self {
            work_duration,
            overrun: OverrunPolicy::default(),
        }
    }

    pub fn with_overrun_policy(mut self, overrun: OverrunPolicy) -> Self {
        self.overrun = overrun;
        self
    }

    pub fn work_duration(&self) -> Duration {
        self.work_duration
    }

    /// Races simulated work against `event.deadline` and returns the outcome.
    pub async fn process(&self, event: &Event) -> Status {
        let start = Instant::now();
        let work_until = start + self.work_duration;
        let deadline = time::sleep_until(start + event.deadline);
        let work_done = time::sleep_until(work_until);
        tokio::pin!(deadline, work_done);

        let work = tokio::spawn(async move {
            time::sleep_until(work_until).await;
        });

        let status = select! {
            biased;
            _ = &mut work_done => Status::OnTime,
            _ = &mut deadline => Status::Late,
        };

        // Dropping the handle detaches; an on-time task is finishing anyway.
        if status == Status::Late && self.overrun == OverrunPolicy::Abort {
            work.abort();
        }
        status
    }

    /// Labeled copy of `event`.
    pub async fn process_with_status(&self, event: Event) -> Event {
        let status = self.process(&event).await;
        event.with_status(status)
    }
}
