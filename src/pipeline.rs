//! Pipeline wiring: Generator → queue A → Driver/Processor → queue B → sink.
//!
//! `Pipeline::start` spawns the generator loop and the driver task and hands
//! back the receive side of queue B for the delivery sink. `shutdown` stops
//! generation first, then waits for the driver to drain its last in-flight
//! event and close queue B.

use log::{error, info};
use tokio::{sync::mpsc, task::JoinHandle};

use crate::component_a::{
    driver::Driver,
    generator::Generator,
    processor::Processor,
    transmitter,
};
use crate::config::Config;
use crate::error::Result;
use crate::model::event::Event;
use crate::utils::metrics::{SharedStats, Stage};

pub struct Pipeline {
    generator: Generator,
    driver: Option<JoinHandle<()>>,
    stats: SharedStats,
}

impl Pipeline {
    /// Starts both stages on the current runtime. Returns the pipeline handle
    /// and the single receiver of labeled events.
    pub fn start(config: &Config, stats: SharedStats) -> Result<(Self, mpsc::Receiver<Event>)> {
        config.validate()?;

        let (mut generator, upstream) = Generator::with_receiver(
            config.interval(),
            config.deadline(),
            config.buffer_size,
            stats.clone(),
        );

        let (sink_tx, sink_rx) = transmitter::bounded(config.buffer_size, Stage::Sink, stats.clone());
        let processor = Processor::new(config.work_duration()).with_overrun_policy(config.overrun_policy);

        generator.start();
        let driver = Driver::new(upstream, processor, sink_tx, stats.clone()).spawn();

        info!(
            "[Pipeline] running interval={:?} deadline={:?} work={:?} buffer={}",
            config.interval(),
            config.deadline(),
            config.work_duration(),
            config.buffer_size
        );

        Ok((
            Self {
                generator,
                driver: Some(driver),
                stats,
            },
            sink_rx,
        ))
    }

    /// Stops generation and waits for the driver to finish its final event.
    /// Queue B is terminal once this returns.
    pub async fn shutdown(&mut self) {
        self.generator.stop().await;

        if let Some(driver) = self.driver.take() {
            if let Err(e) = driver.await {
                error!("[Pipeline] driver task ended abnormally: {}", e);
            }
        }

        let s = self.stats.snapshot();
        info!(
            "[Pipeline] stopped generated={} processed={} on_time={} late={} dropped(gen={}, sink={})",
            s.generated, s.processed, s.on_time, s.late, s.generator_dropped, s.sink_dropped
        );
    }
}
