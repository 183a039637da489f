// End-to-end pipeline scenarios on a paused tokio clock: generation cadence,
// deadline classification, drop accounting, ordering and shutdown.

use std::{collections::HashSet, time::Duration};

use soft_rts::{
    Config, Event, Pipeline, Status,
    component_a::processor::OverrunPolicy,
    utils::metrics::{PipelineStats, Stage},
};
use tokio::{sync::mpsc::Receiver, time};

fn config(interval_ms: u64, deadline_ms: u64, work_ms: u64, buffer_size: usize) -> Config {
    Config {
        interval_ms,
        deadline_ms,
        work_ms,
        buffer_size,
        ..Config::default()
    }
}

async fn drain(rx: &mut Receiver<Event>) -> Vec<Event> {
    let mut out = Vec::new();
    while let Some(ev) = rx.recv().await {
        out.push(ev);
    }
    out
}

#[tokio::test(start_paused = true)]
async fn fast_work_is_always_on_time() {
    let stats = PipelineStats::shared();
    let (mut pipeline, mut rx) = Pipeline::start(&config(50, 100, 50, 100), stats.clone()).unwrap();

    time::sleep(Duration::from_millis(1_010)).await;
    pipeline.shutdown().await;

    let events = drain(&mut rx).await;
    assert_eq!(events.len(), 20);
    assert!(events.iter().all(|e| e.status() == Status::OnTime));
    assert_eq!(stats.generated(), 20);
    assert_eq!(stats.dropped(Stage::Generator), 0);
    assert_eq!(stats.dropped(Stage::Sink), 0);
}

#[tokio::test(start_paused = true)]
async fn slow_work_is_always_late() {
    let stats = PipelineStats::shared();
    let (mut pipeline, mut rx) = Pipeline::start(&config(50, 100, 120, 100), stats.clone()).unwrap();

    time::sleep(Duration::from_millis(1_010)).await;
    pipeline.shutdown().await;

    let events = drain(&mut rx).await;
    assert_eq!(events.len(), 20);
    assert!(events.iter().all(|e| e.status() == Status::Late));
    assert_eq!(stats.snapshot().late_rate, 100.0);
}

#[tokio::test(start_paused = true)]
async fn detached_overruns_classify_the_same() {
    let cfg = Config {
        overrun_policy: OverrunPolicy::Detach,
        ..config(50, 100, 120, 100)
    };
    let (mut pipeline, mut rx) = Pipeline::start(&cfg, PipelineStats::shared()).unwrap();

    time::sleep(Duration::from_millis(510)).await;
    pipeline.shutdown().await;

    let events = drain(&mut rx).await;
    assert_eq!(events.len(), 10);
    assert!(events.iter().all(|e| e.status() == Status::Late));
}

#[tokio::test(start_paused = true)]
async fn overload_drops_but_never_reorders_or_duplicates() {
    let stats = PipelineStats::shared();
    let (mut pipeline, mut rx) = Pipeline::start(&config(10, 100, 30, 5), stats.clone()).unwrap();

    let reader = tokio::spawn(async move { drain(&mut rx).await });

    time::sleep(Duration::from_secs(2)).await;
    pipeline.shutdown().await;
    let events = reader.await.unwrap();

    assert!(stats.dropped(Stage::Generator) > 0);
    assert!(events.windows(2).all(|w| w[0].created_at <= w[1].created_at));
    let ids: HashSet<&str> = events.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids.len(), events.len());
    assert!(events.iter().all(|e| !e.status().is_unset()));

    // Every generated event is accounted for exactly once.
    let s = stats.snapshot();
    assert_eq!(s.generated, s.processed + s.generator_dropped);
    assert_eq!(s.processed, events.len() as u64 + s.sink_dropped);
}

#[tokio::test(start_paused = true)]
async fn unread_sink_does_not_stall_the_pipeline() {
    let stats = PipelineStats::shared();
    let (mut pipeline, mut rx) = Pipeline::start(&config(10, 100, 5, 2), stats.clone()).unwrap();

    time::sleep(Duration::from_secs(1)).await;
    time::timeout(Duration::from_secs(60), pipeline.shutdown())
        .await
        .expect("shutdown stalled behind a full sink queue");

    assert!(stats.dropped(Stage::Sink) > 0);
    let events = drain(&mut rx).await;
    assert_eq!(events.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn nothing_is_produced_after_shutdown() {
    let stats = PipelineStats::shared();
    let (mut pipeline, mut rx) = Pipeline::start(&config(20, 100, 5, 50), stats.clone()).unwrap();

    time::sleep(Duration::from_millis(200)).await;
    pipeline.shutdown().await;
    let generated = stats.generated();

    drain(&mut rx).await;
    time::sleep(Duration::from_secs(1)).await;
    assert_eq!(stats.generated(), generated);
    assert!(rx.recv().await.is_none());
}

#[tokio::test]
async fn invalid_config_is_rejected_before_start() {
    let result = Pipeline::start(&config(50, 100, 50, 0), PipelineStats::shared());
    assert!(matches!(result, Err(soft_rts::Error::InvalidConfig(_))));
}
