/*
Measures the fixed overhead of one deadline race (spawn simulated work, arm the
deadline timer, select the winner) with zero-length work, plus the late path
where the deadline is already due and the losing work task is aborted.
*/
use criterion::{criterion_group, criterion_main, Criterion};

use soft_rts::{
    component_a::processor::Processor,
    model::event::Event,
};

use std::{hint::black_box, time::Duration};

fn bench_processing(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    let instant_work = Processor::new(Duration::ZERO);
    let generous = Event::new(Duration::from_secs(1));
    c.bench_function("deadline_race_on_time", |b| {
        b.to_async(&rt).iter(|| {
            let (p, ev) = (&instant_work, &generous);
            async move { black_box(p.process(black_box(ev)).await) }
        });
    });

    let slow_work = Processor::new(Duration::from_millis(10));
    let expired = Event::new(Duration::ZERO);
    c.bench_function("deadline_race_late_abort", |b| {
        b.to_async(&rt).iter(|| {
            let (p, ev) = (&slow_work, &expired);
            async move { black_box(p.process(black_box(ev)).await) }
        });
    });
}

criterion_group!(benches, bench_processing);
criterion_main!(benches);
