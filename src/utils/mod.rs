// Utilities: pipeline counters and latency window shared by all stages.

pub mod metrics;
