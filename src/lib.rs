//! # Soft Real-Time Event Pipeline
//!
//! Continuously generates timestamped events with a deadline budget, races a
//! simulated bounded-duration task against each deadline, and streams the
//! labeled (`on-time` / `late`) events to one external consumer.
//!
//! ## Key Architecture
//! - **Generator:** ticks events into bounded queue A; drops on full.
//! - **Driver + Processor:** single worker; deadline race per event; forwards into queue B; drops on full.
//! - **Delivery sink:** one WebSocket session drains queue B.
//!
//! ## Concurrency
//! - Bounded tokio mpsc queues, single producer / single consumer, FIFO.
//! - Backpressure is resolved by loss, never by blocking an upstream stage.
//! - One `CancellationToken`, scoped to the generator loop.

pub mod component_a;
pub mod component_b;
pub mod config;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod utils;

pub use config::Config;
pub use error::{Error, Result};
pub use model::event::{Event, Status};
pub use pipeline::Pipeline;
