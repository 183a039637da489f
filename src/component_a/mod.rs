// Component A: event generation and deadline classification.
// Generator ticks events into a bounded queue, the Driver pulls them one at a
// time through the Processor's deadline race and forwards the labeled copies
// to the delivery queue. Every enqueue is non-blocking and drops on full.

pub mod driver;
pub mod generator;
pub mod processor;
pub mod transmitter;
