// Component B: delivery of labeled events to the outside world.
// A single WebSocket session drains the delivery queue; a liveness probe and a
// metrics document sit beside it on the same HTTP listener.

pub mod health;
pub mod router;
pub mod server;
pub mod sink;
