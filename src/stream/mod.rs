//! Live-Update Streaming
//!
//! Per-device WebSocket fan-out: the [`StreamHub`] keeps the subscriber
//! registry, [`messages`] defines the wire events, and [`handler`] binds a
//! WebSocket connection to one device's stream.

pub mod handler;
pub mod hub;
pub mod messages;

pub use handler::stream_handler;
pub use hub::{StreamHub, SubscriberHandle};
pub use messages::StreamEvent;
