//! Message Bus
//!
//! Everything that touches MQTT: the [`BusRouter`] owns the connection and
//! the inbound telemetry path, the [`CommandPublisher`] shares the same
//! client for the outbound command path, and [`topic`] defines the topic
//! layout both sides agree on.

pub mod command;
pub mod router;
pub mod topic;

pub use command::{CommandError, CommandPublisher};
pub use router::{BusRouter, BusStatus};
