//! Device State
//!
//! The per-device "latest known state" cache: one [`TelemetryRecord`] per
//! device, owned by the [`DeviceStore`]. Readers receive clones.

pub mod record;
pub mod store;

pub use record::TelemetryRecord;
pub use store::DeviceStore;
