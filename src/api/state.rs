//! Application State
//!
//! Shared state accessible by all API handlers. The store, hub and bus
//! handles are constructed in the composition root and injected here, so
//! tests can build isolated instances per test case.

use std::sync::Arc;
use std::time::Instant;

use crate::auth::TokenCodec;
use crate::bus::{BusStatus, CommandPublisher};
use crate::config::Config;
use crate::devices::DeviceStore;
use crate::stream::StreamHub;

/// Shared application state for all handlers
pub struct AppState {
    /// Bridge configuration
    pub config: Arc<Config>,
    /// Session token codec backing the auth gate and the login endpoint
    pub tokens: TokenCodec,
    /// Latest known record per device
    pub store: Arc<DeviceStore>,
    /// Live-update fan-out registry
    pub hub: Arc<StreamHub>,
    /// Outbound command path
    pub commands: CommandPublisher,
    /// Bus connectivity flag
    pub bus_status: Arc<BusStatus>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
}

impl AppState {
    pub fn new(
        config: Arc<Config>,
        store: Arc<DeviceStore>,
        hub: Arc<StreamHub>,
        commands: CommandPublisher,
        bus_status: Arc<BusStatus>,
    ) -> Self {
        let tokens = TokenCodec::new(&config.auth.secret);
        Self {
            config,
            tokens,
            store,
            hub,
            commands,
            bus_status,
            start_time: Instant::now(),
        }
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
