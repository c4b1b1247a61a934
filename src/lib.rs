//! # Telebridge
//!
//! Real-time IoT telemetry bridge: exposes telemetry published by embedded
//! devices over MQTT to authenticated web clients, and relays commands from
//! those clients back to the devices over the same bus.
//!
//! ## How it works
//!
//! - **Inbound**: the bus router subscribes to `<prefix>/+/telemetry`,
//!   keeps the latest record per device in the [`devices`] store and fans
//!   each new record out to WebSocket subscribers through the [`stream`]
//!   hub. New subscribers get a snapshot of the last known state
//!   immediately.
//! - **Outbound**: authenticated callers post commands that are published
//!   to `<prefix>/<deviceId>/cmd` (QoS 1, never retained).
//! - **Auth**: a signed, expiring session cookie guards every device
//!   endpoint; there is no server-side session store.
//!
//! ## Modules
//!
//! - [`auth`]: Session token codec and the request-level auth gate
//! - [`devices`]: Latest-known-state cache, one record per device
//! - [`bus`]: MQTT connection, telemetry router and command publisher
//! - [`stream`]: Per-device live-update WebSocket fan-out
//! - [`api`]: REST/WebSocket API server with Axum
//! - [`config`]: TOML + environment configuration

pub mod api;
pub mod auth;
pub mod bus;
pub mod config;
pub mod devices;
pub mod stream;

// Re-export top-level types for convenience
pub use api::{build_router, serve, ApiError, ApiResult, AppState};

pub use auth::{AuthSession, TokenClaims, TokenCodec, TokenError};

pub use bus::{BusRouter, BusStatus, CommandError, CommandPublisher};

pub use config::{ApiConfig, AuthConfig, BusConfig, Config, ConfigError, LoggingConfig};

pub use devices::{DeviceStore, TelemetryRecord};

pub use stream::{StreamEvent, StreamHub, SubscriberHandle};
