//! Device Routes
//!
//! Listing of known devices and overall bridge status.

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::api::dto::{DeviceListResponse, StatusResponse};
use crate::api::state::AppState;
use crate::auth::AuthSession;

/// GET /api/devices
///
/// Sorted set of device identifiers the bridge has seen telemetry for.
pub async fn list_devices(
    _session: AuthSession,
    State(state): State<Arc<AppState>>,
) -> Json<DeviceListResponse> {
    Json(DeviceListResponse {
        devices: state.store.device_ids().await,
    })
}

/// GET /api/status
pub async fn bridge_status(
    _session: AuthSession,
    State(state): State<Arc<AppState>>,
) -> Json<StatusResponse> {
    Json(StatusResponse {
        connected: state.bus_status.is_connected(),
        prefix: state.config.bus.topic_prefix.clone(),
        devices: state.store.device_ids().await,
        uptime_seconds: state.uptime_seconds(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
