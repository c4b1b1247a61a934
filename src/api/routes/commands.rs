//! Command Routes
//!
//! Accepts an arbitrary JSON body and relays it to the device's command
//! topic on the bus.

use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use crate::api::dto::CommandResponse;
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::auth::AuthSession;

/// POST /api/devices/:id/cmd
pub async fn send_command(
    _session: AuthSession,
    State(state): State<Arc<AppState>>,
    Path(device_id): Path<String>,
    Json(body): Json<serde_json::Value>,
) -> ApiResult<Json<CommandResponse>> {
    if device_id.trim().is_empty() {
        return Err(ApiError::DeviceRequired);
    }

    let topic = state.commands.publish(&device_id, &body).await?;

    Ok(Json(CommandResponse {
        status: "ok".to_string(),
        topic,
    }))
}
