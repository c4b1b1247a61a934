//! API Data Transfer Objects
//!
//! Request and response bodies for the HTTP surface.

use serde::{Deserialize, Serialize};

/// POST /api/login request body
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// POST /api/login success response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub status: String,
    pub identity: String,
}

/// GET /api/devices response
#[derive(Debug, Serialize)]
pub struct DeviceListResponse {
    pub devices: Vec<String>,
}

/// GET /api/status response
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    /// Whether the bus connection is currently up
    pub connected: bool,
    /// Topic prefix shared with device firmware
    pub prefix: String,
    pub devices: Vec<String>,
    pub uptime_seconds: u64,
    pub version: String,
}

/// POST /api/devices/:id/cmd success response
#[derive(Debug, Serialize)]
pub struct CommandResponse {
    pub status: String,
    /// Bus topic the command was published to
    pub topic: String,
}

/// GET /health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub bus: String,
    pub uptime_seconds: u64,
    pub version: String,
}
