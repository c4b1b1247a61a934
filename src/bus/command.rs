//! Command Publisher
//!
//! Publishes operator commands to a device's command topic through the
//! shared bus client. Publish failures are surfaced to the caller, never
//! swallowed.

use rumqttc::{AsyncClient, QoS};
use std::sync::Arc;
use thiserror::Error;

use super::router::BusStatus;
use super::topic;

/// Command publish failure, surfaced to the API as `publish_failed`
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("bus publish failed: {0}")]
    PublishFailed(String),
}

/// Sends commands to devices over the shared bus connection
pub struct CommandPublisher {
    client: AsyncClient,
    status: Arc<BusStatus>,
    prefix: String,
}

impl CommandPublisher {
    pub fn new(client: AsyncClient, status: Arc<BusStatus>, prefix: impl Into<String>) -> Self {
        Self {
            client,
            status,
            prefix: prefix.into(),
        }
    }

    /// Publish `body` to the device's command topic at QoS 1 and return the
    /// topic used. The retain flag stays off: a command must never replay
    /// to a device that reconnects later.
    pub async fn publish(
        &self,
        device_id: &str,
        body: &serde_json::Value,
    ) -> Result<String, CommandError> {
        if !self.status.is_connected() {
            return Err(CommandError::PublishFailed(
                "bus connection is down".to_string(),
            ));
        }

        let cmd_topic = topic::command_topic(&self.prefix, device_id);
        let payload =
            serde_json::to_vec(body).map_err(|e| CommandError::PublishFailed(e.to_string()))?;

        self.client
            .publish(&cmd_topic, QoS::AtLeastOnce, false, payload)
            .await
            .map_err(|e| CommandError::PublishFailed(e.to_string()))?;

        tracing::info!(device = %device_id, topic = %cmd_topic, "command published");
        Ok(cmd_topic)
    }
}
