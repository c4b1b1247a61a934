//! Message Bus Router
//!
//! Owns the MQTT connection. Subscribes to the wildcard telemetry pattern,
//! parses inbound messages into device id + record, updates the device
//! state store and notifies the stream hub. Transport errors are logged and
//! retried forever; nothing on this path may take the process down.

use rumqttc::{AsyncClient, Event, EventLoop, MqttOptions, Packet, QoS};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

use super::topic;
use crate::config::BusConfig;
use crate::devices::{DeviceStore, TelemetryRecord};
use crate::stream::StreamHub;

/// Shared bus connectivity flag, read by the status and health endpoints
/// and by the command publisher.
#[derive(Default)]
pub struct BusStatus {
    connected: AtomicBool,
}

impl BusStatus {
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Relaxed)
    }

    fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::Relaxed);
    }
}

/// Routes inbound bus messages into the store and out to subscribers
pub struct BusRouter {
    store: Arc<DeviceStore>,
    hub: Arc<StreamHub>,
    prefix: String,
    status: Arc<BusStatus>,
}

impl BusRouter {
    pub fn new(store: Arc<DeviceStore>, hub: Arc<StreamHub>, prefix: impl Into<String>) -> Self {
        Self {
            store,
            hub,
            prefix: prefix.into(),
            status: Arc::new(BusStatus::default()),
        }
    }

    /// Connectivity flag shared with the rest of the bridge
    pub fn status(&self) -> Arc<BusStatus> {
        Arc::clone(&self.status)
    }

    /// Open the bus connection and spawn the event loop task.
    ///
    /// Returns the client (shared with the command publisher) and the task
    /// handle. The task runs until the process stops; reconnection is
    /// automatic and indefinite.
    pub fn start(self, config: &BusConfig) -> (AsyncClient, JoinHandle<()>) {
        let mut options = MqttOptions::new(&config.client_id, &config.host, config.port);
        options.set_keep_alive(Duration::from_secs(config.keep_alive_secs));
        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            options.set_credentials(username, password);
        }

        let (client, eventloop) = AsyncClient::new(options, 64);
        let reconnect_delay = Duration::from_secs(config.reconnect_delay_secs);

        tracing::info!(
            broker = %format!("{}:{}", config.host, config.port),
            prefix = %self.prefix,
            "connecting to message bus"
        );

        let task = tokio::spawn(self.run(client.clone(), eventloop, reconnect_delay));
        (client, task)
    }

    /// Drive the event loop forever.
    async fn run(self, client: AsyncClient, mut eventloop: EventLoop, reconnect_delay: Duration) {
        loop {
            match eventloop.poll().await {
                Ok(Event::Incoming(Packet::ConnAck(_))) => {
                    self.status.set_connected(true);
                    let filter = topic::telemetry_filter(&self.prefix);
                    // Failure here is not fatal: the session resubscribes
                    // on the next reconnect.
                    match client.subscribe(&filter, QoS::AtLeastOnce).await {
                        Ok(()) => tracing::info!(filter = %filter, "bus connected, subscribed"),
                        Err(e) => tracing::warn!(filter = %filter, error = %e, "telemetry subscribe failed"),
                    }
                }
                Ok(Event::Incoming(Packet::Publish(publish))) => {
                    self.handle_message(&publish.topic, &publish.payload).await;
                }
                Ok(_) => {}
                Err(e) => {
                    if self.status.is_connected() {
                        tracing::warn!(error = %e, "bus connection lost, retrying");
                    }
                    self.status.set_connected(false);
                    tokio::time::sleep(reconnect_delay).await;
                }
            }
        }
    }

    /// Process one inbound message: extract the device id, build a record
    /// stamped with arrival time, update the store and notify subscribers.
    /// Non-matching topics are silently discarded; undecodable bodies are
    /// kept as raw text.
    async fn handle_message(&self, msg_topic: &str, payload: &[u8]) {
        let Some(device_id) = topic::parse_device_id(&self.prefix, msg_topic) else {
            tracing::trace!(topic = %msg_topic, "ignoring message outside telemetry namespace");
            return;
        };

        let raw = String::from_utf8_lossy(payload);
        let record = TelemetryRecord::from_payload(msg_topic, &raw);

        self.store.upsert(device_id, record.clone()).await;
        self.hub.publish(device_id, &record).await;

        tracing::debug!(
            device = %device_id,
            parsed = record.payload_json.is_some(),
            "telemetry stored"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::StreamEvent;

    fn router() -> (Arc<DeviceStore>, Arc<StreamHub>, BusRouter) {
        let store = Arc::new(DeviceStore::new());
        let hub = Arc::new(StreamHub::new(Arc::clone(&store)));
        let router = BusRouter::new(Arc::clone(&store), Arc::clone(&hub), "embarcatech");
        (store, hub, router)
    }

    #[tokio::test]
    async fn test_inbound_message_updates_store_and_subscribers() {
        let (store, hub, router) = router();

        let (handle, mut rx) = hub.subscribe("sensor1").await;
        let _ = rx.try_recv().unwrap(); // snapshot

        router
            .handle_message("embarcatech/sensor1/telemetry", br#"{"temp":21.5}"#)
            .await;

        let stored = store.get("sensor1").await.unwrap();
        assert_eq!(
            stored.payload_json,
            Some(serde_json::json!({"temp": 21.5}))
        );

        // exactly one delivery for the one message
        match rx.try_recv().unwrap() {
            StreamEvent::Telemetry { record } => {
                assert_eq!(record.payload_raw, r#"{"temp":21.5}"#);
            }
            other => panic!("expected telemetry, got {:?}", other),
        }
        assert!(rx.try_recv().is_err());

        hub.unsubscribe(&handle).await;
    }

    #[tokio::test]
    async fn test_wrong_prefix_is_discarded() {
        let (store, hub, router) = router();

        let (handle, mut rx) = hub.subscribe("sensor1").await;
        let _ = rx.try_recv().unwrap();

        router
            .handle_message("other/sensor1/telemetry", br#"{"temp":21.5}"#)
            .await;

        assert!(store.is_empty().await);
        assert!(rx.try_recv().is_err());

        hub.unsubscribe(&handle).await;
    }

    #[tokio::test]
    async fn test_short_topic_is_discarded() {
        let (store, _hub, router) = router();

        router.handle_message("embarcatech/sensor1", b"1").await;

        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_undecodable_body_downgraded_to_raw() {
        let (store, _hub, router) = router();

        router
            .handle_message("embarcatech/sensor1/telemetry", b"not json at all")
            .await;

        let stored = store.get("sensor1").await.unwrap();
        assert!(stored.payload_json.is_none());
        assert_eq!(stored.payload_raw, "not json at all");
    }

    #[tokio::test]
    async fn test_per_device_order_is_processing_order() {
        let (store, hub, router) = router();

        let (handle, mut rx) = hub.subscribe("sensor1").await;
        let _ = rx.try_recv().unwrap();

        router
            .handle_message("embarcatech/sensor1/telemetry", b"1")
            .await;
        router
            .handle_message("embarcatech/sensor1/telemetry", b"2")
            .await;

        // store reflects the most recently processed record
        assert_eq!(store.get("sensor1").await.unwrap().payload_raw, "2");

        for expected in ["1", "2"] {
            match rx.try_recv().unwrap() {
                StreamEvent::Telemetry { record } => assert_eq!(record.payload_raw, expected),
                other => panic!("expected telemetry, got {:?}", other),
            }
        }

        hub.unsubscribe(&handle).await;
    }
}
