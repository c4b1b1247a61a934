//! Stream Hub
//!
//! Tracks, per device, the set of currently-connected live-update
//! subscribers and fans new telemetry records out to them. Each subscriber
//! is an independent sink with its own unbounded channel: a slow or dead
//! subscriber never stalls the router or its siblings, and a failed send
//! removes only that subscriber.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};
use uuid::Uuid;

use super::messages::StreamEvent;
use crate::devices::{DeviceStore, TelemetryRecord};

/// Identifies one registered subscriber so it can be removed later.
/// A subscriber belongs to exactly one device for its lifetime.
#[derive(Debug, Clone)]
pub struct SubscriberHandle {
    pub device_id: String,
    id: Uuid,
}

/// Per-device fan-out registry for live-update streams
pub struct StreamHub {
    store: Arc<DeviceStore>,
    /// Device id → subscriber id → that subscriber's channel
    subscribers: RwLock<HashMap<String, HashMap<Uuid, mpsc::UnboundedSender<StreamEvent>>>>,
}

impl StreamHub {
    pub fn new(store: Arc<DeviceStore>) -> Self {
        Self {
            store,
            subscribers: RwLock::new(HashMap::new()),
        }
    }

    /// Register a new subscriber for `device_id`.
    ///
    /// The snapshot event is enqueued before the subscriber is added to the
    /// registry, while the registry write lock is held, so it is always the
    /// first event the subscriber sees: a concurrent publish for the same
    /// device either lands in the snapshot or is delivered after it, never
    /// before.
    pub async fn subscribe(
        &self,
        device_id: &str,
    ) -> (SubscriberHandle, mpsc::UnboundedReceiver<StreamEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();

        let mut subs = self.subscribers.write().await;
        let snapshot = StreamEvent::snapshot(self.store.get(device_id).await);
        // The receiver is still in scope, this cannot fail.
        let _ = tx.send(snapshot);

        let id = Uuid::new_v4();
        subs.entry(device_id.to_string()).or_default().insert(id, tx);

        tracing::debug!(device = %device_id, subscriber = %id, "stream subscribed");

        (
            SubscriberHandle {
                device_id: device_id.to_string(),
                id,
            },
            rx,
        )
    }

    /// Deliver `record` to every subscriber currently registered for
    /// `device_id`. Per-subscriber order is FIFO; order across subscribers
    /// is not significant. A subscriber whose channel is closed is removed
    /// immediately, and the device entry is dropped with its last
    /// subscriber.
    pub async fn publish(&self, device_id: &str, record: &TelemetryRecord) {
        let mut subs = self.subscribers.write().await;
        let Some(device_subs) = subs.get_mut(device_id) else {
            return;
        };

        device_subs.retain(|id, tx| {
            let delivered = tx.send(StreamEvent::telemetry(record.clone())).is_ok();
            if !delivered {
                tracing::debug!(device = %device_id, subscriber = %id, "dropping dead subscriber");
            }
            delivered
        });

        if device_subs.is_empty() {
            subs.remove(device_id);
        }
    }

    /// Remove a subscriber; drops the per-device entry when it was the last
    /// one so the registry never accumulates empty sets.
    pub async fn unsubscribe(&self, handle: &SubscriberHandle) {
        let mut subs = self.subscribers.write().await;
        if let Some(device_subs) = subs.get_mut(&handle.device_id) {
            device_subs.remove(&handle.id);
            if device_subs.is_empty() {
                subs.remove(&handle.device_id);
            }
        }

        tracing::debug!(device = %handle.device_id, subscriber = %handle.id, "stream unsubscribed");
    }

    /// Number of subscribers currently registered for a device.
    pub async fn subscriber_count(&self, device_id: &str) -> usize {
        self.subscribers
            .read()
            .await
            .get(device_id)
            .map(|s| s.len())
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(body: &str) -> TelemetryRecord {
        TelemetryRecord::from_payload("embarcatech/sensor1/telemetry", body)
    }

    fn hub() -> (Arc<DeviceStore>, StreamHub) {
        let store = Arc::new(DeviceStore::new());
        let hub = StreamHub::new(Arc::clone(&store));
        (store, hub)
    }

    #[tokio::test]
    async fn test_snapshot_for_never_seen_device() {
        let (_store, hub) = hub();

        let (handle, mut rx) = hub.subscribe("sensor1").await;

        match rx.try_recv().unwrap() {
            StreamEvent::Snapshot { has_last, record } => {
                assert!(!has_last);
                assert!(record.is_none());
            }
            other => panic!("expected snapshot, got {:?}", other),
        }

        hub.unsubscribe(&handle).await;
    }

    #[tokio::test]
    async fn test_snapshot_reflects_stored_record() {
        let (store, hub) = hub();
        store.upsert("sensor1", record(r#"{"temp":21.5}"#)).await;

        let (handle, mut rx) = hub.subscribe("sensor1").await;

        match rx.try_recv().unwrap() {
            StreamEvent::Snapshot { has_last, record } => {
                assert!(has_last);
                assert_eq!(record.unwrap().payload_raw, r#"{"temp":21.5}"#);
            }
            other => panic!("expected snapshot, got {:?}", other),
        }

        hub.unsubscribe(&handle).await;
    }

    #[tokio::test]
    async fn test_publish_reaches_only_matching_device() {
        let (_store, hub) = hub();

        let (h1, mut rx1) = hub.subscribe("sensor1").await;
        let (h2, mut rx2) = hub.subscribe("sensor2").await;
        // drain snapshots
        let _ = rx1.try_recv().unwrap();
        let _ = rx2.try_recv().unwrap();

        hub.publish("sensor1", &record(r#"{"temp":1}"#)).await;

        assert!(matches!(
            rx1.try_recv().unwrap(),
            StreamEvent::Telemetry { .. }
        ));
        assert!(rx2.try_recv().is_err());

        hub.unsubscribe(&h1).await;
        hub.unsubscribe(&h2).await;
    }

    #[tokio::test]
    async fn test_per_subscriber_fifo_order() {
        let (_store, hub) = hub();

        let (handle, mut rx) = hub.subscribe("sensor1").await;
        let _ = rx.try_recv().unwrap();

        hub.publish("sensor1", &record("first")).await;
        hub.publish("sensor1", &record("second")).await;
        hub.publish("sensor1", &record("third")).await;

        for expected in ["first", "second", "third"] {
            match rx.try_recv().unwrap() {
                StreamEvent::Telemetry { record } => assert_eq!(record.payload_raw, expected),
                other => panic!("expected telemetry, got {:?}", other),
            }
        }

        hub.unsubscribe(&handle).await;
    }

    #[tokio::test]
    async fn test_unsubscribe_removes_last_entry() {
        let (_store, hub) = hub();

        let (h1, _rx1) = hub.subscribe("sensor1").await;
        let (h2, _rx2) = hub.subscribe("sensor1").await;
        assert_eq!(hub.subscriber_count("sensor1").await, 2);

        hub.unsubscribe(&h1).await;
        assert_eq!(hub.subscriber_count("sensor1").await, 1);

        hub.unsubscribe(&h2).await;
        assert_eq!(hub.subscriber_count("sensor1").await, 0);
        // the device entry itself is gone
        assert!(hub.subscribers.read().await.is_empty());
    }

    #[tokio::test]
    async fn test_dead_subscriber_removed_on_publish() {
        let (_store, hub) = hub();

        let (_h1, rx1) = hub.subscribe("sensor1").await;
        let (_h2, mut rx2) = hub.subscribe("sensor1").await;
        let _ = rx2.try_recv().unwrap();

        // simulate a disconnected client
        drop(rx1);

        hub.publish("sensor1", &record("after-drop")).await;

        // the dead sink is gone, the live one still got its event
        assert_eq!(hub.subscriber_count("sensor1").await, 1);
        assert!(matches!(
            rx2.try_recv().unwrap(),
            StreamEvent::Telemetry { .. }
        ));
    }
}
