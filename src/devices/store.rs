//! Device State Store
//!
//! In-memory mapping from device identifier to its most recent telemetry
//! record. Devices are never registered explicitly; they come into
//! existence the first time the router upserts a record for them and
//! persist for the lifetime of the process.

use std::collections::BTreeMap;
use tokio::sync::RwLock;

use super::record::TelemetryRecord;

/// Holds the latest known record per device. At most one record is stored
/// per device at any instant; no history is retained.
#[derive(Default)]
pub struct DeviceStore {
    records: RwLock<BTreeMap<String, TelemetryRecord>>,
}

impl DeviceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the record for `device_id` unconditionally (last-write-wins).
    pub async fn upsert(&self, device_id: &str, record: TelemetryRecord) {
        self.records
            .write()
            .await
            .insert(device_id.to_string(), record);
    }

    /// Latest record for `device_id`, if any message has ever arrived.
    pub async fn get(&self, device_id: &str) -> Option<TelemetryRecord> {
        self.records.read().await.get(device_id).cloned()
    }

    /// All known device identifiers in lexicographic order.
    pub async fn device_ids(&self) -> Vec<String> {
        self.records.read().await.keys().cloned().collect()
    }

    /// Number of known devices.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(body: &str) -> TelemetryRecord {
        TelemetryRecord::from_payload("embarcatech/sensor1/telemetry", body)
    }

    #[tokio::test]
    async fn test_get_unknown_device() {
        let store = DeviceStore::new();
        assert!(store.get("sensor1").await.is_none());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_last_write_wins() {
        let store = DeviceStore::new();

        store.upsert("sensor1", record(r#"{"temp":1}"#)).await;
        store.upsert("sensor1", record(r#"{"temp":2}"#)).await;

        let latest = store.get("sensor1").await.unwrap();
        assert_eq!(latest.payload_raw, r#"{"temp":2}"#);
        // exactly one record per device
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_device_ids_sorted() {
        let store = DeviceStore::new();

        store.upsert("charlie", record("1")).await;
        store.upsert("alpha", record("2")).await;
        store.upsert("bravo", record("3")).await;

        assert_eq!(store.device_ids().await, vec!["alpha", "bravo", "charlie"]);
    }
}
