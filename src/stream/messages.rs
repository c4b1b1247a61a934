//! Stream Message Types
//!
//! Events pushed to live-update subscribers over WebSocket.

use serde::Serialize;

use crate::devices::TelemetryRecord;

/// Messages sent from the bridge to a live-update subscriber
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// First event on every stream: the last known record for the device,
    /// or an explicit "no data yet" indicator.
    Snapshot {
        has_last: bool,
        record: Option<TelemetryRecord>,
    },
    /// A new telemetry record arrived while the subscriber was connected.
    Telemetry { record: TelemetryRecord },
}

impl StreamEvent {
    pub fn snapshot(record: Option<TelemetryRecord>) -> Self {
        Self::Snapshot {
            has_last: record.is_some(),
            record,
        }
    }

    pub fn telemetry(record: TelemetryRecord) -> Self {
        Self::Telemetry { record }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_without_data() {
        let event = StreamEvent::snapshot(None);
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"snapshot\""));
        assert!(json.contains("\"has_last\":false"));
        assert!(json.contains("\"record\":null"));
    }

    #[test]
    fn test_snapshot_with_data() {
        let record = TelemetryRecord::from_payload("embarcatech/sensor1/telemetry", r#"{"temp":21.5}"#);
        let event = StreamEvent::snapshot(Some(record));
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"has_last\":true"));
        assert!(json.contains("\"temp\":21.5"));
    }

    #[test]
    fn test_telemetry_event() {
        let record = TelemetryRecord::from_payload("embarcatech/sensor1/telemetry", "raw text");
        let json = serde_json::to_string(&StreamEvent::telemetry(record)).unwrap();
        assert!(json.contains("\"type\":\"telemetry\""));
        assert!(json.contains("\"payload_raw\":\"raw text\""));
    }
}
