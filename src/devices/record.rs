//! Telemetry Record
//!
//! The single unit of device state the bridge retains: the most recent
//! message received from a device, with both the raw payload text and its
//! JSON decode when the payload parses.

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// The latest telemetry received from one device
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryRecord {
    /// Arrival instant in epoch milliseconds
    pub received_at: i64,
    /// Bus topic the message arrived on
    pub topic: String,
    /// Payload body, retained verbatim even when it is not valid JSON
    pub payload_raw: String,
    /// JSON decode of the payload, `None` when the body does not parse.
    /// A body that is the literal `null` decodes to `Some(Value::Null)`;
    /// both serialize identically, so wire clients see `null` either way.
    pub payload_json: Option<serde_json::Value>,
}

impl TelemetryRecord {
    /// Build a record for a payload that just arrived, stamped with the
    /// current time. A message is never dropped for an unparseable body.
    pub fn from_payload(topic: &str, raw: &str) -> Self {
        Self {
            received_at: Utc::now().timestamp_millis(),
            topic: topic.to_string(),
            payload_raw: raw.to_string(),
            payload_json: serde_json::from_str(raw).ok(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_payload_parses() {
        let record = TelemetryRecord::from_payload("embarcatech/sensor1/telemetry", r#"{"temp":21.5}"#);
        assert_eq!(record.payload_json, Some(json!({"temp": 21.5})));
        assert_eq!(record.payload_raw, r#"{"temp":21.5}"#);
    }

    #[test]
    fn test_non_json_payload_retained_raw() {
        let record = TelemetryRecord::from_payload("embarcatech/sensor1/telemetry", "temp=21.5");
        assert!(record.payload_json.is_none());
        assert_eq!(record.payload_raw, "temp=21.5");
    }

    #[test]
    fn test_null_body_and_non_json_serialize_alike() {
        // "null" parses to Some(Value::Null), garbage parses to None;
        // both must serialize as null so clients cannot tell them apart.
        let parsed_null = TelemetryRecord::from_payload("t/d/telemetry", "null");
        let not_json = TelemetryRecord::from_payload("t/d/telemetry", "garbage");

        assert_eq!(parsed_null.payload_json, Some(serde_json::Value::Null));
        assert!(not_json.payload_json.is_none());

        let a = serde_json::to_value(&parsed_null).unwrap();
        let b = serde_json::to_value(&not_json).unwrap();
        assert_eq!(a["payload_json"], serde_json::Value::Null);
        assert_eq!(b["payload_json"], serde_json::Value::Null);
    }

    #[test]
    fn test_received_at_is_stamped() {
        let before = Utc::now().timestamp_millis();
        let record = TelemetryRecord::from_payload("t/d/telemetry", "1");
        let after = Utc::now().timestamp_millis();
        assert!(record.received_at >= before && record.received_at <= after);
    }
}
