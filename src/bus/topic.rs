//! Topic layout shared with device firmware.
//!
//! Inbound: `<prefix>/<deviceId>/telemetry`. Outbound: `<prefix>/<deviceId>/cmd`.

/// Wildcard subscription filter matching every device's telemetry topic
pub fn telemetry_filter(prefix: &str) -> String {
    format!("{}/+/telemetry", prefix)
}

/// Command topic for one device
pub fn command_topic(prefix: &str, device_id: &str) -> String {
    format!("{}/{}/cmd", prefix, device_id)
}

/// Extract the device identifier from an inbound topic.
///
/// Returns `None` for topics with fewer than three segments or whose first
/// segment is not `prefix`. A non-match is not an error; the message is
/// simply not for us.
pub fn parse_device_id<'a>(prefix: &str, topic: &'a str) -> Option<&'a str> {
    let mut segments = topic.split('/');
    let first = segments.next()?;
    let device = segments.next()?;
    segments.next()?;

    (first == prefix).then_some(device)
}
