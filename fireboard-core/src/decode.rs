//! Payload decoding.

use tracing::trace;

use crate::device::{DeviceRecord, DeviceSnapshot};
use crate::error::DecodeError;

/// Parse the raw `devices.json` body into wire records.
pub fn decode_records(payload: &[u8]) -> Result<Vec<DeviceRecord>, DecodeError> {
    Ok(serde_json::from_slice(payload)?)
}

/// Parse the raw `devices.json` body into device snapshots, in payload order.
///
/// The payload must be a JSON array of device objects. An empty array is a
/// valid answer with zero devices.
pub fn decode(payload: &[u8]) -> Result<Vec<DeviceSnapshot>, DecodeError> {
    let records = decode_records(payload)?;
    trace!(devices = records.len(), "Decoded device payload");

    Ok(records
        .into_iter()
        .enumerate()
        .map(|(i, record)| record.into_snapshot(i + 1))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_empty_list() {
        let devices = decode(b"[]").unwrap();
        assert!(devices.is_empty());
    }

    #[test]
    fn test_decode_object_is_error() {
        assert!(decode(br#"{"title": "Smoker"}"#).is_err());
    }

    #[test]
    fn test_decode_garbage_is_error() {
        assert!(decode(b"<html>Bad Gateway</html>").is_err());
        assert!(decode(b"").is_err());
    }

    #[test]
    fn test_decode_wrong_field_type_is_error() {
        let payload = br#"[{"title": "Smoker", "channels": "none"}]"#;
        assert!(decode(payload).is_err());
    }

    #[test]
    fn test_decode_tolerates_mistyped_unread_fields() {
        let payload = br#"[{
            "id": "abc",
            "title": "Smoker",
            "latest_temps": [{"temp": 72.5, "created": 1714564800}],
            "device_log": {"vBatt": 4.1, "onboardTemp": "31.5", "version": 2, "cpuUsage": "17%"},
            "channels": [{"channel": "1", "enabled": true, "current_temp": 72.5}]
        }]"#;
        let devices = decode(payload).unwrap();

        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].name, "Smoker");
        assert!(devices[0].has_live_telemetry);
        assert_eq!(devices[0].diagnostics.battery_voltage, 4.1);
        assert_eq!(devices[0].channels[0].current_temperature, 72.5);
    }

    #[test]
    fn test_decode_fractional_radio_levels() {
        let payload = br#"[{
            "title": "Smoker",
            "device_log": {"txpower": 77.5, "signallevel": -54.25}
        }]"#;
        let devices = decode(payload).unwrap();

        assert_eq!(devices[0].diagnostics.transmit_power, 77.5);
        assert_eq!(devices[0].diagnostics.signal_level, -54.25);
    }

    #[test]
    fn test_decode_missing_optional_fields() {
        let devices = decode(br#"[{"title": "Bare"}]"#).unwrap();

        assert_eq!(devices.len(), 1);
        let device = &devices[0];
        assert_eq!(device.name, "Bare");
        assert!(!device.has_live_telemetry);
        assert_eq!(device.diagnostics.battery_voltage, 0.0);
        assert_eq!(device.diagnostics.cpu_usage, "");
        assert!(device.channels.is_empty());
    }

    #[test]
    fn test_decode_liveness_from_latest_temps() {
        let payload = br#"[
            {"title": "Live", "latest_temps": [{"temp": 70.1, "channel": 1}]},
            {"title": "Offline", "latest_temps": []},
            {"title": "Unknown"}
        ]"#;
        let devices = decode(payload).unwrap();

        assert!(devices[0].has_live_telemetry);
        assert!(!devices[1].has_live_telemetry);
        assert!(!devices[2].has_live_telemetry);
    }

    #[test]
    fn test_decode_preserves_order() {
        let payload = br#"[{"title": "b"}, {"title": "a"}, {"title": "c"}]"#;
        let names: Vec<String> = decode(payload).unwrap().into_iter().map(|d| d.name).collect();

        assert_eq!(names, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_decode_ignores_unknown_fields() {
        let payload = br#"[{"title": "Smoker", "fbj_version": "1.2", "last_drivelog": {"x": 1}}]"#;
        let devices = decode(payload).unwrap();

        assert_eq!(devices[0].name, "Smoker");
    }

    #[test]
    fn test_decode_untitled_device_is_named_by_position() {
        let payload = br#"[{"title": "Smoker"}, {}]"#;
        let devices = decode(payload).unwrap();

        assert_eq!(devices[1].name, "device-2");
    }
}
