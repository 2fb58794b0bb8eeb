//! Fireboard device data.
//!
//! Two layers live here:
//!
//! - Wire records ([`DeviceRecord`] and friends) hold the parts of the JSON
//!   returned by `GET /api/v1/devices.json` that metrics are derived from.
//!   Every field is optional on the wire; absent or `null` values fall back
//!   to their zero value. Fields not listed here are ignored, whatever their
//!   type.
//! - Snapshots ([`DeviceSnapshot`]) are the reduced view the mapper works on.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Deserialize `null` as the type's default.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Deserialize an informational field, falling back to the default when the
/// value has an unexpected type.
fn default_on_mistype<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).unwrap_or_default())
}

/// One device object as returned by the API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceRecord {
    #[serde(default, deserialize_with = "null_as_default")]
    pub uuid: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub hardware_id: String,

    /// Most recent readings. Empty when the device is not reporting; only
    /// the count matters.
    #[serde(default, deserialize_with = "null_as_default")]
    pub latest_temps: Vec<Value>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub device_log: DeviceLog,

    #[serde(default, deserialize_with = "null_as_default")]
    pub channels: Vec<ChannelRecord>,
}

/// Device-level diagnostics block (`device_log`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceLog {
    #[serde(default, deserialize_with = "null_as_default")]
    pub v_batt: f64,

    /// Reported as an integer, accepted as any number.
    #[serde(default, deserialize_with = "null_as_default")]
    pub txpower: f64,

    #[serde(default, deserialize_with = "null_as_default")]
    pub signallevel: f64,

    #[serde(default, deserialize_with = "null_as_default")]
    pub nightmode: bool,

    /// CPU usage, e.g. `"17%"`.
    #[serde(default, deserialize_with = "null_as_default")]
    pub cpu_usage: String,
}

/// One probe channel as configured on the device.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChannelRecord {
    #[serde(default, deserialize_with = "default_on_mistype")]
    pub channel_label: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub enabled: bool,

    #[serde(default, deserialize_with = "null_as_default")]
    pub current_temp: f64,
}

/// Decoded state of one device for a single scrape.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceSnapshot {
    /// Display name. Never empty.
    pub name: String,
    /// Whether the device returned at least one recent reading.
    pub has_live_telemetry: bool,
    pub diagnostics: Diagnostics,
    pub channels: Vec<ChannelReading>,
}

/// Device-level scalar readings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Diagnostics {
    pub battery_voltage: f64,
    pub transmit_power: f64,
    pub signal_level: f64,
    pub night_mode: bool,
    /// Raw CPU usage string; parsed during mapping.
    pub cpu_usage: String,
}

/// One probe channel reading.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChannelReading {
    pub enabled: bool,
    pub current_temperature: f64,
    pub label: String,
}

impl DeviceSnapshot {
    /// Channels paired with their 1-based position.
    pub fn indexed_channels(&self) -> impl Iterator<Item = (usize, &ChannelReading)> {
        self.channels.iter().enumerate().map(|(i, c)| (i + 1, c))
    }
}

impl DeviceRecord {
    /// Reduce a wire record to a snapshot.
    ///
    /// `position` is the 1-based position in the payload and only names the
    /// device when the record carries no title, hardware id or uuid.
    pub fn into_snapshot(self, position: usize) -> DeviceSnapshot {
        let name = [self.title, self.hardware_id, self.uuid]
            .into_iter()
            .find(|s| !s.trim().is_empty())
            .unwrap_or_else(|| format!("device-{}", position));

        DeviceSnapshot {
            name,
            has_live_telemetry: !self.latest_temps.is_empty(),
            diagnostics: Diagnostics {
                battery_voltage: self.device_log.v_batt,
                transmit_power: self.device_log.txpower,
                signal_level: self.device_log.signallevel,
                night_mode: self.device_log.nightmode,
                cpu_usage: self.device_log.cpu_usage,
            },
            channels: self
                .channels
                .into_iter()
                .map(|c| ChannelReading {
                    enabled: c.enabled,
                    current_temperature: c.current_temp,
                    label: c.channel_label,
                })
                .collect(),
        }
    }
}
