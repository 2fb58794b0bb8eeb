//! Mapping from device snapshots to observations.
//!
//! Per device, in snapshot order:
//!
//! 1. `up` (1 when the device reports recent temperatures, else 0).
//! 2. Offline devices stop here. Their diagnostics are stale.
//! 3. Battery, transmit power, signal level, night mode.
//! 4. CPU usage, parsed from strings like `"17%"`. A malformed value records a
//!    [`FieldMappingError`] and only the CPU observation is skipped.
//! 5. One probe temperature per enabled channel with a non-zero reading,
//!    labelled by the channel's 1-based position.

use tracing::trace;

use crate::config::MapperConfig;
use crate::device::DeviceSnapshot;
use crate::error::FieldMappingError;
use crate::metrics::{Labels, Metric, Observation};

/// Result of mapping one scrape worth of devices.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MappedDevices {
    pub observations: Vec<Observation>,
    pub errors: Vec<FieldMappingError>,
}

/// Turns decoded devices into observations.
#[derive(Debug, Clone, Copy, Default)]
pub struct ObservationMapper {
    config: MapperConfig,
}

impl ObservationMapper {
    pub fn new(config: MapperConfig) -> Self {
        Self { config }
    }

    /// Map all devices, preserving their order.
    pub fn map(&self, devices: &[DeviceSnapshot]) -> MappedDevices {
        let mut mapped = MappedDevices::default();
        for device in devices {
            self.map_device(device, &mut mapped);
        }
        mapped
    }

    fn map_device(&self, device: &DeviceSnapshot, out: &mut MappedDevices) {
        let name = device.name.as_str();
        let live = device.has_live_telemetry;

        out.observations.push(Observation::new(
            Metric::Up,
            Labels::device(name),
            bool_value(live),
        ));

        if !live {
            trace!(device = %name, "Device offline, skipping diagnostics");
            return;
        }

        let diag = &device.diagnostics;
        for (metric, value) in [
            (Metric::BatteryVolts, diag.battery_voltage),
            (Metric::TransmitPower, diag.transmit_power),
            (Metric::SignalLevel, diag.signal_level),
            (Metric::NightMode, bool_value(diag.night_mode)),
        ] {
            out.observations
                .push(Observation::new(metric, Labels::device(name), value));
        }

        match parse_cpu_usage(&diag.cpu_usage) {
            Some(cpu) => out.observations.push(Observation::new(
                Metric::CpuUsage,
                Labels::device(name),
                cpu,
            )),
            None => out.errors.push(FieldMappingError::CpuUsage {
                device: name.to_string(),
                raw: diag.cpu_usage.clone(),
            }),
        }

        for (index, channel) in device.indexed_channels() {
            if !channel.enabled
                || (self.config.suppress_zero_temperature && channel.current_temperature == 0.0)
            {
                trace!(
                    device = %name,
                    channel = index,
                    label = %channel.label,
                    enabled = channel.enabled,
                    "Probe temperature suppressed"
                );
                continue;
            }
            out.observations.push(Observation::new(
                Metric::ProbeTemperature,
                Labels::channel(name, index),
                channel.current_temperature,
            ));
        }
    }
}

fn bool_value(b: bool) -> f64 {
    if b { 1.0 } else { 0.0 }
}

/// Parse a CPU usage string such as `"42%"` or `" 12.5 % "`.
///
/// Only the leading numeric run is considered (optional sign, digits,
/// optional fraction). Returns `None` when there is no such run.
pub fn parse_cpu_usage(raw: &str) -> Option<f64> {
    let s = raw.trim();
    let s = s.strip_suffix('%').unwrap_or(s).trim_end();
    let bytes = s.as_bytes();

    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }
    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        if frac_end > frac_start {
            digits += frac_end - frac_start;
            end = frac_end;
        }
    }

    if digits == 0 {
        return None;
    }
    s[..end].parse().ok()
}
