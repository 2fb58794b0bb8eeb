//! Metric definitions and observations.

/// Label carrying the device name.
pub const DEVICE_LABEL: &str = "fireboard_name";

/// Label carrying the 1-based channel position.
pub const CHANNEL_LABEL: &str = "port_number";

/// Every metric the mapper can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Metric {
    Up,
    BatteryVolts,
    TransmitPower,
    SignalLevel,
    NightMode,
    CpuUsage,
    ProbeTemperature,
}

impl Metric {
    /// All metrics, in exposition order.
    pub const ALL: [Metric; 7] = [
        Metric::Up,
        Metric::BatteryVolts,
        Metric::TransmitPower,
        Metric::SignalLevel,
        Metric::NightMode,
        Metric::CpuUsage,
        Metric::ProbeTemperature,
    ];

    /// Metric name without namespace.
    pub fn base_name(&self) -> &'static str {
        match self {
            Metric::Up => "up",
            Metric::BatteryVolts => "battery_volts",
            Metric::TransmitPower => "transmit_power_db",
            Metric::SignalLevel => "signal_level_db",
            Metric::NightMode => "night_mode",
            Metric::CpuUsage => "cpu_usage_percent",
            Metric::ProbeTemperature => "probe_temperature_degrees",
        }
    }

    pub fn help(&self) -> &'static str {
        match self {
            Metric::Up => "Whether the Fireboard is currently reporting temperatures",
            Metric::BatteryVolts => "Battery voltage of the Fireboard",
            Metric::TransmitPower => "Transmitter power",
            Metric::SignalLevel => "Wifi Signal Level",
            Metric::NightMode => "Is the fireboard in night mode",
            Metric::CpuUsage => "Current CPU usage",
            Metric::ProbeTemperature => {
                "Probe temperature in degrees. Units are dependent on Fireboard settings."
            }
        }
    }

    /// Label keys attached to this metric.
    pub fn label_names(&self) -> &'static [&'static str] {
        match self {
            Metric::ProbeTemperature => &[DEVICE_LABEL, CHANNEL_LABEL],
            _ => &[DEVICE_LABEL],
        }
    }
}

/// A metric with its fully qualified name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricDescriptor {
    pub metric: Metric,
    pub name: String,
    pub help: &'static str,
    pub label_names: &'static [&'static str],
}

/// The full set of descriptors, built once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricDescriptors {
    descriptors: Vec<MetricDescriptor>,
}

impl MetricDescriptors {
    /// Build descriptors under `namespace` (e.g. `fireboard_up`).
    ///
    /// An empty namespace leaves the base names untouched.
    pub fn new(namespace: &str) -> Self {
        let descriptors = Metric::ALL
            .iter()
            .map(|&metric| MetricDescriptor {
                metric,
                name: if namespace.is_empty() {
                    metric.base_name().to_string()
                } else {
                    format!("{}_{}", namespace, metric.base_name())
                },
                help: metric.help(),
                label_names: metric.label_names(),
            })
            .collect();

        Self { descriptors }
    }

    pub fn get(&self, metric: Metric) -> &MetricDescriptor {
        // Built from Metric::ALL, so every variant is present at its position.
        &self.descriptors[metric as usize]
    }

    pub fn iter(&self) -> impl Iterator<Item = &MetricDescriptor> {
        self.descriptors.iter()
    }
}

/// Label set of one observation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Labels {
    pub device: String,
    pub channel: Option<usize>,
}

impl Labels {
    pub fn device(device: impl Into<String>) -> Self {
        Self {
            device: device.into(),
            channel: None,
        }
    }

    pub fn channel(device: impl Into<String>, channel: usize) -> Self {
        Self {
            device: device.into(),
            channel: Some(channel),
        }
    }

    /// Key/value pairs in label order.
    pub fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![(DEVICE_LABEL, self.device.clone())];
        if let Some(channel) = self.channel {
            pairs.push((CHANNEL_LABEL, channel.to_string()));
        }
        pairs
    }
}

/// One (metric, labels, value) tuple.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub metric: Metric,
    pub labels: Labels,
    pub value: f64,
}

impl Observation {
    pub fn new(metric: Metric, labels: Labels, value: f64) -> Self {
        Self {
            metric,
            labels,
            value,
        }
    }
}
