//! Prometheus text exposition format (version 0.0.4).

use std::io::Write;

use fireboard_core::{MetricDescriptors, Observation};

use crate::naming::escape_label_value;

/// Content type of the rendered output.
pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Write one gauge family per metric that has samples.
///
/// Families follow descriptor order; samples keep observation order.
/// `extra_labels` are appended to every sample.
pub fn write_observations(
    output: &mut Vec<u8>,
    descriptors: &MetricDescriptors,
    observations: &[Observation],
    extra_labels: &[(String, String)],
) {
    for descriptor in descriptors.iter() {
        let mut samples = observations
            .iter()
            .filter(|o| o.metric == descriptor.metric)
            .peekable();
        if samples.peek().is_none() {
            continue;
        }

        writeln!(output, "# HELP {} {}", descriptor.name, escape_help(descriptor.help)).ok();
        writeln!(output, "# TYPE {} gauge", descriptor.name).ok();

        for observation in samples {
            let mut labels: Vec<(&str, String)> = observation.labels.pairs();
            labels.extend(extra_labels.iter().map(|(k, v)| (k.as_str(), v.clone())));

            writeln!(
                output,
                "{}{} {}",
                descriptor.name,
                format_labels(&labels),
                format_value(observation.value)
            )
            .ok();
        }
    }
}

/// Write a single unlabelled sample with its HELP and TYPE lines.
pub fn write_sample(output: &mut Vec<u8>, name: &str, kind: &str, help: &str, value: f64) {
    writeln!(output, "# HELP {} {}", name, escape_help(help)).ok();
    writeln!(output, "# TYPE {} {}", name, kind).ok();
    writeln!(output, "{} {}", name, format_value(value)).ok();
}

/// Format labels for Prometheus exposition format.
pub fn format_labels(labels: &[(&str, String)]) -> String {
    if labels.is_empty() {
        return String::new();
    }

    let parts: Vec<String> = labels
        .iter()
        .map(|(k, v)| format!("{}=\"{}\"", k, escape_label_value(v)))
        .collect();

    format!("{{{}}}", parts.join(","))
}

/// Format a floating point value for Prometheus.
pub fn format_value(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        if value.is_sign_positive() {
            "+Inf".to_string()
        } else {
            "-Inf".to_string()
        }
    } else if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{}", value)
    }
}

fn escape_help(help: &str) -> String {
    help.replace('\\', "\\\\").replace('\n', "\\n")
}
