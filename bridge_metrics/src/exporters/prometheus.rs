use crate::catalogue::{self, ValueKind, GAUGES, UPDATES_TOTAL, UPDATES_TOTAL_HELP};
use crate::registry::Snapshot;
use std::fmt::Write;

pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

pub struct PrometheusExporter;

impl PrometheusExporter {
    /// Renders a snapshot in the Prometheus text exposition format.
    /// Metrics that have never been set are left out entirely.
    pub fn format(snapshot: &Snapshot) -> String {
        let mut out = String::new();

        for gauge in GAUGES.iter() {
            if let Some(value) = snapshot.get(gauge.name) {
                write_family(&mut out, gauge.name, Some(gauge.help), "gauge", gauge.kind, value);
            }
        }

        // Names outside the catalogue are still exposed, without help text.
        for (name, value) in &snapshot.values {
            if catalogue::find(name).is_none() {
                write_family(&mut out, name, None, "gauge", ValueKind::Measurement, *value);
            }
        }

        if snapshot.updates_total > 0 {
            write_family(
                &mut out,
                UPDATES_TOTAL,
                Some(UPDATES_TOTAL_HELP),
                "counter",
                ValueKind::Count,
                snapshot.updates_total as f64,
            );
        }

        out
    }
}

fn write_family(
    out: &mut String,
    name: &str,
    help: Option<&str>,
    metric_type: &str,
    kind: ValueKind,
    value: f64,
) {
    if let Some(help) = help {
        let _ = writeln!(out, "# HELP {} {}", name, escape_help(help));
    }
    let _ = writeln!(out, "# TYPE {} {}", name, metric_type);
    let _ = writeln!(out, "{} {}", name, format_value(value, kind));
}

fn escape_help(help: &str) -> String {
    help.replace('\\', "\\\\").replace('\n', "\\n")
}

pub(crate) fn format_value(value: f64, kind: ValueKind) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "+Inf" } else { "-Inf" }.to_string();
    }

    let text = value.to_string();
    match kind {
        ValueKind::Measurement if !text.contains('.') => format!("{}.0", text),
        _ => text,
    }
}
