//! Exposition-line encoder.
//!
//! Renders merged records into `name{label="value",...} value` lines
//! for a pull-based metrics endpoint. One line per non-null field;
//! absence of a line, not a sentinel value, signals "no data". Metric
//! names come from one fixed canonical-to-exposition table so the
//! exposed surface is stable regardless of which mapping tables
//! produced the fields.

use optel_core::record::{FieldValue, MergedRecord, RecordScope};

/// Canonical field name to exposition metric name.
///
/// The exposed names carry the measurement domain and unit; canonical
/// names stay terse for mapping tables and columnar storage.
const METRIC_NAMES: &[(&str, &str)] = &[
    // Module-level measurements.
    ("temperature", "optics_module_temperature_celsius"),
    ("voltage", "optics_module_voltage_volts"),
    // Lane measurements, both scales extracted directly.
    ("rx_power", "optics_rx_power_dbm"),
    ("rx_power_mw", "optics_rx_power_mw"),
    ("tx_power", "optics_tx_power_dbm"),
    ("tx_power_mw", "optics_tx_power_mw"),
    ("tx_bias", "optics_tx_bias_ma"),
    // Temperature thresholds.
    ("temperature_high_alarm", "optics_temperature_high_alarm_celsius"),
    ("temperature_low_alarm", "optics_temperature_low_alarm_celsius"),
    ("temperature_high_warn", "optics_temperature_high_warn_celsius"),
    ("temperature_low_warn", "optics_temperature_low_warn_celsius"),
    // Voltage thresholds.
    ("voltage_high_alarm", "optics_voltage_high_alarm_volts"),
    ("voltage_low_alarm", "optics_voltage_low_alarm_volts"),
    ("voltage_high_warn", "optics_voltage_high_warn_volts"),
    ("voltage_low_warn", "optics_voltage_low_warn_volts"),
    // Optical power thresholds.
    ("tx_power_high_alarm", "optics_tx_power_high_alarm_dbm"),
    ("tx_power_low_alarm", "optics_tx_power_low_alarm_dbm"),
    ("tx_power_high_warn", "optics_tx_power_high_warn_dbm"),
    ("tx_power_low_warn", "optics_tx_power_low_warn_dbm"),
    ("rx_power_high_alarm", "optics_rx_power_high_alarm_dbm"),
    ("rx_power_low_alarm", "optics_rx_power_low_alarm_dbm"),
    ("rx_power_high_warn", "optics_rx_power_high_warn_dbm"),
    ("rx_power_low_warn", "optics_rx_power_low_warn_dbm"),
    // Bias thresholds.
    ("tx_bias_high_alarm", "optics_tx_bias_high_alarm_ma"),
    ("tx_bias_low_alarm", "optics_tx_bias_low_alarm_ma"),
    ("tx_bias_high_warn", "optics_tx_bias_high_warn_ma"),
    ("tx_bias_low_warn", "optics_tx_bias_low_warn_ma"),
    // Statuses, traffic and speed.
    ("admin_status", "interface_admin_status"),
    ("oper_status", "interface_oper_status"),
    ("speed_bps", "interface_speed_bps"),
    ("input_bps", "interface_input_bps"),
    ("input_pps", "interface_input_pps"),
    ("output_bps", "interface_output_bps"),
    ("output_pps", "interface_output_pps"),
    // FEC counters and rates.
    ("fec_ccw", "interface_fec_ccw"),
    ("fec_nccw", "interface_fec_nccw"),
    ("fec_ccw_error_rate", "interface_fec_ccw_error_rate"),
    ("fec_nccw_error_rate", "interface_fec_nccw_error_rate"),
    ("pre_fec_ber", "interface_pre_fec_ber"),
    ("fec_ccw_delta", "interface_fec_ccw_delta"),
    ("fec_ccw_rate", "interface_fec_ccw_rate"),
    ("fec_ccw_reset", "interface_fec_ccw_reset"),
    ("fec_nccw_delta", "interface_fec_nccw_delta"),
    ("fec_nccw_rate", "interface_fec_nccw_rate"),
    ("fec_nccw_reset", "interface_fec_nccw_reset"),
    ("collection_interval_sec", "interface_collection_interval_sec"),
];

/// Exposition name for a canonical field, if the field is exposed.
///
/// Histogram bins are generated names (`histogram_bin_0` through
/// `histogram_bin_15` plus `_live`/`_harvest` components) and map by
/// prefix rather than by table entry.
pub fn exposition_name(canonical: &str) -> Option<String> {
    if canonical.starts_with("histogram_bin_") {
        return Some(format!("interface_fec_{canonical}"));
    }
    METRIC_NAMES
        .iter()
        .find(|(name, _)| *name == canonical)
        .map(|(_, exposed)| (*exposed).to_string())
}

/// Escape a label value: backslash, double quote and newline.
fn escape_label(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out
}

fn label_set(record: &MergedRecord) -> String {
    let mut labels = vec![
        format!("device=\"{}\"", escape_label(&record.device)),
        format!("interface=\"{}\"", escape_label(&record.if_name)),
    ];
    if let RecordScope::Lane { lane } = record.scope {
        labels.push(format!("lane=\"{lane}\""));
    }

    let mut push = |name: &str, value: &Option<String>| {
        if let Some(v) = value {
            labels.push(format!("{name}=\"{}\"", escape_label(v)));
        }
    };
    push("hostname", &record.hostname);
    push("device_profile", &record.device_profile);
    push("device_serial", &record.device_serial);
    push("vendor", &record.transceiver.vendor);
    push("part_number", &record.transceiver.part_number);
    push("serial_number", &record.transceiver.serial_number);
    push("media_type", &record.transceiver.media_type);
    push("cable_type", &record.transceiver.cable_type);
    push("wavelength", &record.transceiver.wavelength);
    push("fiber_type", &record.transceiver.fiber_type);

    labels.join(",")
}

/// Encode one merged record into exposition lines.
///
/// Status fields encode up=1/other=0; non-status text fields have no
/// numeric form and emit nothing.
pub fn encode_record(record: &MergedRecord) -> Vec<String> {
    let labels = label_set(record);
    let mut lines = Vec::new();

    for (field, value) in &record.fields {
        let Some(name) = exposition_name(field) else {
            continue;
        };
        let rendered = match value {
            FieldValue::Float(v) => format!("{v}"),
            FieldValue::Int(v) => format!("{v}"),
            FieldValue::Text(s) if field.ends_with("_status") => {
                if s == "up" { "1".to_string() } else { "0".to_string() }
            }
            FieldValue::Text(_) => continue,
        };
        lines.push(format!("{name}{{{labels}}} {rendered}"));
    }
    lines
}

/// Encode a record set into one exposition payload with the required
/// trailing newline. An empty record set yields an empty payload.
pub fn encode_records(records: &[MergedRecord]) -> String {
    let lines: Vec<String> = records.iter().flat_map(|r| encode_record(r)).collect();
    if lines.is_empty() {
        return String::new();
    }
    let mut payload = lines.join("\n");
    payload.push('\n');
    payload
}
