//! Built-in mapping tables for the supported RPC document kinds.
//!
//! These mirror the element vocabulary of the device RPCs. They are the
//! authoritative field lists; extractors apply whatever the table says
//! rather than naming elements themselves.

use crate::mapping::{MappingEntry, MappingTable, ValueKind};

fn threshold(source: &str, target: &str, unit: &str) -> MappingEntry {
    MappingEntry::new(source, target, ValueKind::Threshold, Some(unit))
}

fn measurement(source: &str, target: &str, unit: &str) -> MappingEntry {
    MappingEntry::new(source, target, ValueKind::Measurement, Some(unit))
}

fn status(source: &str, target: &str) -> MappingEntry {
    MappingEntry::new(source, target, ValueKind::Status, None)
}

/// Interface-level table for optics diagnostics documents.
///
/// Thresholds hang off the `optics-diagnostics` element of each
/// physical interface. Module temperature and voltage measurements are
/// interface-scoped, not lane-scoped, so they live here too.
pub fn optics_diagnostics_table() -> MappingTable {
    MappingTable::new(
        "optics_diagnostics",
        vec![
            // Temperature thresholds
            threshold(
                "laser-temperature-high-alarm-threshold",
                "temperature_high_alarm",
                "celsius",
            ),
            threshold(
                "laser-temperature-low-alarm-threshold",
                "temperature_low_alarm",
                "celsius",
            ),
            threshold(
                "laser-temperature-high-warn-threshold",
                "temperature_high_warn",
                "celsius",
            ),
            threshold(
                "laser-temperature-low-warn-threshold",
                "temperature_low_warn",
                "celsius",
            ),
            // Voltage thresholds
            threshold(
                "module-voltage-high-alarm-threshold",
                "voltage_high_alarm",
                "volts",
            ),
            threshold(
                "module-voltage-low-alarm-threshold",
                "voltage_low_alarm",
                "volts",
            ),
            threshold(
                "module-voltage-high-warn-threshold",
                "voltage_high_warn",
                "volts",
            ),
            threshold(
                "module-voltage-low-warn-threshold",
                "voltage_low_warn",
                "volts",
            ),
            // TX power thresholds
            threshold(
                "laser-tx-power-high-alarm-threshold-dbm",
                "tx_power_high_alarm",
                "dbm",
            ),
            threshold(
                "laser-tx-power-low-alarm-threshold-dbm",
                "tx_power_low_alarm",
                "dbm",
            ),
            threshold(
                "laser-tx-power-high-warn-threshold-dbm",
                "tx_power_high_warn",
                "dbm",
            ),
            threshold(
                "laser-tx-power-low-warn-threshold-dbm",
                "tx_power_low_warn",
                "dbm",
            ),
            // RX power thresholds
            threshold(
                "laser-rx-power-high-alarm-threshold-dbm",
                "rx_power_high_alarm",
                "dbm",
            ),
            threshold(
                "laser-rx-power-low-alarm-threshold-dbm",
                "rx_power_low_alarm",
                "dbm",
            ),
            threshold(
                "laser-rx-power-high-warn-threshold-dbm",
                "rx_power_high_warn",
                "dbm",
            ),
            threshold(
                "laser-rx-power-low-warn-threshold-dbm",
                "rx_power_low_warn",
                "dbm",
            ),
            // TX bias current thresholds
            threshold(
                "laser-bias-current-high-alarm-threshold",
                "tx_bias_high_alarm",
                "ma",
            ),
            threshold(
                "laser-bias-current-low-alarm-threshold",
                "tx_bias_low_alarm",
                "ma",
            ),
            threshold(
                "laser-bias-current-high-warn-threshold",
                "tx_bias_high_warn",
                "ma",
            ),
            threshold(
                "laser-bias-current-low-warn-threshold",
                "tx_bias_low_warn",
                "ma",
            ),
            // Module-level measurements (interface-scoped, not per lane)
            measurement("module-temperature", "temperature", "celsius"),
            measurement("module-voltage", "voltage", "volts"),
        ],
    )
}

/// Lane-level table for optics diagnostics documents.
///
/// Applied once per lane-values container. Both the milliwatt and the
/// dBm readings are extracted directly; neither is recomputed from the
/// other.
pub fn lane_measurement_table() -> MappingTable {
    MappingTable::new(
        "optics_lanes",
        vec![
            measurement("laser-rx-optical-power", "rx_power_mw", "mw"),
            measurement("laser-rx-optical-power-dbm", "rx_power", "dbm"),
            measurement("laser-output-power", "tx_power_mw", "mw"),
            measurement("laser-output-power-dbm", "tx_power", "dbm"),
            measurement("laser-bias-current", "tx_bias", "ma"),
        ],
    )
}

/// Table for interface statistics documents (FEC counters and status).
///
/// Counter sources live under `ethernet-fec-statistics`; traffic rates
/// under `traffic-statistics`; statuses directly on the interface. The
/// extractor resolves each source path anywhere in the interface
/// subtree, so nesting differences across firmware stay invisible here.
pub fn statistics_table() -> MappingTable {
    MappingTable::new(
        "interface_statistics",
        vec![
            status("admin-status", "admin_status"),
            status("oper-status", "oper_status"),
            // Cumulative FEC codeword counters
            measurement("fec_ccw_count", "fec_ccw", "codewords"),
            measurement("fec_nccw_count", "fec_nccw", "codewords"),
            // Instantaneous rates reported by the device itself
            measurement("fec_ccw_error_rate", "fec_ccw_error_rate", "per_second"),
            measurement("fec_nccw_error_rate", "fec_nccw_error_rate", "per_second"),
            measurement("pre-fec-ber", "pre_fec_ber", "ratio"),
            // Traffic rates
            measurement("input-bps", "input_bps", "bps"),
            measurement("input-pps", "input_pps", "pps"),
            measurement("output-bps", "output_bps", "bps"),
            measurement("output-pps", "output_pps", "pps"),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_tables_validate() {
        optics_diagnostics_table().validate().unwrap();
        lane_measurement_table().validate().unwrap();
        statistics_table().validate().unwrap();
    }

    #[test]
    fn optics_table_covers_alarm_thresholds() {
        let t = optics_diagnostics_table();
        for field in [
            "temperature_high_alarm",
            "temperature_low_alarm",
            "voltage_high_alarm",
            "voltage_low_alarm",
            "tx_power_high_alarm",
            "tx_power_low_alarm",
            "rx_power_high_alarm",
            "rx_power_low_alarm",
            "tx_bias_high_alarm",
            "tx_bias_low_alarm",
        ] {
            assert!(
                t.entries.iter().any(|e| e.target_field == field),
                "missing {field}"
            );
        }
    }

    #[test]
    fn lane_table_extracts_both_power_scales() {
        let t = lane_measurement_table();
        let fields: Vec<_> = t.entries.iter().map(|e| e.target_field.as_str()).collect();
        assert_eq!(
            fields,
            vec!["rx_power_mw", "rx_power", "tx_power_mw", "tx_power", "tx_bias"]
        );
    }

    #[test]
    fn statistics_table_has_status_and_counters() {
        let t = statistics_table();
        assert_eq!(t.of_kind(ValueKind::Status).count(), 2);
        assert!(t.entries.iter().any(|e| e.target_field == "fec_nccw"));
        assert!(t.entries.iter().any(|e| e.target_field == "pre_fec_ber"));
    }
}
