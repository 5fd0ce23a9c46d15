//! Arrow schema definitions for the hourly telemetry tables.
//!
//! Tables defined:
//! - `interface_dom`: interface-level DOM measurements and identity
//! - `lane_dom`: per-lane optical measurements
//! - `interface_counters`: FEC counters, deltas and traffic statistics
//!
//! Column order is fixed per schema version; rows that lack a column
//! are null-filled, never dropped.

use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use std::sync::Arc;

/// Table names for hourly Parquet storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableName {
    InterfaceDom,
    LaneDom,
    InterfaceCounters,
}

impl TableName {
    /// Get the string name used in file names.
    pub fn as_str(&self) -> &'static str {
        match self {
            TableName::InterfaceDom => "interface_dom",
            TableName::LaneDom => "lane_dom",
            TableName::InterfaceCounters => "interface_counters",
        }
    }

    /// Get the per-table subdirectory inside an hourly partition.
    pub fn dir_name(&self) -> &'static str {
        match self {
            TableName::InterfaceDom => "intf-dom",
            TableName::LaneDom => "lane-dom",
            TableName::InterfaceCounters => "intf-counters",
        }
    }

    /// Get the default row group size for this table.
    pub fn row_group_size(&self) -> usize {
        match self {
            TableName::InterfaceDom => 256 * 1024,      // 256KB
            TableName::LaneDom => 512 * 1024,           // 512KB
            TableName::InterfaceCounters => 512 * 1024, // 512KB
        }
    }
}

impl std::fmt::Display for TableName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Container for all table schemas.
pub struct TelemetrySchema {
    pub interface_dom: Arc<Schema>,
    pub lane_dom: Arc<Schema>,
    pub interface_counters: Arc<Schema>,
}

impl TelemetrySchema {
    /// Create all schemas.
    pub fn new() -> Self {
        TelemetrySchema {
            interface_dom: Arc::new(interface_dom_schema()),
            lane_dom: Arc::new(lane_dom_schema()),
            interface_counters: Arc::new(interface_counters_schema()),
        }
    }

    /// Get schema by table name.
    pub fn get(&self, table: TableName) -> Arc<Schema> {
        match table {
            TableName::InterfaceDom => self.interface_dom.clone(),
            TableName::LaneDom => self.lane_dom.clone(),
            TableName::InterfaceCounters => self.interface_counters.clone(),
        }
    }
}

impl Default for TelemetrySchema {
    fn default() -> Self {
        Self::new()
    }
}

/// Helper to create a timestamp field (microseconds UTC).
fn timestamp_field(name: &str, nullable: bool) -> Field {
    Field::new(
        name,
        DataType::Timestamp(TimeUnit::Microsecond, Some("UTC".into())),
        nullable,
    )
}

fn string_field(name: &str, nullable: bool) -> Field {
    Field::new(name, DataType::Utf8, nullable)
}

fn float_field(name: &str) -> Field {
    Field::new(name, DataType::Float64, true)
}

/// Identity columns shared by all three tables.
fn identity_fields() -> Vec<Field> {
    vec![
        string_field("device", false),
        string_field("origin_hostname", true),
        // The device chassis serial.
        string_field("origin_name", true),
        string_field("device_profile", true),
        string_field("run_id", false),
        timestamp_field("timestamp", false),
        string_field("if_name", false),
    ]
}

/// Schema for `interface_dom`: module measurements plus transceiver
/// identity.
pub fn interface_dom_schema() -> Schema {
    let mut fields = identity_fields();
    fields.extend(vec![
        string_field("vendor", true),
        string_field("part_number", true),
        string_field("serial_number", true),
        string_field("media_type", true),
        string_field("fiber_type", true),
        float_field("temperature"),
        float_field("voltage"),
    ]);
    Schema::new(fields)
}

/// Schema for `lane_dom`: per-lane optical measurements.
pub fn lane_dom_schema() -> Schema {
    let mut fields = identity_fields();
    fields.extend(vec![
        Field::new("lane", DataType::Int32, false),
        float_field("tx_bias"),
        float_field("tx_power"),
        float_field("rx_power"),
    ]);
    Schema::new(fields)
}

/// Schema for `interface_counters`: statuses, traffic, FEC counters
/// and the derived deltas and rates.
pub fn interface_counters_schema() -> Schema {
    let mut fields = identity_fields();
    fields.extend(vec![
        string_field("admin_status", true),
        string_field("oper_status", true),
        Field::new("speed_bps", DataType::Int64, true),
        float_field("input_bps"),
        float_field("input_pps"),
        float_field("output_bps"),
        float_field("output_pps"),
        float_field("fec_ccw"),
        float_field("fec_nccw"),
        float_field("fec_ccw_error_rate"),
        float_field("fec_nccw_error_rate"),
        float_field("pre_fec_ber"),
        float_field("fec_ccw_delta"),
        float_field("fec_ccw_rate"),
        float_field("fec_nccw_delta"),
        float_field("fec_nccw_rate"),
        float_field("collection_interval_sec"),
    ]);
    Schema::new(fields)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interface_dom_columns() {
        let schema = interface_dom_schema();
        assert!(schema.field_with_name("device").is_ok());
        assert!(schema.field_with_name("temperature").is_ok());
        assert!(schema.field_with_name("serial_number").is_ok());
        assert!(schema.field_with_name("run_id").is_ok());
    }

    #[test]
    fn lane_dom_columns() {
        let schema = lane_dom_schema();
        assert!(schema.field_with_name("lane").is_ok());
        assert!(schema.field_with_name("rx_power").is_ok());
        assert!(!schema.field_with_name("lane").unwrap().is_nullable());
    }

    #[test]
    fn interface_counters_columns() {
        let schema = interface_counters_schema();
        assert!(schema.field_with_name("fec_ccw").is_ok());
        assert!(schema.field_with_name("fec_ccw_delta").is_ok());
        assert!(schema.field_with_name("collection_interval_sec").is_ok());
    }

    #[test]
    fn table_name_layout() {
        assert_eq!(TableName::InterfaceDom.as_str(), "interface_dom");
        assert_eq!(TableName::InterfaceDom.dir_name(), "intf-dom");
        assert_eq!(TableName::LaneDom.dir_name(), "lane-dom");
        assert_eq!(TableName::InterfaceCounters.dir_name(), "intf-counters");
    }

    #[test]
    fn schema_container_get() {
        let schemas = TelemetrySchema::new();
        let lane = schemas.get(TableName::LaneDom);
        assert!(lane.field_with_name("tx_bias").is_ok());
    }
}
