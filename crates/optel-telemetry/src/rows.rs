//! Merged-record to Arrow row conversion.
//!
//! Each builder selects the records of its scope from a merged set and
//! produces one `RecordBatch` against the fixed table schema, null
//! filling whatever a record does not carry. Rows carry the source-run
//! identifier so concurrent producers can write into the same hourly
//! partition without collision.

use std::sync::Arc;

use arrow::array::{
    ArrayRef, Float64Array, Int32Array, Int64Array, RecordBatch, StringArray,
    TimestampMicrosecondArray,
};
use chrono::DateTime;

use optel_core::record::{FieldValue, MergedRecord, RecordScope};

use crate::schema::{interface_counters_schema, interface_dom_schema, lane_dom_schema};
use crate::writer::WriteError;

/// Hourly partition key for a collection timestamp: `dt=YYYY-MM-DD/hr=HH`.
pub fn partition_key(timestamp_us: i64) -> String {
    let dt = DateTime::from_timestamp_micros(timestamp_us).unwrap_or(DateTime::UNIX_EPOCH);
    format!("dt={}/hr={}", dt.format("%Y-%m-%d"), dt.format("%H"))
}

fn float_col(records: &[&MergedRecord], field: &str) -> ArrayRef {
    let values: Vec<Option<f64>> = records
        .iter()
        .map(|r| r.fields.get(field).and_then(FieldValue::as_f64))
        .collect();
    Arc::new(Float64Array::from(values))
}

fn status_col(records: &[&MergedRecord], field: &str) -> ArrayRef {
    let values: Vec<Option<String>> = records
        .iter()
        .map(|r| {
            r.fields
                .get(field)
                .and_then(FieldValue::as_str)
                .map(str::to_string)
        })
        .collect();
    Arc::new(StringArray::from(values))
}

/// Identity columns shared by all three tables, in schema order.
fn identity_cols(records: &[&MergedRecord], run_id: &str) -> Vec<ArrayRef> {
    let device: Vec<&str> = records.iter().map(|r| r.device.as_str()).collect();
    let hostname: Vec<Option<&str>> = records.iter().map(|r| r.hostname.as_deref()).collect();
    let origin_name: Vec<Option<&str>> =
        records.iter().map(|r| r.device_serial.as_deref()).collect();
    let profile: Vec<Option<&str>> =
        records.iter().map(|r| r.device_profile.as_deref()).collect();
    let run_ids: Vec<&str> = records.iter().map(|_| run_id).collect();
    let timestamps: Vec<i64> = records.iter().map(|r| r.timestamp_us).collect();
    let if_names: Vec<&str> = records.iter().map(|r| r.if_name.as_str()).collect();

    vec![
        Arc::new(StringArray::from(device)),
        Arc::new(StringArray::from(hostname)),
        Arc::new(StringArray::from(origin_name)),
        Arc::new(StringArray::from(profile)),
        Arc::new(StringArray::from(run_ids)),
        Arc::new(TimestampMicrosecondArray::from(timestamps).with_timezone("UTC")),
        Arc::new(StringArray::from(if_names)),
    ]
}

/// Build the `interface_dom` batch from the interface-scoped records.
pub fn interface_dom_batch(
    records: &[MergedRecord],
    run_id: &str,
) -> Result<RecordBatch, WriteError> {
    let rows: Vec<&MergedRecord> = records
        .iter()
        .filter(|r| matches!(r.scope, RecordScope::Interface))
        .collect();

    let mut columns = identity_cols(&rows, run_id);
    for getter in [
        |r: &MergedRecord| r.transceiver.vendor.clone(),
        |r: &MergedRecord| r.transceiver.part_number.clone(),
        |r: &MergedRecord| r.transceiver.serial_number.clone(),
        |r: &MergedRecord| r.transceiver.media_type.clone(),
        |r: &MergedRecord| r.transceiver.fiber_type.clone(),
    ] {
        let values: Vec<Option<String>> = rows.iter().map(|r| getter(r)).collect();
        columns.push(Arc::new(StringArray::from(values)));
    }
    columns.push(float_col(&rows, "temperature"));
    columns.push(float_col(&rows, "voltage"));

    Ok(RecordBatch::try_new(
        Arc::new(interface_dom_schema()),
        columns,
    )?)
}

/// Build the `lane_dom` batch from the lane-scoped records.
pub fn lane_dom_batch(records: &[MergedRecord], run_id: &str) -> Result<RecordBatch, WriteError> {
    let rows: Vec<&MergedRecord> = records
        .iter()
        .filter(|r| matches!(r.scope, RecordScope::Lane { .. }))
        .collect();

    let lanes: Vec<i32> = rows
        .iter()
        .map(|r| match r.scope {
            RecordScope::Lane { lane } => lane as i32,
            _ => 0,
        })
        .collect();

    let mut columns = identity_cols(&rows, run_id);
    columns.push(Arc::new(Int32Array::from(lanes)));
    columns.push(float_col(&rows, "tx_bias"));
    columns.push(float_col(&rows, "tx_power"));
    columns.push(float_col(&rows, "rx_power"));

    Ok(RecordBatch::try_new(Arc::new(lane_dom_schema()), columns)?)
}

/// Build the `interface_counters` batch from the counter-scoped records.
pub fn interface_counters_batch(
    records: &[MergedRecord],
    run_id: &str,
) -> Result<RecordBatch, WriteError> {
    let rows: Vec<&MergedRecord> = records
        .iter()
        .filter(|r| matches!(r.scope, RecordScope::Counter))
        .collect();

    let speed: Vec<Option<i64>> = rows
        .iter()
        .map(|r| {
            r.fields
                .get("speed_bps")
                .and_then(FieldValue::as_f64)
                .map(|v| v as i64)
        })
        .collect();

    let mut columns = identity_cols(&rows, run_id);
    columns.push(status_col(&rows, "admin_status"));
    columns.push(status_col(&rows, "oper_status"));
    columns.push(Arc::new(Int64Array::from(speed)));
    for field in [
        "input_bps",
        "input_pps",
        "output_bps",
        "output_pps",
        "fec_ccw",
        "fec_nccw",
        "fec_ccw_error_rate",
        "fec_nccw_error_rate",
        "pre_fec_ber",
        "fec_ccw_delta",
        "fec_ccw_rate",
        "fec_nccw_delta",
        "fec_nccw_rate",
        "collection_interval_sec",
    ] {
        columns.push(float_col(&rows, field));
    }

    Ok(RecordBatch::try_new(
        Arc::new(interface_counters_schema()),
        columns,
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::Array;
    use optel_core::record::{FieldMap, TransceiverMetadata};

    fn record(scope: RecordScope, fields: FieldMap) -> MergedRecord {
        MergedRecord {
            if_name: "et-0/0/6".into(),
            device: "r1".into(),
            timestamp_us: 1_700_000_000_000_000,
            scope,
            fields,
            device_serial: Some("XK1234567890".into()),
            hostname: Some("spine1".into()),
            device_profile: None,
            os_version: None,
            transceiver: TransceiverMetadata::default(),
        }
    }

    #[test]
    fn partition_key_format() {
        // 2023-11-14T22:13:20Z
        assert_eq!(partition_key(1_700_000_000_000_000), "dt=2023-11-14/hr=22");
        assert_eq!(partition_key(0), "dt=1970-01-01/hr=00");
    }

    #[test]
    fn interface_dom_rows_select_interface_scope() {
        let mut fields = FieldMap::new();
        fields.insert("temperature".into(), FieldValue::Float(41.5));
        let records = vec![
            record(RecordScope::Interface, fields),
            record(RecordScope::Lane { lane: 0 }, FieldMap::new()),
        ];
        let batch = interface_dom_batch(&records, "run-1").unwrap();
        assert_eq!(batch.num_rows(), 1);
        assert_eq!(batch.num_columns(), interface_dom_schema().fields().len());

        let temps = batch
            .column_by_name("temperature")
            .unwrap()
            .as_any()
            .downcast_ref::<Float64Array>()
            .unwrap();
        assert_eq!(temps.value(0), 41.5);
    }

    #[test]
    fn lane_rows_carry_lane_index() {
        let mut fields = FieldMap::new();
        fields.insert("rx_power".into(), FieldValue::Float(-2.28));
        let records = vec![record(RecordScope::Lane { lane: 3 }, fields)];
        let batch = lane_dom_batch(&records, "run-1").unwrap();
        assert_eq!(batch.num_rows(), 1);

        let lanes = batch
            .column_by_name("lane")
            .unwrap()
            .as_any()
            .downcast_ref::<Int32Array>()
            .unwrap();
        assert_eq!(lanes.value(0), 3);
    }

    #[test]
    fn counter_rows_null_fill_missing_columns() {
        let mut fields = FieldMap::new();
        fields.insert("fec_ccw".into(), FieldValue::Float(1024.0));
        fields.insert("admin_status".into(), FieldValue::Text("up".into()));
        let records = vec![record(RecordScope::Counter, fields)];
        let batch = interface_counters_batch(&records, "run-1").unwrap();

        let ber = batch
            .column_by_name("pre_fec_ber")
            .unwrap()
            .as_any()
            .downcast_ref::<Float64Array>()
            .unwrap();
        assert!(ber.is_null(0));

        let fec = batch
            .column_by_name("fec_ccw")
            .unwrap()
            .as_any()
            .downcast_ref::<Float64Array>()
            .unwrap();
        assert_eq!(fec.value(0), 1024.0);
    }

    #[test]
    fn empty_scope_yields_empty_batch() {
        let records = vec![record(RecordScope::Interface, FieldMap::new())];
        let batch = interface_counters_batch(&records, "run-1").unwrap();
        assert_eq!(batch.num_rows(), 0);
    }
}
