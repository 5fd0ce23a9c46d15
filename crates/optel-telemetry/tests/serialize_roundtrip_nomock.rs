//! No-mock serializer roundtrip: run a real pipeline cycle, render the
//! exposition payload, write the three Parquet tables and read them
//! back to validate schemas and values.

use std::sync::Arc;

use arrow::array::{Array, Float64Array, StringArray};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use tempfile::TempDir;

use optel_core::delta::MemoryStateStore;
use optel_core::pipeline::{DeviceDocuments, DevicePipeline};
use optel_core::record::MergedRecord;
use optel_telemetry::{
    encode_records, interface_counters_batch, interface_dom_batch, lane_dom_batch, new_run_id,
    BatchedWriter, TableName, TelemetrySchema, WriterConfig,
};

const T0: i64 = 1_700_000_000_000_000;

const OPTICS: &str = r#"<interface-information>
  <physical-interface>
    <name>et-0/0/6</name>
    <optics-diagnostics>
      <module-temperature celsius="41.5">41.5 degrees C</module-temperature>
      <module-voltage>3.25 V</module-voltage>
      <optics-diagnostics-lane-values>
        <lane-index>0</lane-index>
        <laser-rx-optical-power-dbm>-2.28</laser-rx-optical-power-dbm>
        <laser-output-power-dbm>-1.40</laser-output-power-dbm>
        <laser-bias-current>42.5</laser-bias-current>
      </optics-diagnostics-lane-values>
    </optics-diagnostics>
  </physical-interface>
</interface-information>"#;

const STATS: &str = r#"<interface-information>
  <physical-interface>
    <name>et-0/0/6</name>
    <admin-status>up</admin-status>
    <ethernet-fec-statistics>
      <fec_ccw_count>1024</fec_ccw_count>
      <fec_nccw_count>3</fec_nccw_count>
    </ethernet-fec-statistics>
  </physical-interface>
</interface-information>"#;

const SYSTEM: &str = r#"<rpc-reply><system-information>
  <hardware-model>qfx5240-64od</hardware-model>
  <host-name>spine1</host-name>
</system-information></rpc-reply>"#;

fn normalized_records() -> Vec<MergedRecord> {
    let docs = DeviceDocuments {
        optics_diagnostics: Some(OPTICS.to_string()),
        interface_statistics: Some(STATS.to_string()),
        system_information: Some(SYSTEM.to_string()),
        ..Default::default()
    };
    let mut pipeline = DevicePipeline::new(MemoryStateStore::new());
    let out = pipeline.run("r1", T0, &docs);
    assert!(out.failures.is_empty());
    out.records
}

#[test]
fn exposition_payload_covers_all_scopes() {
    let payload = encode_records(&normalized_records());

    assert!(payload.contains(
        "optics_module_temperature_celsius{device=\"r1\",interface=\"et-0/0/6\""
    ));
    assert!(payload.contains("optics_rx_power_dbm{"));
    assert!(payload.contains("lane=\"0\""));
    assert!(payload.contains("interface_fec_ccw{"));
    assert!(payload.contains("interface_admin_status{"));
    assert!(payload.ends_with('\n'));
    // Every line is name{labels} value.
    for line in payload.lines() {
        assert!(line.contains("{") && line.contains("} "), "bad line: {line}");
    }
}

#[test]
fn parquet_tables_roundtrip() {
    let records = normalized_records();
    let run_id = new_run_id();
    let dir = TempDir::new().unwrap();
    let schemas = TelemetrySchema::new();

    for (table, batch) in [
        (
            TableName::InterfaceDom,
            interface_dom_batch(&records, &run_id).unwrap(),
        ),
        (
            TableName::LaneDom,
            lane_dom_batch(&records, &run_id).unwrap(),
        ),
        (
            TableName::InterfaceCounters,
            interface_counters_batch(&records, &run_id).unwrap(),
        ),
    ] {
        let config = WriterConfig::new(dir.path().to_path_buf(), run_id.clone())
            .with_partition_for(T0)
            .with_snappy();
        let mut writer = BatchedWriter::new(table, schemas.get(table), config);
        writer.write(batch).unwrap();
        let path = writer.close().unwrap();
        assert!(path
            .to_string_lossy()
            .contains(&format!("dt=2023-11-14/hr=22/{}/", table.dir_name())));

        let file = std::fs::File::open(&path).unwrap();
        let reader = ParquetRecordBatchReaderBuilder::try_new(file).unwrap();
        let expected: Arc<arrow::datatypes::Schema> = schemas.get(table);
        assert_eq!(reader.schema().fields(), expected.fields(), "{table}");

        let kv = reader
            .metadata()
            .file_metadata()
            .key_value_metadata()
            .unwrap();
        assert!(
            kv.iter().any(|entry| entry.key == "schema_version"
                && entry.value.as_deref() == Some(optel_telemetry::SCHEMA_VERSION)),
            "{table} missing schema_version metadata"
        );

        let batches: Vec<_> = reader.build().unwrap().map(|b| b.unwrap()).collect();
        let rows: usize = batches.iter().map(|b| b.num_rows()).sum();
        assert_eq!(rows, 1, "{table}");
    }
}

#[test]
fn interface_dom_values_survive_write() {
    let records = normalized_records();
    let run_id = new_run_id();
    let dir = TempDir::new().unwrap();
    let schemas = TelemetrySchema::new();

    let config = WriterConfig::new(dir.path().to_path_buf(), run_id.clone())
        .with_partition_for(T0);
    let mut writer = BatchedWriter::new(
        TableName::InterfaceDom,
        schemas.get(TableName::InterfaceDom),
        config,
    );
    writer
        .write(interface_dom_batch(&records, &run_id).unwrap())
        .unwrap();
    let path = writer.close().unwrap();

    let file = std::fs::File::open(&path).unwrap();
    let mut reader = ParquetRecordBatchReaderBuilder::try_new(file)
        .unwrap()
        .build()
        .unwrap();
    let batch = reader.next().unwrap().unwrap();

    let devices = batch
        .column_by_name("device")
        .unwrap()
        .as_any()
        .downcast_ref::<StringArray>()
        .unwrap();
    assert_eq!(devices.value(0), "r1");

    let hostnames = batch
        .column_by_name("origin_hostname")
        .unwrap()
        .as_any()
        .downcast_ref::<StringArray>()
        .unwrap();
    assert_eq!(hostnames.value(0), "spine1");

    let temps = batch
        .column_by_name("temperature")
        .unwrap()
        .as_any()
        .downcast_ref::<Float64Array>()
        .unwrap();
    assert_eq!(temps.value(0), 41.5);

    // Chassis inventory was absent this run; transceiver columns are
    // null, not empty strings.
    let serials = batch
        .column_by_name("serial_number")
        .unwrap()
        .as_any()
        .downcast_ref::<StringArray>()
        .unwrap();
    assert!(serials.is_null(0));
}
