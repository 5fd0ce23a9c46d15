//! Optel output serializers.
//!
//! This crate provides:
//! - Exposition-line encoder for pull-based metrics endpoints
//! - Arrow schema definitions for the three hourly telemetry tables
//! - Merged-record to row conversion with hourly partition keys
//! - Batched Parquet writer with compression and atomic finalization

pub mod exposition;
pub mod rows;
pub mod schema;
pub mod writer;

pub use exposition::{encode_record, encode_records, exposition_name};
pub use rows::{interface_counters_batch, interface_dom_batch, lane_dom_batch, partition_key};
pub use schema::{
    interface_counters_schema, interface_dom_schema, lane_dom_schema, TableName, TelemetrySchema,
};
pub use writer::{BatchedWriter, WriteError, WriterConfig};

pub use optel_common::SCHEMA_VERSION;

/// Default batch size for buffered writes.
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// Fresh source-run identifier for one collection cycle's output files.
pub fn new_run_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
