//! Batched Parquet writer for the hourly telemetry tables.
//!
//! Provides buffered writes with automatic flushing and crash safety:
//! data lands in a temp file and is renamed into the partition only on
//! close, so readers never see a half-written file.

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::RecordBatch;
use arrow::datatypes::Schema;
use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression, Encoding, ZstdLevel};
use parquet::file::metadata::KeyValue;
use parquet::file::properties::{WriterProperties, WriterVersion};
use thiserror::Error;
use tracing::debug;

use crate::schema::TableName;

/// Errors from telemetry writer operations.
#[derive(Error, Debug)]
pub enum WriteError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Writer not initialized")]
    NotInitialized,

    #[error("Buffer empty")]
    EmptyBuffer,
}

/// Configuration for the batched writer.
#[derive(Debug, Clone)]
pub struct WriterConfig {
    /// Base directory for hourly partitions.
    pub base_dir: PathBuf,

    /// Compression codec.
    pub compression: Compression,

    /// Row group size in bytes.
    pub row_group_size: usize,

    /// Maximum rows to buffer before flushing.
    pub batch_size: usize,

    /// Source-run identifier for file naming.
    pub run_id: String,

    /// Hourly partition key (`dt=YYYY-MM-DD/hr=HH`).
    pub partition: String,
}

impl WriterConfig {
    /// Create config with defaults; the partition comes from the
    /// current UTC time unless overridden.
    pub fn new(base_dir: PathBuf, run_id: String) -> Self {
        let now = chrono::Utc::now();
        WriterConfig {
            base_dir,
            compression: Compression::ZSTD(ZstdLevel::try_new(3).expect("valid zstd level")),
            row_group_size: 512 * 1024, // 512KB default
            batch_size: crate::DEFAULT_BATCH_SIZE,
            run_id,
            partition: crate::rows::partition_key(now.timestamp_micros()),
        }
    }

    /// Use snappy compression instead of zstd.
    pub fn with_snappy(mut self) -> Self {
        self.compression = Compression::SNAPPY;
        self
    }

    /// Write into the hourly partition of a given collection timestamp.
    pub fn with_partition_for(mut self, timestamp_us: i64) -> Self {
        self.partition = crate::rows::partition_key(timestamp_us);
        self
    }

    /// Set custom batch size.
    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size;
        self
    }
}

/// Batched writer for a single telemetry table.
pub struct BatchedWriter {
    table: TableName,
    schema: Arc<Schema>,
    config: WriterConfig,
    buffer: Vec<RecordBatch>,
    rows_buffered: usize,
    output_path: Option<PathBuf>,
    temp_path: Option<PathBuf>,
    writer: Option<ArrowWriter<File>>,
}

impl BatchedWriter {
    /// Create a new batched writer for a table.
    pub fn new(table: TableName, schema: Arc<Schema>, config: WriterConfig) -> Self {
        BatchedWriter {
            table,
            schema,
            config,
            buffer: Vec::new(),
            rows_buffered: 0,
            output_path: None,
            temp_path: None,
            writer: None,
        }
    }

    /// Write a record batch to the buffer.
    ///
    /// If the buffer exceeds the batch size, it will be flushed to disk.
    pub fn write(&mut self, batch: RecordBatch) -> Result<(), WriteError> {
        let num_rows = batch.num_rows();
        self.buffer.push(batch);
        self.rows_buffered += num_rows;

        if self.rows_buffered >= self.config.batch_size {
            self.flush()?;
        }

        Ok(())
    }

    /// Flush buffered data to disk.
    pub fn flush(&mut self) -> Result<(), WriteError> {
        if self.buffer.is_empty() {
            return Ok(());
        }

        if self.writer.is_none() {
            self.init_writer()?;
        }

        let writer = self.writer.as_mut().ok_or(WriteError::NotInitialized)?;

        for batch in self.buffer.drain(..) {
            writer.write(&batch)?;
        }

        self.rows_buffered = 0;
        Ok(())
    }

    /// Close the writer and rename the temp file into the partition.
    pub fn close(mut self) -> Result<PathBuf, WriteError> {
        if self.writer.is_none() && self.buffer.is_empty() {
            return Err(WriteError::EmptyBuffer);
        }
        self.flush()?;

        if let Some(writer) = self.writer.take() {
            writer.close()?;
        }

        let temp_path = self.temp_path.take().ok_or(WriteError::NotInitialized)?;
        let output_path = self.output_path.take().ok_or(WriteError::NotInitialized)?;
        atomic_rename(&temp_path, &output_path)?;

        debug!(target: "optel::writer", table = %self.table,
               path = %output_path.display(), "parquet file finalized");
        Ok(output_path)
    }

    /// Get the current output path (if writer is initialized).
    pub fn output_path(&self) -> Option<&Path> {
        self.output_path.as_deref()
    }

    /// Initialize the Parquet writer.
    fn init_writer(&mut self) -> Result<(), WriteError> {
        let output_path = self.build_output_path();

        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Temp file for atomic write.
        let temp_path = output_path.with_extension("parquet.tmp");
        let file = File::create(&temp_path)?;

        let props = WriterProperties::builder()
            .set_writer_version(WriterVersion::PARQUET_2_0)
            .set_compression(self.config.compression)
            .set_max_row_group_size(self.table.row_group_size())
            // Readers check this against the schema they expect.
            .set_key_value_metadata(Some(vec![KeyValue::new(
                "schema_version".to_string(),
                crate::SCHEMA_VERSION.to_string(),
            )]))
            // Dictionary encoding for string columns
            .set_dictionary_enabled(true)
            // Plain encoding for numeric columns
            .set_encoding(Encoding::PLAIN)
            .build();

        let writer = ArrowWriter::try_new(file, self.schema.clone(), Some(props))?;

        self.writer = Some(writer);
        self.temp_path = Some(temp_path);
        self.output_path = Some(output_path);

        Ok(())
    }

    /// Build the output path: hourly partition, per-table directory,
    /// run-suffixed file name.
    fn build_output_path(&self) -> PathBuf {
        let run_suffix = self.config.run_id.split('-').next_back().unwrap_or("xxxx");
        let filename = format!("{}_{}.parquet", self.table.as_str(), run_suffix);

        self.config
            .base_dir
            .join(&self.config.partition)
            .join(self.table.dir_name())
            .join(filename)
    }
}

impl Drop for BatchedWriter {
    fn drop(&mut self) {
        // Best-effort flush on drop
        if !self.buffer.is_empty() {
            let _ = self.flush();
        }
    }
}

/// Helper to rename temp file to final path atomically.
pub fn atomic_rename(temp_path: &Path, final_path: &Path) -> Result<(), WriteError> {
    fs::rename(temp_path, final_path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rows::lane_dom_batch;
    use optel_core::record::{FieldMap, FieldValue, MergedRecord, RecordScope, TransceiverMetadata};
    use tempfile::TempDir;

    fn lane_record() -> MergedRecord {
        let mut fields = FieldMap::new();
        fields.insert("rx_power".into(), FieldValue::Float(-2.28));
        MergedRecord {
            if_name: "et-0/0/6".into(),
            device: "r1".into(),
            timestamp_us: 1_700_000_000_000_000,
            scope: RecordScope::Lane { lane: 0 },
            fields,
            device_serial: None,
            hostname: None,
            device_profile: None,
            os_version: None,
            transceiver: TransceiverMetadata::default(),
        }
    }

    fn config(dir: &TempDir) -> WriterConfig {
        WriterConfig::new(
            dir.path().to_path_buf(),
            "2f5a1c8e-0000-0000-0000-9d2b7c41a7f3".to_string(),
        )
        .with_partition_for(1_700_000_000_000_000)
        .with_batch_size(1)
    }

    #[test]
    fn writer_config_defaults() {
        let dir = TempDir::new().unwrap();
        let config = WriterConfig::new(dir.path().to_path_buf(), "run".to_string());
        assert_eq!(config.batch_size, crate::DEFAULT_BATCH_SIZE);
        assert!(matches!(config.compression, Compression::ZSTD(_)));
        assert!(config.partition.starts_with("dt="));
    }

    #[test]
    fn write_and_close_lands_in_partition() {
        let dir = TempDir::new().unwrap();
        let schema = Arc::new(crate::schema::lane_dom_schema());
        let mut writer = BatchedWriter::new(TableName::LaneDom, schema, config(&dir));

        let batch = lane_dom_batch(&[lane_record()], "run-1").unwrap();
        writer.write(batch).unwrap();

        let path = writer.close().unwrap();
        assert!(path.exists());
        let path_str = path.to_string_lossy();
        assert!(path_str.contains("dt=2023-11-14/hr=22/lane-dom/"));
        assert!(path_str.ends_with("lane_dom_9d2b7c41a7f3.parquet"));
        // Temp file is gone after the rename.
        assert!(!path.with_extension("parquet.tmp").exists());
    }

    #[test]
    fn close_without_writes_is_empty_buffer() {
        let dir = TempDir::new().unwrap();
        let schema = Arc::new(crate::schema::lane_dom_schema());
        let writer = BatchedWriter::new(TableName::LaneDom, schema, config(&dir));
        assert!(matches!(writer.close().unwrap_err(), WriteError::EmptyBuffer));
    }
}
