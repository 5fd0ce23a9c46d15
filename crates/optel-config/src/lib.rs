//! Optel declarative field-mapping configuration.
//!
//! This crate provides:
//! - Typed mapping tables: ordered `(source_path, target_field, kind, unit)` entries
//! - Built-in tables for the supported RPC document kinds
//! - Collection filters (interface allow-lists)
//! - Structural validation performed once at load time
//!
//! Tables are immutable global configuration: constructed once at
//! process start and shared read-only by every worker.

pub mod builtin;
pub mod mapping;

pub use builtin::{lane_measurement_table, optics_diagnostics_table, statistics_table};
pub use mapping::{CollectionFilter, MappingEntry, MappingTable, ValueKind};
