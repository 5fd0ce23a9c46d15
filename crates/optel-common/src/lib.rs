//! Optel common types shared across the normalization engine.
//!
//! This crate provides foundational types used by every other crate:
//! - Structured error taxonomy with categories and recoverability hints
//! - Interface identity normalization (base names, channels, chassis slots)
//! - Fiber type classification from transceiver metadata

pub mod error;
pub mod fiber;
pub mod ifname;

pub use error::{Error, ErrorCategory, Result};
pub use fiber::{determine_fiber_type, parse_fiber_mode, FiberType};
pub use ifname::{
    base_interface_name, interface_channel, juniper_interface_name, parse_slot_name, SlotKind,
};

/// Schema version stamped into persisted counter state files and
/// Parquet file metadata.
pub const SCHEMA_VERSION: &str = "1.0.0";
