//! Canonical record types produced by the normalization engine.
//!
//! Records pair a fixed identity with an ordered field map. The map
//! form is what lets one mapping table drive extraction, one encoder
//! walk "every non-null field", and one tabular schema null-fill
//! whatever a record does not carry.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use optel_common::base_interface_name;

/// A single extracted field value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Float(f64),
    Int(i64),
    Text(String),
}

impl FieldValue {
    /// Numeric view; integers widen, text is not coerced.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Float(v) => Some(*v),
            FieldValue::Int(v) => Some(*v as f64),
            FieldValue::Text(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// Ordered field map shared by all record kinds.
pub type FieldMap = BTreeMap<String, FieldValue>;

/// One record per physical interface: identity, thresholds, statuses.
///
/// Always produced for every admitted interface, even when the module
/// reports no diagnostics capability; in that case the field map is
/// empty and every measurement is "unknown", not zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterfaceRecord {
    pub if_name: String,
    pub device: String,
    /// Collection timestamp, microseconds since the Unix epoch.
    pub timestamp_us: i64,
    pub fields: FieldMap,
}

/// One record per (interface, lane index): measured optical values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaneRecord {
    pub if_name: String,
    pub device: String,
    pub lane: u32,
    pub timestamp_us: i64,
    pub fields: FieldMap,
}

/// One record per interface from a statistics document: cumulative FEC
/// counters, the 16-bin error histogram, statuses and traffic rates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterfaceCounterRecord {
    pub if_name: String,
    pub device: String,
    pub timestamp_us: i64,
    pub fields: FieldMap,
}

/// Device-level metadata from a system information document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceMetadata {
    pub device: String,
    pub hostname: Option<String>,
    /// `Juniper_{model}` profile string.
    pub device_profile: Option<String>,
    pub hardware_model: Option<String>,
    pub os_name: Option<String>,
    pub os_version: Option<String>,
    /// Device serial as reported by the device itself; the chassis
    /// inventory serial wins when both are present.
    pub serial_number: Option<String>,
}

/// Per-interface transceiver metadata from inventory documents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransceiverMetadata {
    pub vendor: Option<String>,
    pub part_number: Option<String>,
    pub serial_number: Option<String>,
    pub description: Option<String>,
    pub media_type: Option<String>,
    pub cable_type: Option<String>,
    pub wavelength: Option<String>,
    pub fiber_type: Option<String>,
    pub firmware_version: Option<String>,
}

/// Chassis inventory extraction: device serial plus transceivers keyed
/// by normalized base interface name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChassisInventory {
    pub device: String,
    /// Device chassis serial number.
    pub serial_number: Option<String>,
    pub transceivers: BTreeMap<String, TransceiverMetadata>,
}

/// PIC detail extraction: richer transceiver metadata for one FPC/PIC,
/// keyed by normalized base interface name. Carries no serial numbers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PicDetail {
    pub device: String,
    pub fpc: u32,
    pub pic: u32,
    pub transceivers: BTreeMap<String, TransceiverMetadata>,
}

/// Scope of a merged record: which base record kind it wraps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "scope", rename_all = "snake_case")]
pub enum RecordScope {
    Interface,
    Lane { lane: u32 },
    Counter,
}

/// A base record joined with device and transceiver metadata.
///
/// The union the serializers consume: identity, lane scope where
/// applicable, the extracted fields, and null-filled metadata from
/// whichever auxiliary sources were present this run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedRecord {
    pub if_name: String,
    pub device: String,
    pub timestamp_us: i64,
    pub scope: RecordScope,
    pub fields: FieldMap,
    /// Chassis serial of the device itself.
    pub device_serial: Option<String>,
    pub hostname: Option<String>,
    pub device_profile: Option<String>,
    pub os_version: Option<String>,
    pub transceiver: TransceiverMetadata,
}

impl MergedRecord {
    /// Join key: base interface name with channel suffix stripped.
    pub fn base_if_name(&self) -> String {
        base_interface_name(&self.if_name)
    }
}
