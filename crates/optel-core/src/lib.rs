//! Optel telemetry normalization engine.
//!
//! Turns heterogeneous, namespace-bearing device RPC documents into a
//! canonical, typed metric record set:
//!
//! - [`xml`]: namespace-agnostic traversal over a parsed document
//! - [`value`]: numeric extraction and sentinel detection
//! - [`record`]: canonical record types
//! - [`extract`]: declarative-mapping-driven extractors, one per RPC kind
//! - [`merge`]: metadata join across independently sourced documents
//! - [`delta`]: stateful cumulative-counter to delta/rate conversion
//! - [`pipeline`]: the per-device sequential pass tying it together
//!
//! One pipeline instance handles one device for one collection cycle;
//! instances are independent and a failure in one never cascades.

pub mod delta;
pub mod extract;
pub mod merge;
pub mod pipeline;
pub mod record;
pub mod value;
pub mod xml;

pub use delta::{CounterKey, CounterState, DeltaEngine, DeltaOutcome, StateStore};
pub use extract::{DocumentKind, ExtractorRegistry, MetricExtractor};
pub use merge::merge_records;
pub use pipeline::{DevicePipeline, PipelineOutput};
pub use record::{
    ChassisInventory, DeviceMetadata, FieldValue, InterfaceCounterRecord, InterfaceRecord,
    LaneRecord, MergedRecord, PicDetail, TransceiverMetadata,
};
