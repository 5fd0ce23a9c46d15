//! Declarative-mapping-driven extractors, one per RPC document kind.
//!
//! Each supported device command has one [`MetricExtractor`]
//! implementation selected by [`DocumentKind`]. Adding a parser for a
//! new command means registering a new implementation, not editing a
//! dispatch chain. Per-interface failures are logged and skipped; they
//! never abort the rest of the document.

mod chassis;
mod optics;
mod pic;
mod statistics;
mod system;

pub use chassis::ChassisInventoryExtractor;
pub use optics::OpticsDiagnosticsExtractor;
pub use pic::PicDetailExtractor;
pub use statistics::InterfaceStatisticsExtractor;
pub use system::SystemInformationExtractor;

use roxmltree::Document;
use serde::{Deserialize, Serialize};

use optel_common::Result;
use optel_config::CollectionFilter;

use crate::record::{
    ChassisInventory, DeviceMetadata, InterfaceCounterRecord, InterfaceRecord, LaneRecord,
    PicDetail,
};
use crate::xml;

/// The RPC document kinds the engine understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    OpticsDiagnostics,
    InterfaceStatistics,
    ChassisInventory,
    PicDetail,
    SystemInformation,
}

impl DocumentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::OpticsDiagnostics => "optics_diagnostics",
            DocumentKind::InterfaceStatistics => "interface_statistics",
            DocumentKind::ChassisInventory => "chassis_inventory",
            DocumentKind::PicDetail => "pic_detail",
            DocumentKind::SystemInformation => "system_information",
        }
    }
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-invocation extraction context.
#[derive(Debug, Clone)]
pub struct ExtractionContext {
    /// Device hostname or address the document came from.
    pub device: String,
    /// Collection timestamp stamped onto every record, microseconds.
    pub timestamp_us: i64,
    /// Interface allow-list; applied before lane traversal.
    pub filter: CollectionFilter,
    /// Platform hint for chassis slot to interface-name mapping.
    pub platform: Option<String>,
    /// FPC/PIC slot a pic-detail document was collected for.
    pub pic_slot: Option<(u32, u32)>,
}

impl ExtractionContext {
    pub fn new(device: &str, timestamp_us: i64) -> Self {
        ExtractionContext {
            device: device.to_string(),
            timestamp_us,
            filter: CollectionFilter::allow_all(),
            platform: None,
            pic_slot: None,
        }
    }

    pub fn with_filter(mut self, filter: CollectionFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_platform(mut self, platform: &str) -> Self {
        self.platform = Some(platform.to_string());
        self
    }

    pub fn with_pic_slot(mut self, fpc: u32, pic: u32) -> Self {
        self.pic_slot = Some((fpc, pic));
        self
    }
}

/// Output of one extraction pass, shaped by the document kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    Optics {
        interfaces: Vec<InterfaceRecord>,
        lanes: Vec<LaneRecord>,
    },
    Counters(Vec<InterfaceCounterRecord>),
    Chassis(ChassisInventory),
    Pic(PicDetail),
    System(DeviceMetadata),
}

/// One parser for one RPC document kind.
pub trait MetricExtractor: Send + Sync {
    /// The document kind this extractor handles.
    fn kind(&self) -> DocumentKind;

    /// Extract records from a parsed document.
    fn extract(&self, doc: &Document<'_>, ctx: &ExtractionContext) -> Result<Extraction>;
}

/// Registry of extractors keyed by document kind.
pub struct ExtractorRegistry {
    extractors: Vec<Box<dyn MetricExtractor>>,
}

impl ExtractorRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        ExtractorRegistry {
            extractors: Vec::new(),
        }
    }

    /// Registry with all built-in extractors and mapping tables.
    pub fn builtin() -> Self {
        let mut registry = ExtractorRegistry::new();
        registry.register(Box::new(OpticsDiagnosticsExtractor::builtin()));
        registry.register(Box::new(InterfaceStatisticsExtractor::builtin()));
        registry.register(Box::new(ChassisInventoryExtractor::new()));
        registry.register(Box::new(PicDetailExtractor::new()));
        registry.register(Box::new(SystemInformationExtractor::new()));
        registry
    }

    /// Register an extractor. A later registration for the same kind
    /// shadows an earlier one.
    pub fn register(&mut self, extractor: Box<dyn MetricExtractor>) {
        self.extractors.push(extractor);
    }

    /// The extractor for a document kind, if registered.
    pub fn get(&self, kind: DocumentKind) -> Option<&dyn MetricExtractor> {
        self.extractors
            .iter()
            .rev()
            .find(|e| e.kind() == kind)
            .map(|e| e.as_ref())
    }

    /// Parse raw document text and run the matching extractor.
    pub fn extract_text(
        &self,
        kind: DocumentKind,
        text: &str,
        ctx: &ExtractionContext,
    ) -> Result<Extraction> {
        let extractor = self.get(kind).ok_or_else(|| {
            optel_common::Error::InvalidMapping(format!("no extractor registered for {kind}"))
        })?;
        let doc = xml::parse(text)?;
        extractor.extract(&doc, ctx)
    }
}

impl Default for ExtractorRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_registry_covers_all_kinds() {
        let registry = ExtractorRegistry::builtin();
        for kind in [
            DocumentKind::OpticsDiagnostics,
            DocumentKind::InterfaceStatistics,
            DocumentKind::ChassisInventory,
            DocumentKind::PicDetail,
            DocumentKind::SystemInformation,
        ] {
            assert!(registry.get(kind).is_some(), "missing extractor for {kind}");
        }
    }

    #[test]
    fn later_registration_shadows() {
        let mut registry = ExtractorRegistry::builtin();
        registry.register(Box::new(SystemInformationExtractor::new()));
        assert_eq!(
            registry.get(DocumentKind::SystemInformation).unwrap().kind(),
            DocumentKind::SystemInformation
        );
    }

    #[test]
    fn unparseable_text_is_parse_error() {
        let registry = ExtractorRegistry::builtin();
        let ctx = ExtractionContext::new("r1", 0);
        let err = registry
            .extract_text(DocumentKind::OpticsDiagnostics, "<nope", &ctx)
            .unwrap_err();
        assert!(matches!(err, optel_common::Error::Parse(_)));
    }
}
