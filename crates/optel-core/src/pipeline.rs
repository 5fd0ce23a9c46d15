//! Per-device normalization pipeline.
//!
//! One pipeline pass covers one device for one collection cycle:
//! extraction over whatever documents were collected, metadata merge,
//! counter differentiation, records out. Strictly sequential; devices
//! are isolated by construction because each pass touches only its own
//! state keys. A document that fails to parse costs only its own
//! contribution.

use tracing::{info, warn};

use optel_common::Error;
use optel_config::CollectionFilter;

use crate::delta::{DeltaEngine, StateStore};
use crate::extract::{DocumentKind, Extraction, ExtractionContext, ExtractorRegistry};
use crate::merge::{merge_records, BaseRecords, MetadataSources};
use crate::record::MergedRecord;

/// Raw RPC documents collected from one device. Every slot is optional;
/// absent auxiliary documents null-fill the merged output.
#[derive(Debug, Clone, Default)]
pub struct DeviceDocuments {
    pub optics_diagnostics: Option<String>,
    pub interface_statistics: Option<String>,
    pub chassis_inventory: Option<String>,
    /// One document per collected (fpc, pic) slot.
    pub pic_details: Vec<((u32, u32), String)>,
    pub system_information: Option<String>,
}

/// Result of one pipeline pass.
#[derive(Debug)]
pub struct PipelineOutput {
    pub records: Vec<MergedRecord>,
    /// Documents that failed to parse or extract, with their errors.
    pub failures: Vec<(DocumentKind, Error)>,
}

/// Extraction, merge and counter differentiation for one device.
pub struct DevicePipeline<S: StateStore> {
    registry: ExtractorRegistry,
    engine: DeltaEngine<S>,
    filter: CollectionFilter,
    platform: Option<String>,
}

impl<S: StateStore> DevicePipeline<S> {
    pub fn new(store: S) -> Self {
        DevicePipeline {
            registry: ExtractorRegistry::builtin(),
            engine: DeltaEngine::new(store),
            filter: CollectionFilter::allow_all(),
            platform: None,
        }
    }

    pub fn with_registry(mut self, registry: ExtractorRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_filter(mut self, filter: CollectionFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_platform(mut self, platform: &str) -> Self {
        self.platform = Some(platform.to_string());
        self
    }

    /// Run one collection cycle for a device.
    pub fn run(
        &mut self,
        device: &str,
        timestamp_us: i64,
        documents: &DeviceDocuments,
    ) -> PipelineOutput {
        let mut ctx = ExtractionContext::new(device, timestamp_us).with_filter(self.filter.clone());
        if let Some(platform) = &self.platform {
            ctx = ctx.with_platform(platform);
        }

        let mut base = BaseRecords::default();
        let mut sources = MetadataSources::default();
        let mut failures = Vec::new();

        let run_doc = |kind: DocumentKind,
                           text: &str,
                           ctx: &ExtractionContext,
                           base: &mut BaseRecords,
                           sources: &mut MetadataSources,
                           failures: &mut Vec<(DocumentKind, Error)>| {
            match self.registry.extract_text(kind, text, ctx) {
                Ok(Extraction::Optics { interfaces, lanes }) => {
                    base.interfaces.extend(interfaces);
                    base.lanes.extend(lanes);
                }
                Ok(Extraction::Counters(records)) => base.counters.extend(records),
                Ok(Extraction::Chassis(inventory)) => sources.chassis = Some(inventory),
                Ok(Extraction::Pic(detail)) => sources.pic_details.push(detail),
                Ok(Extraction::System(meta)) => sources.device = Some(meta),
                Err(e) => {
                    warn!(target: "optel::pipeline", device = %ctx.device, document = %kind,
                          error = %e, "document failed, its contribution is dropped");
                    failures.push((kind, e));
                }
            }
        };

        if let Some(text) = &documents.system_information {
            run_doc(
                DocumentKind::SystemInformation,
                text,
                &ctx,
                &mut base,
                &mut sources,
                &mut failures,
            );
        }
        if let Some(text) = &documents.chassis_inventory {
            run_doc(
                DocumentKind::ChassisInventory,
                text,
                &ctx,
                &mut base,
                &mut sources,
                &mut failures,
            );
        }
        for ((fpc, pic), text) in &documents.pic_details {
            let slot_ctx = ctx.clone().with_pic_slot(*fpc, *pic);
            run_doc(
                DocumentKind::PicDetail,
                text,
                &slot_ctx,
                &mut base,
                &mut sources,
                &mut failures,
            );
        }
        if let Some(text) = &documents.optics_diagnostics {
            run_doc(
                DocumentKind::OpticsDiagnostics,
                text,
                &ctx,
                &mut base,
                &mut sources,
                &mut failures,
            );
        }
        if let Some(text) = &documents.interface_statistics {
            run_doc(
                DocumentKind::InterfaceStatistics,
                text,
                &ctx,
                &mut base,
                &mut sources,
                &mut failures,
            );
        }

        self.engine.apply_to_records(&mut base.counters);

        let records = merge_records(&base, &sources);
        info!(target: "optel::pipeline", device, records = records.len(),
              failures = failures.len(), "collection cycle normalized");

        PipelineOutput { records, failures }
    }
}
