//! Extractor for optics diagnostics documents.
//!
//! Walks every `physical-interface`, applies the threshold table against
//! its `optics-diagnostics` element, and builds one lane record per
//! `optics-diagnostics-lane-values` container. An interface whose module
//! reports no diagnostics capability still yields an interface record
//! shell: downstream must see the interface with unknown measurements
//! rather than not at all.

use roxmltree::{Document, Node};
use tracing::debug;

use optel_common::Result;
use optel_config::{MappingTable, ValueKind};

use crate::record::{FieldMap, FieldValue, InterfaceRecord, LaneRecord};
use crate::value::extract_numeric;
use crate::xml;

use super::{DocumentKind, Extraction, ExtractionContext, MetricExtractor};

/// Marker element: the module cannot report diagnostics at all.
const NOT_AVAILABLE_MARKER: &str = "optic-diagnostics-not-available";

pub struct OpticsDiagnosticsExtractor {
    interface_table: MappingTable,
    lane_table: MappingTable,
}

impl OpticsDiagnosticsExtractor {
    pub fn new(interface_table: MappingTable, lane_table: MappingTable) -> Self {
        OpticsDiagnosticsExtractor {
            interface_table,
            lane_table,
        }
    }

    /// Extractor wired to the built-in mapping tables.
    pub fn builtin() -> Self {
        Self::new(
            optel_config::optics_diagnostics_table(),
            optel_config::lane_measurement_table(),
        )
    }

    fn interface_fields(&self, diag: Node<'_, '_>) -> FieldMap {
        let mut fields = FieldMap::new();
        for entry in &self.interface_table.entries {
            let Some(node) = xml::child(diag, &entry.source_path) else {
                // Mapping miss: absent element yields null, not an error.
                continue;
            };
            match entry.value_kind {
                ValueKind::Threshold | ValueKind::Measurement => {
                    // Some measurements carry the canonical value in a
                    // unit-named attribute (module-temperature's celsius).
                    let raw = entry
                        .unit
                        .as_deref()
                        .and_then(|unit| xml::attribute(node, unit))
                        .or_else(|| xml::text(node));
                    if let Some(v) = raw.and_then(|t| extract_numeric(t)) {
                        fields.insert(entry.target_field.clone(), FieldValue::Float(v));
                    }
                }
                ValueKind::Status => {
                    if let Some(t) = xml::text(node) {
                        fields.insert(entry.target_field.clone(), FieldValue::Text(t.to_string()));
                    }
                }
            }
        }
        fields
    }

    fn lane_records(
        &self,
        diag: Node<'_, '_>,
        if_name: &str,
        ctx: &ExtractionContext,
    ) -> Vec<LaneRecord> {
        let mut lanes = Vec::new();
        for lane_node in xml::find_all(diag, "optics-diagnostics-lane-values") {
            // A container without a lane-index element is a single-lane
            // module reporting lane 0.
            let lane = xml::child_text(lane_node, "lane-index")
                .and_then(|t| t.parse().ok())
                .unwrap_or(0);

            let mut fields = FieldMap::new();
            for entry in self.lane_table.of_kind(ValueKind::Measurement) {
                if let Some(v) =
                    xml::child_text(lane_node, &entry.source_path).and_then(extract_numeric)
                {
                    fields.insert(entry.target_field.clone(), FieldValue::Float(v));
                }
            }

            lanes.push(LaneRecord {
                if_name: if_name.to_string(),
                device: ctx.device.clone(),
                lane,
                timestamp_us: ctx.timestamp_us,
                fields,
            });
        }
        lanes
    }
}

impl MetricExtractor for OpticsDiagnosticsExtractor {
    fn kind(&self) -> DocumentKind {
        DocumentKind::OpticsDiagnostics
    }

    fn extract(&self, doc: &Document<'_>, ctx: &ExtractionContext) -> Result<Extraction> {
        let mut interfaces = Vec::new();
        let mut lanes = Vec::new();

        for iface in xml::find_all(doc.root_element(), "physical-interface") {
            let Some(if_name) = xml::child_text(iface, "name") else {
                debug!(target: "optel::extract", device = %ctx.device,
                       "physical-interface without a name, skipped");
                continue;
            };
            // Allow-list suppression happens here, before any lane
            // traversal for the interface.
            if !ctx.filter.admits(if_name) {
                continue;
            }

            let diag = xml::child(iface, "optics-diagnostics")
                .filter(|d| xml::child(*d, NOT_AVAILABLE_MARKER).is_none());

            let Some(diag) = diag else {
                debug!(target: "optel::extract", device = %ctx.device, interface = %if_name,
                       "diagnostics not available, emitting shell record");
                interfaces.push(InterfaceRecord {
                    if_name: if_name.to_string(),
                    device: ctx.device.clone(),
                    timestamp_us: ctx.timestamp_us,
                    fields: FieldMap::new(),
                });
                continue;
            };

            interfaces.push(InterfaceRecord {
                if_name: if_name.to_string(),
                device: ctx.device.clone(),
                timestamp_us: ctx.timestamp_us,
                fields: self.interface_fields(diag),
            });
            lanes.extend(self.lane_records(diag, if_name, ctx));
        }

        Ok(Extraction::Optics { interfaces, lanes })
    }
}
