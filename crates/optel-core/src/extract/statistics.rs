//! Extractor for interface statistics documents (FEC counters).
//!
//! Extracts cumulative FEC codeword counters, device-reported error
//! rates, pre-FEC BER, the 16-bin symbol-error histogram, statuses,
//! speed and traffic rates. Only interfaces exposing FEC data are
//! emitted: electrical and management ports carry none and would be
//! all-null noise downstream.

use roxmltree::{Document, Node};
use tracing::{debug, warn};

use optel_common::Result;
use optel_config::{MappingTable, ValueKind};

use crate::record::{FieldMap, FieldValue, InterfaceCounterRecord};
use crate::value::{extract_numeric, parse_speed};
use crate::xml;

use super::{DocumentKind, Extraction, ExtractionContext, MetricExtractor};

/// Number of histogram bins; a codeword can carry 0..=15 symbol errors.
pub const HISTOGRAM_BINS: u32 = 16;

pub struct InterfaceStatisticsExtractor {
    table: MappingTable,
}

impl InterfaceStatisticsExtractor {
    pub fn new(table: MappingTable) -> Self {
        InterfaceStatisticsExtractor { table }
    }

    pub fn builtin() -> Self {
        Self::new(optel_config::statistics_table())
    }

    fn mapped_fields(&self, iface: Node<'_, '_>, fields: &mut FieldMap) {
        for entry in &self.table.entries {
            // Source paths resolve anywhere in the interface subtree so
            // firmware nesting differences (ethernet-fec-statistics,
            // traffic-statistics) stay out of the table.
            let Some(node) = xml::find_first(iface, &entry.source_path) else {
                continue;
            };
            let Some(raw) = xml::text(node) else {
                continue;
            };
            match entry.value_kind {
                ValueKind::Status => {
                    fields.insert(entry.target_field.clone(), FieldValue::Text(raw.to_string()));
                }
                ValueKind::Threshold | ValueKind::Measurement => {
                    if let Some(v) = extract_numeric(raw) {
                        fields.insert(entry.target_field.clone(), FieldValue::Float(v));
                    }
                }
            }
        }
    }

    fn histogram_fields(&self, iface: Node<'_, '_>, device: &str, fields: &mut FieldMap) {
        for bin_node in xml::find_all(iface, "ethernet-fechistogram-statistics") {
            let Some(bin) = xml::child_text(bin_node, "bin-num")
                .and_then(extract_numeric)
                .map(|v| v as i64)
            else {
                continue;
            };
            if !(0..HISTOGRAM_BINS as i64).contains(&bin) {
                warn!(target: "optel::extract", device, bin,
                      "histogram bin outside 0..=15, ignored");
                continue;
            }

            let live = xml::child_text(bin_node, "sym-live-err")
                .and_then(extract_numeric)
                .unwrap_or(0.0);
            let harvest = xml::child_text(bin_node, "sym-harvest-err")
                .and_then(extract_numeric)
                .unwrap_or(0.0);

            // Merged bin plus the raw components for detailed analysis.
            fields.insert(
                format!("histogram_bin_{bin}"),
                FieldValue::Float(live + harvest),
            );
            fields.insert(format!("histogram_bin_{bin}_live"), FieldValue::Float(live));
            fields.insert(
                format!("histogram_bin_{bin}_harvest"),
                FieldValue::Float(harvest),
            );
        }
    }
}

impl MetricExtractor for InterfaceStatisticsExtractor {
    fn kind(&self) -> DocumentKind {
        DocumentKind::InterfaceStatistics
    }

    fn extract(&self, doc: &Document<'_>, ctx: &ExtractionContext) -> Result<Extraction> {
        let mut records = Vec::new();

        for iface in xml::find_all(doc.root_element(), "physical-interface") {
            let Some(if_name) = xml::child_text(iface, "name") else {
                continue;
            };
            if !ctx.filter.admits(if_name) {
                continue;
            }

            let mut fields = FieldMap::new();
            self.mapped_fields(iface, &mut fields);

            if let Some(bps) = xml::child_text(iface, "speed").and_then(parse_speed) {
                fields.insert("speed_bps".to_string(), FieldValue::Int(bps as i64));
            }

            self.histogram_fields(iface, &ctx.device, &mut fields);

            // Optical interfaces only: no FEC counters, no record.
            if !fields.contains_key("fec_ccw") && !fields.contains_key("fec_nccw") {
                debug!(target: "optel::extract", device = %ctx.device, interface = %if_name,
                       "no FEC data, counter record suppressed");
                continue;
            }

            records.push(InterfaceCounterRecord {
                if_name: if_name.to_string(),
                device: ctx.device.clone(),
                timestamp_us: ctx.timestamp_us,
                fields,
            });
        }

        Ok(Extraction::Counters(records))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(text: &str) -> Vec<InterfaceCounterRecord> {
        let doc = xml::parse(text).unwrap();
        let ctx = ExtractionContext::new("r1", 1_700_000_000_000_000);
        match InterfaceStatisticsExtractor::builtin()
            .extract(&doc, &ctx)
            .unwrap()
        {
            Extraction::Counters(records) => records,
            other => panic!("unexpected extraction {other:?}"),
        }
    }

    fn sample_doc() -> &'static str {
        r#"<interface-information>
  <physical-interface>
    <name>et-0/0/6</name>
    <admin-status>up</admin-status>
    <oper-status>up</oper-status>
    <speed>400Gbps</speed>
    <traffic-statistics>
      <input-bps>123456789</input-bps>
      <output-bps>98765432</output-bps>
    </traffic-statistics>
    <ethernet-fec-statistics>
      <fec_ccw_count>1024</fec_ccw_count>
      <fec_nccw_count>3</fec_nccw_count>
      <fec_ccw_error_rate>12</fec_ccw_error_rate>
      <fec_nccw_error_rate>0</fec_nccw_error_rate>
      <pre-fec-ber>1.25e-11</pre-fec-ber>
    </ethernet-fec-statistics>
    <ethernet-fechistogram-statistics>
      <bin-num>0</bin-num>
      <sym-live-err>100</sym-live-err>
      <sym-harvest-err>20</sym-harvest-err>
    </ethernet-fechistogram-statistics>
    <ethernet-fechistogram-statistics>
      <bin-num>15</bin-num>
      <sym-live-err>1</sym-live-err>
    </ethernet-fechistogram-statistics>
    <ethernet-fechistogram-statistics>
      <bin-num>16</bin-num>
      <sym-live-err>999</sym-live-err>
    </ethernet-fechistogram-statistics>
  </physical-interface>
  <physical-interface>
    <name>em0</name>
    <admin-status>up</admin-status>
  </physical-interface>
</interface-information>"#
    }

    #[test]
    fn counters_and_statuses() {
        let records = extract(sample_doc());
        assert_eq!(records.len(), 1);
        let rec = &records[0];
        assert_eq!(rec.if_name, "et-0/0/6");
        assert_eq!(rec.fields["fec_ccw"], FieldValue::Float(1024.0));
        assert_eq!(rec.fields["fec_nccw"], FieldValue::Float(3.0));
        assert_eq!(rec.fields["pre_fec_ber"], FieldValue::Float(1.25e-11));
        assert_eq!(rec.fields["admin_status"], FieldValue::Text("up".into()));
        assert_eq!(rec.fields["speed_bps"], FieldValue::Int(400_000_000_000));
        assert_eq!(rec.fields["input_bps"], FieldValue::Float(123456789.0));
    }

    #[test]
    fn histogram_merges_live_and_harvest() {
        let records = extract(sample_doc());
        let rec = &records[0];
        assert_eq!(rec.fields["histogram_bin_0"], FieldValue::Float(120.0));
        assert_eq!(rec.fields["histogram_bin_0_live"], FieldValue::Float(100.0));
        assert_eq!(
            rec.fields["histogram_bin_0_harvest"],
            FieldValue::Float(20.0)
        );
        // Missing harvest component defaults to zero.
        assert_eq!(rec.fields["histogram_bin_15"], FieldValue::Float(1.0));
        // Out-of-range bin is dropped.
        assert!(!rec.fields.contains_key("histogram_bin_16"));
    }

    #[test]
    fn interfaces_without_fec_are_suppressed() {
        let records = extract(sample_doc());
        assert!(records.iter().all(|r| r.if_name != "em0"));
    }
}
