//! Extractor for PIC detail documents.
//!
//! PIC detail output carries the richest transceiver metadata: vendor,
//! part number, cable type, fiber mode, wavelength and firmware
//! versions. It never carries serial numbers; those come from chassis
//! inventory only. The document is scoped to one FPC/PIC pair, so the
//! slot must be supplied through the extraction context.

use roxmltree::{Document, Node};
use tracing::debug;

use optel_common::{juniper_interface_name, parse_fiber_mode, Error, Result};

use crate::record::{PicDetail, TransceiverMetadata};
use crate::value::is_sentinel;
use crate::xml;

use super::{DocumentKind, Extraction, ExtractionContext, MetricExtractor};

/// Child text with not-available sentinels filtered out.
fn meaningful_text(node: Node<'_, '_>, name: &str) -> Option<String> {
    xml::child_text(node, name)
        .filter(|t| !is_sentinel(t))
        .map(str::to_string)
}

pub struct PicDetailExtractor;

impl PicDetailExtractor {
    pub fn new() -> Self {
        PicDetailExtractor
    }
}

impl Default for PicDetailExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricExtractor for PicDetailExtractor {
    fn kind(&self) -> DocumentKind {
        DocumentKind::PicDetail
    }

    fn extract(&self, doc: &Document<'_>, ctx: &ExtractionContext) -> Result<Extraction> {
        let Some((fpc, pic)) = ctx.pic_slot else {
            return Err(Error::InvalidMapping(
                "pic-detail extraction requires an FPC/PIC slot in the context".to_string(),
            ));
        };

        let mut detail = PicDetail {
            device: ctx.device.clone(),
            fpc,
            pic,
            transceivers: Default::default(),
        };

        for port_elem in xml::find_all(doc.root_element(), "port") {
            let Some(port) = xml::child_text(port_elem, "port-number") else {
                continue;
            };

            let if_name = juniper_interface_name(
                &fpc.to_string(),
                &pic.to_string(),
                port,
                ctx.platform.as_deref(),
            );

            let cable_type = meaningful_text(port_elem, "cable-type");
            let xcvr = TransceiverMetadata {
                vendor: meaningful_text(port_elem, "sfp-vendor-name"),
                part_number: meaningful_text(port_elem, "sfp-vendor-pno"),
                // Cable type doubles as the media type; PIC detail has
                // no separate media-type element.
                media_type: cable_type.clone(),
                cable_type,
                wavelength: meaningful_text(port_elem, "wavelength"),
                fiber_type: xml::child_text(port_elem, "fiber-mode")
                    .and_then(parse_fiber_mode)
                    .map(|f| f.as_str().to_string()),
                // Vendors without real firmware report "0.0".
                firmware_version: meaningful_text(port_elem, "sfp-vendor-fw-ver")
                    .filter(|v| v != "0.0"),
                ..Default::default()
            };

            // Empty ports still appear in the document; only populated
            // transceivers are worth keeping.
            if xcvr == TransceiverMetadata::default() {
                debug!(target: "optel::extract", device = %ctx.device, interface = %if_name,
                       "port without transceiver metadata, skipped");
                continue;
            }

            detail.transceivers.insert(if_name, xcvr);
        }

        Ok(Extraction::Pic(detail))
    }
}
