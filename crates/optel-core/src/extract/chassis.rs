//! Extractor for chassis inventory documents.
//!
//! Walks the FPC / PIC / Xcvr module hierarchy, maps each transceiver
//! slot to an interface name, and parses vendor and media type out of
//! the free-text description. Also picks up the chassis serial number,
//! the device's own identity in inventory systems.

use roxmltree::Document;
use tracing::debug;

use optel_common::{
    determine_fiber_type, juniper_interface_name, parse_slot_name, Result, SlotKind,
};

use crate::record::{ChassisInventory, TransceiverMetadata};
use crate::xml;

use super::{DocumentKind, Extraction, ExtractionContext, MetricExtractor};

/// Parse vendor and media type from a transceiver description such as
/// `JUNIPER QFX-QSFP-100G-SR4`. The first token is the vendor; the
/// media type is the first token carrying a reach code or a speed
/// figure.
fn parse_description(description: &str) -> (Option<String>, Option<String>) {
    let mut parts = description.split_whitespace();
    let Some(vendor) = parts.next() else {
        return (None, None);
    };

    // The vendor token is excluded from the media-type scan: vendor
    // names themselves can contain reach codes (JUNIPER ends in "ER").
    let mut media = None;
    for part in parts {
        let upper = part.to_ascii_uppercase();
        if ["BASE", "SR", "LR", "ER", "ZR", "SX", "LX"]
            .iter()
            .any(|code| upper.contains(code))
        {
            media = Some(part.to_string());
            break;
        }
        if has_speed_code(&upper) {
            media = Some(part.to_string());
        }
    }
    (Some(vendor.to_string()), media)
}

/// Whether a token contains a speed figure like `100G` or `400G`.
fn has_speed_code(token: &str) -> bool {
    let bytes = token.as_bytes();
    bytes
        .windows(2)
        .any(|w| w[0].is_ascii_digit() && w[1] == b'G')
}

pub struct ChassisInventoryExtractor;

impl ChassisInventoryExtractor {
    pub fn new() -> Self {
        ChassisInventoryExtractor
    }
}

impl Default for ChassisInventoryExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricExtractor for ChassisInventoryExtractor {
    fn kind(&self) -> DocumentKind {
        DocumentKind::ChassisInventory
    }

    fn extract(&self, doc: &Document<'_>, ctx: &ExtractionContext) -> Result<Extraction> {
        let root = doc.root_element();
        let mut inventory = ChassisInventory {
            device: ctx.device.clone(),
            ..Default::default()
        };

        // Chassis serial number: the device's own serial.
        for chassis in xml::find_all(root, "chassis") {
            if let Some(serial) = xml::child_text(chassis, "serial-number") {
                inventory.serial_number = Some(serial.to_string());
                break;
            }
        }

        for fpc_elem in xml::find_all(root, "chassis-module") {
            let Some((SlotKind::Fpc, fpc)) =
                xml::child_text(fpc_elem, "name").and_then(parse_slot_name)
            else {
                continue;
            };

            for pic_elem in xml::find_all(fpc_elem, "chassis-sub-module") {
                let Some((SlotKind::Pic, pic)) =
                    xml::child_text(pic_elem, "name").and_then(parse_slot_name)
                else {
                    continue;
                };

                for xcvr_elem in xml::find_all(pic_elem, "chassis-sub-sub-module") {
                    let Some((SlotKind::Port, port)) =
                        xml::child_text(xcvr_elem, "name").and_then(parse_slot_name)
                    else {
                        continue;
                    };

                    let description = xml::child_text(xcvr_elem, "description");
                    let (vendor, media_type) = description
                        .map(parse_description)
                        .unwrap_or((None, None));
                    let fiber_type =
                        determine_fiber_type(media_type.as_deref(), description, None);

                    let if_name = juniper_interface_name(
                        &fpc.to_string(),
                        &pic.to_string(),
                        &port.to_string(),
                        ctx.platform.as_deref(),
                    );
                    debug!(target: "optel::extract", device = %ctx.device,
                           interface = %if_name, "transceiver found in chassis inventory");

                    inventory.transceivers.insert(
                        if_name,
                        TransceiverMetadata {
                            vendor,
                            part_number: xml::child_text(xcvr_elem, "part-number")
                                .map(str::to_string),
                            serial_number: xml::child_text(xcvr_elem, "serial-number")
                                .map(str::to_string),
                            description: description.map(str::to_string),
                            media_type,
                            fiber_type: fiber_type.map(|f| f.as_str().to_string()),
                            ..Default::default()
                        },
                    );
                }
            }
        }

        Ok(Extraction::Chassis(inventory))
    }
}
