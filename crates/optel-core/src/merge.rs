//! Metadata merger: joins base records with device and transceiver
//! metadata from the auxiliary documents.
//!
//! Device-level metadata broadcasts onto every record. Transceiver
//! metadata joins by normalized base interface name so channelized
//! interfaces (`et-0/0/6:2`) find the module in port 6. PIC detail wins
//! over chassis inventory for vendor information; serial numbers come
//! from chassis inventory alone. The merge is a pure function: absent
//! sources null-fill, unmatched metadata entries drop, unmatched base
//! records pass through untouched.

use std::collections::BTreeMap;

use tracing::debug;

use optel_common::base_interface_name;

use crate::record::{
    ChassisInventory, DeviceMetadata, InterfaceCounterRecord, InterfaceRecord, LaneRecord,
    MergedRecord, PicDetail, RecordScope, TransceiverMetadata,
};

/// Base records from one device's collection run.
#[derive(Debug, Clone, Default)]
pub struct BaseRecords {
    pub interfaces: Vec<InterfaceRecord>,
    pub lanes: Vec<LaneRecord>,
    pub counters: Vec<InterfaceCounterRecord>,
}

/// Auxiliary metadata sources, each optional.
#[derive(Debug, Clone, Default)]
pub struct MetadataSources {
    pub device: Option<DeviceMetadata>,
    pub chassis: Option<ChassisInventory>,
    /// One PIC detail document per collected FPC/PIC slot.
    pub pic_details: Vec<PicDetail>,
}

impl MetadataSources {
    /// Transceiver metadata for a base interface name, chassis fields
    /// first, then PIC detail overriding field by field.
    fn transceiver_for(&self, base_name: &str) -> TransceiverMetadata {
        let mut xcvr = TransceiverMetadata::default();

        if let Some(chassis) = &self.chassis {
            if let Some(found) = chassis.transceivers.get(base_name) {
                xcvr = found.clone();
            }
        }

        for detail in &self.pic_details {
            let Some(pic) = detail.transceivers.get(base_name) else {
                continue;
            };
            let serial = xcvr.serial_number.take();
            let desc = xcvr.description.take();
            overlay(&mut xcvr, pic);
            // PIC detail never carries serials, and the chassis
            // description is not among its fields either.
            xcvr.serial_number = serial;
            xcvr.description = desc;
        }

        xcvr
    }
}

/// Field-by-field overlay: `Some` values in `top` replace `base` values.
fn overlay(base: &mut TransceiverMetadata, top: &TransceiverMetadata) {
    let fields = [
        (&mut base.vendor, &top.vendor),
        (&mut base.part_number, &top.part_number),
        (&mut base.serial_number, &top.serial_number),
        (&mut base.description, &top.description),
        (&mut base.media_type, &top.media_type),
        (&mut base.cable_type, &top.cable_type),
        (&mut base.wavelength, &top.wavelength),
        (&mut base.fiber_type, &top.fiber_type),
        (&mut base.firmware_version, &top.firmware_version),
    ];
    for (dst, src) in fields {
        if let Some(v) = src {
            *dst = Some(v.clone());
        }
    }
}

/// Merge base records with whatever metadata sources are present.
///
/// Output order follows input order: interfaces, then lanes, then
/// counters. Rerunning with the same inputs yields identical output.
pub fn merge_records(base: &BaseRecords, sources: &MetadataSources) -> Vec<MergedRecord> {
    if sources.device.is_none() {
        debug!(target: "optel::merge", "no device metadata source, records null-filled");
    }
    if sources.chassis.is_none() {
        debug!(target: "optel::merge", "no chassis inventory source, records null-filled");
    }

    // One transceiver lookup per distinct base name.
    let mut cache: BTreeMap<String, TransceiverMetadata> = BTreeMap::new();
    let mut lookup = |if_name: &str| -> TransceiverMetadata {
        let base_name = base_interface_name(if_name);
        cache
            .entry(base_name.clone())
            .or_insert_with(|| {
                let xcvr = sources.transceiver_for(&base_name);
                if xcvr == TransceiverMetadata::default() {
                    debug!(target: "optel::merge", interface = %base_name,
                           "no transceiver metadata matched");
                }
                xcvr
            })
            .clone()
    };

    let device = sources.device.as_ref();
    // The chassis inventory serial wins over the self-reported one.
    let chassis_serial = sources
        .chassis
        .as_ref()
        .and_then(|c| c.serial_number.clone())
        .or_else(|| device.and_then(|d| d.serial_number.clone()));

    let mut build = |if_name: &str,
                     device_name: &str,
                     timestamp_us: i64,
                     scope: RecordScope,
                     fields: &crate::record::FieldMap| MergedRecord {
        if_name: if_name.to_string(),
        device: device_name.to_string(),
        timestamp_us,
        scope,
        fields: fields.clone(),
        device_serial: chassis_serial.clone(),
        hostname: device.and_then(|d| d.hostname.clone()),
        device_profile: device.and_then(|d| d.device_profile.clone()),
        os_version: device.and_then(|d| d.os_version.clone()),
        transceiver: lookup(if_name),
    };

    let mut merged = Vec::with_capacity(
        base.interfaces.len() + base.lanes.len() + base.counters.len(),
    );
    for rec in &base.interfaces {
        merged.push(build(
            &rec.if_name,
            &rec.device,
            rec.timestamp_us,
            RecordScope::Interface,
            &rec.fields,
        ));
    }
    for rec in &base.lanes {
        merged.push(build(
            &rec.if_name,
            &rec.device,
            rec.timestamp_us,
            RecordScope::Lane { lane: rec.lane },
            &rec.fields,
        ));
    }
    for rec in &base.counters {
        merged.push(build(
            &rec.if_name,
            &rec.device,
            rec.timestamp_us,
            RecordScope::Counter,
            &rec.fields,
        ));
    }
    merged
}
