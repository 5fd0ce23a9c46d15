//! Extractor for system information documents.

use roxmltree::Document;
use tracing::warn;

use optel_common::Result;

use crate::record::DeviceMetadata;
use crate::xml;

use super::{DocumentKind, Extraction, ExtractionContext, MetricExtractor};

pub struct SystemInformationExtractor;

impl SystemInformationExtractor {
    pub fn new() -> Self {
        SystemInformationExtractor
    }
}

impl Default for SystemInformationExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricExtractor for SystemInformationExtractor {
    fn kind(&self) -> DocumentKind {
        DocumentKind::SystemInformation
    }

    fn extract(&self, doc: &Document<'_>, ctx: &ExtractionContext) -> Result<Extraction> {
        let mut meta = DeviceMetadata {
            device: ctx.device.clone(),
            ..Default::default()
        };

        let Some(info) = xml::find_first(doc.root_element(), "system-information") else {
            warn!(target: "optel::extract", device = %ctx.device,
                  "no system-information element in document");
            return Ok(Extraction::System(meta));
        };

        // The collection address stands in when the device does not
        // report a hostname.
        meta.hostname = Some(
            xml::child_text(info, "host-name")
                .unwrap_or(&ctx.device)
                .to_string(),
        );
        meta.hardware_model = xml::child_text(info, "hardware-model").map(str::to_string);
        meta.serial_number = xml::child_text(info, "serial-number").map(str::to_string);
        meta.os_name = xml::child_text(info, "os-name").map(str::to_string);
        meta.os_version = xml::child_text(info, "os-version").map(str::to_string);
        meta.device_profile = meta
            .hardware_model
            .as_deref()
            .map(|model| format!("Juniper_{model}"));

        Ok(Extraction::System(meta))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(text: &str) -> DeviceMetadata {
        let doc = xml::parse(text).unwrap();
        let ctx = ExtractionContext::new("10.0.0.1", 0);
        match SystemInformationExtractor::new().extract(&doc, &ctx).unwrap() {
            Extraction::System(meta) => meta,
            other => panic!("unexpected extraction {other:?}"),
        }
    }

    #[test]
    fn metadata_extracted() {
        let meta = extract(
            r#"<rpc-reply>
  <system-information>
    <hardware-model>qfx5240-64od</hardware-model>
    <os-name>junos-evo</os-name>
    <os-version>23.4R2-S3.5-EVO</os-version>
    <serial-number>XK1234567890</serial-number>
    <host-name>spine1</host-name>
  </system-information>
</rpc-reply>"#,
        );
        assert_eq!(meta.hostname.as_deref(), Some("spine1"));
        assert_eq!(meta.serial_number.as_deref(), Some("XK1234567890"));
        assert_eq!(meta.hardware_model.as_deref(), Some("qfx5240-64od"));
        assert_eq!(meta.os_name.as_deref(), Some("junos-evo"));
        assert_eq!(meta.os_version.as_deref(), Some("23.4R2-S3.5-EVO"));
        assert_eq!(meta.device_profile.as_deref(), Some("Juniper_qfx5240-64od"));
    }

    #[test]
    fn hostname_falls_back_to_device() {
        let meta = extract(
            r#"<rpc-reply><system-information>
  <hardware-model>ex4300-48t</hardware-model>
</system-information></rpc-reply>"#,
        );
        assert_eq!(meta.hostname.as_deref(), Some("10.0.0.1"));
        assert_eq!(meta.device_profile.as_deref(), Some("Juniper_ex4300-48t"));
    }

    #[test]
    fn missing_element_yields_bare_identity() {
        let meta = extract("<rpc-reply><other/></rpc-reply>");
        assert_eq!(meta.device, "10.0.0.1");
        assert_eq!(meta.hostname, None);
        assert_eq!(meta.device_profile, None);
    }
}
