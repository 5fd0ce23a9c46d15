//! Field-mapping table types and validation.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use optel_common::{base_interface_name, Error, Result};

/// How a mapped value is classified downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    /// Alarm/warn threshold, attached to the interface record.
    Threshold,
    /// Measured value, attached to lane records.
    Measurement,
    /// Textual status (admin/oper state), kept as a string.
    Status,
}

/// One declarative mapping from a source element to a canonical field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MappingEntry {
    /// Element local name in the source document (namespace-free).
    pub source_path: String,
    /// Canonical field name on the output record.
    pub target_field: String,
    /// Value classification.
    pub value_kind: ValueKind,
    /// Unit annotation (documentation and exposition-name derivation).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

impl MappingEntry {
    pub fn new(
        source_path: &str,
        target_field: &str,
        value_kind: ValueKind,
        unit: Option<&str>,
    ) -> Self {
        MappingEntry {
            source_path: source_path.to_string(),
            target_field: target_field.to_string(),
            value_kind,
            unit: unit.map(str::to_string),
        }
    }
}

/// An ordered, immutable list of mapping entries.
///
/// Constructed once at startup (built-in tables or deserialized from
/// configuration) and shared read-only across workers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MappingTable {
    /// Table name, used in logs.
    pub name: String,
    /// Ordered mapping entries; order fixes output field order.
    pub entries: Vec<MappingEntry>,
}

impl MappingTable {
    pub fn new(name: &str, entries: Vec<MappingEntry>) -> Self {
        MappingTable {
            name: name.to_string(),
            entries,
        }
    }

    /// Entries of one value kind, in table order.
    pub fn of_kind(&self, kind: ValueKind) -> impl Iterator<Item = &MappingEntry> {
        self.entries.iter().filter(move |e| e.value_kind == kind)
    }

    /// Structural validation, run once at load time.
    ///
    /// Rejects duplicate target fields and empty source paths; a bad
    /// table is a configuration defect, not a per-document condition.
    pub fn validate(&self) -> Result<()> {
        let mut seen = BTreeSet::new();
        for entry in &self.entries {
            if entry.source_path.trim().is_empty() {
                return Err(Error::InvalidMapping(format!(
                    "table {}: empty source path for target {}",
                    self.name, entry.target_field
                )));
            }
            if entry.target_field.trim().is_empty() {
                return Err(Error::InvalidMapping(format!(
                    "table {}: empty target field for source {}",
                    self.name, entry.source_path
                )));
            }
            if !seen.insert(entry.target_field.as_str()) {
                return Err(Error::InvalidMapping(format!(
                    "table {}: duplicate target field {}",
                    self.name, entry.target_field
                )));
            }
        }
        Ok(())
    }
}

/// Optional per-run interface allow-list.
///
/// Filtering is applied per interface before any lane traversal, so
/// suppressed interfaces cost no extraction work. Matching is on the
/// normalized base interface name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CollectionFilter {
    #[serde(default)]
    allow: Option<BTreeSet<String>>,
}

impl CollectionFilter {
    /// A filter that admits every interface.
    pub fn allow_all() -> Self {
        CollectionFilter { allow: None }
    }

    /// A filter restricted to the given interface names.
    pub fn allow_list<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        CollectionFilter {
            allow: Some(
                names
                    .into_iter()
                    .map(|n| base_interface_name(n.as_ref()))
                    .collect(),
            ),
        }
    }

    /// Whether records for this interface should be produced.
    pub fn admits(&self, interface: &str) -> bool {
        match &self.allow {
            None => true,
            Some(set) => set.contains(&base_interface_name(interface)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> MappingTable {
        MappingTable::new(
            "test",
            vec![
                MappingEntry::new("a-elem", "a", ValueKind::Threshold, Some("celsius")),
                MappingEntry::new("b-elem", "b", ValueKind::Measurement, None),
                MappingEntry::new("c-elem", "c", ValueKind::Status, None),
            ],
        )
    }

    #[test]
    fn validate_accepts_well_formed_table() {
        assert!(table().validate().is_ok());
    }

    #[test]
    fn validate_rejects_duplicate_targets() {
        let mut t = table();
        t.entries
            .push(MappingEntry::new("d-elem", "a", ValueKind::Threshold, None));
        assert!(t.validate().is_err());
    }

    #[test]
    fn validate_rejects_empty_source() {
        let mut t = table();
        t.entries
            .push(MappingEntry::new("  ", "d", ValueKind::Threshold, None));
        assert!(t.validate().is_err());
    }

    #[test]
    fn of_kind_preserves_order() {
        let t = table();
        let thresholds: Vec<_> = t.of_kind(ValueKind::Threshold).collect();
        assert_eq!(thresholds.len(), 1);
        assert_eq!(thresholds[0].target_field, "a");
    }

    #[test]
    fn filter_allow_all() {
        assert!(CollectionFilter::allow_all().admits("et-0/0/1"));
    }

    #[test]
    fn filter_allow_list_normalizes_names() {
        let f = CollectionFilter::allow_list(["et-0/0/32"]);
        assert!(f.admits("et-0/0/32"));
        // Channelized and xe-prefixed forms of the same port match.
        assert!(f.admits("et-0/0/32:1"));
        assert!(f.admits("xe-0/0/32"));
        assert!(!f.admits("et-0/0/33"));
    }

    #[test]
    fn tables_round_trip_as_json() {
        let t = table();
        let json = serde_json::to_string(&t).unwrap();
        let back: MappingTable = serde_json::from_str(&json).unwrap();
        assert_eq!(back.entries.len(), t.entries.len());
        assert_eq!(back.entries[0].unit.as_deref(), Some("celsius"));
    }
}
