//! Namespace-agnostic traversal over hierarchical device documents.
//!
//! Device firmware versions vary namespace prefixes and sometimes emit
//! none at all; every lookup here matches on the local element name
//! only. Absence of an element is `None`, which stays distinct from a
//! present element with empty content; that distinction is load-bearing
//! for downstream null handling.

use optel_common::{Error, Result};
use roxmltree::Document;

pub use roxmltree::Node;

/// Parse a document. An unparseable document is fatal for that one
/// collection call only; a missing element is never an error.
pub fn parse(text: &str) -> Result<Document<'_>> {
    Document::parse(text).map_err(|e| Error::Parse(e.to_string()))
}

/// Strip any namespace decoration from a raw tag name.
///
/// Handles both the `{uri}local` convention and `prefix:local`.
pub fn local_name(tag: &str) -> &str {
    let tag = match tag.split_once('}') {
        Some((_, local)) => local,
        None => tag,
    };
    match tag.rsplit_once(':') {
        Some((_, local)) => local,
        None => tag,
    }
}

/// First element with the given local name anywhere in the subtree,
/// depth-first. The start node itself is not considered.
pub fn find_first<'a, 'input>(
    node: Node<'a, 'input>,
    local: &str,
) -> Option<Node<'a, 'input>> {
    node.descendants()
        .skip(1)
        .find(|n| n.is_element() && n.tag_name().name() == local)
}

/// All elements with the given local name anywhere in the subtree,
/// depth-first document order, unrestricted depth.
pub fn find_all<'a, 'input>(node: Node<'a, 'input>, local: &str) -> Vec<Node<'a, 'input>> {
    node.descendants()
        .skip(1)
        .filter(|n| n.is_element() && n.tag_name().name() == local)
        .collect()
}

/// First direct child element with the given local name.
pub fn child<'a, 'input>(node: Node<'a, 'input>, local: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|n| n.is_element() && n.tag_name().name() == local)
}

/// Trimmed text content of a node; `None` when absent or whitespace-only.
pub fn text<'a>(node: Node<'a, '_>) -> Option<&'a str> {
    let t = node.text()?.trim();
    if t.is_empty() {
        None
    } else {
        Some(t)
    }
}

/// Trimmed text of a direct child element.
pub fn child_text<'a>(node: Node<'a, '_>, local: &str) -> Option<&'a str> {
    child(node, local).and_then(text)
}

/// Attribute whose local name matches, ignoring namespace prefixes.
///
/// Firmware emits attributes like `junos:celsius` with version-specific
/// namespace URIs; matching on the attribute local name is invariant to
/// that.
pub fn attribute<'a>(node: Node<'a, '_>, local: &str) -> Option<&'a str> {
    node.attributes()
        .find(|a| a.name() == local)
        .map(|a| a.value())
        .filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    const NAMESPACED: &str = r#"<rpc-reply xmlns:junos="http://xml.juniper.net/junos/22.1R1/junos">
  <interface-information xmlns="http://xml.juniper.net/junos/22.1R1/junos">
    <physical-interface>
      <name>et-0/0/6</name>
      <optics-diagnostics>
        <module-temperature junos:celsius="34.5">34 degrees C / 94 degrees F</module-temperature>
        <module-voltage>3.25 V</module-voltage>
        <empty-elem>   </empty-elem>
      </optics-diagnostics>
    </physical-interface>
  </interface-information>
</rpc-reply>"#;

    #[test]
    fn local_name_strips_both_conventions() {
        assert_eq!(
            local_name("{http://xml.juniper.net/junos}interface-information"),
            "interface-information"
        );
        assert_eq!(local_name("junos:celsius"), "celsius");
        assert_eq!(local_name("name"), "name");
    }

    #[test]
    fn parse_failure_is_parse_error() {
        let err = parse("<unclosed").unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn find_first_matches_at_any_depth() {
        let doc = parse(NAMESPACED).unwrap();
        let root = doc.root_element();
        let iface = find_first(root, "physical-interface").unwrap();
        assert_eq!(child_text(iface, "name"), Some("et-0/0/6"));
        // Deeply nested element is found from the root.
        assert!(find_first(root, "module-voltage").is_some());
        assert!(find_first(root, "no-such-element").is_none());
    }

    #[test]
    fn find_all_preserves_document_order() {
        let doc = parse(
            "<root><a><x>1</x></a><b><x>2</x><nested><x>3</x></nested></b></root>",
        )
        .unwrap();
        let xs = find_all(doc.root_element(), "x");
        let texts: Vec<_> = xs.iter().map(|n| text(*n).unwrap()).collect();
        assert_eq!(texts, vec!["1", "2", "3"]);
    }

    #[test]
    fn empty_text_is_none() {
        let doc = parse(NAMESPACED).unwrap();
        let root = doc.root_element();
        let empty = find_first(root, "empty-elem").unwrap();
        assert_eq!(text(empty), None);
        // The element is still present even though its text is None.
        assert!(find_first(root, "empty-elem").is_some());
    }

    #[test]
    fn attribute_matches_local_name_across_namespaces() {
        let doc = parse(NAMESPACED).unwrap();
        let temp = find_first(doc.root_element(), "module-temperature").unwrap();
        assert_eq!(attribute(temp, "celsius"), Some("34.5"));
        assert_eq!(attribute(temp, "fahrenheit"), None);
    }
}
