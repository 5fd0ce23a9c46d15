//! Interface naming conventions and chassis slot mapping.
//!
//! Device firmware reports the same physical port under several names:
//! the diagnostics RPC may say `xe-0/0/48`, the chassis inventory walks
//! `FPC 0` / `PIC 0` / `Xcvr 48`, and channelized ports carry a `:N`
//! suffix. Everything that joins records across documents goes through
//! the normalized base name produced here.

use regex::Regex;
use std::sync::OnceLock;

/// Platform-specific interface prefix mappings.
///
/// Substring match against a lowercased platform hint; first hit wins.
/// Order matters: more specific model numbers come before family names.
const PLATFORM_PREFIXES: &[(&str, &str)] = &[
    ("qfx5240", "et"),
    ("qfx5230", "et"),
    ("qfx5220", "et"),
    ("qfx5210", "et"),
    ("qfx5200", "et"),
    ("qfx5130", "et"),
    ("qfx5120", "et"),
    ("qfx5110", "xe"),
    ("qfx5100", "xe"),
    ("qfx10k", "et"),
    ("mx960", "et"),
    ("mx480", "et"),
    ("mx240", "et"),
    ("mx204", "et"),
    ("mx150", "et"),
    ("mx", "et"),
    ("ptx10k", "et"),
    ("ptx5000", "et"),
    ("ptx3000", "et"),
    ("ptx1000", "et"),
    ("ptx", "et"),
    ("ex4300", "ge"),
    ("ex4600", "et"),
    ("ex", "xe"),
];

/// Kind of chassis slot named by an inventory module entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotKind {
    /// Flexible PIC Concentrator (`FPC 0`).
    Fpc,
    /// Physical Interface Card (`PIC 1`).
    Pic,
    /// Transceiver port (`Xcvr 32`).
    Port,
}

/// Extract the base interface name without channel suffix.
///
/// Channelized suffixes (`:N`) are removed and the `xe-` prefix is
/// folded to `et-`: the chassis inventory always reports `et-` while
/// optics diagnostics may report `xe-` for the same port.
///
/// ```
/// use optel_common::base_interface_name;
/// assert_eq!(base_interface_name("et-0/0/6:2"), "et-0/0/6");
/// assert_eq!(base_interface_name("xe-0/0/48"), "et-0/0/48");
/// ```
pub fn base_interface_name(interface: &str) -> String {
    let base = interface.split(':').next().unwrap_or(interface);
    if let Some(rest) = base.strip_prefix("xe-") {
        format!("et-{rest}")
    } else {
        base.to_string()
    }
}

/// Extract the channel number from a channelized interface name.
///
/// Returns `None` for non-channelized names or malformed suffixes.
pub fn interface_channel(interface: &str) -> Option<u32> {
    let (_, suffix) = interface.split_once(':')?;
    suffix.parse().ok()
}

/// Map FPC/PIC/Port slot numbers to an interface name.
///
/// The prefix defaults to `et` for modern platforms and is overridden
/// by a platform hint (e.g. `qfx5110` ports are `xe-`).
pub fn juniper_interface_name(fpc: &str, pic: &str, port: &str, platform: Option<&str>) -> String {
    let mut prefix = "et";
    if let Some(hint) = platform {
        let hint = hint.to_ascii_lowercase();
        for (key, val) in PLATFORM_PREFIXES {
            if hint.contains(key) {
                prefix = val;
                break;
            }
        }
    }
    format!("{prefix}-{fpc}/{pic}/{port}")
}

fn slot_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\b(FPC|PIC|Xcvr)\s+(\d+)").expect("valid slot regex"))
}

/// Parse a chassis module name like `FPC 0`, `PIC 1` or `Xcvr 32`.
///
/// Returns the slot kind and number, or `None` for module names that do
/// not name a slot (power supplies, fans, routing engines).
pub fn parse_slot_name(module_name: &str) -> Option<(SlotKind, u32)> {
    let caps = slot_regex().captures(module_name)?;
    let kind = match caps.get(1)?.as_str().to_ascii_uppercase().as_str() {
        "FPC" => SlotKind::Fpc,
        "PIC" => SlotKind::Pic,
        "XCVR" => SlotKind::Port,
        _ => return None,
    };
    let number = caps.get(2)?.as_str().parse().ok()?;
    Some((kind, number))
}
