//! Fiber type classification, vendor agnostic.
//!
//! Determines single-mode vs multi-mode fiber from whatever the device
//! exposes: wavelength is authoritative, media type codes next,
//! free-text description last.

use serde::{Deserialize, Serialize};

/// Physical fiber classification for a transceiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FiberType {
    SingleMode,
    MultiMode,
}

impl FiberType {
    /// Canonical string form used in records and labels.
    pub fn as_str(&self) -> &'static str {
        match self {
            FiberType::SingleMode => "FIBER_TYPE_SINGLE_MODE",
            FiberType::MultiMode => "FIBER_TYPE_MULTI_MODE",
        }
    }
}

impl std::fmt::Display for FiberType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Multi-mode indicators in media type codes: SR/SX are 850nm short
/// reach, VCSEL transmitters are almost always 850nm MMF.
const MMF_MEDIA: &[&str] = &["SR", "SX", "VCSEL", "850NM", "MMF", "MULTIMODE"];

/// Single-mode indicators: LR/ER/ZR long-reach families plus WDM grids.
const SMF_MEDIA: &[&str] = &[
    "LR", "ER", "ZR", "LX", "EX", "ZX", "1310NM", "1550NM", "CWDM", "DWDM", "SMF", "SINGLEMODE",
];

const MMF_DESC: &[&str] = &["SR", "SX", "VCSEL", "850NM", "MMF", "MULTIMODE", "SHORT"];
const SMF_DESC: &[&str] = &[
    "LR", "ER", "ZR", "LX", "EX", "ZX", "1310NM", "1550NM", "CWDM", "DWDM", "SMF", "SINGLEMODE",
    "LONG", "EXTENDED",
];

fn squash(text: &str) -> String {
    text.to_ascii_uppercase().replace(['-', ' '], "")
}

fn matches_any(haystack: &str, patterns: &[&str]) -> bool {
    patterns.iter().any(|p| haystack.contains(p))
}

/// Determine fiber type from available transceiver information.
///
/// Detection order: wavelength (most reliable), then media type code,
/// then description text. Returns `None` when nothing matches.
pub fn determine_fiber_type(
    media_type: Option<&str>,
    description: Option<&str>,
    wavelength_nm: Option<u32>,
) -> Option<FiberType> {
    if let Some(nm) = wavelength_nm {
        if nm == 850 {
            return Some(FiberType::MultiMode);
        }
        // 1310/1550 plus the CWDM/DWDM grid (1270-1610nm) are SMF.
        if (1270..=1610).contains(&nm) {
            return Some(FiberType::SingleMode);
        }
    }

    if let Some(media) = media_type {
        let media = squash(media);
        if matches_any(&media, MMF_MEDIA) {
            return Some(FiberType::MultiMode);
        }
        if matches_any(&media, SMF_MEDIA) {
            return Some(FiberType::SingleMode);
        }
    }

    if let Some(desc) = description {
        let desc = squash(desc);
        if matches_any(&desc, MMF_DESC) {
            return Some(FiberType::MultiMode);
        }
        if matches_any(&desc, SMF_DESC) {
            return Some(FiberType::SingleMode);
        }
    }

    None
}

/// Parse a `fiber-mode` field from PIC detail output.
///
/// Devices report `Multi Mode`, `Single Mode`, `MM`, `SM` or a
/// not-applicable sentinel.
pub fn parse_fiber_mode(fiber_mode: &str) -> Option<FiberType> {
    let lower = fiber_mode.trim().to_ascii_lowercase();
    if matches!(lower.as_str(), "" | "n/a" | "na" | "none") {
        return None;
    }
    if lower.contains("multi") || lower.contains("mm") {
        Some(FiberType::MultiMode)
    } else if lower.contains("single") || lower.contains("sm") {
        Some(FiberType::SingleMode)
    } else {
        None
    }
}
