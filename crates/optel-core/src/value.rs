//! Numeric value extraction and sentinel detection.
//!
//! Device text values arrive with units glued on (`-2.28dBm`), spaced
//! out (`90.00 C`), in scientific notation (`1.25e-11`), or with
//! embedded thousands separators (`1,234`). A fixed sentinel vocabulary
//! marks "no reading available"; sentinels yield `None` silently, while
//! genuinely unparseable text yields `None` with a logged warning so
//! downstream can distinguish "unknown" from "zero".

use tracing::warn;

/// Sentinel strings meaning "value not available", matched
/// case-insensitively after trimming.
const SENTINELS: &[&str] = &["n/a", "na", "not available", "--", "none"];

/// Whether the text is a recognized not-available sentinel.
pub fn is_sentinel(text: &str) -> bool {
    let lower = text.trim().to_ascii_lowercase();
    SENTINELS.iter().any(|s| *s == lower)
}

/// Extract a leading numeric value from text, handling units.
///
/// Sentinels and empty text return `None` without logging. Text that is
/// neither a sentinel nor parseable logs a unit-parse warning and
/// returns `None`.
pub fn extract_numeric(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() || is_sentinel(trimmed) {
        return None;
    }

    // First whitespace token, thousands separators removed.
    let token = trimmed.split_whitespace().next()?.replace(',', "");

    if let Ok(v) = token.parse::<f64>() {
        return Some(v);
    }

    // Units glued onto the number ("-2.28dBm", "3.3V"). Take the
    // longest leading prefix that still parses as a float; scanning
    // from the front would cut "1.25e-11" at the 'e'.
    for end in (1..token.len()).rev() {
        if !token.is_char_boundary(end) {
            continue;
        }
        if let Ok(v) = token[..end].parse::<f64>() {
            return Some(v);
        }
    }

    warn!(target: "optel::value", text = %trimmed, "unparseable numeric value");
    None
}

/// Parse an interface speed string into bits per second.
///
/// `400Gbps` -> 400_000_000_000. Unknown units return `None`.
pub fn parse_speed(text: &str) -> Option<u64> {
    let lower = text.trim().to_ascii_lowercase();
    const MULTIPLIERS: &[(&str, u64)] = &[
        ("gbps", 1_000_000_000),
        ("mbps", 1_000_000),
        ("kbps", 1_000),
        ("bps", 1),
    ];
    for (unit, multiplier) in MULTIPLIERS {
        if let Some(value) = lower.strip_suffix(unit) {
            let value: f64 = value.trim().parse().ok()?;
            return Some((value * *multiplier as f64) as u64);
        }
    }
    None
}
