use chrono::DateTime;
use serde_json::Value;
use sha2::{Digest, Sha256};

/// Canonical serialization of a raw payload: compact JSON with object keys
/// in sorted order, no trailing whitespace.
///
/// serde_json's default `Map` is a BTreeMap, so object keys serialize sorted
/// regardless of the order they were parsed in; compact output has no
/// insignificant whitespace. Non-object payloads (plain text wrapped in a
/// JSON string) canonicalize the same way.
pub fn canonical_json(value: &Value) -> String {
    serde_json::to_string(value).unwrap_or_default()
}

/// SHA-256 of the canonicalized payload, lowercase hex.
///
/// This is the deduplication key across the whole system: two records with
/// the same hash carry the same payload regardless of which source captured
/// them.
pub fn content_hash(value: &Value) -> String {
    let canonical = canonical_json(value);
    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    let digest = hasher.finalize();

    let mut out = String::with_capacity(64);
    for byte in digest {
        out.push_str(&format!("{:02x}", byte));
    }
    out
}

/// Extract the `YYYY-MM-DD` partition from an RFC 3339 timestamp.
///
/// The partition comes from the conversation's own timestamp, never from the
/// wall clock, so historical records land in the correct date even when
/// processed months later. Falls back to the leading date characters for
/// timestamps chrono rejects but that still start with a plausible date.
pub fn date_partition(timestamp: &str) -> Option<String> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(timestamp) {
        return Some(parsed.date_naive().format("%Y-%m-%d").to_string());
    }

    let prefix = timestamp.get(..10)?;
    if prefix
        .chars()
        .enumerate()
        .all(|(i, c)| if i == 4 || i == 7 { c == '-' } else { c.is_ascii_digit() })
    {
        return Some(prefix.to_string());
    }

    None
}

/// Truncate a string to a maximum length, marking the cut
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        s.chars().take(max).collect::<String>() + "...(truncated)"
    }
}

/// Hard character cap with no marker appended.
pub fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}
