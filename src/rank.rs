//! Total order over the valid record set: priority tier, then timestamp.
//!
//! Undated records sort as if carrying the maximum representable timestamp,
//! so within a tier they come after every dated record. The sort is stable:
//! records equal on both keys keep their ingestion order.

use chrono::NaiveDateTime;

use crate::record::{Record, fields};

/// Tier for priorities outside the documented vocabulary.
pub const TIER_UNRECOGNIZED: u8 = 3;

/// Map a priority value to its tier; lower sorts first.
///
/// Matching is case-insensitive on the trimmed value. Anything outside
/// `alta` / `media` / `baja` (including empty) lands in tier 3.
pub fn priority_tier(priority: &str) -> u8 {
    match priority.trim().to_lowercase().as_str() {
        "alta" => 0,
        "media" => 1,
        "baja" => 2,
        _ => TIER_UNRECOGNIZED,
    }
}

/// Sort records by `(priority tier, timestamp)` in place.
pub fn rank(records: &mut [Record]) {
    records.sort_by_key(|r| {
        (
            priority_tier(r.field(fields::PRIORITY)),
            r.timestamp.unwrap_or(NaiveDateTime::MAX),
        )
    });
}
