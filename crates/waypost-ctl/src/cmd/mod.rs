//! CLI command modules.

pub mod discover;
pub mod register;
pub mod windows;

use chrono::Utc;
use waypost_core::ServiceRecord;

/// Seconds since the record was last renewed.
pub fn age_secs(record: &ServiceRecord) -> i64 {
    (Utc::now() - record.added).num_seconds().max(0)
}
