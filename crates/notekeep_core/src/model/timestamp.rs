//! Persisted timestamp text format.
//!
//! All stored times use `YYYY-MM-DD HH:MM:SS` local time without an offset.
//! An empty string stands for "unset".

use chrono::{Local, NaiveDateTime};

/// `chrono` format string for persisted timestamps.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Returns the current local time in persisted format.
pub fn now_timestamp() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// Parses one persisted timestamp. Returns `None` for malformed text.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value.trim(), TIMESTAMP_FORMAT).ok()
}

/// Maps the stored `''` sentinel to `None`.
pub fn optional_from_db(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}
