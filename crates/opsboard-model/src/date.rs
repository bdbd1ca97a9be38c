//! Date normalization for time-series rows.
//!
//! Upstream query layers hand dates over either as plain strings or wrapped in an object
//! (`{ "value": "2024-01-01" }`, the shape BigQuery client libraries produce). Both are folded
//! into a [`NaiveDate`] here so nothing downstream has to re-check the shape.

use chrono::NaiveDate;
use std::fmt::Write as _;

/// Parse the textual date shapes seen in dashboard datasets.
///
/// Accepted:
/// - `YYYY-MM-DD`
/// - an ISO date-time whose first ten characters are `YYYY-MM-DD` followed by `T` or a space
/// - compact `YYYYMMDD`
pub fn parse_date_text(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }

    if raw.len() > 10 && raw.is_char_boundary(10) {
        let (head, tail) = raw.split_at(10);
        if tail.starts_with('T') || tail.starts_with(' ') {
            if let Ok(date) = NaiveDate::parse_from_str(head, "%Y-%m-%d") {
                return Some(date);
            }
        }
    }

    if raw.len() == 8 && raw.bytes().all(|b| b.is_ascii_digit()) {
        return NaiveDate::parse_from_str(raw, "%Y%m%d").ok();
    }

    None
}

/// Normalize a JSON date field (plain string or `{ "value": ... }` wrapper).
pub fn normalize_date(value: &serde_json::Value) -> Option<NaiveDate> {
    match value {
        serde_json::Value::String(s) => parse_date_text(s),
        serde_json::Value::Object(map) => map.get("value").and_then(normalize_date),
        _ => None,
    }
}

pub fn iso_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Format `date` for chart axes using a strftime pattern.
///
/// Falls back to the ISO form when the pattern cannot be rendered.
pub fn format_display_date(date: NaiveDate, pattern: &str) -> String {
    let mut out = String::new();
    if write!(out, "{}", date.format(pattern)).is_err() {
        return iso_date(date);
    }
    out
}
