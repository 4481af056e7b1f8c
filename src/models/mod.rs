//! The six backend collections and how each is listed and edited.
pub mod category;
pub mod comment;
pub mod news;
pub mod subcategory;
pub mod tag;
pub mod user;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};

use crate::api::payload::{FieldValue, FormValues};

pub use category::{Category, CategoryRow, Categories};
pub use comment::{Comment, CommentAuthor, CommentRow, Comments};
pub use news::{News, NewsRow, NewsStatus, NewsArticles};
pub use subcategory::{Subcategory, SubcategoryRow, Subcategories};
pub use tag::{Tag, TagRow, Tags};
pub use user::{Role, User, UserRow, Users};

/// Shown in place of any missing optional field
pub const NOT_AVAILABLE: &str = "N/A";

pub fn or_na(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => NOT_AVAILABLE.to_string(),
    }
}

pub(crate) fn yes_no(flag: bool) -> String {
    if flag { "Yes" } else { "No" }.to_string()
}

/// Parse the timestamp shapes the backend emits: RFC 3339, a naive
/// date-time (taken as UTC) or a bare date (midnight UTC)
pub fn parse_timestamp(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt);
    }
    let utc = FixedOffset::east_opt(0)?;
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc().with_timezone(&utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f") {
        return Some(naive.and_utc().with_timezone(&utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc().with_timezone(&utc))
}

/// `dd/mm/yyyy`, or `N/A` when absent or unparseable
pub fn format_date(raw: Option<&str>) -> String {
    raw.and_then(parse_timestamp)
        .map(|dt| dt.format("%d/%m/%Y").to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// `dd/mm/yyyy, HH:MM:SS`, or `N/A` when absent or unparseable
pub fn format_date_time(raw: Option<&str>) -> String {
    raw.and_then(parse_timestamp)
        .map(|dt| dt.format("%d/%m/%Y, %H:%M:%S").to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

pub(crate) fn text(value: &str) -> FieldValue {
    FieldValue::Text(value.to_string())
}

pub(crate) fn insert_text(values: &mut FormValues, name: &str, value: Option<&str>) {
    values.insert(name.to_string(), text(value.unwrap_or_default()));
}
