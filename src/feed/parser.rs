use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;
use std::sync::LazyLock;

// Compiled once; every source feed goes through the same patterns.
static ENTRY_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<entry>(.*?)</entry>").unwrap());
static TITLE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<title[^>]*>(.*?)</title>").unwrap());
static LINK_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<link[^>]*href=["'](.*?)["'][^>]*/>"#).unwrap());
static CONTENT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<content[^>]*>(.*?)</content>").unwrap());
static SUMMARY_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<summary[^>]*>(.*?)</summary>").unwrap());
static UPDATED_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<updated>(.*?)</updated>").unwrap());
static PUBLISHED_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<published>(.*?)</published>").unwrap());
static ID_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<id>(.*?)</id>").unwrap());

/// One `<entry>` pulled out of a source feed.
///
/// `raw` is the fragment exactly as it appeared in the source, from
/// `<entry>` through `</entry>`; it is what gets written to the combined feed.
/// The other fields only drive ordering and filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub title: String,
    pub link: String,
    /// `<content>` body, else `<summary>`, else empty.
    pub content: String,
    /// `<updated>`, else `<published>`, else the run time.
    pub timestamp: DateTime<Utc>,
    /// `<id>`, else the link.
    pub id: String,
    pub raw: String,
}

/// Extracts every usable entry from one feed's text.
///
/// The text is scanned for non-overlapping `<entry>...</entry>` fragments; it
/// is never parsed as a whole document, so a broken feed still yields the
/// entries that look right. Fragments without a title or a link are skipped.
/// `now` stands in for entries that carry no usable date.
pub fn extract_entries(text: &str, now: DateTime<Utc>) -> Vec<Entry> {
    let mut entries = Vec::new();
    let mut skipped = 0usize;

    for caps in ENTRY_PATTERN.captures_iter(text) {
        let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        match parse_entry(inner.as_str(), whole.as_str(), now) {
            Some(entry) => entries.push(entry),
            None => skipped += 1,
        }
    }

    if skipped > 0 {
        tracing::debug!(
            kept = entries.len(),
            skipped,
            "Dropped entries without a title or link"
        );
    }
    entries
}

fn parse_entry(inner: &str, raw: &str, now: DateTime<Utc>) -> Option<Entry> {
    let title = capture(&TITLE_PATTERN, inner)?;
    let link = capture(&LINK_PATTERN, inner)?;

    let content = capture(&CONTENT_PATTERN, inner)
        .or_else(|| capture(&SUMMARY_PATTERN, inner))
        .unwrap_or_default();

    let timestamp = capture(&UPDATED_PATTERN, inner)
        .or_else(|| capture(&PUBLISHED_PATTERN, inner))
        .map(|date| {
            parse_timestamp(&date).unwrap_or_else(|| {
                tracing::debug!(date = %date, link = %link, "Unparseable entry date, using run time");
                now
            })
        })
        .unwrap_or(now);

    let id = capture(&ID_PATTERN, inner).unwrap_or_else(|| link.clone());

    Some(Entry {
        title,
        link,
        content,
        timestamp,
        id,
        raw: raw.to_string(),
    })
}

fn capture(pattern: &Regex, haystack: &str) -> Option<String> {
    pattern
        .captures(haystack)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// ISO 8601 variants RFC 3339 rejects: minutes-only times, `+0200` and
/// `+02` offsets, a space instead of `T`.
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%#z",
    "%Y-%m-%dT%H:%M%#z",
    "%Y-%m-%d %H:%M:%S%.f%#z",
    "%Y-%m-%d %H:%M%#z",
];

/// Zone-less forms, read as UTC.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parses the date formats seen in Atom and RSS feeds.
///
/// Tries RFC 3339 and RFC 2822 first, then looser ISO 8601 date-times with
/// and without an offset, and finally a bare date. Anything without a zone
/// is read as UTC.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(value) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Some(dt) = OFFSET_FORMATS
        .iter()
        .find_map(|fmt| DateTime::parse_from_str(value, fmt).ok())
    {
        return Some(dt.with_timezone(&Utc));
    }
    if let Some(dt) = NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
    {
        return Some(dt.and_utc());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}
