use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use quick_xml::escape::escape;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

use super::parser::Entry;
use crate::config::SiteMeta;

/// Builds the combined Atom document.
///
/// The envelope comes from `site` (escaped) and `now`; each entry's `raw`
/// fragment is embedded untouched, one per line, in the order given.
pub fn render_feed(entries: &[Entry], site: &SiteMeta, now: DateTime<Utc>) -> String {
    let fragments = entries
        .iter()
        .map(|e| e.raw.as_str())
        .collect::<Vec<_>>()
        .join("\n  ");

    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>{title}</title>
  <link href="{self_link}" rel="self"/>
  <link href="{site_link}"/>
  <updated>{updated}</updated>
  <id>{id}</id>
  <author>
    <name>{author}</name>
  </author>
  {fragments}
</feed>"#,
        title = escape(site.title.as_str()),
        self_link = escape(site.self_link.as_str()),
        site_link = escape(site.site_link.as_str()),
        updated = now.to_rfc3339_opts(SecondsFormat::Millis, true),
        id = escape(site.id.as_str()),
        author = escape(site.author.as_str()),
        fragments = fragments,
    )
}

/// Writes the combined feed to `path`, replacing any previous file.
///
/// The document goes to a temporary file next to `path` that is synced and
/// then persisted over the destination, so readers never see a half-written
/// feed. The temporary file is removed if any step fails.
pub fn write_feed(path: &Path, document: &str) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = NamedTempFile::new_in(dir).with_context(|| {
        format!(
            "Failed to create temporary file in '{}': check the directory exists and is writable",
            dir.display()
        )
    })?;

    temp.write_all(document.as_bytes())
        .and_then(|()| temp.as_file().sync_all())
        .with_context(|| {
            format!(
                "Failed to write feed to temporary file '{}': disk may be full",
                temp.path().display()
            )
        })?;

    temp.persist(path)
        .with_context(|| format!("Failed to replace '{}'", path.display()))?;

    tracing::debug!(path = %path.display(), bytes = document.len(), "Wrote combined feed");
    Ok(())
}
