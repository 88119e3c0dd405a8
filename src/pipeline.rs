//! End-to-end merge run: load, extract, merge, render, write.
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::path::PathBuf;

use crate::config::Config;
use crate::feed::{extract_entries, load_sources, merge, render_feed, write_feed};

/// Outcome of one merge run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeReport {
    /// Number of entries written to the combined feed.
    pub entries: usize,
    pub output_path: PathBuf,
    /// Configured sources that did not exist, in configured order.
    pub missing: Vec<String>,
}

/// Runs the whole pipeline once.
///
/// `now` is both the fallback timestamp for undated entries and the
/// `<updated>` value of the combined feed. Missing sources are skipped and
/// listed in the report; failing to read an existing source or to write the
/// output aborts the run.
pub fn run(config: &Config, now: DateTime<Utc>) -> Result<MergeReport> {
    run_with(config, now, |_| {})
}

/// Same as [`run`], calling `on_missing` with each missing source's name as
/// soon as it is skipped, before anything is written.
pub fn run_with<F>(config: &Config, now: DateTime<Utc>, mut on_missing: F) -> Result<MergeReport>
where
    F: FnMut(&str),
{
    let sources = load_sources(&config.base_dir, config.feeds.as_slice())
        .context("Failed to load source feeds")?;

    let mut missing = Vec::new();
    let mut per_source = Vec::with_capacity(sources.len());
    for source in sources {
        match source.content {
            Some(text) => {
                let entries = extract_entries(&text, now);
                tracing::info!(file = %source.name, entries = entries.len(), "Extracted entries");
                per_source.push(entries);
            }
            None => {
                on_missing(&source.name);
                missing.push(source.name);
            }
        }
    }

    let entries = merge(per_source);
    let document = render_feed(&entries, &config.site, now);

    let output_path = config.output_path();
    write_feed(&output_path, &document)
        .with_context(|| format!("Failed to write combined feed to {}", output_path.display()))?;

    tracing::info!(
        entries = entries.len(),
        missing = missing.len(),
        path = %output_path.display(),
        "Combined feed written"
    );

    Ok(MergeReport {
        entries: entries.len(),
        output_path,
        missing,
    })
}
