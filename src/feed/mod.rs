//! Feed handling for the merge pipeline.
//!
//! The pipeline runs in four steps, one submodule each:
//!
//! - [`loader`] - Read the configured source files, flagging missing ones
//! - [`parser`] - Pull `<entry>` fragments and their fields out of feed text
//! - [`merge`] - Combine all entries and order them newest first
//! - [`render`] - Wrap the fragments in a fresh envelope and write the file
//!
//! # Example
//!
//! ```ignore
//! use feedmerge::feed::{extract_entries, load_sources, merge, render_feed};
//!
//! let sources = load_sources(&base_dir, &["a.xml", "b.xml"])?;
//! let entries = merge(sources.iter().filter_map(|s| s.content.as_deref()).map(|t| extract_entries(t, now)));
//! let document = render_feed(&entries, &site, now);
//! ```

mod loader;
mod merge;
mod parser;
mod render;

pub use loader::{load_sources, LoadError, SourceFeed};
pub use merge::merge;
pub use parser::{extract_entries, parse_timestamp, Entry};
pub use render::{render_feed, write_feed};
