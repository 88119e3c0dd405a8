//! Merge local Atom feed files into one combined feed, newest entries first.

pub mod config;
pub mod feed;
pub mod pipeline;

pub use config::{Config, ConfigError, SiteMeta};
pub use pipeline::{run, run_with, MergeReport};
