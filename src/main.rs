use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use std::path::PathBuf;

use feedmerge::Config;

#[derive(Parser, Debug)]
#[command(
    name = "feedmerge",
    about = "Merge local Atom feeds into one combined feed"
)]
struct Args {
    /// Configuration file (TOML). Built-in defaults are used if it does not exist.
    #[arg(long, value_name = "FILE", default_value = "feedmerge.toml")]
    config: PathBuf,

    /// Directory holding the source feeds and the output file
    #[arg(long, value_name = "DIR")]
    base_dir: Option<PathBuf>,

    /// Output file name, relative to the base directory
    #[arg(long, value_name = "NAME")]
    output: Option<String>,

    /// Source feed file name (repeatable; replaces the configured list)
    #[arg(long = "feed", value_name = "NAME")]
    feeds: Vec<String>,
}

impl Args {
    fn apply(self, mut config: Config) -> Config {
        if let Some(base_dir) = self.base_dir {
            config.base_dir = base_dir;
        }
        if let Some(output) = self.output {
            config.output = output;
        }
        if !self.feeds.is_empty() {
            config.feeds = self.feeds;
        }
        config
    }
}

fn missing_source_warning(name: &str) -> String {
    format!("Warning: {} not found, skipping...", name)
}

fn main() -> Result<()> {
    // Initialize tracing for debug logging
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let config = Config::load(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;
    let config = args.apply(config);
    config.validate().context("Invalid configuration")?;
    tracing::debug!(?config, "Effective configuration");

    let report = feedmerge::run_with(&config, Utc::now(), |name| {
        eprintln!("{}", missing_source_warning(name));
    })?;

    println!(
        "✓ Generated combined feed with {} entries",
        report.entries
    );
    println!("✓ Saved to {}", report.output_path.display());

    Ok(())
}
