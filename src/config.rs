//! Configuration file parser for `feedmerge.toml`.
//!
//! The config file is optional — a missing file yields `Config::default()`,
//! which reproduces the stock source list, output name and site envelope.
//! Unknown keys are accepted by serde, though we log a warning for each one
//! since they are usually typos.
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config file too large: {0}")]
    TooLarge(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Top-level merge configuration.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding the source feeds and receiving the output file.
    pub base_dir: PathBuf,

    /// Source feed file names, in priority order.
    pub feeds: Vec<String>,

    /// File name of the combined feed, relative to `base_dir`.
    pub output: String,

    /// Envelope metadata for the combined feed.
    pub site: SiteMeta,
}

/// Feed-level metadata wrapped around the merged entries.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteMeta {
    pub title: String,
    /// `rel="self"` link, the public URL of the combined feed.
    pub self_link: String,
    pub site_link: String,
    pub id: String,
    pub author: String,
}

const DEFAULT_SELF_LINK: &str = "https://arbnorcyberlabs-eng.github.io/rss-feeds/all.xml";

impl Default for SiteMeta {
    fn default() -> Self {
        Self {
            title: "Combined Feed - All Sources".to_string(),
            self_link: DEFAULT_SELF_LINK.to_string(),
            site_link: "https://arbnorcyberlabs-eng.github.io/rss-feeds/".to_string(),
            id: DEFAULT_SELF_LINK.to_string(),
            author: "RSS Feed Aggregator".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("./public"),
            feeds: vec![
                "funfacts.xml".to_string(),
                "wikivoyage.xml".to_string(),
                "hackernews.xml".to_string(),
                "medium_matteo.xml".to_string(),
            ],
            output: "all.xml".to_string(),
            site: SiteMeta::default(),
        }
    }
}

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    /// Load configuration from a TOML file.
    ///
    /// - Missing, empty or whitespace-only file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Unknown keys → accepted, logged as warning
    ///
    /// The result is not validated; call [`Config::validate`] once any
    /// command-line overrides have been applied.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let Some(content) = read_config_text(path)? else {
            tracing::debug!(path = %path.display(), "No config found, using defaults");
            return Ok(Self::default());
        };

        for key in unknown_keys(&content) {
            tracing::warn!(key = %key, "Unknown key in config file, ignoring");
        }

        let config: Config = toml::from_str(&content)?;
        tracing::info!(
            path = %path.display(),
            feeds = config.feeds.len(),
            "Loaded configuration"
        );
        Ok(config)
    }

    /// Checks the values a run depends on.
    ///
    /// Rejects an empty feed list, an output name that is not a plain file
    /// name (it must land inside `base_dir`), and envelope links that are not
    /// absolute URLs.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.feeds.is_empty() {
            return Err(ConfigError::Invalid("no source feeds configured".to_string()));
        }

        for name in self.feeds.iter().chain(std::iter::once(&self.output)) {
            if !is_plain_file_name(name) {
                return Err(ConfigError::Invalid(format!(
                    "'{}' must be a plain file name inside the base directory",
                    name
                )));
            }
        }

        for (key, value) in [
            ("site.self_link", &self.site.self_link),
            ("site.site_link", &self.site.site_link),
        ] {
            url::Url::parse(value).map_err(|e| {
                ConfigError::Invalid(format!("{} '{}' is not a valid URL: {}", key, value, e))
            })?;
        }

        Ok(())
    }

    /// Full path of the combined feed.
    pub fn output_path(&self) -> PathBuf {
        self.base_dir.join(&self.output)
    }
}

/// Reads the config file, `None` when there is nothing to parse.
fn read_config_text(path: &Path) -> Result<Option<String>, ConfigError> {
    let size = match std::fs::metadata(path) {
        Ok(meta) => meta.len(),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(ConfigError::Io(e)),
    };
    if size > Config::MAX_FILE_SIZE {
        return Err(ConfigError::TooLarge(format!(
            "Config file is {} bytes (max {} bytes)",
            size,
            Config::MAX_FILE_SIZE
        )));
    }

    match std::fs::read_to_string(path) {
        Ok(text) if text.trim().is_empty() => Ok(None),
        Ok(text) => Ok(Some(text)),
        // Deleted between metadata and read
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(ConfigError::Io(e)),
    }
}

/// Dotted names of keys this crate does not know, top level and `[site]`.
/// Unparseable text yields nothing; `toml::from_str` reports it instead.
fn unknown_keys(content: &str) -> Vec<String> {
    const TOP: [&str; 4] = ["base_dir", "feeds", "output", "site"];
    const SITE: [&str; 5] = ["title", "self_link", "site_link", "id", "author"];

    let Ok(table) = content.parse::<toml::Table>() else {
        return Vec::new();
    };

    let mut unknown: Vec<String> = table
        .keys()
        .filter(|key| !TOP.contains(&key.as_str()))
        .cloned()
        .collect();
    if let Some(site) = table.get("site").and_then(|v| v.as_table()) {
        unknown.extend(
            site.keys()
                .filter(|key| !SITE.contains(&key.as_str()))
                .map(|key| format!("site.{}", key)),
        );
    }
    unknown
}

fn is_plain_file_name(name: &str) -> bool {
    let path = Path::new(name);
    !name.is_empty()
        && path.file_name().map(|f| f == path.as_os_str()).unwrap_or(false)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(dir: &tempfile::TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("feedmerge.toml");
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.base_dir, PathBuf::from("./public"));
        assert_eq!(
            config.feeds,
            vec![
                "funfacts.xml",
                "wikivoyage.xml",
                "hackernews.xml",
                "medium_matteo.xml"
            ]
        );
        assert_eq!(config.output, "all.xml");
        assert_eq!(config.site.title, "Combined Feed - All Sources");
        assert_eq!(config.site.id, config.site.self_link);
        assert_eq!(config.site.author, "RSS Feed Aggregator");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_output_path_joins_base_dir() {
        let config = Config::default();
        assert_eq!(config.output_path(), PathBuf::from("./public/all.xml"));
    }

    #[test]
    fn test_missing_file_returns_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(config.output, "all.xml");
    }

    #[test]
    fn test_whitespace_only_file_returns_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, "   \n  \n  ");

        let config = Config::load(&path).unwrap();
        assert_eq!(config.feeds.len(), 4);
    }

    #[test]
    fn test_partial_config_uses_defaults_for_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, "output = \"combined.xml\"\n\n[site]\ntitle = \"Mine\"\n");

        let config = Config::load(&path).unwrap();
        assert_eq!(config.output, "combined.xml");
        assert_eq!(config.site.title, "Mine");
        assert_eq!(config.site.author, "RSS Feed Aggregator"); // default
        assert_eq!(config.base_dir, PathBuf::from("./public")); // default
    }

    #[test]
    fn test_full_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            &dir,
            r#"
base_dir = "/srv/feeds"
feeds = ["a.xml", "b.xml"]
output = "merged.xml"

[site]
title = "Everything"
self_link = "https://example.com/merged.xml"
site_link = "https://example.com/"
id = "urn:example:merged"
author = "Example Bot"
"#,
        );

        let config = Config::load(&path).unwrap();
        assert_eq!(config.base_dir, PathBuf::from("/srv/feeds"));
        assert_eq!(config.feeds, vec!["a.xml", "b.xml"]);
        assert_eq!(config.output, "merged.xml");
        assert_eq!(config.site.self_link, "https://example.com/merged.xml");
        assert_eq!(config.site.id, "urn:example:merged");
        assert_eq!(config.site.author, "Example Bot");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_toml_returns_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, "this is not [valid toml");

        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().contains("Invalid TOML"));
    }

    #[test]
    fn test_wrong_type_returns_error() {
        let dir = tempfile::tempdir().unwrap();
        // feeds should be an array of strings
        let path = write_config(&dir, "feeds = \"a.xml\"\n");

        assert!(matches!(Config::load(&path), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_unknown_keys_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, "output = \"x.xml\"\ntotally_fake_key = 42\n");

        let config = Config::load(&path).unwrap();
        assert_eq!(config.output, "x.xml");
    }

    #[test]
    fn test_unknown_keys_listed_with_site_prefix() {
        let content = "output = \"x.xml\"\nfeedz = []\n\n[site]\ntitle = \"T\"\nauthr = \"me\"\n";
        assert_eq!(unknown_keys(content), vec!["feedz", "site.authr"]);
    }

    #[test]
    fn test_unknown_keys_empty_for_known_or_invalid() {
        assert!(unknown_keys("output = \"x.xml\"\n[site]\nid = \"urn:x\"\n").is_empty());
        assert!(unknown_keys("this is not [valid toml").is_empty());
    }

    #[test]
    fn test_too_large_file_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, &"a".repeat(1_048_577));

        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::TooLarge(_)));
        assert!(err.to_string().contains("too large"));
    }

    #[test]
    fn test_validate_rejects_empty_feed_list() {
        let config = Config {
            feeds: Vec::new(),
            ..Config::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("no source feeds"));
    }

    #[test]
    fn test_validate_rejects_output_outside_base_dir() {
        for output in ["../all.xml", "sub/all.xml", "/tmp/all.xml", ""] {
            let config = Config {
                output: output.to_string(),
                ..Config::default()
            };
            assert!(
                matches!(config.validate(), Err(ConfigError::Invalid(_))),
                "output {:?} should be rejected",
                output
            );
        }
    }

    #[test]
    fn test_validate_rejects_nested_feed_name() {
        let config = Config {
            feeds: vec!["ok.xml".to_string(), "../secret.xml".to_string()],
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_relative_site_link() {
        let mut config = Config::default();
        config.site.site_link = "/rss-feeds/".to_string();

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("site.site_link"));
    }
}
