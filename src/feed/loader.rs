use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while reading source feeds.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The file exists but could not be read.
    #[error("Failed to read feed '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// One configured source feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFeed {
    /// File name as configured.
    pub name: String,
    /// Full text of the file, `None` when it does not exist.
    pub content: Option<String>,
}

impl SourceFeed {
    pub fn is_missing(&self) -> bool {
        self.content.is_none()
    }
}

/// Reads each named feed from `base_dir`, keeping the configured order.
///
/// A file that does not exist is reported as missing rather than failing the
/// run. Bytes that are not valid UTF-8 are replaced, not rejected.
///
/// # Errors
///
/// Returns [`LoadError::Read`] when a file exists but cannot be read
/// (permissions, a directory in its place, ...).
pub fn load_sources<S: AsRef<str>>(
    base_dir: &Path,
    names: &[S],
) -> Result<Vec<SourceFeed>, LoadError> {
    names
        .iter()
        .map(|name| load_source(base_dir, name.as_ref()))
        .collect()
}

fn load_source(base_dir: &Path, name: &str) -> Result<SourceFeed, LoadError> {
    let path = base_dir.join(name);

    let content = match std::fs::read(&path) {
        Ok(bytes) => {
            tracing::debug!(file = %name, bytes = bytes.len(), "Loaded source feed");
            Some(String::from_utf8_lossy(&bytes).into_owned())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!(file = %name, path = %path.display(), "Source feed not found, skipping");
            None
        }
        Err(source) => return Err(LoadError::Read { path, source }),
    };

    Ok(SourceFeed {
        name: name.to_string(),
        content,
    })
}
