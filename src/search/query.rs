//! Search query and its normalized snapshot
//!
//! A `Query` is immutable once built. When a session starts, the engine takes
//! a `QuerySnapshot`: normalized word list, MIME filter and resolved root, all
//! owned by the worker.

use super::mime::MimeFilter;
use super::types::uri_path_to_path;
use crate::config::DEFAULT_ROOT;
use crate::error::SearchError;
use std::path::{Path, PathBuf};
use unicode_normalization::UnicodeNormalization;

/// Description of what to search for
#[derive(Debug, Clone, Default)]
pub struct Query {
    text: String,
    mime_filter: MimeFilter,
    location: Option<String>,
}

impl Query {
    /// Create a query for `text` with no MIME filter, rooted at `/`
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Restrict hits to entries whose MIME type matches one of `patterns`
    ///
    /// # Errors
    /// Returns error if a pattern is not a valid glob
    pub fn with_mime_types<I, S>(mut self, patterns: I) -> Result<Self, SearchError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.mime_filter = MimeFilter::new(patterns)?;
        Ok(self)
    }

    /// Root location as a `file://` URI or a filesystem path
    #[must_use]
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn mime_filter(&self) -> &MimeFilter {
        &self.mime_filter
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    /// Take a private copy for a worker
    pub fn snapshot(&self) -> QuerySnapshot {
        QuerySnapshot {
            text: self.text.clone(),
            words: normalize_words(&self.text),
            mime_filter: self.mime_filter.clone(),
            root: resolve_location(self.location.as_deref()),
        }
    }
}

/// Read-only copy of a query owned by one session
#[derive(Debug, Clone)]
pub struct QuerySnapshot {
    pub text: String,
    pub words: Vec<String>,
    pub mime_filter: MimeFilter,
    pub root: PathBuf,
}

/// NFD-normalize, lowercase and split on whitespace
pub fn normalize_words(text: &str) -> Vec<String> {
    normalize_text(text)
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// NFD-normalize and lowercase
pub fn normalize_text(text: &str) -> String {
    text.nfd().collect::<String>().to_lowercase()
}

/// Expand home directory (~) in file paths
fn expand_home(filepath: &str) -> String {
    if (filepath.starts_with("~/") || filepath == "~")
        && let Some(home_dir) = dirs::home_dir()
    {
        return home_dir.join(filepath[1..].trim_start_matches('/')).to_string_lossy().to_string();
    }
    filepath.to_string()
}

/// Resolve a query location into a root directory
///
/// Accepts `file://` URIs and plain paths. Missing, empty or unparseable
/// locations fall back to `/`.
pub fn resolve_location(location: Option<&str>) -> PathBuf {
    let Some(raw) = location.map(str::trim).filter(|l| !l.is_empty()) else {
        return PathBuf::from(DEFAULT_ROOT);
    };

    match parse_location(raw) {
        Some(path) => path,
        None => {
            log::warn!("Unparseable search location '{raw}', falling back to {DEFAULT_ROOT}");
            PathBuf::from(DEFAULT_ROOT)
        }
    }
}

fn parse_location(raw: &str) -> Option<PathBuf> {
    if let Some(rest) = raw.strip_prefix("file://") {
        // Only local authorities are supported: file:///path or file://localhost/path
        let path = rest.strip_prefix("localhost").unwrap_or(rest);
        if !path.starts_with('/') {
            return None;
        }
        return uri_path_to_path(path);
    }

    if raw.contains("://") {
        return None;
    }

    let expanded = expand_home(raw);
    let path = Path::new(&expanded);
    if path.is_absolute() {
        Some(path.to_path_buf())
    } else {
        std::env::current_dir().ok().map(|cwd| cwd.join(path))
    }
}
