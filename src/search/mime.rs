//! MIME type detection and filtering
//!
//! Entry MIME types are guessed from the file name with `mime_guess`;
//! directories report `inode/directory`. Filter patterns are compiled into a
//! `GlobSet` so both exact types and wildcards like `image/*` work.

use crate::error::SearchError;
use globset::{Glob, GlobSet, GlobSetBuilder};
use mime_guess::from_path;
use std::path::Path;

/// MIME type reported for directories
pub const DIRECTORY_MIME: &str = "inode/directory";

/// MIME type reported when the name gives no hint
pub const FALLBACK_MIME: &str = "application/octet-stream";

/// Guess the MIME type of an entry from its name
pub fn guess_mime(path: &Path, is_dir: bool) -> String {
    if is_dir {
        return DIRECTORY_MIME.to_string();
    }
    from_path(path)
        .first()
        .map_or_else(|| FALLBACK_MIME.to_string(), |m| m.essence_str().to_lowercase())
}

/// Set of acceptable MIME type patterns. An empty filter accepts everything.
#[derive(Debug, Clone)]
pub struct MimeFilter {
    patterns: Vec<String>,
    set: GlobSet,
}

impl Default for MimeFilter {
    fn default() -> Self {
        Self {
            patterns: Vec::new(),
            set: GlobSet::empty(),
        }
    }
}

impl MimeFilter {
    /// Compile a filter from MIME patterns (`image/png`, `image/*`, `*/*`)
    ///
    /// # Errors
    /// Returns error if a pattern is not a valid glob
    pub fn new<I, S>(patterns: I) -> Result<Self, SearchError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut builder = GlobSetBuilder::new();
        let mut kept = Vec::new();

        for pattern in patterns {
            let pattern = pattern.as_ref().trim().to_lowercase();
            if pattern.is_empty() {
                continue;
            }
            let glob = Glob::new(&pattern).map_err(|source| SearchError::InvalidMimePattern {
                pattern: pattern.clone(),
                source,
            })?;
            builder.add(glob);
            kept.push(pattern);
        }

        let set = builder
            .build()
            .map_err(|source| SearchError::InvalidMimePattern {
                pattern: kept.join(","),
                source,
            })?;

        Ok(Self {
            patterns: kept,
            set,
        })
    }

    /// Patterns as given (lowercased, blanks removed)
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// True if the filter is empty or any pattern matches `mime`
    pub fn accepts(&self, mime: &str) -> bool {
        self.is_empty() || self.set.is_match(mime.to_lowercase())
    }
}
