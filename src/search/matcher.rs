//! Match policy for directory entries
//!
//! Matchers are pure: the result depends only on the entry, the normalized
//! query words and the MIME filter.

use super::entry::EntryInfo;
use super::mime::MimeFilter;
use super::query::normalize_text;

/// Decides whether a directory entry is a hit
pub trait Matcher: Send + Sync {
    fn matches(&self, entry: &EntryInfo, words: &[String], mime_filter: &MimeFilter) -> bool;
}

impl<F> Matcher for F
where
    F: Fn(&EntryInfo, &[String], &MimeFilter) -> bool + Send + Sync,
{
    fn matches(&self, entry: &EntryInfo, words: &[String], mime_filter: &MimeFilter) -> bool {
        self(entry, words, mime_filter)
    }
}

/// Default policy: every word is a substring of the normalized display name
/// and the MIME type passes the filter
#[derive(Debug, Clone, Copy, Default)]
pub struct NameMimeMatcher;

impl Matcher for NameMimeMatcher {
    fn matches(&self, entry: &EntryInfo, words: &[String], mime_filter: &MimeFilter) -> bool {
        if !mime_filter.accepts(&entry.mime_type) {
            return false;
        }
        if words.is_empty() {
            return true;
        }
        let name = normalize_text(&entry.display_name);
        words.iter().all(|word| name.contains(word.as_str()))
    }
}
