use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use uuid::Uuid;

/// Unique identifier of one search session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(Uuid);

impl SessionId {
    pub(crate) fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Engine lifecycle as seen from the consumer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineState {
    Idle,
    Running,
}

/// Single search hit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitRecord {
    /// `file://` URI of the entry
    pub uri: String,
    /// MIME type the matcher saw
    pub mime_type: String,
}

impl HitRecord {
    pub fn new(path: &Path, mime_type: impl Into<String>) -> Self {
        Self {
            uri: path_to_uri(path),
            mime_type: mime_type.into(),
        }
    }
}

/// Build a `file://` URI with percent-encoded path segments
pub fn path_to_uri(path: &Path) -> String {
    let mut uri = String::from("file://");
    for component in path.components() {
        match component {
            Component::RootDir | Component::Prefix(_) => {}
            Component::CurDir => continue,
            Component::ParentDir => uri.push_str("/.."),
            Component::Normal(segment) => {
                uri.push('/');
                uri.push_str(&encode_segment(segment));
            }
        }
    }
    if uri.len() == "file://".len() {
        uri.push('/');
    }
    uri
}

/// Decode the percent-encoded path part of a `file://` URI
///
/// On Unix the decoded bytes are used as-is, so names that are not valid
/// UTF-8 survive a round trip through `path_to_uri`.
pub fn uri_path_to_path(encoded: &str) -> Option<PathBuf> {
    #[cfg(unix)]
    {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;
        let bytes = urlencoding::decode_binary(encoded.as_bytes());
        Some(PathBuf::from(OsStr::from_bytes(&bytes)))
    }
    #[cfg(not(unix))]
    {
        urlencoding::decode(encoded)
            .ok()
            .map(|decoded| PathBuf::from(decoded.into_owned()))
    }
}

#[cfg(unix)]
fn encode_segment(segment: &std::ffi::OsStr) -> String {
    use std::os::unix::ffi::OsStrExt;
    urlencoding::encode_binary(segment.as_bytes()).into_owned()
}

#[cfg(not(unix))]
fn encode_segment(segment: &std::ffi::OsStr) -> String {
    urlencoding::encode(&segment.to_string_lossy()).into_owned()
}

/// Notification delivered to the consumer, in flush order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SearchEvent {
    /// One batch of hits
    HitsAdded { hits: Vec<HitRecord> },
    /// Terminal notification of a session that was not stopped
    Finished { stats: SessionStats },
}

/// Progress counters shared between the worker and the consumer
#[derive(Debug, Default)]
pub struct SessionCounters {
    pub directories_visited: AtomicUsize,
    pub entries_processed: AtomicUsize,
    pub hits: AtomicUsize,
    pub error_count: AtomicUsize,
}

impl SessionCounters {
    pub fn snapshot(&self, incomplete: bool) -> SessionStats {
        SessionStats {
            directories_visited: self.directories_visited.load(Ordering::Acquire),
            entries_processed: self.entries_processed.load(Ordering::Acquire),
            hits: self.hits.load(Ordering::Acquire),
            error_count: self.error_count.load(Ordering::Acquire),
            incomplete,
        }
    }
}

/// Point-in-time copy of session counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    pub directories_visited: usize,
    pub entries_processed: usize,
    pub hits: usize,
    pub error_count: usize,
    /// True when the session stopped early because its time budget ran out
    pub incomplete: bool,
}
