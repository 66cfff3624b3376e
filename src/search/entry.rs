//! Filesystem access for the worker
//!
//! Enumerates a directory and queries per-entry metadata: name, display name,
//! hidden flag, type, MIME type and a stable identity token.

use super::mime::guess_mime;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Stable identity of a filesystem object, independent of the path used to reach it
///
/// On Unix this is the device and inode pair, rendered as `l<dev>:<ino>`.
/// Elsewhere the canonical path is used.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileIdentity(String);

impl FileIdentity {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for FileIdentity {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Metadata of one directory entry, as seen by the matcher
#[derive(Debug, Clone)]
pub struct EntryInfo {
    pub path: PathBuf,
    /// Raw file name
    pub name: String,
    /// Name suitable for matching (lossy UTF-8)
    pub display_name: String,
    /// Dot files and `~` backup files
    pub is_hidden: bool,
    /// True for directories, including symlinks to directories when followed
    pub is_dir: bool,
    pub is_symlink: bool,
    pub mime_type: String,
    /// None when the platform or filesystem gives no identity
    pub identity: Option<FileIdentity>,
}

impl EntryInfo {
    /// Build entry info for `path`
    ///
    /// # Errors
    /// Returns error if metadata cannot be read
    pub fn query(path: &Path, follow_symlinks: bool) -> io::Result<Self> {
        let link_meta = fs::symlink_metadata(path)?;
        let is_symlink = link_meta.file_type().is_symlink();

        // A dangling link is still reported, just as a non-directory
        let meta = if is_symlink && follow_symlinks {
            fs::metadata(path).unwrap_or(link_meta)
        } else {
            link_meta
        };

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let is_dir = meta.is_dir();

        Ok(Self {
            path: path.to_path_buf(),
            display_name: name.clone(),
            is_hidden: is_hidden_name(&name),
            is_dir,
            is_symlink,
            mime_type: guess_mime(path, is_dir),
            identity: identity_of(path, &meta),
            name,
        })
    }
}

/// Dot files and editor backups (`name~`) are hidden
pub fn is_hidden_name(name: &str) -> bool {
    name.starts_with('.') || name.ends_with('~')
}

/// Resolve the identity of the object at `path`, following symlinks
///
/// # Errors
/// Returns error if metadata cannot be read
pub fn query_identity(path: &Path) -> io::Result<Option<FileIdentity>> {
    let meta = fs::metadata(path)?;
    Ok(identity_of(path, &meta))
}

#[cfg(unix)]
fn identity_of(_path: &Path, meta: &fs::Metadata) -> Option<FileIdentity> {
    use std::os::unix::fs::MetadataExt;
    Some(FileIdentity(format!("l{}:{}", meta.dev(), meta.ino())))
}

#[cfg(not(unix))]
fn identity_of(path: &Path, _meta: &fs::Metadata) -> Option<FileIdentity> {
    fs::canonicalize(path)
        .ok()
        .map(|p| FileIdentity(p.to_string_lossy().into_owned()))
}

/// Enumerate the entries of `dir` in filesystem order
///
/// Per-entry failures are yielded as errors so the caller can count and skip them.
///
/// # Errors
/// Returns error if the directory cannot be opened
pub fn read_entries(
    dir: &Path,
    follow_symlinks: bool,
) -> io::Result<impl Iterator<Item = io::Result<EntryInfo>>> {
    let reader = fs::read_dir(dir)?;
    Ok(reader.map(move |entry| {
        let entry = entry?;
        EntryInfo::query(&entry.path(), follow_symlinks)
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn reports_name_type_and_mime() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let file = temp_dir.path().join(".hidden.png");
        fs::write(&file, b"png").expect("Failed to write file");

        let info = EntryInfo::query(&file, true).expect("query");
        assert_eq!(info.name, ".hidden.png");
        assert!(info.is_hidden);
        assert!(!info.is_dir);
        assert_eq!(info.mime_type, "image/png");
        assert!(info.identity.is_some());
    }

    #[test]
    fn backups_are_hidden() {
        assert!(is_hidden_name(".bashrc"));
        assert!(is_hidden_name("notes.txt~"));
        assert!(!is_hidden_name("notes.txt"));
        assert!(!is_hidden_name("a~b.png"));
    }

    #[test]
    fn same_object_has_same_identity() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let dir = temp_dir.path().join("d");
        fs::create_dir(&dir).expect("Failed to create dir");

        let direct = query_identity(&dir).expect("identity");
        let dotted = query_identity(&dir.join(".")).expect("identity");
        assert_eq!(direct, dotted);
        assert_ne!(direct, query_identity(temp_dir.path()).expect("identity"));
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_directories_follow_only_when_asked() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let link = temp_dir.path().join("self");
        std::os::unix::fs::symlink(temp_dir.path(), &link).expect("Failed to create symlink");

        let followed = EntryInfo::query(&link, true).expect("query");
        assert!(followed.is_symlink);
        assert!(followed.is_dir);
        assert_eq!(
            followed.identity,
            query_identity(temp_dir.path()).expect("identity")
        );

        let unfollowed = EntryInfo::query(&link, false).expect("query");
        assert!(!unfollowed.is_dir);
    }

    #[test]
    fn missing_directory_is_an_error() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        assert!(read_entries(&temp_dir.path().join("gone"), true).is_err());
    }
}
