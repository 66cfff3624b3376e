//! Deduplication of visited directories by identity

use super::entry::FileIdentity;
use std::collections::HashSet;

/// Identities of directories already queued or visited in one session
#[derive(Debug, Default)]
pub struct VisitedSet {
    seen: HashSet<FileIdentity>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `identity`; returns false if it was already present
    pub fn insert(&mut self, identity: FileIdentity) -> bool {
        self.seen.insert(identity)
    }

    pub fn contains(&self, identity: &FileIdentity) -> bool {
        self.seen.contains(identity)
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
