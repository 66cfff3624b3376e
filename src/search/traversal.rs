//! FIFO frontier of directories pending a visit

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

/// Directory waiting in the queue, with its depth below the root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingDir {
    pub path: PathBuf,
    pub depth: usize,
}

/// Breadth-first traversal queue, seeded with the root
#[derive(Debug)]
pub struct TraversalQueue {
    pending: VecDeque<PendingDir>,
}

impl TraversalQueue {
    pub fn with_root(root: &Path) -> Self {
        let mut pending = VecDeque::new();
        pending.push_back(PendingDir {
            path: root.to_path_buf(),
            depth: 0,
        });
        Self { pending }
    }

    pub fn push(&mut self, path: PathBuf, depth: usize) {
        self.pending.push_back(PendingDir { path, depth });
    }

    pub fn pop(&mut self) -> Option<PendingDir> {
        self.pending.pop_front()
    }

    /// Directory that will be visited next
    pub fn peek(&self) -> Option<&PendingDir> {
        self.pending.front()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
