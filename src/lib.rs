//! Cancellable, breadth-first directory tree search.
//!
//! A [`SimpleSearchEngine`](search::SimpleSearchEngine) runs at most one
//! background session at a time. The session walks the tree from the query's
//! root, deduplicating directories by filesystem identity, and delivers hits
//! in bounded batches followed by a single `Finished` notification.

pub mod config;
pub use config::*;

pub mod error;
pub use error::SearchError;

pub mod search;
