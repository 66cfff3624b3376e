//! Worker-owned state of one search session

use crate::config::SearchConfig;
use crate::search::delivery::Outbox;
use crate::search::matcher::Matcher;
use crate::search::query::QuerySnapshot;
use crate::search::types::SessionCounters;
use std::sync::Arc;

/// Everything the worker needs, moved onto its thread at spawn time
pub(crate) struct SearchContext {
    pub(crate) snapshot: QuerySnapshot,
    pub(crate) config: SearchConfig,
    pub(crate) matcher: Arc<dyn Matcher>,
    pub(crate) counters: Arc<SessionCounters>,
    pub(crate) outbox: Outbox,
}

impl SearchContext {
    /// Polled at the top of every traversal iteration
    pub(crate) fn is_cancelled(&self) -> bool {
        self.outbox.is_cancelled()
    }
}
