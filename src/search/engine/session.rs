//! Session creation

use super::super::delivery::{Envelope, Outbox};
use super::super::matcher::Matcher;
use super::super::query::Query;
use super::super::types::{SessionCounters, SessionId, SessionStats};
use super::super::worker::context::SearchContext;
use crate::config::SearchConfig;

use std::sync::Arc;
use tokio::sync::{mpsc, watch};

/// Consumer-side reference to the running session
///
/// Owns the receiving end of the session's delivery channel. Dropping it
/// discards everything still queued and makes further posts fail.
pub(super) struct ActiveSession {
    pub(super) id: SessionId,
    pub(super) events_rx: mpsc::UnboundedReceiver<Envelope>,
    cancellation_tx: watch::Sender<bool>,
    counters: Arc<SessionCounters>,
}

impl ActiveSession {
    /// Raise the cancellation flag. Stays raised even after the sender is dropped.
    pub(super) fn cancel(&self) {
        self.cancellation_tx.send_replace(true);
    }

    pub(super) fn stats(&self) -> SessionStats {
        self.counters.snapshot(false)
    }
}

/// Build a new search session
///
/// Returns the consumer's handle and the worker's context, which share only
/// the cancellation flag, the counters and a delivery channel of their own.
pub(super) fn build_session(
    query: &Query,
    config: &SearchConfig,
    matcher: &Arc<dyn Matcher>,
) -> (ActiveSession, SearchContext) {
    let id = SessionId::new();
    let (cancellation_tx, cancellation_rx) = watch::channel(false);
    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let counters = Arc::new(SessionCounters::default());

    let context = SearchContext {
        snapshot: query.snapshot(),
        config: config.clone(),
        matcher: Arc::clone(matcher),
        counters: Arc::clone(&counters),
        outbox: Outbox::new(id, cancellation_rx, Arc::clone(&counters), events_tx),
    };

    let session = ActiveSession {
        id,
        events_rx,
        cancellation_tx,
        counters,
    };

    (session, context)
}
