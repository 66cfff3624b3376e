//! Ordered delivery channel between a worker and the consumer
//!
//! Every notification of a session travels through the session's own unbounded
//! channel, so batches arrive in flush order and `Finished` is always last.
//! Each envelope carries the session's cancellation flag; the consumer checks
//! it at delivery time and drops envelopes of stopped sessions.

use super::batcher::DeliverBatch;
use super::types::{HitRecord, SearchEvent, SessionCounters, SessionId};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};

/// Notification in flight from a worker
pub(crate) struct Envelope {
    pub(crate) session: SessionId,
    cancellation_rx: watch::Receiver<bool>,
    pub(crate) event: SearchEvent,
}

impl Envelope {
    /// True if the session was stopped, checked now rather than at send time
    pub(crate) fn is_cancelled(&self) -> bool {
        *self.cancellation_rx.borrow()
    }
}

/// Worker-side handle for posting notifications of one session
#[derive(Clone)]
pub(crate) struct Outbox {
    session: SessionId,
    cancellation_rx: watch::Receiver<bool>,
    counters: Arc<SessionCounters>,
    tx: mpsc::UnboundedSender<Envelope>,
}

impl Outbox {
    pub(crate) fn new(
        session: SessionId,
        cancellation_rx: watch::Receiver<bool>,
        counters: Arc<SessionCounters>,
        tx: mpsc::UnboundedSender<Envelope>,
    ) -> Self {
        Self {
            session,
            cancellation_rx,
            counters,
            tx,
        }
    }

    /// Post an event; returns false if the consumer side is gone
    pub(crate) fn post(&self, event: SearchEvent) -> bool {
        self.tx
            .send(Envelope {
                session: self.session,
                cancellation_rx: self.cancellation_rx.clone(),
                event,
            })
            .is_ok()
    }

    /// Post the terminal notification unless the session was stopped
    pub(crate) fn finish(&self, incomplete: bool) -> bool {
        if self.is_cancelled() {
            return false;
        }
        self.post(SearchEvent::Finished {
            stats: self.counters.snapshot(incomplete),
        })
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        *self.cancellation_rx.borrow()
    }

    pub(crate) fn session(&self) -> SessionId {
        self.session
    }
}

impl DeliverBatch for &Outbox {
    fn deliver(&mut self, batch: Vec<HitRecord>) -> bool {
        self.post(SearchEvent::HitsAdded { hits: batch })
    }
}
