//! Search engine coordinating one background session at a time
//!
//! This module provides the `SearchEngine` trait and the brute-force
//! `SimpleSearchEngine`. All methods are called from the consumer's context;
//! the worker runs on tokio's blocking pool and reports back through an ordered
//! per-session channel that the consumer drains with `next_event`,
//! `try_next_event` or `dispatch_pending`. `stop` drops that channel along
//! with anything still queued in it.

mod session;
mod spawn;

use super::delivery::Envelope;
use super::matcher::{Matcher, NameMimeMatcher};
use super::query::Query;
use super::types::{EngineState, HitRecord, SearchEvent, SessionId, SessionStats};
use crate::config::SearchConfig;
use crate::error::SearchError;
use session::ActiveSession;

use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::mpsc::error::TryRecvError;

/// Consumer of session notifications
pub trait ResultsSink {
    /// One batch of hits, in flush order
    fn hits_added(&mut self, hits: &[HitRecord]);

    /// Terminal notification; never sent for a stopped session
    fn finished(&mut self, stats: &SessionStats);
}

/// Common interface of search engine variants
pub trait SearchEngine: Send {
    /// Replace the stored query. A running session keeps its own snapshot.
    fn set_query(&mut self, query: Option<Query>);

    /// Start a session for the stored query.
    ///
    /// No-op when already running or when no query is set.
    fn start(&mut self);

    /// Stop the running session, if any. Its remaining notifications are dropped.
    fn stop(&mut self);

    /// Whether this variant answers from a prebuilt index
    fn is_indexed(&self) -> bool;

    fn state(&self) -> EngineState;

    /// Deliver every queued notification to `sink`; returns how many were delivered
    fn dispatch_pending(&mut self, sink: &mut dyn ResultsSink) -> usize;
}

/// Engine that walks the directory tree on every search
pub struct SimpleSearchEngine {
    config: SearchConfig,
    matcher: Arc<dyn Matcher>,
    runtime: Handle,
    query: Option<Query>,
    active: Option<ActiveSession>,
}

impl SimpleSearchEngine {
    /// Create an engine bound to the current tokio runtime
    ///
    /// # Errors
    /// Returns error if called outside a tokio runtime or `config` is invalid
    pub fn new(config: SearchConfig) -> Result<Self, SearchError> {
        Self::with_runtime(config, Handle::try_current()?)
    }

    /// Create an engine that spawns its workers on `runtime`
    ///
    /// # Errors
    /// Returns error if `config` is invalid
    pub fn with_runtime(config: SearchConfig, runtime: Handle) -> Result<Self, SearchError> {
        config.validate()?;
        Ok(Self {
            config,
            matcher: Arc::new(NameMimeMatcher),
            runtime,
            query: None,
            active: None,
        })
    }

    /// Replace the match policy used by sessions started from now on
    #[must_use]
    pub fn with_matcher(mut self, matcher: impl Matcher + 'static) -> Self {
        self.matcher = Arc::new(matcher);
        self
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn query(&self) -> Option<&Query> {
        self.query.as_ref()
    }

    /// Identifier of the running session
    pub fn active_session(&self) -> Option<SessionId> {
        self.active.as_ref().map(|a| a.id)
    }

    /// Live counters of the running session
    pub fn stats(&self) -> Option<SessionStats> {
        self.active.as_ref().map(ActiveSession::stats)
    }

    /// Wait for the next notification of the running session
    ///
    /// Returns `None` once the engine is idle. Cancel-safe.
    pub async fn next_event(&mut self) -> Option<SearchEvent> {
        loop {
            let active = self.active.as_mut()?;
            let Some(envelope) = active.events_rx.recv().await else {
                self.detach_silent_session();
                return None;
            };
            if let Some(event) = self.accept(envelope) {
                return Some(event);
            }
        }
    }

    /// Take the next queued notification without waiting
    pub fn try_next_event(&mut self) -> Option<SearchEvent> {
        loop {
            let active = self.active.as_mut()?;
            let envelope = match active.events_rx.try_recv() {
                Ok(envelope) => envelope,
                Err(TryRecvError::Empty) => return None,
                Err(TryRecvError::Disconnected) => {
                    self.detach_silent_session();
                    return None;
                }
            };
            if let Some(event) = self.accept(envelope) {
                return Some(event);
            }
        }
    }

    /// Filter an envelope at delivery time
    fn accept(&mut self, envelope: Envelope) -> Option<SearchEvent> {
        if envelope.is_cancelled() {
            log::debug!("Dropping notification of stopped session {}", envelope.session);
            return None;
        }

        if let SearchEvent::Finished { stats } = &envelope.event {
            log::info!(
                "Search session {} finished with {} hits",
                envelope.session,
                stats.hits
            );
            self.active = None;
        }

        Some(envelope.event)
    }

    /// Every sender of the running session is gone without a terminal notification
    fn detach_silent_session(&mut self) {
        if let Some(active) = self.active.take() {
            log::warn!("Search session {} ended without finishing", active.id);
        }
    }
}

impl SearchEngine for SimpleSearchEngine {
    fn set_query(&mut self, query: Option<Query>) {
        self.query = query;
    }

    fn start(&mut self) {
        if self.active.is_some() {
            log::debug!("Search already running, start ignored");
            return;
        }
        let Some(query) = self.query.as_ref() else {
            log::debug!("No query set, start ignored");
            return;
        };

        let (active, ctx) = session::build_session(query, &self.config, &self.matcher);
        log::debug!("Starting search session {}", active.id);

        spawn::spawn_search_task(&self.runtime, ctx);
        self.active = Some(active);
    }

    fn stop(&mut self) {
        if let Some(active) = self.active.take() {
            log::info!("Stopping search session {}", active.id);
            active.cancel();
            // Dropping `active` frees whatever the worker already queued
        }
    }

    fn is_indexed(&self) -> bool {
        false
    }

    fn state(&self) -> EngineState {
        if self.active.is_some() {
            EngineState::Running
        } else {
            EngineState::Idle
        }
    }

    fn dispatch_pending(&mut self, sink: &mut dyn ResultsSink) -> usize {
        let mut delivered = 0;
        while let Some(event) = self.try_next_event() {
            match &event {
                SearchEvent::HitsAdded { hits } => sink.hits_added(hits),
                SearchEvent::Finished { stats } => sink.finished(stats),
            }
            delivered += 1;
        }
        delivered
    }
}

impl Drop for SimpleSearchEngine {
    fn drop(&mut self) {
        // Let a detached worker exit at its next iteration
        self.stop();
    }
}

#[cfg(test)]
mod tests;
