//! Background traversal of one search session
//!
//! The worker walks the tree breadth-first from the snapshot's root, matching
//! entries and batching hits, until the queue drains, the session is stopped,
//! the time budget runs out, or the consumer disappears.

pub(crate) mod context;
mod visit;

use super::batcher::Batcher;
use super::entry::query_identity;
use super::traversal::TraversalQueue;
use super::visited::VisitedSet;
use context::SearchContext;
use std::time::{Duration, Instant};
use visit::{VisitOutcome, visit_directory};

/// How a traversal loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoopExit {
    Exhausted,
    Cancelled,
    TimedOut,
    ConsumerGone,
}

/// Run the traversal to completion on the current (blocking) thread
pub(crate) fn run(ctx: SearchContext) -> LoopExit {
    let root = ctx.snapshot.root.clone();
    log::info!(
        "Search session {} started: text='{}', root={}",
        ctx.outbox.session(),
        ctx.snapshot.text,
        root.display()
    );

    let mut visited = VisitedSet::new();
    let mut queue = TraversalQueue::with_root(&root);

    // Seed the root identity so links back to it are never re-queued
    match query_identity(&root) {
        Ok(Some(identity)) => {
            visited.insert(identity);
        }
        Ok(None) => {}
        Err(e) => log::debug!("No identity for search root {}: {e}", root.display()),
    }

    let deadline = ctx
        .config
        .timeout_ms
        .map(|ms| Instant::now() + Duration::from_millis(ms));

    let mut batcher = Batcher::new(ctx.config.batch_size, &ctx.outbox);

    let exit = loop {
        if ctx.is_cancelled() {
            break LoopExit::Cancelled;
        }
        if deadline.is_some_and(|d| Instant::now() >= d) {
            log::warn!("Search session {} timed out", ctx.outbox.session());
            break LoopExit::TimedOut;
        }
        let Some(dir) = queue.pop() else {
            break LoopExit::Exhausted;
        };

        let outcome = visit_directory(&dir, &ctx, &mut visited, &mut queue, &mut batcher);
        if outcome == VisitOutcome::ConsumerGone {
            break LoopExit::ConsumerGone;
        }
    };

    // A stopped session's partial batch is never flushed
    let exit = match exit {
        LoopExit::Cancelled | LoopExit::ConsumerGone => exit,
        LoopExit::Exhausted | LoopExit::TimedOut if !batcher.flush() => LoopExit::ConsumerGone,
        LoopExit::Exhausted | LoopExit::TimedOut => exit,
    };

    match exit {
        LoopExit::Exhausted | LoopExit::TimedOut => {
            // A stop() racing with the last flush suppresses the notification
            ctx.outbox.finish(exit == LoopExit::TimedOut);
        }
        LoopExit::Cancelled | LoopExit::ConsumerGone => {}
    }

    let stats = ctx.counters.snapshot(exit == LoopExit::TimedOut);
    log::info!(
        "Search session {} ended ({exit:?}): {} directories, {} entries, {} hits, {} errors, {} batches",
        ctx.outbox.session(),
        stats.directories_visited,
        stats.entries_processed,
        stats.hits,
        stats.error_count,
        batcher.batches_sent()
    );

    exit
}
