//! Visit of a single directory

use super::context::SearchContext;
use crate::search::batcher::{Batcher, DeliverBatch};
use crate::search::entry::read_entries;
use crate::search::traversal::{PendingDir, TraversalQueue};
use crate::search::types::HitRecord;
use crate::search::visited::VisitedSet;
use std::sync::atomic::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum VisitOutcome {
    Continue,
    ConsumerGone,
}

/// Match every entry of `dir` and queue its unseen subdirectories
///
/// A directory that cannot be read counts as one error and yields nothing.
pub(super) fn visit_directory<D: DeliverBatch>(
    dir: &PendingDir,
    ctx: &SearchContext,
    visited: &mut VisitedSet,
    queue: &mut TraversalQueue,
    batcher: &mut Batcher<D>,
) -> VisitOutcome {
    let counters = &ctx.counters;
    let config = &ctx.config;

    let entries = match read_entries(&dir.path, config.follow_symlinks) {
        Ok(entries) => entries,
        Err(e) => {
            counters.error_count.fetch_add(1, Ordering::SeqCst);
            log::debug!("Skipping unreadable directory {}: {e}", dir.path.display());
            return VisitOutcome::Continue;
        }
    };

    counters.directories_visited.fetch_add(1, Ordering::SeqCst);
    log::debug!("Visiting {} (depth {})", dir.path.display(), dir.depth);

    let child_depth = dir.depth + 1;
    let descend = config.max_depth.is_none_or(|max| child_depth <= max);

    for entry in entries {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                counters.error_count.fetch_add(1, Ordering::SeqCst);
                log::debug!("Skipping entry in {}: {e}", dir.path.display());
                continue;
            }
        };

        counters.entries_processed.fetch_add(1, Ordering::SeqCst);

        if entry.is_hidden && !config.include_hidden {
            continue;
        }

        if ctx
            .matcher
            .matches(&entry, &ctx.snapshot.words, &ctx.snapshot.mime_filter)
        {
            counters.hits.fetch_add(1, Ordering::SeqCst);
            let hit = HitRecord::new(&entry.path, entry.mime_type.clone());
            if !batcher.record(hit) {
                return VisitOutcome::ConsumerGone;
            }
        }

        if !entry.is_dir || !descend {
            continue;
        }

        // Without an identity the directory cannot be deduplicated; queue it anyway
        let unseen = match entry.identity {
            Some(identity) => visited.insert(identity),
            None => true,
        };
        if unseen {
            queue.push(entry.path, child_depth);
        } else {
            log::debug!("Already visited {}", entry.path.display());
        }
    }

    VisitOutcome::Continue
}
