//! Background task spawning

use super::super::worker::{self, context::SearchContext};
use tokio::runtime::Handle;

/// Spawn the traversal on the blocking pool and detach it
///
/// If the worker panics, the monitor posts the terminal notification in its
/// place so the engine does not stay `Running` forever.
pub(super) fn spawn_search_task(runtime: &Handle, ctx: SearchContext) {
    let outbox = ctx.outbox.clone();
    let search_handle = runtime.spawn_blocking(move || worker::run(ctx));

    runtime.spawn(async move {
        if let Err(e) = search_handle.await {
            log::error!("Search session {} worker failed: {e}", outbox.session());
            outbox.finish(true);
        }
    });
}
