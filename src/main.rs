//! Tree search command line
//!
//! Runs one search session and prints every notification as a JSON line.
//! Ctrl-C stops the session.

use anyhow::Result;
use clap::Parser;
use kodegen_tools_tree_search::SearchConfig;
use kodegen_tools_tree_search::search::{Query, SearchEngine, SimpleSearchEngine};

#[derive(Debug, Parser)]
#[command(name = "kodegen-tree-search", version, about = "Search a directory tree by name and MIME type")]
struct Args {
    /// Words that must all appear in the entry name
    #[arg(default_value = "")]
    text: String,

    /// Root directory as a path or file:// URI
    #[arg(short, long, env = "KODEGEN_TREE_SEARCH_ROOT")]
    root: Option<String>,

    /// Accepted MIME type patterns, e.g. image/* (repeatable)
    #[arg(short, long = "mime")]
    mime_types: Vec<String>,

    /// Include entries whose name starts with '.'
    #[arg(long)]
    hidden: bool,

    /// Do not descend into symlinked directories
    #[arg(long)]
    no_follow: bool,

    /// Maximum directory depth below the root
    #[arg(long)]
    max_depth: Option<usize>,

    /// Give up after this many milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Hits per batch
    #[arg(long)]
    batch_size: Option<usize>,
}

impl Args {
    fn config(&self) -> Result<SearchConfig> {
        let mut config = SearchConfig::from_env()?;
        config.include_hidden |= self.hidden;
        if self.no_follow {
            config.follow_symlinks = false;
        }
        if self.max_depth.is_some() {
            config.max_depth = self.max_depth;
        }
        if self.timeout_ms.is_some() {
            config.timeout_ms = self.timeout_ms;
        }
        if let Some(size) = self.batch_size {
            config.batch_size = size;
        }
        config.validate()?;
        Ok(config)
    }

    fn query(&self) -> Result<Query> {
        let mut query = Query::new(self.text.clone()).with_mime_types(&self.mime_types)?;
        if let Some(root) = &self.root {
            query = query.with_location(root.clone());
        }
        Ok(query)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();
    let mut engine = SimpleSearchEngine::new(args.config()?)?;
    engine.set_query(Some(args.query()?));
    engine.start();

    loop {
        tokio::select! {
            event = engine.next_event() => {
                let Some(event) = event else { break };
                println!("{}", serde_json::to_string(&event)?);
            }
            _ = tokio::signal::ctrl_c() => {
                if let Some(stats) = engine.stats() {
                    log::warn!("Interrupted after {} hits", stats.hits);
                }
                engine.stop();
                break;
            }
        }
    }

    Ok(())
}
