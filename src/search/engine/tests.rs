use super::*;
use crate::search::entry::EntryInfo;
use crate::search::mime::MimeFilter;
use crate::search::types::path_to_uri;

use std::fs;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;

#[derive(Default)]
struct RecordingSink {
    batches: Vec<Vec<String>>,
    finished: Vec<SessionStats>,
}

impl ResultsSink for RecordingSink {
    fn hits_added(&mut self, hits: &[HitRecord]) {
        assert!(self.finished.is_empty(), "hits after finished");
        self.batches.push(hits.iter().map(|h| h.uri.clone()).collect());
    }

    fn finished(&mut self, stats: &SessionStats) {
        self.finished.push(*stats);
    }
}

fn png_tree() -> TempDir {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let root = temp_dir.path();
    fs::write(root.join("a.png"), b"a").expect("Failed to write a.png");
    fs::write(root.join("b.txt"), b"b").expect("Failed to write b.txt");
    fs::create_dir(root.join("d")).expect("Failed to create d");
    fs::write(root.join("d/c.png"), b"c").expect("Failed to write c.png");
    temp_dir
}

fn png_query(root: &Path) -> Query {
    Query::new("png")
        .with_mime_types(["image/*"])
        .expect("query")
        .with_location(root.to_string_lossy())
}

async fn collect(engine: &mut SimpleSearchEngine) -> Vec<SearchEvent> {
    let mut events = Vec::new();
    while let Some(event) = tokio::time::timeout(Duration::from_secs(10), engine.next_event())
        .await
        .expect("search did not finish in time")
    {
        events.push(event);
    }
    events
}

#[tokio::test]
async fn scenario_png_hits_then_finished() {
    let temp_dir = png_tree();
    let root = temp_dir.path();
    let mut engine = SimpleSearchEngine::new(SearchConfig::default()).expect("engine");
    engine.set_query(Some(png_query(root)));

    engine.start();
    assert_eq!(engine.state(), EngineState::Running);

    let events = collect(&mut engine).await;
    assert_eq!(events.len(), 2);
    match &events[0] {
        SearchEvent::HitsAdded { hits } => {
            let uris: Vec<_> = hits.iter().map(|h| h.uri.clone()).collect();
            assert_eq!(
                uris,
                vec![
                    path_to_uri(&root.join("a.png")),
                    path_to_uri(&root.join("d/c.png"))
                ]
            );
        }
        other => panic!("expected hits, got {other:?}"),
    }
    assert!(matches!(events[1], SearchEvent::Finished { .. }));
    assert_eq!(engine.state(), EngineState::Idle);
    assert!(engine.active_session().is_none());
}

#[tokio::test]
async fn second_start_keeps_the_running_session() {
    let temp_dir = png_tree();
    let mut engine = SimpleSearchEngine::new(SearchConfig::default()).expect("engine");
    engine.set_query(Some(png_query(temp_dir.path())));

    engine.start();
    let first = engine.active_session().expect("session");
    engine.start();
    engine.start();
    assert_eq!(engine.active_session(), Some(first));

    let events = collect(&mut engine).await;
    let finished = events
        .iter()
        .filter(|e| matches!(e, SearchEvent::Finished { .. }))
        .count();
    assert_eq!(finished, 1);
}

#[tokio::test]
async fn start_without_query_is_ignored() {
    let mut engine = SimpleSearchEngine::new(SearchConfig::default()).expect("engine");
    engine.start();
    assert_eq!(engine.state(), EngineState::Idle);
    assert!(engine.next_event().await.is_none());
}

#[tokio::test]
async fn stop_on_idle_engine_is_silent() {
    let mut engine = SimpleSearchEngine::new(SearchConfig::default()).expect("engine");
    engine.stop();
    engine.stop();

    let mut sink = RecordingSink::default();
    assert_eq!(engine.dispatch_pending(&mut sink), 0);
    assert_eq!(engine.state(), EngineState::Idle);
}

#[tokio::test]
async fn stopped_session_never_reports_finished() {
    let temp_dir = png_tree();
    let mut engine = SimpleSearchEngine::new(SearchConfig::default()).expect("engine");
    engine.set_query(Some(png_query(temp_dir.path())));

    engine.start();
    engine.stop();
    assert_eq!(engine.state(), EngineState::Idle);

    // Give the worker time to run to completion in the background
    tokio::time::sleep(Duration::from_millis(200)).await;

    let mut sink = RecordingSink::default();
    assert_eq!(engine.dispatch_pending(&mut sink), 0);
    assert!(sink.finished.is_empty());
    assert!(engine.next_event().await.is_none());
}

#[tokio::test]
async fn stop_after_first_batch_silences_the_rest() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let root = temp_dir.path();
    for dir in 0..4 {
        let sub = root.join(format!("album-{dir}"));
        fs::create_dir(&sub).expect("Failed to create dir");
        for n in 0..50 {
            fs::write(sub.join(format!("img-{n}.png")), b"").expect("Failed to write file");
        }
    }

    let config = SearchConfig {
        batch_size: 1,
        ..SearchConfig::default()
    };
    let mut engine = SimpleSearchEngine::new(config).expect("engine");
    engine.set_query(Some(png_query(root)));
    engine.start();

    let first = tokio::time::timeout(Duration::from_secs(10), engine.next_event())
        .await
        .expect("first batch in time");
    assert!(matches!(first, Some(SearchEvent::HitsAdded { .. })));

    engine.stop();
    tokio::time::sleep(Duration::from_millis(200)).await;

    let mut sink = RecordingSink::default();
    assert_eq!(engine.dispatch_pending(&mut sink), 0);
    assert!(sink.batches.is_empty());
    assert!(sink.finished.is_empty());
    assert!(engine.next_event().await.is_none());
    assert_eq!(engine.state(), EngineState::Idle);
}

#[test]
fn dropping_the_session_handle_discards_queued_notifications() {
    let temp_dir = png_tree();
    let matcher: Arc<dyn Matcher> = Arc::new(NameMimeMatcher);
    let query = png_query(temp_dir.path());
    let (active, ctx) = super::session::build_session(&query, &SearchConfig::default(), &matcher);

    assert!(ctx.outbox.post(SearchEvent::HitsAdded { hits: Vec::new() }));
    active.cancel();
    drop(active);

    // Nothing accumulates for a session nobody listens to
    assert!(!ctx.outbox.post(SearchEvent::HitsAdded { hits: Vec::new() }));
}

#[tokio::test]
async fn restart_after_stop_only_reports_the_new_session() {
    let temp_dir = png_tree();
    let mut engine = SimpleSearchEngine::new(SearchConfig::default()).expect("engine");
    engine.set_query(Some(png_query(temp_dir.path())));

    engine.start();
    let stopped = engine.active_session().expect("session");
    engine.stop();

    engine.start();
    let current = engine.active_session().expect("session");
    assert_ne!(stopped, current);

    let events = collect(&mut engine).await;
    let hits: usize = events
        .iter()
        .map(|e| match e {
            SearchEvent::HitsAdded { hits } => hits.len(),
            SearchEvent::Finished { .. } => 0,
        })
        .sum();
    assert_eq!(hits, 2);
    assert!(matches!(events.last(), Some(SearchEvent::Finished { .. })));
}

#[tokio::test]
async fn query_changes_do_not_reach_a_running_session() {
    let temp_dir = png_tree();
    let mut engine = SimpleSearchEngine::new(SearchConfig::default()).expect("engine");
    engine.set_query(Some(png_query(temp_dir.path())));
    engine.start();

    engine.set_query(Some(Query::new("txt").with_location(temp_dir.path().to_string_lossy())));
    engine.set_query(None);
    assert!(engine.query().is_none());

    let events = collect(&mut engine).await;
    let uris: Vec<String> = events
        .iter()
        .flat_map(|e| match e {
            SearchEvent::HitsAdded { hits } => hits.iter().map(|h| h.uri.clone()).collect(),
            SearchEvent::Finished { .. } => Vec::new(),
        })
        .collect();
    assert_eq!(uris.len(), 2);
    assert!(uris.iter().all(|u| u.ends_with(".png")));
}

#[tokio::test]
async fn dispatch_delivers_batches_before_finished() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let root = temp_dir.path();
    for n in 0..25 {
        fs::write(root.join(format!("img-{n}.png")), b"").expect("Failed to write file");
    }

    let config = SearchConfig {
        batch_size: 10,
        ..SearchConfig::default()
    };
    let mut engine = SimpleSearchEngine::new(config).expect("engine");
    engine.set_query(Some(png_query(root)));
    engine.start();

    let mut sink = RecordingSink::default();
    let deadline = tokio::time::Instant::now() + Duration::from_secs(10);
    while sink.finished.is_empty() {
        assert!(tokio::time::Instant::now() < deadline, "search did not finish in time");
        engine.dispatch_pending(&mut sink);
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    let sizes: Vec<_> = sink.batches.iter().map(Vec::len).collect();
    assert_eq!(sizes, vec![10, 10, 5]);
    assert_eq!(sink.finished.len(), 1);
    assert_eq!(sink.finished[0].hits, 25);
    assert_eq!(engine.state(), EngineState::Idle);
}

#[tokio::test]
async fn injected_matcher_replaces_the_default() {
    let temp_dir = png_tree();
    let dirs_only = |entry: &EntryInfo, _: &[String], _: &MimeFilter| entry.is_dir;
    let mut engine = SimpleSearchEngine::new(SearchConfig::default())
        .expect("engine")
        .with_matcher(dirs_only);
    engine.set_query(Some(png_query(temp_dir.path())));
    engine.start();

    let events = collect(&mut engine).await;
    match &events[0] {
        SearchEvent::HitsAdded { hits } => {
            assert_eq!(hits.len(), 1);
            assert_eq!(hits[0].uri, path_to_uri(&temp_dir.path().join("d")));
        }
        other => panic!("expected hits, got {other:?}"),
    }
}

#[tokio::test]
async fn engines_run_independently() {
    let first_tree = png_tree();
    let second_tree = png_tree();
    let mut first = SimpleSearchEngine::new(SearchConfig::default()).expect("engine");
    let mut second = SimpleSearchEngine::new(SearchConfig::default()).expect("engine");
    first.set_query(Some(png_query(first_tree.path())));
    second.set_query(Some(png_query(second_tree.path())));

    first.start();
    second.start();
    first.stop();

    let events = collect(&mut second).await;
    assert!(matches!(events.last(), Some(SearchEvent::Finished { .. })));
    assert!(first.next_event().await.is_none());
}

#[test]
fn variant_is_not_indexed_and_needs_a_runtime() {
    assert!(matches!(
        SimpleSearchEngine::new(SearchConfig::default()),
        Err(SearchError::NoRuntime(_))
    ));

    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("runtime");
    let engine: Box<dyn SearchEngine> = Box::new(
        SimpleSearchEngine::with_runtime(SearchConfig::default(), runtime.handle().clone())
            .expect("engine"),
    );
    assert!(!engine.is_indexed());
    assert_eq!(engine.state(), EngineState::Idle);
}

#[test]
fn invalid_config_is_rejected() {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("runtime");
    let config = SearchConfig {
        batch_size: 0,
        ..SearchConfig::default()
    };
    assert!(matches!(
        SimpleSearchEngine::with_runtime(config, runtime.handle().clone()),
        Err(SearchError::InvalidConfig { .. })
    ));
}
