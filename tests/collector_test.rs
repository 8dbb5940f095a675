use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{Html, Redirect},
    routing::{get, post},
};
use serde_json::{Value, json};
use wordfeed::cursor::CursorStore;
use wordfeed::db::Database;
use wordfeed::dispatch::SiteRegistry;
use wordfeed::engine::{CycleOutcome, SyncEngine};
use wordfeed::error::SourceError;
use wordfeed::model::{Delivery, WordBatch};
use wordfeed::extract::{Schema, parse_and_extract};
use wordfeed::page::{LivePage, PageSource, SnapshotFile};
use wordfeed::status::{StatusPoller, StatusSource};
use wordfeed::transport::{Transport, WordSink, http_client};

#[derive(Clone, Default)]
struct Collector {
    status: Arc<Mutex<Value>>,
    received: Arc<Mutex<Vec<Vec<String>>>>,
}

async fn parsing_status(State(state): State<Collector>) -> Json<Value> {
    Json(state.status.lock().unwrap().clone())
}

async fn words(State(state): State<Collector>, Json(batch): Json<WordBatch>) -> StatusCode {
    state.received.lock().unwrap().push(batch.words);
    StatusCode::OK
}

const RACE_PAGE: &str =
    "<div class=\"editor-text\"><span class=\"word\">мир\u{02FD}</span><span class=\"word\">труд</span></div>";

async fn race_page() -> Html<&'static str> {
    Html(RACE_PAGE)
}

async fn garbage() -> &'static str {
    "<html>not json</html>"
}

async fn spawn_collector(state: Collector) -> String {
    let app = Router::new()
        .route("/parsing_status", get(parsing_status))
        .route("/words", post(words))
        .route("/broken_status", get(garbage))
        .route("/race", get(race_page))
        .route("/moved", get(|| async { Redirect::temporary("/race") }))
        .route("/rejecting_words", post(|| async { StatusCode::INTERNAL_SERVER_ERROR }))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn client() -> reqwest::Client {
    http_client(Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn poller_reads_flags_and_defaults() {
    let state = Collector::default();
    *state.status.lock().unwrap() = json!({ "enabled": true, "force": true });
    let base = spawn_collector(state.clone()).await;

    let poller = StatusPoller::new(client(), format!("{}/parsing_status", base));
    let status = poller.poll().await;
    assert!(status.enabled);
    assert!(status.memory_enabled);
    assert!(status.force);

    *state.status.lock().unwrap() = json!({ "enabled": true, "memory_enabled": false });
    let status = poller.poll().await;
    assert!(!status.memory_enabled);
    assert!(!status.force);
}

#[tokio::test]
async fn poller_fails_closed() {
    let base = spawn_collector(Collector::default()).await;

    let broken = StatusPoller::new(client(), format!("{}/broken_status", base));
    assert!(!broken.poll().await.enabled);

    let unreachable = StatusPoller::new(client(), "http://127.0.0.1:9/parsing_status");
    assert!(!unreachable.poll().await.enabled);
}

#[tokio::test]
async fn transport_posts_words_object() {
    let state = Collector::default();
    let base = spawn_collector(state.clone()).await;

    let transport = Transport::new(client(), format!("{}/words", base));
    let batch = WordBatch {
        words: vec!["fn".into(), "".into(), "\t".into()],
    };
    assert_eq!(transport.deliver(&batch).await, Delivery::Delivered(200));
    assert_eq!(*state.received.lock().unwrap(), vec![batch.words.clone()]);

    let rejecting = Transport::new(client(), format!("{}/rejecting_words", base));
    assert_eq!(rejecting.deliver(&batch).await, Delivery::Delivered(500));

    let offline = Transport::new(client(), "http://127.0.0.1:9/words");
    assert!(matches!(offline.deliver(&batch).await, Delivery::Dropped(_)));
}

#[tokio::test]
async fn engine_syncs_snapshot_through_collector() {
    let state = Collector::default();
    *state.status.lock().unwrap() = json!({ "enabled": true });
    let base = spawn_collector(state.clone()).await;

    let dir = tempfile::tempdir().unwrap();
    let page_path = dir.path().join("page.html");
    let page = |words: &[&str]| {
        let spans: String = words
            .iter()
            .map(|w| format!("<span class=\"word\">{}\u{02FD}</span>", w))
            .collect();
        format!("<div class=\"editor-text\">{}</div>", spans)
    };
    std::fs::write(&page_path, page(&["один", "два"])).unwrap();

    let db = Database::open(dir.path().join("cursors.db").to_str().unwrap()).await.unwrap();
    let engine = SyncEngine::new(
        SnapshotFile::new(&page_path, "https://gonki.nabiraem.ru/race/42"),
        StatusPoller::new(client(), format!("{}/parsing_status", base)),
        Transport::new(client(), format!("{}/words", base)),
        db,
        SiteRegistry::default(),
        Duration::from_millis(10),
    );

    assert!(matches!(engine.run_cycle().await, CycleOutcome::Sent { words: 2, .. }));
    assert_eq!(engine.run_cycle().await, CycleOutcome::UpToDate);

    std::fs::write(&page_path, page(&["один", "два", "три"])).unwrap();
    engine.run_cycle().await;
    assert_eq!(engine.cursors().read("gonki.nabiraem.ru").await, 3);

    *state.status.lock().unwrap() = json!({ "enabled": false });
    std::fs::write(&page_path, page(&["четыре"])).unwrap();
    assert_eq!(engine.run_cycle().await, CycleOutcome::Disabled);

    assert_eq!(
        *state.received.lock().unwrap(),
        vec![
            vec!["один".to_string(), "два".to_string()],
            vec!["три".to_string()],
        ]
    );
}

#[tokio::test]
async fn live_page_fetches_and_follows_redirects() {
    let base = spawn_collector(Collector::default()).await;

    let page = LivePage::new(client(), format!("{}/race", base));
    let snapshot = page.snapshot().await.unwrap();
    assert_eq!(snapshot.html, RACE_PAGE);
    assert_eq!(snapshot.url, format!("{}/race", base));
    assert_eq!(snapshot.origin(), "127.0.0.1");
    assert_eq!(
        parse_and_extract(Schema::Gonki.extractor().as_ref(), &snapshot.html),
        vec!["мир", "труд"]
    );

    let moved = LivePage::new(client(), format!("{}/moved", base));
    let snapshot = moved.snapshot().await.unwrap();
    assert_eq!(snapshot.url, format!("{}/race", base));
    assert_eq!(snapshot.html, RACE_PAGE);
}

#[tokio::test]
async fn live_page_rejects_error_status() {
    let base = spawn_collector(Collector::default()).await;

    let missing = LivePage::new(client(), format!("{}/no_such_page", base));
    assert!(matches!(missing.snapshot().await, Err(SourceError::Http { .. })));

    let offline = LivePage::new(client(), "http://127.0.0.1:9/race");
    assert!(matches!(offline.snapshot().await, Err(SourceError::Http { .. })));
}
