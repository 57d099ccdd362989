use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use docsvc_daemon::http_server::{self, App};
use docsvc_daemon::{ServiceConfig, ServiceState};
use store::{
    BlobStore, DocumentStore, MetadataStore, NewDocument, SequentialKeys, METADATA_TREE,
};

// -- Helpers --------------------------------------------------------------

struct TestApp {
    app: App,
    state: ServiceState,
    _dir: TempDir,
}

fn test_app() -> TestApp {
    test_app_with(ServiceConfig::default())
}

fn test_app_with(config: ServiceConfig) -> TestApp {
    let dir = TempDir::new().unwrap();
    let blobs = BlobStore::open(dir.path().join("documents")).unwrap();
    let metadata = MetadataStore::temporary().unwrap();
    let documents = DocumentStore::new(blobs, metadata, Arc::new(SequentialKeys::new("doc")));
    let state = ServiceState::from_store(documents);

    TestApp {
        app: http_server::app(state.clone(), &config),
        state,
        _dir: dir,
    }
}

struct DbTestApp {
    app: TestApp,
    db: sled::Db,
}

/// Like [`test_app`], but keeps a handle on the metadata database.
fn test_app_on_db() -> DbTestApp {
    let dir = TempDir::new().unwrap();
    let blobs = BlobStore::open(dir.path().join("documents")).unwrap();
    let db = sled::Config::new().temporary(true).open().unwrap();
    let metadata = MetadataStore::from_db(db.clone()).unwrap();
    let documents = DocumentStore::new(blobs, metadata, Arc::new(SequentialKeys::new("doc")));
    let state = ServiceState::from_store(documents);

    DbTestApp {
        app: TestApp {
            app: http_server::app(state.clone(), &ServiceConfig::default()),
            state,
            _dir: dir,
        },
        db,
    }
}

async fn send(app: &App, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, value)
}

fn post(uri: &str, content_type: &str, body: &'static [u8]) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, content_type)
        .body(Body::from(body))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn delete(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

// -- Document lifecycle ---------------------------------------------------

#[tokio::test]
async fn json_document_lifecycle() {
    let t = test_app();

    let (status, body) = send(
        &t.app,
        post("/document", "application/json", br#"{"a":1,"b":2}"#),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], "true");
    assert_eq!(body["message"], "document saved (13 bytes)");
    let key = body["key"].as_str().unwrap().to_string();
    assert!(!key.is_empty());

    let (status, body) = send(&t.app, get(&format!("/document/{key}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], "true");
    assert_eq!(body["key"], key.as_str());
    assert_eq!(body["content-type"], "application/json");
    assert!(body["timestamp"].as_i64().unwrap() > 0);
    let text = body["document"].as_str().unwrap();
    let document: Value = serde_json::from_str(text).unwrap();
    assert_eq!(document, json!({"a": 1, "b": 2}));

    let (status, body) = send(&t.app, delete(&format!("/document/{key}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], "true");
    assert_eq!(body["message"], "removed document");

    let (status, body) = send(&t.app, get(&format!("/document/{key}"))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["ok"], "false");
    assert_eq!(body["message"], "key not found");
}

#[tokio::test]
async fn metadata_comes_from_query_parameters() {
    let t = test_app();

    let (status, _) = send(
        &t.app,
        post(
            "/document/report?name=report.txt&extractor=tika&dc:title=Quarterly&dcterms:created=2016-01-01&dcterms:modified=2016-02-01",
            "text/plain",
            b"numbers",
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&t.app, get("/document/report")).await;
    assert_eq!(body["name"], "report.txt");
    assert_eq!(body["extractor"], "tika");
    assert_eq!(body["title"], "Quarterly");
    assert_eq!(body["creation-date"], "2016-01-01");
    assert_eq!(body["modification-date"], "2016-02-01");
    assert_eq!(body["document"], "numbers");
}

#[tokio::test]
async fn trailing_slashes_are_accepted() {
    let t = test_app();

    let (status, body) = send(&t.app, post("/document/", "text/plain", b"slash")).await;
    assert_eq!(status, StatusCode::OK);
    let key = body["key"].as_str().unwrap().to_string();

    let (status, _) = send(&t.app, get(&format!("/document/{key}/"))).await;
    assert_eq!(status, StatusCode::OK);
}

// -- Failures ---------------------------------------------------------------

#[tokio::test]
async fn create_on_existing_key_is_file_exists() {
    let t = test_app();
    send(&t.app, post("/document/k", "text/plain", b"first")).await;

    let (status, body) = send(&t.app, post("/document/k", "text/plain", b"second")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["ok"], "false");
    assert_eq!(body["message"], "file exists");
    assert_eq!(body["key"], "k");

    let (_, body) = send(&t.app, get("/document/k")).await;
    assert_eq!(body["document"], "first");
}

#[tokio::test]
async fn generated_key_collision_is_515() {
    let t = test_app();
    // the allocator's first key is already taken
    t.state
        .documents()
        .create(NewDocument::default().key("doc-0"), &b"taken"[..])
        .unwrap();

    let (status, body) = send(&t.app, post("/document", "text/plain", b"new")).await;
    assert_eq!(status.as_u16(), 515);
    assert_eq!(body["message"], "file exists");
    assert_eq!(body["key"], "doc-0");
}

#[tokio::test]
async fn empty_body_is_input_error() {
    let t = test_app();

    let (status, body) = send(&t.app, post("/document/k", "text/plain", b"")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "input error");
    assert_eq!(body["error"], "no data uploaded");
    assert!(body.get("key").is_none());

    let (_, body) = send(&t.app, get("/document/k")).await;
    assert_eq!(body["message"], "key not found");
}

#[tokio::test]
async fn blob_orphan_fails_get_and_delete_clears_it() {
    let t = test_app();
    t.state
        .documents()
        .blobs()
        .create("orphan", &b"bytes"[..])
        .unwrap();

    let (status, body) = send(&t.app, get("/document/orphan")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "error reading metadata");

    let (status, body) = send(&t.app, delete("/document/orphan")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "removed document");
    assert!(!t.state.documents().blobs().exists("orphan"));
}

#[tokio::test]
async fn failed_metadata_write_is_reported_and_leaves_blob() {
    let t = test_app_on_db();
    assert!(t.db.drop_tree(METADATA_TREE).unwrap());

    let (status, body) = send(&t.app.app, post("/document/k", "text/plain", b"bytes")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["ok"], "false");
    assert_eq!(body["key"], "k");
    assert_eq!(body["message"], "file metadata write error");
    assert!(t.app.state.documents().blobs().exists("k"));

    // a restart reopens the tree and finds the leftover blob
    let reopened = DocumentStore::new(
        t.app.state.documents().blobs().clone(),
        MetadataStore::from_db(t.db.clone()).unwrap(),
        Arc::new(SequentialKeys::new("doc")),
    );
    assert_eq!(reopened.scan().unwrap().blob_orphans, vec!["k".to_string()]);
}

#[tokio::test]
async fn failed_metadata_delete_is_reported() {
    let t = test_app_on_db();
    send(&t.app.app, post("/document/k", "text/plain", b"bytes")).await;
    assert!(t.db.drop_tree(METADATA_TREE).unwrap());

    let (status, body) = send(&t.app.app, delete("/document/k")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "error removing metadata");
    assert_eq!(body["key"], "k");
}

#[tokio::test]
async fn missing_document_root_is_file_creation_error() {
    let t = test_app();
    let root = t.state.documents().blobs().root().to_path_buf();
    std::fs::remove_dir(root).unwrap();

    let (status, body) = send(&t.app, post("/document/k", "text/plain", b"bytes")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "file creation error");
    assert_eq!(body["key"], "k");
}

#[tokio::test]
async fn delete_missing_document_fails() {
    let t = test_app();

    let (status, body) = send(&t.app, delete("/document/nope")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "error removing document");
    assert_eq!(body["key"], "nope");
}

#[tokio::test]
async fn dot_dot_key_is_rejected() {
    let t = test_app();

    let (status, body) = send(&t.app, post("/document/..", "text/plain", b"escape")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "invalid key");
}

#[tokio::test]
async fn oversized_upload_is_refused() {
    let t = test_app_with(ServiceConfig {
        max_upload_size: 4,
        ..ServiceConfig::default()
    });

    let (status, _) = send(&t.app, post("/document/big", "text/plain", b"too large")).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert!(t.state.documents().fetch("big").is_err());
}

// -- Health -----------------------------------------------------------------

#[tokio::test]
async fn status_endpoints() {
    let t = test_app();

    let (status, body) = send(&t.app, get("/_status/livez")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));

    let (status, body) = send(&t.app, get("/_status/readyz")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body) = send(&t.app, get("/_status/version")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "docsvc-daemon");
}
