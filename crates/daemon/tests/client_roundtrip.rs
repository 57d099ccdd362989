use std::net::SocketAddr;

use tempfile::TempDir;
use url::Url;

use docsvc_daemon::http_server::api::client::{ApiClient, ApiError};
use docsvc_daemon::http_server::api::document::{CreateDocumentRequest, CreateParams};
use docsvc_daemon::http_server::health::liveness::LivezRequest;
use docsvc_daemon::http_server::health::version::VersionRequest;
use docsvc_daemon::{build_info, start_service, ServiceConfig};

#[tokio::test]
async fn client_talks_to_running_service() {
    let dir = TempDir::new().unwrap();
    let config = ServiceConfig {
        listen_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
        data_dir: dir.path().join("data"),
        gzip: true,
        ..ServiceConfig::default()
    };

    let (addr, shutdown, task) = start_service(&config).await.unwrap();
    let remote = Url::parse(&format!("http://{addr}")).unwrap();
    let mut client = ApiClient::new(&remote).unwrap();

    let livez = client.call(LivezRequest {}).await.unwrap();
    assert_eq!(livez.status, "ok");
    assert_eq!(client.call(VersionRequest {}).await.unwrap(), build_info());

    let created = client
        .create_document(CreateDocumentRequest {
            key: Some("notes".into()),
            content_type: Some("text/plain".into()),
            params: CreateParams {
                title: "Meeting notes".into(),
                ..CreateParams::default()
            },
            content: b"agenda".to_vec(),
        })
        .await
        .unwrap();
    assert!(created.ok);
    assert_eq!(created.key, "notes");

    let fetched = client.get_document("notes").await.unwrap();
    assert_eq!(fetched.document, "agenda");
    assert_eq!(fetched.title, "Meeting notes");
    assert_eq!(fetched.content_type, "text/plain");

    let removed = client.delete_document("notes").await.unwrap();
    assert_eq!(removed.message, "removed document");

    let err = client.get_document("notes").await.unwrap_err();
    match err {
        ApiError::Service { status, response } => {
            assert_eq!(status.as_u16(), 500);
            assert!(!response.ok);
            assert_eq!(response.message, "key not found");
        }
        other => panic!("unexpected error: {other}"),
    }

    drop(client);
    shutdown.shutdown();
    task.await.unwrap().unwrap();
    assert!(dir.path().join("data").join("metadata.db").exists());
}
