use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use super::StatusResponse;
use crate::http_server::api::client::{endpoint, ApiRequest};
use crate::ServiceState;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReadyzRequest {}

impl ApiRequest for ReadyzRequest {
    type Response = StatusResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> RequestBuilder {
        client.get(endpoint(base_url, &["_status", "readyz"]))
    }
}

/// Ok while the metadata database answers and the document root is present.
#[tracing::instrument(skip(state))]
pub async fn handler(State(state): State<ServiceState>) -> Response {
    let documents = state.documents().clone();
    let check = tokio::task::spawn_blocking(move || -> Result<(), BoxError> {
        documents.metadata().check()?;
        if !documents.blobs().root().is_dir() {
            return Err(format!(
                "document root {} is missing",
                documents.blobs().root().display()
            )
            .into());
        }
        Ok(())
    })
    .await;

    let body = match check {
        Ok(Ok(())) => return (StatusCode::OK, Json(StatusResponse::ok())).into_response(),
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "readiness check failed");
            StatusResponse::unavailable(e)
        }
        Err(e) => {
            tracing::error!(error = %e, "readiness task failed");
            StatusResponse::unavailable(e)
        }
    };
    (StatusCode::SERVICE_UNAVAILABLE, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use store::{BlobStore, DocumentStore, MetadataStore, UuidKeys};

    fn state(dir: &tempfile::TempDir) -> ServiceState {
        let blobs = BlobStore::open(dir.path().join("documents")).unwrap();
        let metadata = MetadataStore::temporary().unwrap();
        ServiceState::from_store(DocumentStore::new(blobs, metadata, Arc::new(UuidKeys)))
    }

    #[tokio::test]
    async fn test_ready_with_open_store() {
        let dir = tempfile::TempDir::new().unwrap();
        let response = handler(State(state(&dir))).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unavailable_without_document_root() {
        let dir = tempfile::TempDir::new().unwrap();
        let state = state(&dir);
        std::fs::remove_dir(dir.path().join("documents")).unwrap();

        let response = handler(State(state)).await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let status: StatusResponse = serde_json::from_slice(&body).unwrap();
        assert!(!status.is_ok());
        assert!(status.error.unwrap().contains("document root"));
    }
}
