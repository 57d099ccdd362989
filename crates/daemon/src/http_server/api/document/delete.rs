use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use http::StatusCode;
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};
use store::DocumentError;

use super::response::{log_failure, respond, DocumentResponse};
use crate::http_server::api::client::{endpoint, ApiRequest};
use crate::ServiceState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteDocumentRequest {
    pub key: String,
}

/// Remove the blob, then the metadata record.
#[tracing::instrument(skip(state))]
pub async fn handler(
    State(state): State<ServiceState>,
    Path(key): Path<String>,
) -> Result<Response, DeleteError> {
    let documents = state.documents().clone();
    let target = key.clone();
    tokio::task::spawn_blocking(move || documents.remove(&target))
        .await?
        .map_err(|source| DeleteError::Store {
            key: key.clone(),
            source,
        })?;

    tracing::info!(key = %key, "document removed");
    Ok(respond(
        StatusCode::OK,
        DocumentResponse::success(key, "removed document"),
    ))
}

#[derive(Debug, thiserror::Error)]
pub enum DeleteError {
    #[error("{source}")]
    Store {
        key: String,
        #[source]
        source: DocumentError,
    },
    #[error("remove task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl IntoResponse for DeleteError {
    fn into_response(self) -> Response {
        let body = match &self {
            DeleteError::Store { key, source } => {
                log_failure("delete", key, source);
                let message = match source {
                    DocumentError::InvalidKey(_) => "invalid key",
                    DocumentError::MetadataDelete { .. } => "error removing metadata",
                    _ => "error removing document",
                };
                DocumentResponse::failure(key.as_str(), message, source)
            }
            DeleteError::Task(e) => {
                tracing::error!(error = %e, "remove task failed");
                DocumentResponse::failure("", "error removing document", e)
            }
        };
        respond(StatusCode::INTERNAL_SERVER_ERROR, body)
    }
}

impl ApiRequest for DeleteDocumentRequest {
    type Response = DocumentResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> RequestBuilder {
        client.delete(endpoint(base_url, &["document", &self.key]))
    }
}
