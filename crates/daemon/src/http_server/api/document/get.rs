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
pub struct GetDocumentRequest {
    pub key: String,
}

#[tracing::instrument(skip(state))]
pub async fn handler(
    State(state): State<ServiceState>,
    Path(key): Path<String>,
) -> Result<Response, GetError> {
    let documents = state.documents().clone();
    let lookup = key.clone();
    let document = tokio::task::spawn_blocking(move || documents.fetch(&lookup))
        .await?
        .map_err(|source| GetError::Store { key, source })?;

    Ok(respond(
        StatusCode::OK,
        DocumentResponse::from_document(document),
    ))
}

#[derive(Debug, thiserror::Error)]
pub enum GetError {
    #[error("{source}")]
    Store {
        key: String,
        #[source]
        source: DocumentError,
    },
    #[error("fetch task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl IntoResponse for GetError {
    fn into_response(self) -> Response {
        let body = match &self {
            GetError::Store { key, source } => {
                log_failure("get", key, source);
                let message = match source {
                    DocumentError::NotFound(_) => "key not found",
                    DocumentError::InvalidKey(_) => "invalid key",
                    DocumentError::Metadata { .. } => "error reading metadata",
                    _ => "error reading file",
                };
                DocumentResponse::failure(key.as_str(), message, source)
            }
            GetError::Task(e) => {
                tracing::error!(error = %e, "fetch task failed");
                DocumentResponse::failure("", "error reading file", e)
            }
        };
        respond(StatusCode::INTERNAL_SERVER_ERROR, body)
    }
}

impl ApiRequest for GetDocumentRequest {
    type Response = DocumentResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> RequestBuilder {
        client.get(endpoint(base_url, &["document", &self.key]))
    }
}
