use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::{HeaderMap, StatusCode};
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};
use store::{DocumentError, NewDocument};

use super::response::{file_exists_status, log_failure, respond, DocumentResponse};
use crate::http_server::api::client::{endpoint, ApiRequest};
use crate::ServiceState;

/// Metadata fields passed as query parameters on upload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateParams {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub extractor: String,
    #[serde(default, rename = "dc:title")]
    pub title: String,
    #[serde(default, rename = "dcterms:created")]
    pub created: String,
    #[serde(default, rename = "dcterms:modified")]
    pub modified: String,
}

impl CreateParams {
    fn query_pairs(&self) -> Vec<(&'static str, &str)> {
        [
            ("name", self.name.as_str()),
            ("extractor", self.extractor.as_str()),
            ("dc:title", self.title.as_str()),
            ("dcterms:created", self.created.as_str()),
            ("dcterms:modified", self.modified.as_str()),
        ]
        .into_iter()
        .filter(|(_, value)| !value.is_empty())
        .collect()
    }
}

/// Upload request. Without a `key` the service generates one.
#[derive(Debug, Clone, Default)]
pub struct CreateDocumentRequest {
    pub key: Option<String>,
    pub content_type: Option<String>,
    pub params: CreateParams,
    pub content: Vec<u8>,
}

/// `POST /document`: store the body under a generated key.
pub async fn handler(
    State(state): State<ServiceState>,
    Query(params): Query<CreateParams>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, CreateError> {
    create(state, None, params, &headers, body).await
}

/// `POST /document/:key`: store the body under `key`.
pub async fn handler_with_key(
    State(state): State<ServiceState>,
    Path(key): Path<String>,
    Query(params): Query<CreateParams>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, CreateError> {
    create(state, Some(key), params, &headers, body).await
}

async fn create(
    state: ServiceState,
    key: Option<String>,
    params: CreateParams,
    headers: &HeaderMap,
    body: Bytes,
) -> Result<Response, CreateError> {
    let auto_key = key.is_none();
    let requested = key.unwrap_or_default();
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    let new = NewDocument::default()
        .key(requested.as_str())
        .content_type(content_type)
        .name(params.name)
        .extractor(params.extractor)
        .title(params.title)
        .creation_date(params.created)
        .modification_date(params.modified);

    let documents = state.documents().clone();
    let created = tokio::task::spawn_blocking(move || documents.create(new, body.as_ref()))
        .await?
        .map_err(|source| CreateError::Store {
            key: requested,
            auto_key,
            source,
        })?;

    tracing::info!(key = %created.key, size = created.size, "document saved");
    Ok(respond(
        StatusCode::OK,
        DocumentResponse::success(
            created.key,
            format!("document saved ({} bytes)", created.size),
        ),
    ))
}

#[derive(Debug, thiserror::Error)]
pub enum CreateError {
    #[error("{source}")]
    Store {
        /// Key from the path, empty when the service was to generate one
        key: String,
        auto_key: bool,
        #[source]
        source: DocumentError,
    },
    #[error("create task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl IntoResponse for CreateError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            CreateError::Store {
                key,
                auto_key,
                source,
            } => {
                let key = source.key().unwrap_or(key.as_str());
                log_failure("create", key, source);
                match source {
                    DocumentError::Conflict(_) if *auto_key => (
                        file_exists_status(),
                        DocumentResponse::failure(key, "file exists", source),
                    ),
                    DocumentError::Conflict(_) => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        DocumentResponse::failure(key, "file exists", source),
                    ),
                    DocumentError::EmptyInput => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        DocumentResponse::failure("", "input error", source),
                    ),
                    DocumentError::InvalidKey(_) => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        DocumentResponse::failure(key, "invalid key", source),
                    ),
                    DocumentError::BlobCreate { .. } => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        DocumentResponse::failure(key, "file creation error", source),
                    ),
                    DocumentError::MetadataWrite { .. } => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        DocumentResponse::failure(key, "file metadata write error", source),
                    ),
                    _ => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        DocumentResponse::failure(key, "file write error", source),
                    ),
                }
            }
            CreateError::Task(e) => {
                tracing::error!(error = %e, "create task failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    DocumentResponse::failure("", "file write error", e),
                )
            }
        };
        respond(status, body)
    }
}

impl ApiRequest for CreateDocumentRequest {
    type Response = DocumentResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> RequestBuilder {
        let url = match self.key.as_deref() {
            Some(key) if !key.is_empty() => endpoint(base_url, &["document", key]),
            _ => endpoint(base_url, &["document"]),
        };

        let mut request = client.post(url).query(&self.params.query_pairs());
        if let Some(content_type) = self.content_type {
            request = request.header(CONTENT_TYPE, content_type);
        }
        request.body(self.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_pairs_skip_empty_fields() {
        let params = CreateParams {
            name: "report.json".into(),
            title: "Report".into(),
            ..CreateParams::default()
        };
        assert_eq!(
            params.query_pairs(),
            vec![("name", "report.json"), ("dc:title", "Report")]
        );
    }

    #[test]
    fn test_build_request_targets_key() {
        let base = Url::parse("http://localhost:8000").unwrap();
        let client = Client::new();

        let request = CreateDocumentRequest {
            key: Some("k1".into()),
            content_type: Some("text/plain".into()),
            content: b"hi".to_vec(),
            ..CreateDocumentRequest::default()
        }
        .build_request(&base, &client)
        .build()
        .unwrap();
        assert_eq!(request.url().as_str(), "http://localhost:8000/document/k1");
        assert_eq!(request.headers()[CONTENT_TYPE], "text/plain");

        let request = CreateDocumentRequest::default()
            .build_request(&base, &client)
            .build()
            .unwrap();
        assert_eq!(request.url().as_str(), "http://localhost:8000/document");
    }
}
