use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::Client;
use url::Url;

use super::error::ApiError;
use super::ApiRequest;
use crate::http_server::api::document::{
    CreateDocumentRequest, DeleteDocumentRequest, DocumentResponse, GetDocumentRequest,
};

#[derive(Debug, Clone)]
pub struct ApiClient {
    pub remote: Url,
    client: Client,
}

impl ApiClient {
    pub fn new(remote: &Url) -> Result<Self, ApiError> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let client = Client::builder().default_headers(default_headers).build()?;

        Ok(Self {
            remote: remote.clone(),
            client,
        })
    }

    /// Send `request` and decode the response.
    ///
    /// Failure responses that carry the service envelope come back as
    /// [`ApiError::Service`]; anything else as [`ApiError::HttpStatus`].
    pub async fn call<T: ApiRequest>(&mut self, request: T) -> Result<T::Response, ApiError> {
        let request_builder = request.build_request(&self.remote, &self.client);
        let response = request_builder.send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response.json::<T::Response>().await?);
        }

        let body = response.text().await?;
        match serde_json::from_str::<DocumentResponse>(&body) {
            Ok(envelope) if !envelope.ok => Err(ApiError::Service {
                status,
                response: envelope,
            }),
            _ => Err(ApiError::HttpStatus(status, body)),
        }
    }

    /// Get the base URL for API requests
    pub fn base_url(&self) -> &Url {
        &self.remote
    }

    pub async fn get_document(&mut self, key: &str) -> Result<DocumentResponse, ApiError> {
        self.call(GetDocumentRequest {
            key: key.to_string(),
        })
        .await
    }

    pub async fn create_document(
        &mut self,
        request: CreateDocumentRequest,
    ) -> Result<DocumentResponse, ApiError> {
        self.call(request).await
    }

    pub async fn delete_document(&mut self, key: &str) -> Result<DocumentResponse, ApiError> {
        self.call(DeleteDocumentRequest {
            key: key.to_string(),
        })
        .await
    }
}
